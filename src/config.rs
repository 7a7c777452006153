use serde::{Deserialize, Serialize};

pub const DEFAULT_SITE_MESSAGE: &str = "We're currently performing some essential updates to bring you an even better experience. Our website will be back online shortly. Thank you for your patience!";
pub const DEFAULT_ENV_MESSAGE: &str =
    "We are currently performing maintenance. Please check back soon.";
pub const DEFAULT_AUTO_REFRESH_MS: u64 = 300_000;
pub const OVERRIDE_KEY: &str = "area22_maintenance_config";

/// Where a resolved [`MaintenanceConfig`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConfigSource {
    Env,
    LocalOverride,
    StaticDefault,
    RemoteProbe,
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceConfig {
    pub enabled: bool,
    pub message: Option<String>,
    pub estimated_return: Option<String>,
    pub exclude_paths: Vec<String>,
    pub auto_refresh_interval_ms: u64,
    pub source: ConfigSource,
}

impl MaintenanceConfig {
    /// The configuration bundled with the site.
    pub fn static_default() -> Self {
        Self {
            enabled: false,
            message: Some(DEFAULT_SITE_MESSAGE.to_string()),
            estimated_return: None,
            exclude_paths: ["/admin.html", "/maintenance.html", "/admin", "/api/"]
                .into_iter()
                .map(String::from)
                .collect(),
            auto_refresh_interval_ms: DEFAULT_AUTO_REFRESH_MS,
            source: ConfigSource::StaticDefault,
        }
    }

    /// Used when no source answered at all.
    pub fn fallback(baseline: &MaintenanceConfig) -> Self {
        Self {
            enabled: false,
            message: None,
            estimated_return: None,
            exclude_paths: baseline.exclude_paths.clone(),
            auto_refresh_interval_ms: baseline.auto_refresh_interval_ms,
            source: ConfigSource::Fallback,
        }
    }

    pub fn is_excluded(&self, path: &str) -> bool {
        self.exclude_paths
            .iter()
            .any(|prefix| path.starts_with(prefix.as_str()))
    }
}

/// A partial answer from one source. Missing fields are filled from the
/// static baseline when the layer is resolved. Exclusions always come from
/// the baseline, so no source can lock operators out of `/admin` or `/api/`.
/// A missing `enabled` reads as live.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigLayer {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub estimated_return: Option<String>,
    #[serde(default, alias = "autoRefreshInterval")]
    pub auto_refresh_interval_ms: Option<u64>,
}

impl ConfigLayer {
    pub fn enabled(enabled: bool) -> Self {
        Self {
            enabled,
            ..Self::default()
        }
    }

    pub fn into_config(self, source: ConfigSource, baseline: &MaintenanceConfig) -> MaintenanceConfig {
        MaintenanceConfig {
            enabled: self.enabled,
            message: self.message.or_else(|| baseline.message.clone()),
            estimated_return: self.estimated_return,
            exclude_paths: baseline.exclude_paths.clone(),
            auto_refresh_interval_ms: self
                .auto_refresh_interval_ms
                .unwrap_or(baseline.auto_refresh_interval_ms),
            source,
        }
    }
}

impl From<&MaintenanceConfig> for ConfigLayer {
    fn from(config: &MaintenanceConfig) -> Self {
        Self {
            enabled: config.enabled,
            message: config.message.clone(),
            estimated_return: config.estimated_return.clone(),
            auto_refresh_interval_ms: Some(config.auto_refresh_interval_ms),
        }
    }
}
