use crate::config::{
    ConfigLayer, ConfigSource, DEFAULT_ENV_MESSAGE, MaintenanceConfig, OVERRIDE_KEY,
};
use crate::errors::SourceError;
use crate::overrides::OverrideStore;
use crate::probe::RemoteStatusProbe;
use crate::storage::read_status_flag;
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// One source of maintenance configuration.
///
/// `Ok(None)` means the source is absent and resolution moves on quietly.
/// Errors are logged by the resolver and also fall through.
#[async_trait]
pub trait ConfigProvider: Send + Sync {
    fn source(&self) -> ConfigSource;
    async fn load(&self) -> Result<Option<ConfigLayer>, SourceError>;
}

/// The `VERCEL_MAINTENANCE_*` values injected at deploy time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildFlags {
    pub enabled: Option<bool>,
    pub message: Option<String>,
    pub return_date: Option<String>,
}

impl BuildFlags {
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.is_empty());
        Self {
            enabled: lookup("VERCEL_MAINTENANCE_ENABLED").map(|value| value == "true"),
            message: non_empty("VERCEL_MAINTENANCE_MESSAGE"),
            return_date: non_empty("VERCEL_MAINTENANCE_RETURN"),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled == Some(true)
    }
}

/// Build flags shared with whoever may rewrite them at runtime.
#[derive(Clone, Default)]
pub struct EnvFlags {
    flags: Arc<Mutex<BuildFlags>>,
}

impl EnvFlags {
    pub fn new(flags: BuildFlags) -> Self {
        Self {
            flags: Arc::new(Mutex::new(flags)),
        }
    }

    pub fn shared(&self) -> Arc<Mutex<BuildFlags>> {
        Arc::clone(&self.flags)
    }
}

#[async_trait]
impl ConfigProvider for EnvFlags {
    fn source(&self) -> ConfigSource {
        ConfigSource::Env
    }

    async fn load(&self) -> Result<Option<ConfigLayer>, SourceError> {
        let flags = self.flags.lock().await;
        Ok(flags.enabled.map(|enabled| ConfigLayer {
            enabled,
            message: Some(
                flags
                    .message
                    .clone()
                    .unwrap_or_else(|| DEFAULT_ENV_MESSAGE.to_string()),
            ),
            estimated_return: flags.return_date.clone(),
            ..ConfigLayer::default()
        }))
    }
}

pub struct LocalOverride {
    store: Arc<dyn OverrideStore>,
}

impl LocalOverride {
    pub fn new(store: Arc<dyn OverrideStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl ConfigProvider for LocalOverride {
    fn source(&self) -> ConfigSource {
        ConfigSource::LocalOverride
    }

    async fn load(&self) -> Result<Option<ConfigLayer>, SourceError> {
        match self.store.get(OVERRIDE_KEY).await? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }
}

pub struct StaticDefault {
    config: MaintenanceConfig,
}

impl StaticDefault {
    pub fn new(config: MaintenanceConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl ConfigProvider for StaticDefault {
    fn source(&self) -> ConfigSource {
        ConfigSource::StaticDefault
    }

    async fn load(&self) -> Result<Option<ConfigLayer>, SourceError> {
        Ok(Some(ConfigLayer::from(&self.config)))
    }
}

#[async_trait]
impl ConfigProvider for RemoteStatusProbe {
    fn source(&self) -> ConfigSource {
        ConfigSource::RemoteProbe
    }

    async fn load(&self) -> Result<Option<ConfigLayer>, SourceError> {
        Ok(self.check().await.map(|outcome| {
            debug!("remote probe answered via {:?}", outcome.method);
            ConfigLayer::enabled(outcome.enabled)
        }))
    }
}

/// The switches a remote check would find on this host: `MAINTENANCE_MODE`
/// first, then the text status file.
pub struct HostStatus {
    maintenance_mode: bool,
    status_dir: PathBuf,
}

impl HostStatus {
    pub fn new(maintenance_mode: bool, status_dir: impl Into<PathBuf>) -> Self {
        Self {
            maintenance_mode,
            status_dir: status_dir.into(),
        }
    }
}

#[async_trait]
impl ConfigProvider for HostStatus {
    fn source(&self) -> ConfigSource {
        ConfigSource::RemoteProbe
    }

    async fn load(&self) -> Result<Option<ConfigLayer>, SourceError> {
        if self.maintenance_mode {
            return Ok(Some(ConfigLayer::enabled(true)));
        }
        Ok(read_status_flag(&self.status_dir)
            .await?
            .map(ConfigLayer::enabled))
    }
}

/// Layers configuration sources in a fixed priority order.
pub struct ConfigResolver {
    baseline: MaintenanceConfig,
    providers: Vec<Box<dyn ConfigProvider>>,
}

impl ConfigResolver {
    pub fn new(baseline: MaintenanceConfig) -> Self {
        Self {
            baseline,
            providers: Vec::new(),
        }
    }

    /// Env flags, then the local override, then the remote status check (if any),
    /// then the static baseline.
    pub fn standard(
        baseline: MaintenanceConfig,
        env: EnvFlags,
        overrides: Option<Arc<dyn OverrideStore>>,
        probe: Option<RemoteStatusProbe>,
    ) -> Self {
        let mut resolver = Self::new(baseline.clone()).with_provider(env);
        if let Some(store) = overrides {
            resolver = resolver.with_provider(LocalOverride::new(store));
        }
        if let Some(probe) = probe {
            resolver = resolver.with_provider(probe);
        }
        resolver.with_provider(StaticDefault::new(baseline))
    }

    pub fn with_provider(mut self, provider: impl ConfigProvider + 'static) -> Self {
        self.providers.push(Box::new(provider));
        self
    }

    pub async fn resolve(&self) -> MaintenanceConfig {
        for provider in &self.providers {
            let source = provider.source();
            match provider.load().await {
                Ok(Some(layer)) => {
                    let config = layer.into_config(source, &self.baseline);
                    debug!(?source, enabled = config.enabled, "maintenance config resolved");
                    return config;
                }
                Ok(None) => debug!(?source, "config source absent"),
                Err(SourceError::Malformed(reason)) => {
                    warn!(?source, "skipping malformed config: {reason}")
                }
                Err(SourceError::Unavailable(reason)) => {
                    warn!(?source, "config source unavailable: {reason}")
                }
            }
        }

        MaintenanceConfig::fallback(&self.baseline)
    }
}
