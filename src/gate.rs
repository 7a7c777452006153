use crate::config::MaintenanceConfig;

pub const MAINTENANCE_PAGE: &str = "/maintenance.html";
pub const HOME_PAGE: &str = "/";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    Allow,
    Redirect { to: String },
}

/// Decides whether a path renders normally or is sent to the maintenance page.
#[derive(Debug, Clone)]
pub struct PathGate {
    maintenance_paths: Vec<String>,
    target: String,
}

impl Default for PathGate {
    fn default() -> Self {
        Self {
            maintenance_paths: vec!["/maintenance".to_string(), MAINTENANCE_PAGE.to_string()],
            target: MAINTENANCE_PAGE.to_string(),
        }
    }
}

impl PathGate {
    pub fn is_maintenance_page(&self, path: &str) -> bool {
        self.maintenance_paths.iter().any(|page| page == path)
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn decide(&self, path: &str, config: &MaintenanceConfig) -> GateDecision {
        if !config.enabled || self.is_maintenance_page(path) || config.is_excluded(path) {
            return GateDecision::Allow;
        }

        GateDecision::Redirect {
            to: self.target.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(enabled: bool) -> MaintenanceConfig {
        MaintenanceConfig {
            enabled,
            ..MaintenanceConfig::static_default()
        }
    }

    #[test]
    fn disabled_config_allows_every_path() {
        let gate = PathGate::default();
        let config = config(false);
        for path in ["/", "/index.html", "/maintenance.html", "/api/x", "/gallery.html"] {
            assert_eq!(gate.decide(path, &config), GateDecision::Allow, "{path}");
        }
    }

    #[test]
    fn excluded_paths_allowed_when_enabled() {
        let gate = PathGate::default();
        let config = config(true);
        assert_eq!(gate.decide("/admin.html", &config), GateDecision::Allow);
        assert_eq!(gate.decide("/api/maintenance", &config), GateDecision::Allow);
        assert_eq!(gate.decide("/admin/settings", &config), GateDecision::Allow);
    }

    #[test]
    fn maintenance_page_always_allowed() {
        let gate = PathGate::default();
        let mut config = config(true);
        config.exclude_paths.clear();
        assert_eq!(gate.decide("/maintenance", &config), GateDecision::Allow);
        assert_eq!(gate.decide("/maintenance.html", &config), GateDecision::Allow);
    }

    #[test]
    fn other_paths_redirect_when_enabled() {
        let gate = PathGate::default();
        let config = config(true);
        assert_eq!(
            gate.decide("/pricing.html", &config),
            GateDecision::Redirect {
                to: MAINTENANCE_PAGE.to_string()
            }
        );
    }
}
