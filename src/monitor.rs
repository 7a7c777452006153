use crate::config::MaintenanceConfig;
use crate::eta::estimated_return_text;
use crate::gate::{GateDecision, HOME_PAGE, PathGate};
use crate::resolver::ConfigResolver;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

pub const SESSION_MESSAGE_KEY: &str = "maintenance_message";
pub const SESSION_RETURN_KEY: &str = "maintenance_return";

/// Moves the visitor to another page.
pub trait Navigator: Send + Sync {
    fn navigate(&self, to: &str);
}

/// Short-lived state handed from the redirecting page to the maintenance page.
pub trait SessionStash: Send + Sync {
    fn stash(&self, key: &str, value: String);
}

#[derive(Default)]
pub struct MemorySession {
    values: Mutex<BTreeMap<String, String>>,
}

impl MemorySession {
    pub fn get(&self, key: &str) -> Option<String> {
        self.values.lock().ok()?.get(key).cloned()
    }
}

impl SessionStash for MemorySession {
    fn stash(&self, key: &str, value: String) {
        if let Ok(mut values) = self.values.lock() {
            values.insert(key.to_string(), value);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    Unchecked,
    Live,
    Maintenance,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateAction {
    Stay,
    RedirectToMaintenance(String),
    RedirectHome,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MonitorExit {
    Redirected(GateAction),
    Cancelled,
}

/// Runs the gating flow for one page view.
pub struct GateMonitor {
    resolver: ConfigResolver,
    gate: PathGate,
    navigator: Arc<dyn Navigator>,
    session: Arc<dyn SessionStash>,
    state: GateState,
    redirected: bool,
}

impl GateMonitor {
    pub fn new(
        resolver: ConfigResolver,
        gate: PathGate,
        navigator: Arc<dyn Navigator>,
        session: Arc<dyn SessionStash>,
    ) -> Self {
        Self {
            resolver,
            gate,
            navigator,
            session,
            state: GateState::Unchecked,
            redirected: false,
        }
    }

    pub fn state(&self) -> GateState {
        self.state
    }

    /// Resolves the config once and applies the outcome for `path`.
    pub async fn check(&mut self, path: &str) -> (GateAction, MaintenanceConfig) {
        let config = self.resolver.resolve().await;
        let action = self.apply(path, &config);
        (action, config)
    }

    fn apply(&mut self, path: &str, config: &MaintenanceConfig) -> GateAction {
        if self.redirected {
            return GateAction::Stay;
        }

        let previous = self.state;
        self.state = if config.enabled {
            GateState::Maintenance
        } else {
            GateState::Live
        };
        if previous != self.state {
            info!(?previous, next = ?self.state, "gate state changed");
        }

        if self.gate.is_maintenance_page(path) {
            // Only a visitor who was parked here by maintenance is sent back.
            if config.enabled || previous != GateState::Maintenance {
                return GateAction::Stay;
            }
            self.redirected = true;
            info!("maintenance over, sending visitor home");
            self.navigator.navigate(HOME_PAGE);
            return GateAction::RedirectHome;
        }

        match self.gate.decide(path, config) {
            GateDecision::Allow => GateAction::Stay,
            GateDecision::Redirect { to } => {
                self.session.stash(
                    SESSION_MESSAGE_KEY,
                    config.message.clone().unwrap_or_default(),
                );
                self.session.stash(
                    SESSION_RETURN_KEY,
                    estimated_return_text(config.estimated_return.as_deref()),
                );
                self.redirected = true;
                info!(%path, %to, "redirecting to maintenance page");
                self.navigator.navigate(&to);
                GateAction::RedirectToMaintenance(to)
            }
        }
    }

    /// Checks `path` now and again every refresh interval until a redirect
    /// happens or `cancel` fires. A zero interval means check once and wait.
    pub async fn run(mut self, path: &str, cancel: CancellationToken) -> MonitorExit {
        loop {
            let (action, config) = self.check(path).await;
            if action != GateAction::Stay {
                return MonitorExit::Redirected(action);
            }

            let interval = config.auto_refresh_interval_ms;
            if interval == 0 {
                cancel.cancelled().await;
                return MonitorExit::Cancelled;
            }

            debug!(interval_ms = interval, "scheduling maintenance re-check");
            tokio::select! {
                _ = cancel.cancelled() => return MonitorExit::Cancelled,
                _ = tokio::time::sleep(Duration::from_millis(interval)) => {}
            }
        }
    }
}
