use crate::config::MaintenanceConfig;
use crate::gate::PathGate;
use crate::overrides::{FileOverrideStore, OverrideStore};
use crate::resolver::{
    BuildFlags, ConfigResolver, EnvFlags, HostStatus, LocalOverride, StaticDefault,
};
use crate::settings::Settings;
use crate::unlock::UnlockSigner;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Everything a request handler needs, built once per process.
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    /// Runtime copy of the injected flags; `/api/maintenance` rewrites it.
    pub flags: Arc<Mutex<BuildFlags>>,
    pub resolver: Arc<ConfigResolver>,
    pub gate: PathGate,
    pub signer: UnlockSigner,
}

impl AppState {
    pub fn new(settings: Settings) -> Self {
        let env = EnvFlags::new(settings.build_flags.clone());
        let flags = env.shared();
        let baseline = MaintenanceConfig::static_default();

        // Env flags, operator override, this host's own switches, bundled default.
        let mut resolver = ConfigResolver::new(baseline.clone()).with_provider(env);
        if let Some(path) = settings.override_path.clone() {
            let store: Arc<dyn OverrideStore> = Arc::new(FileOverrideStore::new(path));
            resolver = resolver.with_provider(LocalOverride::new(store));
        }
        let resolver = resolver
            .with_provider(HostStatus::new(
                settings.maintenance_mode,
                settings.status_dir.clone(),
            ))
            .with_provider(StaticDefault::new(baseline));
        let signer = match &settings.cookie_secret {
            Some(secret) => UnlockSigner::new(secret),
            None => UnlockSigner::with_random_key(),
        };

        Self {
            settings: Arc::new(settings),
            flags,
            resolver: Arc::new(resolver),
            gate: PathGate::default(),
            signer,
        }
    }
}
