pub mod app;
pub mod config;
pub mod errors;
pub mod eta;
pub mod gate;
pub mod handlers;
pub mod models;
pub mod monitor;
pub mod overrides;
pub mod probe;
pub mod resolver;
pub mod settings;
pub mod state;
pub mod storage;
pub mod ui;
pub mod unlock;

pub use app::router;
pub use config::{ConfigSource, MaintenanceConfig};
pub use gate::{GateDecision, PathGate};
pub use monitor::{GateAction, GateMonitor, GateState};
pub use probe::RemoteStatusProbe;
pub use resolver::ConfigResolver;
pub use settings::Settings;
pub use state::AppState;
