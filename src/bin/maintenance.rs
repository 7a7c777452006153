use area22_gate::config::{ConfigLayer, MaintenanceConfig, OVERRIDE_KEY};
use area22_gate::monitor::{MemorySession, MonitorExit, Navigator};
use area22_gate::overrides::{FileOverrideStore, OverrideStore};
use area22_gate::probe::HttpFetcher;
use area22_gate::resolver::{BuildFlags, EnvFlags};
use area22_gate::storage::{load_status_flag, persist_status, status_message};
use area22_gate::{ConfigResolver, GateMonitor, PathGate, RemoteStatusProbe};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Parser)]
#[command(name = "maintenance", version, about = "Area22 maintenance mode tool")]
struct Cli {
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Enable maintenance mode in the status files
    On {
        #[arg(long, default_value = ".")]
        dir: PathBuf,
    },
    /// Disable maintenance mode in the status files
    Off {
        #[arg(long, default_value = ".")]
        dir: PathBuf,
    },
    /// Flip the current state of the status files
    Toggle {
        #[arg(long, default_value = ".")]
        dir: PathBuf,
    },
    /// Show the state recorded in the status files
    Status {
        #[arg(long, default_value = ".")]
        dir: PathBuf,
    },
    /// Manage the operator override read before the remote probe
    Override {
        #[arg(long, default_value = "maintenance-override.json")]
        file: PathBuf,
        #[command(subcommand)]
        action: OverrideAction,
    },
    /// Follow a deployed site the way a visitor's browser would
    Watch {
        #[arg(long)]
        base_url: String,
        #[arg(long, default_value = "/")]
        path: String,
        #[arg(long)]
        edge_config_url: Option<String>,
        #[arg(long)]
        override_file: Option<PathBuf>,
        /// Re-check interval; 0 checks once
        #[arg(long, default_value_t = 30_000)]
        refresh_ms: u64,
    },
}

#[derive(Subcommand)]
enum OverrideAction {
    Set {
        #[arg(long)]
        enabled: bool,
        #[arg(long)]
        message: Option<String>,
        #[arg(long)]
        return_date: Option<String>,
    },
    Clear,
}

struct LogNavigator;

impl Navigator for LogNavigator {
    fn navigate(&self, to: &str) {
        info!(%to, "visitor would be redirected");
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    match Cli::parse().cmd {
        Cmd::On { dir } => set_status(dir, true).await?,
        Cmd::Off { dir } => set_status(dir, false).await?,
        Cmd::Toggle { dir } => {
            let current = load_status_flag(&dir).await;
            info!("toggling from {}", label(current));
            set_status(dir, !current).await?;
        }
        Cmd::Status { dir } => {
            let current = load_status_flag(&dir).await;
            println!("Current status: {}", label(current));
            println!("{}", status_message(current));
        }
        Cmd::Override { file, action } => {
            let store = FileOverrideStore::new(file);
            match action {
                OverrideAction::Set {
                    enabled,
                    message,
                    return_date,
                } => {
                    let layer = ConfigLayer {
                        enabled,
                        message,
                        estimated_return: return_date,
                        ..ConfigLayer::default()
                    };
                    store.set(OVERRIDE_KEY, serde_json::to_string(&layer)?).await?;
                    println!("Override set: {}", label(enabled));
                }
                OverrideAction::Clear => {
                    store.remove(OVERRIDE_KEY).await?;
                    println!("Override cleared");
                }
            }
        }
        Cmd::Watch {
            base_url,
            path,
            edge_config_url,
            override_file,
            refresh_ms,
        } => {
            let mut probe = RemoteStatusProbe::new(Arc::new(HttpFetcher::default()), base_url);
            if let Some(url) = edge_config_url {
                probe = probe.with_edge_config(url);
            }
            let overrides = override_file
                .map(|file| Arc::new(FileOverrideStore::new(file)) as Arc<dyn OverrideStore>);
            let baseline = MaintenanceConfig {
                auto_refresh_interval_ms: refresh_ms,
                ..MaintenanceConfig::static_default()
            };
            let env = EnvFlags::new(BuildFlags::from_lookup(|key| std::env::var(key).ok()));
            let resolver = ConfigResolver::standard(baseline, env, overrides, Some(probe));
            let monitor = GateMonitor::new(
                resolver,
                PathGate::default(),
                Arc::new(LogNavigator),
                Arc::new(MemorySession::default()),
            );

            let cancel = CancellationToken::new();
            let ctrl_c = cancel.clone();
            tokio::spawn(async move {
                if let Err(err) = tokio::signal::ctrl_c().await {
                    warn!("failed to listen for ctrl-c: {err}");
                    return;
                }
                ctrl_c.cancel();
            });

            match monitor.run(&path, cancel).await {
                MonitorExit::Redirected(action) => println!("Stopped after {action:?}"),
                MonitorExit::Cancelled => println!("Stopped"),
            }
        }
    }

    Ok(())
}

async fn set_status(dir: PathBuf, enabled: bool) -> Result<(), Box<dyn std::error::Error>> {
    let status = persist_status(&dir, enabled)
        .await
        .map_err(|err| err.message)?;
    println!("Maintenance mode {}", if enabled { "ENABLED" } else { "DISABLED" });
    println!("Status files updated at {}", status.timestamp);
    println!(
        "Set MAINTENANCE_MODE={} in the hosting environment to match.",
        status.maintenance_mode
    );
    Ok(())
}

fn label(enabled: bool) -> &'static str {
    if enabled { "MAINTENANCE MODE" } else { "LIVE" }
}
