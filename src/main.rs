use area22_gate::{AppState, Settings, router};
use std::net::SocketAddr;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let settings = Settings::from_env();
    if settings.api_key.is_none() {
        warn!("MAINTENANCE_API_KEY is not set; /api/maintenance accepts any caller");
    }
    if settings.cookie_secret.is_none() {
        info!("REQUEST_COOKIE_SECRET not set; unlock cookies last until restart");
    }

    let addr = SocketAddr::from(([0, 0, 0, 0], settings.port));
    info!(
        maintenance_mode = settings.maintenance_mode,
        environment = %settings.environment,
        status_dir = %settings.status_dir.display(),
        site_dir = %settings.site_dir.display(),
        "starting maintenance gate"
    );

    let app = router(AppState::new(settings));

    info!("listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = signal::ctrl_c().await {
        warn!("failed to listen for ctrl-c: {err}");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
