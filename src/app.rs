use crate::handlers;
use crate::state::AppState;
use axum::{
    Router, middleware,
    routing::{get, post},
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/maintenance-status",
            get(handlers::maintenance_status)
                .options(handlers::preflight)
                .fallback(handlers::status_wrong_method)
                .layer(middleware::map_response(handlers::cors_status)),
        )
        .route(
            "/api/maintenance",
            post(handlers::maintenance_admin)
                .options(handlers::preflight)
                .fallback(handlers::admin_wrong_method)
                .layer(middleware::map_response(handlers::cors_admin)),
        )
        .route("/maintenance-status.txt", get(handlers::status_text))
        .route("/maintenance-status.json", get(handlers::status_json))
        .route("/maintenance", get(handlers::maintenance_page))
        .route("/maintenance.html", get(handlers::maintenance_page))
        .route("/unlock", get(handlers::unlock))
        .route("/lock", get(handlers::lock))
        .route("/music-request", get(handlers::request_page))
        .route("/music-request.html", get(handlers::request_page))
        .fallback(handlers::site_page)
        .with_state(state)
}
