use crate::config::DEFAULT_ENV_MESSAGE;
use crate::errors::AppError;
use crate::eta::estimated_return_text;
use crate::gate::{GateDecision, MAINTENANCE_PAGE};
use crate::models::{
    ConfigView, InvalidActionResponse, MaintenanceEnvelope, MaintenanceRequest, MaintenanceStatus,
};
use crate::state::AppState;
use crate::storage::{
    read_public_file, status_json_path, status_message, status_text_path,
};
use crate::ui::render_maintenance;
use crate::unlock::{UNLOCK_COOKIE, clear_cookie_header, cookie_value, set_cookie_header};
use axum::{
    Json,
    extract::{Query, State, rejection::JsonRejection},
    http::{HeaderMap, HeaderValue, StatusCode, Uri, header},
    response::{Html, IntoResponse, Redirect, Response},
};
use chrono::Utc;
use serde::Deserialize;
use std::path::{Component, Path, PathBuf};
use tracing::{info, warn};

const REQUEST_PAGE: &str = "/music-request.html";

pub async fn maintenance_status(State(state): State<AppState>) -> Json<MaintenanceStatus> {
    let runtime_enabled = state.flags.lock().await.is_enabled();
    let maintenance_mode = state.settings.maintenance_mode || runtime_enabled;

    Json(MaintenanceStatus {
        maintenance_mode,
        timestamp: Utc::now().to_rfc3339(),
        environment: state.settings.environment.clone(),
        message: status_message(maintenance_mode).to_string(),
    })
}

pub async fn maintenance_admin(
    State(state): State<AppState>,
    payload: Result<Json<MaintenanceRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(request) = payload.map_err(|rejection| AppError::bad_request(rejection.body_text()))?;

    if let Some(expected) = state.settings.api_key.as_deref() {
        if request.api_key.as_deref() != Some(expected) {
            warn!("maintenance api called with an invalid key");
            return Err(AppError::unauthorized("Invalid API key"));
        }
    }

    let action = request.action.as_deref().map(str::trim).unwrap_or_default();
    let mut flags = state.flags.lock().await;
    let envelope = match action {
        "enable" => {
            let message = request.message.filter(|m| !m.is_empty());
            let return_date = request.return_date.filter(|d| !d.is_empty());
            flags.enabled = Some(true);
            if let Some(message) = &message {
                flags.message = Some(message.clone());
            }
            if let Some(return_date) = &return_date {
                flags.return_date = Some(return_date.clone());
            }
            info!("maintenance mode enabled via api");
            // Echoes this request, not whatever an earlier enable stored.
            MaintenanceEnvelope {
                success: true,
                message: Some("Maintenance mode enabled".to_string()),
                config: ConfigView {
                    enabled: true,
                    message: Some(message.unwrap_or_else(|| DEFAULT_ENV_MESSAGE.to_string())),
                    return_date,
                },
            }
        }
        "disable" => {
            flags.enabled = Some(false);
            flags.message = None;
            flags.return_date = None;
            info!("maintenance mode disabled via api");
            MaintenanceEnvelope {
                success: true,
                message: Some("Maintenance mode disabled".to_string()),
                config: ConfigView {
                    enabled: false,
                    message: None,
                    return_date: None,
                },
            }
        }
        "status" => MaintenanceEnvelope {
            success: true,
            message: None,
            config: ConfigView {
                enabled: flags.is_enabled(),
                message: flags.message.clone(),
                return_date: flags.return_date.clone(),
            },
        },
        _ => {
            let body = InvalidActionResponse {
                error: "Invalid action",
                message: "Action must be: enable, disable, or status",
                available_actions: ["enable", "disable", "status"],
            };
            return Ok((StatusCode::BAD_REQUEST, Json(body)).into_response());
        }
    };

    Ok(Json(envelope).into_response())
}

pub async fn preflight() -> StatusCode {
    StatusCode::OK
}

pub async fn status_wrong_method() -> AppError {
    AppError::method_not_allowed("This endpoint only accepts GET requests")
}

pub async fn admin_wrong_method() -> AppError {
    AppError::method_not_allowed("This endpoint only accepts POST requests")
}

pub async fn cors_status(response: Response) -> Response {
    with_cors(response, "GET, OPTIONS", "Content-Type")
}

pub async fn cors_admin(response: Response) -> Response {
    with_cors(response, "GET, POST, OPTIONS", "Content-Type, Authorization")
}

fn with_cors(mut response: Response, methods: &'static str, headers: &'static str) -> Response {
    let map = response.headers_mut();
    map.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    map.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(methods),
    );
    map.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(headers),
    );
    response
}

pub async fn status_text(State(state): State<AppState>) -> Result<Response, AppError> {
    serve_file(&status_text_path(&state.settings.status_dir)).await
}

pub async fn status_json(State(state): State<AppState>) -> Result<Response, AppError> {
    serve_file(&status_json_path(&state.settings.status_dir)).await
}

pub async fn maintenance_page(State(state): State<AppState>) -> Html<String> {
    let config = state.resolver.resolve().await;
    let message = config
        .message
        .as_deref()
        .unwrap_or(DEFAULT_ENV_MESSAGE);
    let return_text = estimated_return_text(config.estimated_return.as_deref());
    Html(render_maintenance(message, &return_text))
}

#[derive(Debug, Deserialize)]
pub struct UnlockQuery {
    key: Option<String>,
    pin: Option<String>,
}

pub async fn unlock(State(state): State<AppState>, Query(query): Query<UnlockQuery>) -> Response {
    if let Some(expected) = state.settings.unlock_key.as_deref() {
        let supplied = query.key.as_deref().or(query.pin.as_deref());
        if supplied != Some(expected) {
            warn!("unlock attempted with a wrong key");
            return (StatusCode::UNAUTHORIZED, "Unauthorized").into_response();
        }
    }

    let token = state.signer.issue();
    (
        [(header::SET_COOKIE, set_cookie_header(&token))],
        Redirect::temporary(REQUEST_PAGE),
    )
        .into_response()
}

pub async fn lock() -> Response {
    (
        [(header::SET_COOKIE, clear_cookie_header())],
        Redirect::temporary(MAINTENANCE_PAGE),
    )
        .into_response()
}

pub async fn request_page(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let unlocked = cookie_value(&headers, UNLOCK_COOKIE)
        .map(|token| state.signer.verify(token))
        .unwrap_or(false);
    if !unlocked {
        return Ok(Redirect::temporary(MAINTENANCE_PAGE).into_response());
    }

    serve_file(&state.settings.site_dir.join("music-request.html")).await
}

/// Everything else: the static site, behind the maintenance gate.
#[derive(Debug, Deserialize)]
pub struct PreviewQuery {
    maintenance: Option<String>,
}

/// `?maintenance=true` previews the gate as if maintenance were on.
pub async fn site_page(
    State(state): State<AppState>,
    Query(preview): Query<PreviewQuery>,
    uri: Uri,
) -> Result<Response, AppError> {
    let path = uri.path();
    let mut config = state.resolver.resolve().await;
    if preview.maintenance.as_deref() == Some("true") {
        config.enabled = true;
    }
    if let GateDecision::Redirect { to } = state.gate.decide(path, &config) {
        return Ok(Redirect::temporary(&to).into_response());
    }

    let Some(relative) = site_relative_path(path) else {
        return Err(AppError::not_found(format!("{path} not found")));
    };
    serve_file(&state.settings.site_dir.join(relative)).await
}

fn site_relative_path(path: &str) -> Option<PathBuf> {
    let trimmed = path.trim_start_matches('/');
    let mut relative = PathBuf::from(if trimmed.is_empty() { "index.html" } else { trimmed });
    if path.ends_with('/') && !trimmed.is_empty() {
        relative.push("index.html");
    }

    relative
        .components()
        .all(|component| matches!(component, Component::Normal(_)))
        .then_some(relative)
}

async fn serve_file(path: &Path) -> Result<Response, AppError> {
    let Some(bytes) = read_public_file(path).await? else {
        return Err(AppError::not_found(format!("{} not found", path.display())));
    };
    Ok(([(header::CONTENT_TYPE, content_type(path))], bytes).into_response())
}

fn content_type(path: &Path) -> &'static str {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("html") => "text/html; charset=utf-8",
        Some("css") => "text/css",
        Some("js") => "text/javascript",
        Some("json") => "application/json",
        Some("txt") => "text/plain; charset=utf-8",
        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("webp") => "image/webp",
        Some("ico") => "image/x-icon",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn site_paths_map_into_site_dir() {
        assert_eq!(site_relative_path("/"), Some(PathBuf::from("index.html")));
        assert_eq!(
            site_relative_path("/gallery.html"),
            Some(PathBuf::from("gallery.html"))
        );
        assert_eq!(
            site_relative_path("/events/"),
            Some(PathBuf::from("events/index.html"))
        );
    }

    #[test]
    fn traversal_is_rejected() {
        assert_eq!(site_relative_path("/../secrets.env"), None);
        assert_eq!(site_relative_path("/img/../../etc/passwd"), None);
    }

    #[test]
    fn content_types_follow_extension() {
        assert_eq!(content_type(Path::new("a.html")), "text/html; charset=utf-8");
        assert_eq!(content_type(Path::new("a.txt")), "text/plain; charset=utf-8");
        assert_eq!(content_type(Path::new("blob")), "application/octet-stream");
    }
}
