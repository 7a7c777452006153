use crate::errors::{AppError, SourceError};
use crate::models::StatusFile;
use crate::probe::parse_status_text;
use chrono::Utc;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{error, info};

pub const STATUS_TEXT_FILE: &str = "maintenance-status.txt";
pub const STATUS_JSON_FILE: &str = "maintenance-status.json";

pub fn status_text_path(dir: &Path) -> PathBuf {
    dir.join(STATUS_TEXT_FILE)
}

pub fn status_json_path(dir: &Path) -> PathBuf {
    dir.join(STATUS_JSON_FILE)
}

pub fn status_message(enabled: bool) -> &'static str {
    if enabled {
        "Site is currently in maintenance mode"
    } else {
        "Site is currently live"
    }
}

/// Flag from the text status file; `None` when the file does not exist.
pub async fn read_status_flag(dir: &Path) -> Result<Option<bool>, SourceError> {
    let path = status_text_path(dir);
    match fs::read_to_string(&path).await {
        Ok(text) => parse_status_text(&text).map(Some),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(SourceError::unavailable(format!(
            "failed to read {}: {err}",
            path.display()
        ))),
    }
}

/// Current flag from the text status file. Missing or unreadable means live.
pub async fn load_status_flag(dir: &Path) -> bool {
    match read_status_flag(dir).await {
        Ok(flag) => flag.unwrap_or(false),
        Err(err) => {
            error!(dir = %dir.display(), "status file unusable: {err}");
            false
        }
    }
}

/// Rewrites both status files so every probe method agrees.
pub async fn persist_status(dir: &Path, enabled: bool) -> Result<StatusFile, AppError> {
    fs::create_dir_all(dir).await?;

    let status = StatusFile {
        maintenance_mode: enabled,
        timestamp: Utc::now().to_rfc3339(),
        message: status_message(enabled).to_string(),
    };

    fs::write(status_text_path(dir), if enabled { "true" } else { "false" }).await?;
    let payload = serde_json::to_vec_pretty(&status).map_err(AppError::internal)?;
    fs::write(status_json_path(dir), payload).await?;

    info!(enabled, dir = %dir.display(), "status files updated");
    Ok(status)
}

/// Raw file contents for serving; `None` when the file does not exist.
pub async fn read_public_file(path: &Path) -> Result<Option<Vec<u8>>, AppError> {
    match fs::read(path).await {
        Ok(bytes) => Ok(Some(bytes)),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(AppError::internal(err)),
    }
}
