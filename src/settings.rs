use crate::resolver::BuildFlags;
use std::{env, path::PathBuf};

/// Process configuration, read once from the environment at startup.
#[derive(Debug, Clone)]
pub struct Settings {
    pub port: u16,
    /// `MAINTENANCE_MODE == "true"`.
    pub maintenance_mode: bool,
    pub api_key: Option<String>,
    pub environment: String,
    pub build_flags: BuildFlags,
    pub unlock_key: Option<String>,
    pub cookie_secret: Option<String>,
    pub status_dir: PathBuf,
    pub site_dir: PathBuf,
    pub override_path: Option<PathBuf>,
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.is_empty());

        Self {
            port: lookup("PORT")
                .and_then(|value| value.parse::<u16>().ok())
                .unwrap_or(8080),
            maintenance_mode: lookup("MAINTENANCE_MODE").as_deref() == Some("true"),
            api_key: non_empty("MAINTENANCE_API_KEY"),
            environment: non_empty("NODE_ENV").unwrap_or_else(|| "production".to_string()),
            build_flags: BuildFlags::from_lookup(&lookup),
            unlock_key: non_empty("REQUEST_UNLOCK_KEY"),
            cookie_secret: non_empty("REQUEST_COOKIE_SECRET"),
            status_dir: non_empty("STATUS_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(".")),
            site_dir: non_empty("SITE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("public")),
            override_path: non_empty("MAINTENANCE_OVERRIDE_FILE").map(PathBuf::from),
        }
    }
}
