use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::checkup::MAX_SEARCH_RADIUS_METERS;

/// Application-level constants
pub const APP_NAME: &str = "AI Checkup";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:5000";
pub const DEFAULT_MAPS_BASE_URL: &str = "https://maps.googleapis.com/maps/api";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_SEARCH_RADIUS_METERS: u32 = 5000;

/// Tracing filter used when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    "ai_checkup=info,tower_http=info"
}

/// Get the application data directory
/// ~/AiCheckup/ on all platforms. Falls back to the working directory
/// when no home directory can be determined (containers, CI).
pub fn app_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("AiCheckup")
}

/// Get the models directory (diagnosis model artifacts)
pub fn models_dir() -> PathBuf {
    app_data_dir().join("models")
}

pub fn default_database_path() -> PathBuf {
    app_data_dir().join("checkup.db")
}

pub fn default_model_path() -> PathBuf {
    models_dir().join("diagnosis_model.json")
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
}

/// Runtime configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub database_path: PathBuf,
    pub model_path: PathBuf,
    pub maps_api_key: Option<String>,
    pub maps_base_url: String,
    pub http_timeout: Duration,
    pub search_radius_meters: u32,
}

impl AppConfig {
    /// Build the configuration from `CHECKUP_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let bind_raw = get("CHECKUP_BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_raw
            .parse::<SocketAddr>()
            .map_err(|_| ConfigError::InvalidValue {
                key: "CHECKUP_BIND_ADDR",
                value: bind_raw.clone(),
            })?;

        let http_timeout_secs = match get("CHECKUP_HTTP_TIMEOUT_SECS") {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => secs,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        key: "CHECKUP_HTTP_TIMEOUT_SECS",
                        value: raw,
                    })
                }
            },
            None => DEFAULT_HTTP_TIMEOUT_SECS,
        };

        let search_radius_meters = match get("CHECKUP_SEARCH_RADIUS_METERS") {
            Some(raw) => match raw.trim().parse::<u32>() {
                Ok(radius) if (1..=MAX_SEARCH_RADIUS_METERS).contains(&radius) => radius,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        key: "CHECKUP_SEARCH_RADIUS_METERS",
                        value: raw,
                    })
                }
            },
            None => DEFAULT_SEARCH_RADIUS_METERS,
        };

        Ok(Self {
            bind_addr,
            database_path: get("CHECKUP_DATABASE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(default_database_path),
            model_path: get("CHECKUP_MODEL_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(default_model_path),
            maps_api_key: get("CHECKUP_MAPS_API_KEY"),
            maps_base_url: get("CHECKUP_MAPS_BASE_URL")
                .unwrap_or_else(|| DEFAULT_MAPS_BASE_URL.to_string()),
            http_timeout: Duration::from_secs(http_timeout_secs),
            search_radius_meters,
        })
    }
}
