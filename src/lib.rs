pub mod advice; // symptoms label → curated advice
pub mod api; // HTTP surface
pub mod checkup; // request orchestration
pub mod config;
pub mod db;
pub mod diagnosis; // classifier + engine
pub mod hospitals; // store + nearby search merge
pub mod location; // location string → GeoPoint
pub mod maps; // geocoding / places HTTP client
pub mod models;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::checkup::CheckupService;
use crate::config::AppConfig;
use crate::db::SqliteStore;
use crate::diagnosis::DiagnosisEngine;
use crate::maps::MapsClient;

/// Initialize tracing from `RUST_LOG`, falling back to the default filter.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();
}

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] config::ConfigError),
    #[error("Cannot open store at {path}: {source}")]
    Store {
        path: std::path::PathBuf,
        source: db::DatabaseError,
    },
    #[error(transparent)]
    Maps(#[from] maps::MapsError),
}

/// Wire the service from configuration.
///
/// Blocking: opens SQLite, reads the model artifact and builds the
/// blocking HTTP client. Call before entering the async runtime.
pub fn build_service(config: &AppConfig) -> Result<CheckupService, StartupError> {
    let store = SqliteStore::open(&config.database_path, config.http_timeout).map_err(|e| {
        StartupError::Store {
            path: config.database_path.clone(),
            source: e,
        }
    })?;
    tracing::info!(path = %config.database_path.display(), "Store opened");

    let engine = DiagnosisEngine::load(&config.model_path);

    if config.maps_api_key.is_none() {
        tracing::warn!("CHECKUP_MAPS_API_KEY is not set, geocoding and nearby search will be denied");
    }
    let maps = MapsClient::new(
        &config.maps_base_url,
        config.maps_api_key.clone(),
        config.http_timeout,
    )?;

    Ok(CheckupService::assemble(
        engine,
        Arc::new(store),
        Arc::new(maps),
        config.search_radius_meters,
    ))
}
