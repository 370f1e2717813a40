//! Geocoding and nearby-places collaborator (Google Maps Web Service shape).

pub mod client;
pub mod types;

pub use client::*;
pub use types::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MapsError {
    #[error("Maps service unreachable at {0}")]
    Connection(String),

    #[error("Maps request timed out after {0}s")]
    Timeout(u64),

    #[error("Maps service returned error (status {status}): {body}")]
    Http { status: u16, body: String },

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Response parsing error: {0}")]
    ResponseParsing(String),
}

impl MapsError {
    /// Transport-level failures worth another attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            MapsError::Connection(_) | MapsError::Timeout(_) | MapsError::HttpClient(_)
        )
    }
}
