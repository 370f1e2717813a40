//! HTTP surface for the checkup service.
//!
//! `api_router()` returns a `Router` that can be mounted on any axum
//! server; `start_server()` binds it and runs it in the background
//! with a shutdown channel.

pub mod endpoints;
pub mod error;
pub mod middleware;
pub mod router;
pub mod server;
pub mod types;

pub use error::ApiError;
pub use router::api_router;
pub use server::{start_server, ApiServer, ServerSession, SHUTDOWN_GRACE};
pub use types::ApiContext;
