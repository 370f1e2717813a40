//! Shared state for the API layer.

use std::sync::Arc;

use crate::checkup::CheckupService;

/// Shared context for all routes and middleware.
///
/// Cloned per request; the service itself is immutable after startup.
#[derive(Clone)]
pub struct ApiContext {
    pub service: Arc<CheckupService>,
}

impl ApiContext {
    pub fn new(service: CheckupService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}
