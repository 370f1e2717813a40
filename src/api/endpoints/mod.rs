//! Endpoint handlers. Each delegates to `CheckupService` and maps its
//! outcome to JSON.

pub mod diagnose;
pub mod health;
pub mod hospitals;
