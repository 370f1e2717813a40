//! Repository layer — entity-scoped database operations.

mod advice;
mod hospital;

pub use advice::*;
pub use hospital::*;
