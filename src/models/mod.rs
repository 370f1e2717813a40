pub mod advice;
pub mod diagnosis;
pub mod geo;
pub mod hospital;

pub use advice::*;
pub use diagnosis::*;
pub use geo::*;
pub use hospital::*;
