//! Diagnosis engine: symptom text → best label + probability distribution.
//!
//! The engine depends only on the `SymptomClassifier` capability. The
//! bundled implementation is a TF-IDF vectorizer feeding a multinomial
//! logistic regression, persisted as a JSON artifact.

pub mod classifier;
pub mod engine;
pub mod logistic;
pub mod tfidf;

pub use classifier::*;
pub use engine::*;
pub use logistic::*;
pub use tfidf::*;

use std::path::PathBuf;

use thiserror::Error;

use crate::models::Distribution;

#[derive(Error, Debug)]
pub enum DiagnosisError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Diagnosis model is not loaded")]
    ModelUnavailable,

    #[error("Cannot load model from {path}: {reason}")]
    ModelLoad { path: PathBuf, reason: String },

    #[error("Cannot save model to {path}: {reason}")]
    ModelSave { path: PathBuf, reason: String },

    #[error("Training failed: {0}")]
    Training(String),

    #[error("Classifier produced an invalid distribution: {0}")]
    InvalidDistribution(String),
}

/// Classification capability behind the engine.
///
/// Implementations return one entry per label they know, in any
/// order; values are non-negative and sum to 1.
pub trait SymptomClassifier: Send + Sync {
    /// Labels known to the fitted model, in tie-break order.
    fn labels(&self) -> &[String];

    fn predict_distribution(&self, symptoms: &str) -> Result<Distribution, DiagnosisError>;
}

/// Highest-probability label. Ties resolve to the first label in
/// `order` (the classifier's own label order).
pub fn argmax<'a>(distribution: &Distribution, order: &'a [String]) -> Option<(&'a str, f64)> {
    let mut best: Option<(&'a str, f64)> = None;
    for label in order {
        let Some(&p) = distribution.get(label) else {
            continue;
        };
        match best {
            Some((_, best_p)) if p <= best_p => {}
            _ => best = Some((label.as_str(), p)),
        }
    }
    best
}
