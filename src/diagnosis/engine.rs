use std::path::Path;
use std::sync::Arc;

use super::classifier::TextClassifier;
use super::{argmax, DiagnosisError, SymptomClassifier};
use crate::models::{Diagnosis, Distribution};

/// Tolerance for the distribution sum check.
const PROBABILITY_SUM_TOLERANCE: f64 = 1e-6;

/// Read-only wrapper around the loaded classifier.
///
/// Holds `None` when no model artifact could be loaded; every call then
/// fails with `ModelUnavailable`. Safe to share across threads.
#[derive(Clone)]
pub struct DiagnosisEngine {
    classifier: Option<Arc<dyn SymptomClassifier>>,
}

impl DiagnosisEngine {
    pub fn new(classifier: Arc<dyn SymptomClassifier>) -> Self {
        Self {
            classifier: Some(classifier),
        }
    }

    /// Engine with no model loaded.
    pub fn unavailable() -> Self {
        Self { classifier: None }
    }

    /// Load the bundled classifier artifact. A missing or corrupt file
    /// is logged and yields an unavailable engine instead of an error.
    pub fn load(path: &Path) -> Self {
        match TextClassifier::load(path) {
            Ok(classifier) => {
                tracing::info!(
                    path = %path.display(),
                    labels = classifier.labels().len(),
                    "Diagnosis model loaded"
                );
                Self::new(Arc::new(classifier))
            }
            Err(e) => {
                tracing::error!(error = %e, "Diagnosis model unavailable");
                Self::unavailable()
            }
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.classifier.is_some()
    }

    /// Labels known to the loaded model.
    pub fn labels(&self) -> Result<&[String], DiagnosisError> {
        Ok(self.classifier()?.labels())
    }

    /// Best label: the argmax of `predict_distribution`.
    pub fn predict(&self, symptoms: &str) -> Result<String, DiagnosisError> {
        Ok(self.diagnose(symptoms)?.label)
    }

    /// One probability per known label, validated.
    pub fn predict_distribution(&self, symptoms: &str) -> Result<Distribution, DiagnosisError> {
        let symptoms = validate_symptoms(symptoms)?;
        let classifier = self.classifier()?;
        let distribution = classifier.predict_distribution(symptoms)?;
        check_distribution(&distribution, classifier.labels())?;
        Ok(distribution)
    }

    /// Label, its probability, and the full distribution in one pass.
    pub fn diagnose(&self, symptoms: &str) -> Result<Diagnosis, DiagnosisError> {
        let probabilities = self.predict_distribution(symptoms)?;
        let classifier = self.classifier()?;
        let (label, confidence) = argmax(&probabilities, classifier.labels())
            .ok_or_else(|| DiagnosisError::InvalidDistribution("no labels".into()))?;
        Ok(Diagnosis {
            label: label.to_string(),
            confidence,
            probabilities,
        })
    }

    fn classifier(&self) -> Result<&Arc<dyn SymptomClassifier>, DiagnosisError> {
        self.classifier.as_ref().ok_or(DiagnosisError::ModelUnavailable)
    }
}

/// Trimmed, non-empty symptom text.
pub fn validate_symptoms(symptoms: &str) -> Result<&str, DiagnosisError> {
    let trimmed = symptoms.trim();
    if trimmed.is_empty() {
        return Err(DiagnosisError::InvalidInput(
            "Symptoms cannot be empty".into(),
        ));
    }
    Ok(trimmed)
}

fn check_distribution(distribution: &Distribution, labels: &[String]) -> Result<(), DiagnosisError> {
    if distribution.len() != labels.len() || labels.iter().any(|l| !distribution.contains_key(l)) {
        return Err(DiagnosisError::InvalidDistribution(
            "label set does not match the model".into(),
        ));
    }
    if let Some((label, p)) = distribution
        .iter()
        .find(|(_, p)| !p.is_finite() || **p < 0.0)
    {
        return Err(DiagnosisError::InvalidDistribution(format!(
            "{label} has probability {p}"
        )));
    }
    let sum: f64 = distribution.values().sum();
    if (sum - 1.0).abs() > PROBABILITY_SUM_TOLERANCE {
        return Err(DiagnosisError::InvalidDistribution(format!(
            "probabilities sum to {sum}"
        )));
    }
    Ok(())
}
