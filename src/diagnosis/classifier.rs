use std::collections::BTreeSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::logistic::{LogisticRegression, TrainingParams};
use super::tfidf::TfidfVectorizer;
use super::{DiagnosisError, SymptomClassifier};
use crate::models::Distribution;

/// Artifact format written by `TextClassifier::save`.
pub const MODEL_FORMAT_VERSION: u32 = 1;

/// One labelled example, as read by the training CLI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingSample {
    pub symptoms: String,
    pub label: String,
}

/// TF-IDF + logistic regression text classification pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextClassifier {
    format_version: u32,
    vectorizer: TfidfVectorizer,
    model: LogisticRegression,
}

impl TextClassifier {
    /// Fit the vectorizer and classifier on parallel text/label slices.
    ///
    /// Classes are ordered lexicographically; that order is also the
    /// argmax tie-break order.
    pub fn fit<T: AsRef<str>, L: AsRef<str>>(
        texts: &[T],
        labels: &[L],
        params: TrainingParams,
    ) -> Result<Self, DiagnosisError> {
        if texts.len() != labels.len() {
            return Err(DiagnosisError::Training(format!(
                "{} texts but {} labels",
                texts.len(),
                labels.len()
            )));
        }
        if labels.iter().any(|l| l.as_ref().trim().is_empty()) {
            return Err(DiagnosisError::Training("empty label in training data".into()));
        }

        let classes: Vec<String> = labels
            .iter()
            .map(|l| l.as_ref().to_string())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let targets: Vec<usize> = labels
            .iter()
            .filter_map(|l| classes.iter().position(|c| c == l.as_ref()))
            .collect();

        let vectorizer = TfidfVectorizer::fit(texts);
        let rows: Vec<_> = texts
            .iter()
            .map(|t| vectorizer.transform(t.as_ref()))
            .collect();
        let model =
            LogisticRegression::fit(&rows, &targets, classes, vectorizer.n_features(), params)?;

        tracing::info!(
            samples = texts.len(),
            classes = model.classes().len(),
            features = vectorizer.n_features(),
            "Diagnosis classifier trained"
        );

        Ok(Self {
            format_version: MODEL_FORMAT_VERSION,
            vectorizer,
            model,
        })
    }

    pub fn fit_samples(
        samples: &[TrainingSample],
        params: TrainingParams,
    ) -> Result<Self, DiagnosisError> {
        let texts: Vec<&str> = samples.iter().map(|s| s.symptoms.as_str()).collect();
        let labels: Vec<&str> = samples.iter().map(|s| s.label.as_str()).collect();
        Self::fit(&texts, &labels, params)
    }

    /// Write the artifact as JSON, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), DiagnosisError> {
        let save_err = |reason: String| DiagnosisError::ModelSave {
            path: path.to_path_buf(),
            reason,
        };
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| save_err(e.to_string()))?;
            }
        }
        let json = serde_json::to_string(self).map_err(|e| save_err(e.to_string()))?;
        std::fs::write(path, json).map_err(|e| save_err(e.to_string()))?;
        tracing::info!(path = %path.display(), "Diagnosis model saved");
        Ok(())
    }

    /// Read and validate an artifact written by `save`.
    pub fn load(path: &Path) -> Result<Self, DiagnosisError> {
        let load_err = |reason: String| DiagnosisError::ModelLoad {
            path: path.to_path_buf(),
            reason,
        };
        let bytes = std::fs::read(path).map_err(|e| load_err(e.to_string()))?;
        let classifier: Self =
            serde_json::from_slice(&bytes).map_err(|e| load_err(format!("corrupt artifact: {e}")))?;

        if classifier.format_version != MODEL_FORMAT_VERSION {
            return Err(load_err(format!(
                "unsupported format version {}",
                classifier.format_version
            )));
        }
        if !classifier.vectorizer.is_consistent()
            || !classifier
                .model
                .is_consistent(classifier.vectorizer.n_features())
        {
            return Err(load_err("artifact dimensions are inconsistent".into()));
        }
        Ok(classifier)
    }
}

impl SymptomClassifier for TextClassifier {
    fn labels(&self) -> &[String] {
        self.model.classes()
    }

    fn predict_distribution(&self, symptoms: &str) -> Result<Distribution, DiagnosisError> {
        let row = self.vectorizer.transform(symptoms);
        let probabilities = self.model.probabilities(&row);
        Ok(self
            .model
            .classes()
            .iter()
            .cloned()
            .zip(probabilities)
            .collect())
    }
}
