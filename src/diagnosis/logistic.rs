use serde::{Deserialize, Serialize};

use super::tfidf::SparseVector;
use super::DiagnosisError;

/// Gradient-descent settings for `LogisticRegression::fit`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrainingParams {
    pub learning_rate: f64,
    pub epochs: usize,
    /// L2 penalty on the weights (not the bias).
    pub l2: f64,
}

impl Default for TrainingParams {
    fn default() -> Self {
        Self {
            learning_rate: 0.5,
            epochs: 500,
            l2: 1e-3,
        }
    }
}

/// Multinomial (softmax) logistic regression over sparse features.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticRegression {
    classes: Vec<String>,
    /// `weights[class][feature]`
    weights: Vec<Vec<f64>>,
    bias: Vec<f64>,
}

impl LogisticRegression {
    /// Fit with full-batch gradient descent.
    ///
    /// `targets[i]` is an index into `classes`. Classes are kept in the
    /// order given; the caller decides the tie-break order.
    pub fn fit(
        rows: &[SparseVector],
        targets: &[usize],
        classes: Vec<String>,
        n_features: usize,
        params: TrainingParams,
    ) -> Result<Self, DiagnosisError> {
        if rows.is_empty() {
            return Err(DiagnosisError::Training("no training samples".into()));
        }
        if rows.len() != targets.len() {
            return Err(DiagnosisError::Training(format!(
                "{} samples but {} labels",
                rows.len(),
                targets.len()
            )));
        }
        if classes.is_empty() || targets.iter().any(|&t| t >= classes.len()) {
            return Err(DiagnosisError::Training("label index out of range".into()));
        }
        if !(params.learning_rate.is_finite() && params.learning_rate > 0.0)
            || !(params.l2.is_finite() && params.l2 >= 0.0)
            || params.epochs == 0
        {
            return Err(DiagnosisError::Training(format!(
                "invalid training parameters: {params:?}"
            )));
        }

        let k = classes.len();
        let n = rows.len() as f64;
        let mut model = Self {
            classes,
            weights: vec![vec![0.0; n_features]; k],
            bias: vec![0.0; k],
        };

        for _ in 0..params.epochs {
            let mut grad_w = vec![vec![0.0; n_features]; k];
            let mut grad_b = vec![0.0; k];

            for (row, &target) in rows.iter().zip(targets) {
                let p = model.probabilities(row);
                for c in 0..k {
                    let y = if c == target { 1.0 } else { 0.0 };
                    let diff = p[c] - y;
                    grad_b[c] += diff;
                    for &(f, x) in row {
                        grad_w[c][f] += diff * x;
                    }
                }
            }

            for c in 0..k {
                model.bias[c] -= params.learning_rate * grad_b[c] / n;
                for f in 0..n_features {
                    let g = grad_w[c][f] / n + params.l2 * model.weights[c][f];
                    model.weights[c][f] -= params.learning_rate * g;
                }
            }
        }

        if !model.is_consistent(n_features) {
            return Err(DiagnosisError::Training(
                "training diverged to non-finite weights".into(),
            ));
        }

        Ok(model)
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn n_features(&self) -> usize {
        self.weights.first().map_or(0, Vec::len)
    }

    /// Softmax probabilities, one per class, in class order.
    pub fn probabilities(&self, row: &SparseVector) -> Vec<f64> {
        let logits: Vec<f64> = self
            .weights
            .iter()
            .zip(&self.bias)
            .map(|(w, b)| {
                row.iter()
                    .filter_map(|&(f, x)| w.get(f).map(|wf| wf * x))
                    .sum::<f64>()
                    + b
            })
            .collect();
        softmax(&logits)
    }

    /// Structural check for artifacts loaded from disk.
    pub fn is_consistent(&self, n_features: usize) -> bool {
        !self.classes.is_empty()
            && self.weights.len() == self.classes.len()
            && self.bias.len() == self.classes.len()
            && self.weights.iter().all(|w| w.len() == n_features)
            && self
                .weights
                .iter()
                .flatten()
                .chain(&self.bias)
                .all(|v| v.is_finite())
    }
}

fn softmax(logits: &[f64]) -> Vec<f64> {
    let max = logits.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = logits.iter().map(|z| (z - max).exp()).collect();
    let sum: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}
