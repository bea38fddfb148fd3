//! Core type definitions for SVM

use crate::core::{Dataset, InputError, Result, SVMError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Prediction result containing label and decision value
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    /// Predicted class label (+1 or -1)
    pub label: i32,
    /// Raw decision function value
    pub decision_value: f64,
}

impl Prediction {
    /// Build a prediction from a raw decision value.
    ///
    /// Only a strictly positive decision value maps to +1.
    pub fn from_decision(decision_value: f64) -> Self {
        let label = if decision_value > 0.0 { 1 } else { -1 };
        Self {
            label,
            decision_value,
        }
    }

    /// Get confidence as absolute value of decision value
    pub fn confidence(&self) -> f64 {
        self.decision_value.abs()
    }
}

/// Hyperparameters of the SMO optimizer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    /// Regularization parameter (upper bound for alpha)
    pub c: f64,
    /// Tolerance for KKT conditions
    pub tol: f64,
    /// Alphas at or below this value are skipped at prediction time
    pub alpha_tol: f64,
    /// Maximum number of outer sweeps
    pub max_iterations: usize,
    /// Consecutive sweeps without any update required to declare convergence
    pub passes: usize,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            c: 1.0,
            tol: 1e-4,
            alpha_tol: 1e-7,
            max_iterations: 10_000,
            passes: 10,
        }
    }
}

impl OptimizerConfig {
    /// Check that every hyperparameter lies in its documented range
    pub fn validate(&self) -> Result<()> {
        if !(self.c.is_finite() && self.c > 0.0) {
            return Err(SVMError::InvalidParameter(format!(
                "C must be positive and finite, got: {}",
                self.c
            )));
        }
        if !(self.tol.is_finite() && self.tol > 0.0) {
            return Err(SVMError::InvalidParameter(format!(
                "tol must be positive and finite, got: {}",
                self.tol
            )));
        }
        if !(self.alpha_tol.is_finite() && self.alpha_tol >= 0.0) {
            return Err(SVMError::InvalidParameter(format!(
                "alpha_tol must be non-negative and finite, got: {}",
                self.alpha_tol
            )));
        }
        if self.max_iterations == 0 {
            return Err(SVMError::InvalidParameter(
                "max_iterations must be positive".to_string(),
            ));
        }
        if self.passes == 0 {
            return Err(SVMError::InvalidParameter(
                "passes must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Parse a configuration from JSON. Missing fields keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a JSON configuration file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Serialize to pretty-printed JSON
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Why the SMO loop stopped. Every variant is a successful fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Termination {
    /// `passes` consecutive sweeps changed no alpha
    Converged,
    /// The sweep cap was reached first
    MaxIterations,
    /// A progress callback asked to stop
    Interrupted,
}

/// Result of optimization process
#[derive(Debug, Clone)]
pub struct OptimizationResult {
    /// Lagrange multipliers (alpha values), one per training sample
    pub alpha: Vec<f64>,
    /// Bias term (b)
    pub b: f64,
    /// Number of outer sweeps performed
    pub iterations: usize,
    /// Total number of successful pair updates
    pub updates: usize,
    /// Reason the loop ended
    pub termination: Termination,
    /// Final dual objective value
    pub objective_value: f64,
}

impl OptimizationResult {
    /// Indices of samples with a nonzero alpha
    pub fn support_vectors(&self) -> Vec<usize> {
        self.alpha
            .iter()
            .enumerate()
            .filter_map(|(i, &a)| if a != 0.0 { Some(i) } else { None })
            .collect()
    }
}

/// In-memory labeled dataset with dense feature vectors
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DenseDataset {
    samples: Vec<Vec<f64>>,
    labels: Vec<i32>,
}

impl DenseDataset {
    /// Create a dataset, checking that there is one label per sample
    pub fn new(samples: Vec<Vec<f64>>, labels: Vec<i32>) -> Result<Self> {
        if samples.len() != labels.len() {
            return Err(InputError::LabelCountMismatch {
                expected: samples.len(),
                actual: labels.len(),
            }
            .into());
        }
        Ok(Self { samples, labels })
    }

    /// Zero-extend every sample to `dim` features.
    ///
    /// Samples already longer than `dim` are left as they are.
    pub fn pad_to(&mut self, dim: usize) {
        for sample in &mut self.samples {
            if sample.len() < dim {
                sample.resize(dim, 0.0);
            }
        }
    }

    /// Split into the first `n` samples and the rest
    pub fn split_at(&self, n: usize) -> (DenseDataset, DenseDataset) {
        let n = n.min(self.samples.len());
        let head = DenseDataset {
            samples: self.samples[..n].to_vec(),
            labels: self.labels[..n].to_vec(),
        };
        let tail = DenseDataset {
            samples: self.samples[n..].to_vec(),
            labels: self.labels[n..].to_vec(),
        };
        (head, tail)
    }

    /// Consume the dataset, returning samples and labels
    pub fn into_parts(self) -> (Vec<Vec<f64>>, Vec<i32>) {
        (self.samples, self.labels)
    }
}

impl Dataset for DenseDataset {
    fn len(&self) -> usize {
        self.samples.len()
    }

    fn dim(&self) -> usize {
        self.samples.iter().map(Vec::len).max().unwrap_or(0)
    }

    fn samples(&self) -> &[Vec<f64>] {
        &self.samples
    }

    fn labels(&self) -> &[i32] {
        &self.labels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prediction() {
        let pred = Prediction::from_decision(2.5);
        assert_eq!(pred.label, 1);
        assert_eq!(pred.decision_value, 2.5);
        assert_eq!(pred.confidence(), 2.5);

        let neg_pred = Prediction::from_decision(-1.8);
        assert_eq!(neg_pred.label, -1);
        assert_eq!(neg_pred.confidence(), 1.8);
    }

    #[test]
    fn test_prediction_zero_is_negative() {
        assert_eq!(Prediction::from_decision(0.0).label, -1);
    }

    #[test]
    fn test_optimizer_config_default() {
        let config = OptimizerConfig::default();
        assert_eq!(config.c, 1.0);
        assert_eq!(config.tol, 1e-4);
        assert_eq!(config.alpha_tol, 1e-7);
        assert_eq!(config.max_iterations, 10000);
        assert_eq!(config.passes, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_optimizer_config_validation() {
        let bad = [
            OptimizerConfig {
                c: 0.0,
                ..Default::default()
            },
            OptimizerConfig {
                c: f64::NAN,
                ..Default::default()
            },
            OptimizerConfig {
                tol: -1.0,
                ..Default::default()
            },
            OptimizerConfig {
                alpha_tol: -1e-3,
                ..Default::default()
            },
            OptimizerConfig {
                max_iterations: 0,
                ..Default::default()
            },
            OptimizerConfig {
                passes: 0,
                ..Default::default()
            },
        ];

        for config in &bad {
            assert!(
                matches!(config.validate(), Err(SVMError::InvalidParameter(_))),
                "{config:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_config_partial_json() {
        let config = OptimizerConfig::from_json_str(r#"{ "c": 2.5, "passes": 3 }"#).unwrap();
        assert_eq!(config.c, 2.5);
        assert_eq!(config.passes, 3);
        assert_eq!(config.tol, 1e-4);
        assert_eq!(config.max_iterations, 10000);
    }

    #[test]
    fn test_config_json_round_trip() {
        let config = OptimizerConfig {
            c: 0.5,
            tol: 1e-3,
            alpha_tol: 0.0,
            max_iterations: 42,
            passes: 4,
        };
        let json = config.to_json_string().unwrap();
        assert_eq!(OptimizerConfig::from_json_str(&json).unwrap(), config);
    }

    #[test]
    fn test_config_invalid_json() {
        let result = OptimizerConfig::from_json_str("{ c: }");
        assert!(matches!(result, Err(SVMError::ConfigError(_))));
    }

    #[test]
    fn test_dense_dataset() {
        let mut dataset =
            DenseDataset::new(vec![vec![1.0], vec![2.0, 3.0]], vec![1, -1]).unwrap();
        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.dim(), 2);

        dataset.pad_to(3);
        assert_eq!(dataset.samples()[0], vec![1.0, 0.0, 0.0]);
        assert_eq!(dataset.samples()[1], vec![2.0, 3.0, 0.0]);
        assert_eq!(dataset.labels(), &[1, -1]);
    }

    #[test]
    fn test_dense_dataset_label_count() {
        let result = DenseDataset::new(vec![vec![1.0]], vec![1, -1]);
        assert!(matches!(
            result,
            Err(SVMError::InvalidInput(InputError::LabelCountMismatch {
                expected: 1,
                actual: 2
            }))
        ));
    }

    #[test]
    fn test_dense_dataset_split() {
        let dataset = DenseDataset::new(
            vec![vec![1.0], vec![2.0], vec![3.0]],
            vec![1, -1, 1],
        )
        .unwrap();
        let (head, tail) = dataset.split_at(2);
        assert_eq!(head.len(), 2);
        assert_eq!(tail.len(), 1);
        assert_eq!(tail.labels(), &[1]);

        let (all, none) = dataset.split_at(10);
        assert_eq!(all.len(), 3);
        assert!(none.is_empty());
    }

    #[test]
    fn test_support_vectors() {
        let result = OptimizationResult {
            alpha: vec![0.0, 0.5, 0.0, 1.0],
            b: 0.0,
            iterations: 1,
            updates: 1,
            termination: Termination::Converged,
            objective_value: 0.0,
        };
        assert_eq!(result.support_vectors(), vec![1, 3]);
    }
}
