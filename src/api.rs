//! High-level API for Support Vector Machine operations
//!
//! This module provides a user-friendly interface for common SVM tasks,
//! including training, prediction, and model evaluation.
//!
//! # Quick Start
//!
//! ```rust
//! use smo_svm::api::SVM;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let samples = vec![
//!     vec![-2.0, 0.0],
//!     vec![-1.0, 0.0],
//!     vec![1.0, 0.0],
//!     vec![2.0, 0.0],
//! ];
//! let labels = vec![-1, -1, 1, 1];
//!
//! let mut svm = SVM::new().with_c(1.0).with_seed(42);
//! svm.fit(&samples, &labels)?;
//!
//! // Predictions are evaluated against the training set
//! assert_eq!(svm.predict(&samples, &[100.0, 0.0])?, 1);
//! println!("Accuracy: {:.2}%", svm.score(&samples, &samples, &labels)? * 100.0);
//! # Ok(())
//! # }
//! ```

use crate::core::{
    Dataset, InputError, OptimizerConfig, Prediction, Result, SVMError, Termination,
};
use crate::kernel::{Kernel, LinearKernel};
use crate::model::TrainedSVM;
use crate::solver::{SMOSolver, SweepProgress};
use crate::utils::validation;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::ops::ControlFlow;

/// Binary SVM classifier with builder-style configuration
///
/// The kernel is fixed at construction. Hyperparameters can be changed
/// between fits; every successful fit replaces the model state entirely.
pub struct SVM<K: Kernel = LinearKernel, R: Rng = StdRng> {
    kernel: K,
    config: OptimizerConfig,
    rng: R,
    model: Option<TrainedSVM>,
}

impl SVM<LinearKernel, StdRng> {
    /// Create a new SVM with linear kernel and default parameters
    pub fn new() -> Self {
        Self::with_kernel(LinearKernel::new())
    }
}

impl Default for SVM<LinearKernel, StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Kernel> SVM<K, StdRng> {
    /// Create SVM with custom kernel, seeding pair selection from OS entropy
    pub fn with_kernel(kernel: K) -> Self {
        Self {
            kernel,
            config: OptimizerConfig::default(),
            rng: StdRng::from_entropy(),
            model: None,
        }
    }

    /// Reseed pair selection for reproducible training
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }
}

impl<K: Kernel, R: Rng> SVM<K, R> {
    /// Replace the random source driving pair selection
    pub fn with_rng<R2: Rng>(self, rng: R2) -> SVM<K, R2> {
        SVM {
            kernel: self.kernel,
            config: self.config,
            rng,
            model: self.model,
        }
    }

    /// Set regularization parameter C
    pub fn with_c(mut self, c: f64) -> Self {
        self.config.c = c;
        self
    }

    /// Set KKT violation tolerance
    pub fn with_tol(mut self, tol: f64) -> Self {
        self.config.tol = tol;
        self
    }

    /// Set the prediction-time alpha pruning threshold
    pub fn with_alpha_tol(mut self, alpha_tol: f64) -> Self {
        self.config.alpha_tol = alpha_tol;
        self
    }

    /// Set maximum number of outer sweeps
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.config.max_iterations = max_iterations;
        self
    }

    /// Set the number of quiet sweeps that count as convergence
    pub fn with_passes(mut self, passes: usize) -> Self {
        self.config.passes = passes;
        self
    }

    /// Replace the whole configuration
    pub fn with_config(mut self, config: OptimizerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    /// Mutable access for reconfiguring between fits
    pub fn config_mut(&mut self) -> &mut OptimizerConfig {
        &mut self.config
    }

    pub fn kernel(&self) -> &K {
        &self.kernel
    }

    /// State of the last successful fit, if any
    pub fn model(&self) -> Option<&TrainedSVM> {
        self.model.as_ref()
    }

    pub fn is_trained(&self) -> bool {
        self.model.is_some()
    }

    /// Train on samples and labels, replacing any previous model
    ///
    /// On error the previous model, if any, is left untouched.
    pub fn fit<X: AsRef<[f64]>>(&mut self, samples: &[X], labels: &[i32]) -> Result<&TrainedSVM> {
        self.fit_with_callback(samples, labels, |_| ControlFlow::Continue(()))
    }

    /// Train, calling `callback` after every outer sweep
    ///
    /// Returning [`ControlFlow::Break`] from the callback stops training
    /// early. The partial model is kept and reports
    /// [`Termination::Interrupted`].
    pub fn fit_with_callback<X, F>(
        &mut self,
        samples: &[X],
        labels: &[i32],
        callback: F,
    ) -> Result<&TrainedSVM>
    where
        X: AsRef<[f64]>,
        F: FnMut(&SweepProgress) -> ControlFlow<()>,
    {
        let solver = SMOSolver::new(&self.kernel, self.config.clone());
        let result = solver.solve_with_callback(samples, labels, &mut self.rng, callback)?;

        let n_features = samples.first().map_or(0, |s| s.as_ref().len());
        let model = TrainedSVM::new(result, labels.to_vec(), n_features, self.config.c);
        Ok(&*self.model.insert(model))
    }

    /// Train on a dataset
    pub fn fit_dataset<D: Dataset>(&mut self, dataset: &D) -> Result<&TrainedSVM> {
        self.fit(dataset.samples(), dataset.labels())
    }

    fn trained_model<X: AsRef<[f64]>>(&self, training_samples: &[X]) -> Result<&TrainedSVM> {
        let model = self.model.as_ref().ok_or(SVMError::ModelNotTrained)?;
        model.check_training_set(training_samples)?;
        Ok(model)
    }

    fn decision_unchecked<X: AsRef<[f64]>>(
        &self,
        model: &TrainedSVM,
        training_samples: &[X],
        index: usize,
        x: &[f64],
    ) -> Result<f64> {
        if x.len() != model.n_features() {
            return Err(InputError::DimensionMismatch {
                index,
                expected: model.n_features(),
                actual: x.len(),
            }
            .into());
        }
        Ok(model.decision_function(
            &self.kernel,
            training_samples,
            x,
            self.config.alpha_tol,
        ))
    }

    /// Raw decision value for `x`
    ///
    /// `training_samples` must be the samples the model was fit on.
    pub fn decision_function<X: AsRef<[f64]>>(
        &self,
        training_samples: &[X],
        x: &[f64],
    ) -> Result<f64> {
        let model = self.trained_model(training_samples)?;
        self.decision_unchecked(model, training_samples, 0, x)
    }

    /// Predict the label of `x`: +1 if the decision value is positive, else -1
    pub fn predict<X: AsRef<[f64]>>(&self, training_samples: &[X], x: &[f64]) -> Result<i32> {
        Ok(self.predict_detailed(training_samples, x)?.label)
    }

    /// Predict `x`, keeping the decision value
    pub fn predict_detailed<X: AsRef<[f64]>>(
        &self,
        training_samples: &[X],
        x: &[f64],
    ) -> Result<Prediction> {
        let decision = self.decision_function(training_samples, x)?;
        Ok(Prediction::from_decision(decision))
    }

    /// Predict multiple samples
    pub fn predict_batch<X, Y>(
        &self,
        training_samples: &[X],
        samples: &[Y],
    ) -> Result<Vec<Prediction>>
    where
        X: AsRef<[f64]>,
        Y: AsRef<[f64]>,
    {
        let model = self.trained_model(training_samples)?;
        samples
            .iter()
            .enumerate()
            .map(|(index, x)| {
                self.decision_unchecked(model, training_samples, index, x.as_ref())
                    .map(Prediction::from_decision)
            })
            .collect()
    }

    /// Fraction of test samples whose prediction matches the true label
    ///
    /// An empty test set is rejected rather than scored as NaN.
    pub fn score<X, Y>(
        &self,
        training_samples: &[X],
        test_samples: &[Y],
        test_labels: &[i32],
    ) -> Result<f64>
    where
        X: AsRef<[f64]>,
        Y: AsRef<[f64]>,
    {
        Ok(self
            .evaluate_detailed(training_samples, test_samples, test_labels)?
            .accuracy())
    }

    /// Score against datasets holding the training and test sets
    pub fn score_dataset<D1: Dataset, D2: Dataset>(&self, training: &D1, test: &D2) -> Result<f64> {
        self.score(training.samples(), test.samples(), test.labels())
    }

    /// Get detailed evaluation metrics
    pub fn evaluate_detailed<X, Y>(
        &self,
        training_samples: &[X],
        test_samples: &[Y],
        test_labels: &[i32],
    ) -> Result<EvaluationMetrics>
    where
        X: AsRef<[f64]>,
        Y: AsRef<[f64]>,
    {
        if test_samples.is_empty() {
            return Err(InputError::EmptyDataset.into());
        }
        if test_labels.len() != test_samples.len() {
            return Err(InputError::LabelCountMismatch {
                expected: test_samples.len(),
                actual: test_labels.len(),
            }
            .into());
        }
        validation::check_labels(test_labels)?;

        let predictions = self.predict_batch(training_samples, test_samples)?;

        let mut tp = 0; // True positives
        let mut tn = 0; // True negatives
        let mut fp = 0; // False positives
        let mut fn_ = 0; // False negatives

        for (pred, &actual) in predictions.iter().zip(test_labels) {
            match (pred.label > 0, actual > 0) {
                (true, true) => tp += 1,
                (false, false) => tn += 1,
                (true, false) => fp += 1,
                (false, true) => fn_ += 1,
            }
        }

        Ok(EvaluationMetrics::new(tp, tn, fp, fn_))
    }

    /// Get model information
    pub fn info(&self) -> Result<ModelInfo> {
        let model = self.model.as_ref().ok_or(SVMError::ModelNotTrained)?;
        let support_vector_indices = model.support_vector_indices(self.config.alpha_tol);

        Ok(ModelInfo {
            kernel: self.kernel.name().to_string(),
            n_samples: model.n_samples(),
            n_features: model.n_features(),
            n_support_vectors: support_vector_indices.len(),
            n_bound_support_vectors: model.n_bound_support_vectors(),
            n_unbound_support_vectors: model.n_unbound_support_vectors(),
            bias: model.bias(),
            iterations: model.iterations(),
            termination: model.termination(),
            support_vector_indices,
        })
    }
}

/// Detailed evaluation metrics
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationMetrics {
    pub true_positives: usize,
    pub true_negatives: usize,
    pub false_positives: usize,
    pub false_negatives: usize,
}

impl EvaluationMetrics {
    fn new(tp: usize, tn: usize, fp: usize, fn_: usize) -> Self {
        Self {
            true_positives: tp,
            true_negatives: tn,
            false_positives: fp,
            false_negatives: fn_,
        }
    }

    pub fn total(&self) -> usize {
        self.true_positives + self.true_negatives + self.false_positives + self.false_negatives
    }

    /// Calculate accuracy: (TP + TN) / (TP + TN + FP + FN)
    pub fn accuracy(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            0.0
        } else {
            (self.true_positives + self.true_negatives) as f64 / total as f64
        }
    }

    /// Calculate precision: TP / (TP + FP)
    pub fn precision(&self) -> f64 {
        let denominator = self.true_positives + self.false_positives;
        if denominator == 0 {
            0.0
        } else {
            self.true_positives as f64 / denominator as f64
        }
    }

    /// Calculate recall (sensitivity): TP / (TP + FN)
    pub fn recall(&self) -> f64 {
        let denominator = self.true_positives + self.false_negatives;
        if denominator == 0 {
            0.0
        } else {
            self.true_positives as f64 / denominator as f64
        }
    }

    /// Calculate F1 score: 2 * (precision * recall) / (precision + recall)
    pub fn f1_score(&self) -> f64 {
        let p = self.precision();
        let r = self.recall();
        if p + r == 0.0 {
            0.0
        } else {
            2.0 * (p * r) / (p + r)
        }
    }

    /// Calculate specificity: TN / (TN + FP)
    pub fn specificity(&self) -> f64 {
        let denominator = self.true_negatives + self.false_positives;
        if denominator == 0 {
            0.0
        } else {
            self.true_negatives as f64 / denominator as f64
        }
    }
}

/// Model information
#[derive(Debug, Clone)]
pub struct ModelInfo {
    pub kernel: String,
    pub n_samples: usize,
    pub n_features: usize,
    /// Alphas above the configured `alpha_tol`
    pub n_support_vectors: usize,
    pub n_bound_support_vectors: usize,
    pub n_unbound_support_vectors: usize,
    pub bias: f64,
    pub iterations: usize,
    pub termination: Termination,
    pub support_vector_indices: Vec<usize>,
}

/// Convenience functions for quick operations
pub mod quick {
    use super::*;

    /// Train a linear SVM with the given C and score it on a test set
    pub fn train_and_score<X, Y>(
        train_samples: &[X],
        train_labels: &[i32],
        test_samples: &[Y],
        test_labels: &[i32],
        c: f64,
    ) -> Result<f64>
    where
        X: AsRef<[f64]>,
        Y: AsRef<[f64]>,
    {
        let mut svm = SVM::new().with_c(c);
        svm.fit(train_samples, train_labels)?;
        svm.score(train_samples, test_samples, test_labels)
    }

    /// Train on the first `train_ratio` of a dataset and score on the rest
    pub fn simple_validation<D: Dataset>(dataset: &D, train_ratio: f64, c: f64) -> Result<f64> {
        if train_ratio <= 0.0 || train_ratio >= 1.0 {
            return Err(SVMError::InvalidParameter(format!(
                "Train ratio must be between 0 and 1, got: {train_ratio}"
            )));
        }

        let n = dataset.len();
        let train_size = (n as f64 * train_ratio) as usize;

        // Simple sequential split (not randomized for reproducibility)
        let (train_x, test_x) = dataset.samples().split_at(train_size);
        let (train_y, test_y) = dataset.labels().split_at(train_size);

        train_and_score(train_x, train_y, test_x, test_y, c)
    }
}
