//! Trained model state
//!
//! A [`TrainedSVM`] holds what one successful fit produced: one alpha per
//! training sample, the bias, the training labels and the shape of the
//! training set. Training samples themselves are not stored; every
//! prediction is evaluated against the training set handed in by the
//! caller.

use crate::core::{InputError, OptimizationResult, Result, Termination};
use crate::kernel::Kernel;
use crate::solver::{margin, SupportFilter};
use crate::utils::validation;

/// State of a fitted classifier
#[derive(Debug, Clone, PartialEq)]
pub struct TrainedSVM {
    alphas: Vec<f64>,
    bias: f64,
    labels: Vec<i32>,
    n_features: usize,
    c: f64,
    iterations: usize,
    updates: usize,
    termination: Termination,
    objective_value: f64,
}

impl TrainedSVM {
    pub(crate) fn new(
        result: OptimizationResult,
        labels: Vec<i32>,
        n_features: usize,
        c: f64,
    ) -> Self {
        Self {
            alphas: result.alpha,
            bias: result.b,
            labels,
            n_features,
            c,
            iterations: result.iterations,
            updates: result.updates,
            termination: result.termination,
            objective_value: result.objective_value,
        }
    }

    /// One alpha per training sample, in training order
    pub fn alphas(&self) -> &[f64] {
        &self.alphas
    }

    pub fn bias(&self) -> f64 {
        self.bias
    }

    /// Labels of the training set the model was fit on
    pub fn labels(&self) -> &[i32] {
        &self.labels
    }

    pub fn n_samples(&self) -> usize {
        self.alphas.len()
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Box bound C used for this fit
    pub fn c(&self) -> f64 {
        self.c
    }

    /// Outer sweeps performed by the solver
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Total pair updates applied by the solver
    pub fn updates(&self) -> usize {
        self.updates
    }

    pub fn termination(&self) -> Termination {
        self.termination
    }

    pub fn converged(&self) -> bool {
        self.termination == Termination::Converged
    }

    /// Dual objective at the end of training
    pub fn objective_value(&self) -> f64 {
        self.objective_value
    }

    /// Indices of training samples whose alpha is above `alpha_tol`
    pub fn support_vector_indices(&self, alpha_tol: f64) -> Vec<usize> {
        self.alphas
            .iter()
            .enumerate()
            .filter_map(|(i, &a)| if a > alpha_tol { Some(i) } else { None })
            .collect()
    }

    /// Support vectors sitting on the box bound (alpha == C)
    pub fn n_bound_support_vectors(&self) -> usize {
        self.alphas.iter().filter(|&&a| a >= self.c).count()
    }

    /// Support vectors strictly inside the box (0 < alpha < C)
    pub fn n_unbound_support_vectors(&self) -> usize {
        self.alphas
            .iter()
            .filter(|&&a| a > 0.0 && a < self.c)
            .count()
    }

    /// Check that `samples` can stand in for the training set
    pub fn check_training_set<X: AsRef<[f64]>>(&self, samples: &[X]) -> Result<()> {
        if samples.len() != self.n_samples() {
            return Err(InputError::TrainingSetMismatch {
                expected: self.n_samples(),
                actual: samples.len(),
            }
            .into());
        }
        validation::check_features(samples, self.n_features)
    }

    /// Decision value `b + Σ alpha_i y_i K(x, x_i)` over alphas above `alpha_tol`
    ///
    /// `training_samples` must be the set the model was fit on; see
    /// [`check_training_set`](Self::check_training_set).
    pub fn decision_function<K, X>(
        &self,
        kernel: &K,
        training_samples: &[X],
        x: &[f64],
        alpha_tol: f64,
    ) -> f64
    where
        K: Kernel + ?Sized,
        X: AsRef<[f64]>,
    {
        margin(
            kernel,
            training_samples,
            &self.labels,
            &self.alphas,
            self.bias,
            x,
            SupportFilter::Above(alpha_tol),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::SVMError;
    use crate::kernel::LinearKernel;

    fn model() -> TrainedSVM {
        let result = OptimizationResult {
            alpha: vec![0.0, 0.5, 1.0, 1e-9],
            b: -0.25,
            iterations: 12,
            updates: 3,
            termination: Termination::Converged,
            objective_value: 0.75,
        };
        TrainedSVM::new(result, vec![1, -1, 1, -1], 1, 1.0)
    }

    #[test]
    fn test_accessors() {
        let model = model();
        assert_eq!(model.n_samples(), 4);
        assert_eq!(model.n_features(), 1);
        assert_eq!(model.bias(), -0.25);
        assert_eq!(model.labels(), &[1, -1, 1, -1]);
        assert_eq!(model.iterations(), 12);
        assert_eq!(model.updates(), 3);
        assert!(model.converged());
        assert_eq!(model.objective_value(), 0.75);
    }

    #[test]
    fn test_support_vector_counts() {
        let model = model();
        assert_eq!(model.support_vector_indices(1e-7), vec![1, 2]);
        assert_eq!(model.support_vector_indices(0.0), vec![1, 2, 3]);
        assert_eq!(model.n_bound_support_vectors(), 1);
        assert_eq!(model.n_unbound_support_vectors(), 2);
    }

    #[test]
    fn test_decision_function_prunes_tiny_alphas() {
        let model = model();
        let training = [[1.0], [2.0], [3.0], [4.0]];

        // -0.25 + 0.5 * (-1) * 2 * 1 + 1.0 * (+1) * 3 * 1 = 1.75
        let value = model.decision_function(&LinearKernel, &training, &[1.0], 1e-7);
        assert_eq!(value, 1.75);
    }

    #[test]
    fn test_check_training_set() {
        let model = model();
        assert!(model
            .check_training_set(&[[1.0], [2.0], [3.0], [4.0]])
            .is_ok());
        assert!(matches!(
            model.check_training_set(&[[1.0], [2.0]]),
            Err(SVMError::InvalidInput(InputError::TrainingSetMismatch {
                expected: 4,
                actual: 2
            }))
        ));
        assert!(matches!(
            model.check_training_set(&[vec![1.0], vec![2.0], vec![3.0, 0.0], vec![4.0]]),
            Err(SVMError::InvalidInput(InputError::DimensionMismatch { index: 2, .. }))
        ));
    }
}
