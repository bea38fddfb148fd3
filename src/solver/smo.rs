//! Sequential Minimal Optimization (SMO) solver implementation
//!
//! This is the simplified SMO variant: every outer sweep visits each sample,
//! and each KKT violator is paired with a uniformly random partner. The two
//! alphas are then optimized jointly in closed form. Training stops after
//! `passes` consecutive sweeps without an update or after `max_iterations`
//! sweeps, whichever comes first.

use crate::core::{OptimizationResult, OptimizerConfig, Result, SVMError, Termination};
use crate::kernel::Kernel;
use crate::solver::margin::{margin, SupportFilter};
use crate::solver::selection::PairSelector;
use crate::utils::validation;
use log::{debug, trace};
use rand::Rng;
use std::ops::ControlFlow;

/// Pairs whose feasible segment [L, H] is shorter than this are skipped
const BOUND_EPSILON: f64 = 1e-4;

/// Alpha moves smaller than this are not applied
const MIN_ALPHA_STEP: f64 = 1e-4;

/// State reported to the progress callback after every outer sweep
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepProgress {
    /// Number of sweeps completed so far
    pub iteration: usize,
    /// Pair updates applied during this sweep
    pub changed: usize,
    /// Consecutive sweeps without any update
    pub quiet_sweeps: usize,
    /// Current bias
    pub bias: f64,
}

/// SMO solver for SVM optimization
///
/// Solves the SVM dual by repeatedly optimizing pairs of Lagrange
/// multipliers (alpha values). The solver borrows its kernel and never
/// mutates the dataset.
pub struct SMOSolver<'k, K: Kernel + ?Sized> {
    kernel: &'k K,
    config: OptimizerConfig,
}

impl<'k, K: Kernel + ?Sized> SMOSolver<'k, K> {
    /// Create a new SMO solver with the given kernel and configuration
    pub fn new(kernel: &'k K, config: OptimizerConfig) -> Self {
        Self { kernel, config }
    }

    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    /// Solve the SVM optimization problem
    ///
    /// `rng` drives the choice of the second index of every pair; seed it to
    /// make training reproducible.
    pub fn solve<X, R>(
        &self,
        samples: &[X],
        labels: &[i32],
        rng: &mut R,
    ) -> Result<OptimizationResult>
    where
        X: AsRef<[f64]>,
        R: Rng + ?Sized,
    {
        self.solve_with_callback(samples, labels, rng, |_| ControlFlow::Continue(()))
    }

    /// Solve, calling `callback` after every outer sweep
    ///
    /// Returning [`ControlFlow::Break`] stops training; the alphas and bias
    /// reached so far are returned with [`Termination::Interrupted`].
    pub fn solve_with_callback<X, R, F>(
        &self,
        samples: &[X],
        labels: &[i32],
        rng: &mut R,
        mut callback: F,
    ) -> Result<OptimizationResult>
    where
        X: AsRef<[f64]>,
        R: Rng + ?Sized,
        F: FnMut(&SweepProgress) -> ControlFlow<()>,
    {
        self.config.validate()?;
        let dim = validation::check_training_set(samples, labels)?;
        let n = samples.len();

        let mut alpha = allocate_alphas(n)?;
        let mut b = 0.0;
        let mut selector = PairSelector::new(rng);

        debug!(
            "SMO start: {} samples, {} features, {} kernel, C={}, tol={}",
            n,
            dim,
            self.kernel.name(),
            self.config.c,
            self.config.tol
        );

        let mut iterations = 0;
        let mut quiet_sweeps = 0;
        let mut updates = 0;

        let termination = loop {
            if quiet_sweeps >= self.config.passes {
                break Termination::Converged;
            }
            if iterations >= self.config.max_iterations {
                break Termination::MaxIterations;
            }

            let mut changed = 0;
            for i in 0..n {
                let e_i = self.error(samples, labels, &alpha, b, i);
                if !self.violates_kkt(f64::from(labels[i]) * e_i, alpha[i]) {
                    continue;
                }

                let Some(j) = selector.partner(i, n) else {
                    continue;
                };

                if self.take_step(i, j, e_i, samples, labels, &mut alpha, &mut b) {
                    changed += 1;
                }
            }

            if changed == 0 {
                quiet_sweeps += 1;
            } else {
                quiet_sweeps = 0;
            }
            iterations += 1;
            updates += changed;

            trace!("sweep {iterations}: {changed} updates, b={b:.6}");

            let progress = SweepProgress {
                iteration: iterations,
                changed,
                quiet_sweeps,
                bias: b,
            };
            if callback(&progress).is_break() {
                break Termination::Interrupted;
            }
        };

        let objective_value = self.calculate_objective(samples, labels, &alpha);

        debug!(
            "SMO finished: {:?} after {} sweeps, {} updates, b={:.6}, objective={:.6}",
            termination, iterations, updates, b, objective_value
        );

        Ok(OptimizationResult {
            alpha,
            b,
            iterations,
            updates,
            termination,
            objective_value,
        })
    }

    /// E_i = f(x_i) - y_i with every nonzero alpha taking part
    fn error<X: AsRef<[f64]>>(
        &self,
        samples: &[X],
        labels: &[i32],
        alpha: &[f64],
        b: f64,
        i: usize,
    ) -> f64 {
        margin(
            self.kernel,
            samples,
            labels,
            alpha,
            b,
            samples[i].as_ref(),
            SupportFilter::NonZero,
        ) - f64::from(labels[i])
    }

    /// KKT violation test on r_i = y_i * E_i:
    /// - r_i < -tol and alpha_i < C (alpha_i can increase)
    /// - r_i > tol and alpha_i > 0 (alpha_i can decrease)
    fn violates_kkt(&self, r_i: f64, alpha_i: f64) -> bool {
        (r_i < -self.config.tol && alpha_i < self.config.c)
            || (r_i > self.config.tol && alpha_i > 0.0)
    }

    /// Jointly optimize alpha_i and alpha_j. Returns true if they changed.
    #[allow(clippy::too_many_arguments)]
    fn take_step<X: AsRef<[f64]>>(
        &self,
        i: usize,
        j: usize,
        e_i: f64,
        samples: &[X],
        labels: &[i32],
        alpha: &mut [f64],
        b: &mut f64,
    ) -> bool {
        let c = self.config.c;
        let x_i = samples[i].as_ref();
        let x_j = samples[j].as_ref();
        let y_i = f64::from(labels[i]);
        let y_j = f64::from(labels[j]);
        let alpha_i_old = alpha[i];
        let alpha_j_old = alpha[j];

        let e_j = self.error(samples, labels, alpha, *b, j);

        let (low, high) =
            feasible_segment(labels[i] == labels[j], alpha_i_old, alpha_j_old, c);

        if (low - high).abs() < BOUND_EPSILON {
            return false;
        }

        let k_ij = self.kernel.compute(x_i, x_j);
        let k_ii = self.kernel.compute(x_i, x_i);
        let k_jj = self.kernel.compute(x_j, x_j);

        let eta = 2.0 * k_ij - k_ii - k_jj;
        if eta >= 0.0 {
            return false;
        }

        let mut alpha_j_new = alpha_j_old - y_j * (e_i - e_j) / eta;
        if alpha_j_new > high {
            alpha_j_new = high;
        }
        if alpha_j_new < low {
            alpha_j_new = low;
        }

        if (alpha_j_old - alpha_j_new).abs() < MIN_ALPHA_STEP {
            return false;
        }

        // Exact in real arithmetic; the clamp absorbs rounding at the box edges
        let alpha_i_new = (alpha_i_old + y_i * y_j * (alpha_j_old - alpha_j_new)).clamp(0.0, c);

        alpha[i] = alpha_i_new;
        alpha[j] = alpha_j_new;

        let delta_i = y_i * (alpha_i_new - alpha_i_old);
        let delta_j = y_j * (alpha_j_new - alpha_j_old);
        let b1 = *b - e_i - delta_i * k_ii - delta_j * k_ij;
        let b2 = *b - e_j - delta_i * k_ij - delta_j * k_jj;

        *b = select_bias(b1, b2, alpha_i_new, alpha_j_new, c);

        true
    }

    /// Dual objective: Σ alpha_i - ½ Σ_i Σ_j alpha_i alpha_j y_i y_j K(x_i, x_j)
    fn calculate_objective<X: AsRef<[f64]>>(
        &self,
        samples: &[X],
        labels: &[i32],
        alpha: &[f64],
    ) -> f64 {
        let support: Vec<usize> = (0..alpha.len()).filter(|&i| alpha[i] != 0.0).collect();

        let mut quadratic = 0.0;
        for &i in &support {
            for &j in &support {
                let k_ij = self
                    .kernel
                    .compute(samples[i].as_ref(), samples[j].as_ref());
                quadratic +=
                    alpha[i] * alpha[j] * f64::from(labels[i]) * f64::from(labels[j]) * k_ij;
            }
        }

        alpha.iter().sum::<f64>() - 0.5 * quadratic
    }
}

/// Range [L, H] that keeps (alpha_i, alpha_j) inside the [0, C] x [0, C] box
/// while preserving the equality constraint.
///
/// H for differing labels is `(C + alpha_j) - alpha_i`, evaluated in that order.
fn feasible_segment(same_label: bool, alpha_i: f64, alpha_j: f64, c: f64) -> (f64, f64) {
    if same_label {
        let sum = alpha_i + alpha_j;
        ((sum - c).max(0.0), c.min(sum))
    } else {
        ((alpha_j - alpha_i).max(0.0), c.min(c + alpha_j - alpha_i))
    }
}

/// Bias after a pair update.
///
/// Starts from the average of both candidates, then takes `b1` if alpha_i is
/// unbound and finally `b2` if alpha_j is unbound, so `b2` wins a tie.
fn select_bias(b1: f64, b2: f64, alpha_i: f64, alpha_j: f64, c: f64) -> f64 {
    let mut b = 0.5 * (b1 + b2);
    if alpha_i > 0.0 && alpha_i < c {
        b = b1;
    }
    if alpha_j > 0.0 && alpha_j < c {
        b = b2;
    }
    b
}

fn allocate_alphas(n: usize) -> Result<Vec<f64>> {
    let mut alpha = Vec::new();
    alpha
        .try_reserve_exact(n)
        .map_err(|_| SVMError::AllocationFailure(n))?;
    alpha.resize(n, 0.0);
    Ok(alpha)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::InputError;
    use crate::kernel::LinearKernel;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn line_dataset() -> (Vec<Vec<f64>>, Vec<i32>) {
        (
            vec![vec![-2.0, 0.0], vec![-1.0, 0.0], vec![1.0, 0.0], vec![2.0, 0.0]],
            vec![-1, -1, 1, 1],
        )
    }

    #[test]
    fn test_smo_solver_creation() {
        let kernel = LinearKernel::new();
        let solver = SMOSolver::new(&kernel, OptimizerConfig::default());

        assert_eq!(solver.config().c, 1.0);
    }

    #[test]
    fn test_smo_solver_empty_dataset() {
        let kernel = LinearKernel::new();
        let solver = SMOSolver::new(&kernel, OptimizerConfig::default());
        let mut rng = StdRng::seed_from_u64(0);

        let samples: Vec<Vec<f64>> = vec![];
        let result = solver.solve(&samples, &[], &mut rng);

        assert!(matches!(
            result,
            Err(SVMError::InvalidInput(InputError::EmptyDataset))
        ));
    }

    #[test]
    fn test_smo_solver_invalid_labels() {
        let kernel = LinearKernel::new();
        let solver = SMOSolver::new(&kernel, OptimizerConfig::default());
        let mut rng = StdRng::seed_from_u64(0);

        let result = solver.solve(&[[1.0], [2.0]], &[1, 0], &mut rng);
        assert!(matches!(
            result,
            Err(SVMError::InvalidInput(InputError::InvalidLabel {
                index: 1,
                label: 0
            }))
        ));
    }

    #[test]
    fn test_smo_solver_dimension_mismatch() {
        let kernel = LinearKernel::new();
        let solver = SMOSolver::new(&kernel, OptimizerConfig::default());
        let mut rng = StdRng::seed_from_u64(0);

        let samples = vec![vec![1.0, 2.0], vec![1.0]];
        let result = solver.solve(&samples, &[1, -1], &mut rng);
        assert!(matches!(
            result,
            Err(SVMError::InvalidInput(InputError::DimensionMismatch {
                index: 1,
                expected: 2,
                actual: 1
            }))
        ));
    }

    #[test]
    fn test_smo_solver_label_count_mismatch() {
        let kernel = LinearKernel::new();
        let solver = SMOSolver::new(&kernel, OptimizerConfig::default());
        let mut rng = StdRng::seed_from_u64(0);

        let result = solver.solve(&[[1.0], [2.0]], &[1], &mut rng);
        assert!(matches!(
            result,
            Err(SVMError::InvalidInput(InputError::LabelCountMismatch { .. }))
        ));
    }

    #[test]
    fn test_smo_solver_rejects_bad_config() {
        let kernel = LinearKernel::new();
        let config = OptimizerConfig {
            c: -1.0,
            ..Default::default()
        };
        let solver = SMOSolver::new(&kernel, config);
        let mut rng = StdRng::seed_from_u64(0);

        let result = solver.solve(&[[1.0], [-1.0]], &[1, -1], &mut rng);
        assert!(matches!(result, Err(SVMError::InvalidParameter(_))));
    }

    #[test]
    fn test_two_points_exact_solution() {
        let kernel = LinearKernel::new();
        let solver = SMOSolver::new(&kernel, OptimizerConfig::default());
        let mut rng = StdRng::seed_from_u64(5);

        let result = solver
            .solve(&[[1.0], [-1.0]], &[1, -1], &mut rng)
            .expect("Should solve successfully");

        // One pair update lands on the maximum-margin solution w = 1, b = 0
        assert_eq!(result.alpha, vec![0.5, 0.5]);
        assert_eq!(result.b, 0.0);
        assert_eq!(result.updates, 1);
        assert_eq!(result.iterations, 11);
        assert_eq!(result.termination, Termination::Converged);
        assert_relative_eq!(result.objective_value, 0.5, epsilon = 1e-12);
        assert_eq!(result.support_vectors(), vec![0, 1]);
    }

    #[test]
    fn test_smo_solver_max_iterations() {
        let kernel = LinearKernel::new();
        let config = OptimizerConfig {
            max_iterations: 1,
            ..Default::default()
        };
        let solver = SMOSolver::new(&kernel, config);
        let mut rng = StdRng::seed_from_u64(11);

        let (samples, labels) = line_dataset();
        let result = solver
            .solve(&samples, &labels, &mut rng)
            .expect("Should solve");

        assert_eq!(result.iterations, 1);
        assert_eq!(result.termination, Termination::MaxIterations);
    }

    #[test]
    fn test_smo_solver_single_sample() {
        let kernel = LinearKernel::new();
        let solver = SMOSolver::new(&kernel, OptimizerConfig::default());
        let mut rng = StdRng::seed_from_u64(0);

        let result = solver
            .solve(&[[1.0]], &[1], &mut rng)
            .expect("Should handle single sample");

        assert_eq!(result.alpha, vec![0.0]);
        assert_eq!(result.b, 0.0);
        assert_eq!(result.iterations, 10);
        assert_eq!(result.termination, Termination::Converged);
    }

    #[test]
    fn test_single_class_terminates() {
        let kernel = LinearKernel::new();
        let solver = SMOSolver::new(&kernel, OptimizerConfig::default());
        let mut rng = StdRng::seed_from_u64(3);

        let samples = [[1.0, 2.0], [2.0, 1.0], [3.0, 3.0]];
        let result = solver
            .solve(&samples, &[1, 1, 1], &mut rng)
            .expect("Single class should not fail");

        // Same-label pairs starting at zero have L == H, so nothing moves
        assert!(result.alpha.iter().all(|&a| a == 0.0));
        assert_eq!(result.iterations, 10);
        assert_eq!(result.termination, Termination::Converged);
    }

    #[test]
    fn test_take_step_small_c_boundary() {
        let kernel = LinearKernel::new();
        let config = OptimizerConfig {
            c: 0.001,
            ..Default::default()
        };
        let solver = SMOSolver::new(&kernel, config);
        let mut rng = StdRng::seed_from_u64(2);

        let result = solver
            .solve(&[[1.0], [-1.0], [0.5], [-0.5]], &[1, -1, 1, -1], &mut rng)
            .expect("Should solve");

        assert!(result.alpha.iter().all(|&a| (0.0..=0.001).contains(&a)));
        assert!(result.b.is_finite());
    }

    #[test]
    fn test_box_invariant_on_overlapping_classes() {
        let kernel = LinearKernel::new();
        let samples = [
            [0.0, 0.0],
            [1.0, 1.0],
            [0.5, 0.2],
            [0.2, 0.9],
            [0.9, 0.1],
            [0.4, 0.6],
            [0.8, 0.7],
            [0.1, 0.4],
        ];
        let labels = [1, -1, 1, -1, -1, 1, 1, -1];

        for &c in &[0.05, 0.5, 5.0] {
            for seed in 0..5 {
                let config = OptimizerConfig {
                    c,
                    max_iterations: 200,
                    ..Default::default()
                };
                let solver = SMOSolver::new(&kernel, config);
                let mut rng = StdRng::seed_from_u64(seed);
                let result = solver
                    .solve(&samples, &labels, &mut rng)
                    .expect("Should solve");

                for &a in &result.alpha {
                    assert!((0.0..=c).contains(&a), "alpha {a} outside [0, {c}]");
                }
            }
        }
    }

    #[test]
    fn test_identical_features_different_labels() {
        let kernel = LinearKernel::new();
        let solver = SMOSolver::new(&kernel, OptimizerConfig::default());
        let mut rng = StdRng::seed_from_u64(8);

        let result = solver
            .solve(&[[1.0], [1.0], [2.0]], &[1, -1, 1], &mut rng)
            .expect("Should solve");

        assert_eq!(result.alpha.len(), 3);
        assert!(result.alpha.iter().all(|&a| (0.0..=1.0).contains(&a)));
    }

    #[test]
    fn test_zero_kernel_values() {
        let kernel = LinearKernel::new();
        let solver = SMOSolver::new(&kernel, OptimizerConfig::default());
        let mut rng = StdRng::seed_from_u64(4);

        // K == 0 everywhere gives eta == 0, so every pair is skipped
        let result = solver
            .solve(&[[0.0], [0.0], [0.0]], &[1, -1, 1], &mut rng)
            .expect("Should solve");

        assert!(result.alpha.iter().all(|&a| a == 0.0));
        assert_eq!(result.termination, Termination::Converged);
    }

    #[test]
    fn test_same_seed_is_bit_identical() {
        let kernel = LinearKernel::new();
        let solver = SMOSolver::new(&kernel, OptimizerConfig::default());
        let samples = [[0.3, 1.2], [1.5, -0.2], [-0.7, 0.4], [2.2, 1.1], [-1.4, -0.9]];
        let labels = [1, 1, -1, 1, -1];

        let mut rng_a = StdRng::seed_from_u64(1234);
        let mut rng_b = StdRng::seed_from_u64(1234);
        let a = solver.solve(&samples, &labels, &mut rng_a).unwrap();
        let b = solver.solve(&samples, &labels, &mut rng_b).unwrap();

        assert_eq!(a.alpha, b.alpha);
        assert_eq!(a.b.to_bits(), b.b.to_bits());
        assert_eq!(a.iterations, b.iterations);
    }

    #[test]
    fn test_callback_interrupts() {
        let kernel = LinearKernel::new();
        let solver = SMOSolver::new(&kernel, OptimizerConfig::default());
        let mut rng = StdRng::seed_from_u64(6);
        let (samples, labels) = line_dataset();

        let mut seen = Vec::new();
        let result = solver
            .solve_with_callback(&samples, &labels, &mut rng, |progress| {
                seen.push(progress.iteration);
                if progress.iteration >= 2 {
                    ControlFlow::Break(())
                } else {
                    ControlFlow::Continue(())
                }
            })
            .expect("Should solve");

        assert_eq!(seen, vec![1, 2]);
        assert_eq!(result.iterations, 2);
        assert_eq!(result.termination, Termination::Interrupted);
    }

    #[test]
    fn test_feasible_segment() {
        assert_eq!(feasible_segment(true, 0.3, 0.4, 1.0), (0.0, 0.7));
        assert_eq!(feasible_segment(true, 0.8, 0.6, 1.0).1, 1.0);
        assert_eq!(feasible_segment(false, 0.2, 0.5, 1.0), (0.5 - 0.2, 1.0));

        // C + (aj - ai) would round to 0.4 here
        let (low, high) = feasible_segment(false, 0.7, 0.1, 1.0);
        assert_eq!(low, 0.0);
        assert_eq!(high, (1.0 + 0.1) - 0.7);
        assert_eq!(high, 0.40000000000000013);
    }

    #[test]
    fn test_select_bias_tie_break() {
        let c = 1.0;
        // Neither unbound: average
        assert_eq!(select_bias(1.0, 3.0, 0.0, 1.0, c), 2.0);
        // Only alpha_i unbound: b1
        assert_eq!(select_bias(1.0, 3.0, 0.5, 0.0, c), 1.0);
        // Only alpha_j unbound: b2
        assert_eq!(select_bias(1.0, 3.0, 1.0, 0.5, c), 3.0);
        // Both unbound: b2 wins
        assert_eq!(select_bias(1.0, 3.0, 0.5, 0.5, c), 3.0);
    }

    #[test]
    fn test_allocate_alphas() {
        let alpha = allocate_alphas(4).unwrap();
        assert_eq!(alpha, vec![0.0; 4]);
        assert!(matches!(
            allocate_alphas(usize::MAX),
            Err(SVMError::AllocationFailure(n)) if n == usize::MAX
        ));
    }
}
