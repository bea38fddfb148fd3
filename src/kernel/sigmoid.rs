//! Sigmoid (Tanh) Kernel Implementation
//!
//! K(x, y) = tanh(γ * <x, y> + r)
//!
//! The kernel is bounded in [-1, 1] and is not positive semi-definite for
//! every parameter choice, so the SMO step may see `eta >= 0` more often and
//! skip those pairs.

use crate::kernel::linear;
use crate::kernel::traits::Kernel;

/// Sigmoid (Hyperbolic Tangent) kernel for non-linear classification
#[derive(Debug, Clone)]
pub struct SigmoidKernel {
    /// Scaling parameter for the dot product (must be positive)
    pub gamma: f64,
    /// Bias/offset parameter (can be positive, negative, or zero)
    pub coef0: f64,
}

impl SigmoidKernel {
    /// Creates a new Sigmoid kernel with specified parameters
    ///
    /// # Panics
    /// Panics if gamma is not positive
    ///
    /// # Examples
    /// ```
    /// use smo_svm::kernel::SigmoidKernel;
    ///
    /// let kernel = SigmoidKernel::new(0.1, -1.0);
    /// assert_eq!(kernel.gamma, 0.1);
    /// assert_eq!(kernel.coef0, -1.0);
    /// ```
    pub fn new(gamma: f64, coef0: f64) -> Self {
        if gamma <= 0.0 {
            panic!("Gamma must be positive, got: {}", gamma);
        }
        Self { gamma, coef0 }
    }

    /// gamma = 1/n_features, coef0 = -1.0
    pub fn neural_network(n_features: usize) -> Self {
        if n_features == 0 {
            panic!("Number of features must be positive");
        }
        Self::new(1.0 / n_features as f64, -1.0)
    }
}

impl Default for SigmoidKernel {
    fn default() -> Self {
        Self::new(0.01, 0.0)
    }
}

impl Kernel for SigmoidKernel {
    fn compute(&self, x: &[f64], y: &[f64]) -> f64 {
        (self.gamma * linear(x, y) + self.coef0).tanh()
    }

    fn name(&self) -> &str {
        "sigmoid"
    }
}
