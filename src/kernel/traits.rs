//! Kernel trait definition

use std::sync::Arc;

/// Kernel function trait
///
/// A kernel function K(x, y) must satisfy Mercer's condition to be valid for SVM.
/// Implementations must be pure: the same inputs always give the same value.
/// Both slices are expected to have the same length.
pub trait Kernel: Send + Sync {
    /// Compute kernel value K(x, y)
    fn compute(&self, x: &[f64], y: &[f64]) -> f64;

    /// Short human-readable name used in log output
    fn name(&self) -> &str {
        "custom"
    }
}

impl<K: Kernel + ?Sized> Kernel for &K {
    fn compute(&self, x: &[f64], y: &[f64]) -> f64 {
        (**self).compute(x, y)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

impl<K: Kernel + ?Sized> Kernel for Box<K> {
    fn compute(&self, x: &[f64], y: &[f64]) -> f64 {
        (**self).compute(x, y)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

impl<K: Kernel + ?Sized> Kernel for Arc<K> {
    fn compute(&self, x: &[f64], y: &[f64]) -> f64 {
        (**self).compute(x, y)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Adapter turning a plain closure into a [`Kernel`]
///
/// ```
/// use smo_svm::kernel::{linear, FnKernel, Kernel};
///
/// let shifted = FnKernel::new(|x: &[f64], y: &[f64]| linear(x, y) + 1.0);
/// assert_eq!(shifted.compute(&[1.0, 2.0], &[3.0, 4.0]), 12.0);
/// ```
#[derive(Clone, Copy)]
pub struct FnKernel<F> {
    f: F,
}

impl<F> FnKernel<F>
where
    F: Fn(&[f64], &[f64]) -> f64 + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> Kernel for FnKernel<F>
where
    F: Fn(&[f64], &[f64]) -> f64 + Send + Sync,
{
    fn compute(&self, x: &[f64], y: &[f64]) -> f64 {
        (self.f)(x, y)
    }
}
