//! Decision function shared by training and inference

use crate::kernel::Kernel;

/// Which alphas take part in a margin evaluation
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SupportFilter {
    /// Every alpha that is exactly nonzero. Used while training.
    NonZero,
    /// Only alphas strictly above the threshold. Used at prediction time.
    Above(f64),
}

impl SupportFilter {
    #[inline]
    pub fn accepts(self, alpha: f64) -> bool {
        match self {
            SupportFilter::NonZero => alpha != 0.0,
            SupportFilter::Above(threshold) => alpha > threshold,
        }
    }
}

/// `b + Σ alpha_i * y_i * K(x, x_i)` over the alphas accepted by `filter`
///
/// `samples`, `labels` and `alphas` must have the same length.
pub fn margin<K, X>(
    kernel: &K,
    samples: &[X],
    labels: &[i32],
    alphas: &[f64],
    bias: f64,
    x: &[f64],
    filter: SupportFilter,
) -> f64
where
    K: Kernel + ?Sized,
    X: AsRef<[f64]>,
{
    samples
        .iter()
        .zip(labels)
        .zip(alphas)
        .filter(|&(_, &alpha)| filter.accepts(alpha))
        .fold(bias, |sum, ((sample, &label), &alpha)| {
            sum + alpha * f64::from(label) * kernel.compute(x, sample.as_ref())
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::LinearKernel;

    #[test]
    fn test_margin_without_support_is_bias() {
        let samples = [[1.0, 0.0], [0.0, 1.0]];
        let value = margin(
            &LinearKernel,
            &samples,
            &[1, -1],
            &[0.0, 0.0],
            0.75,
            &[3.0, 3.0],
            SupportFilter::NonZero,
        );
        assert_eq!(value, 0.75);
    }

    #[test]
    fn test_margin_weighted_sum() {
        let samples = [[1.0, 0.0], [0.0, 1.0]];
        // 0.5 + 2 * (+1) * 3 + 1 * (-1) * 4 = 2.5
        let value = margin(
            &LinearKernel,
            &samples,
            &[1, -1],
            &[2.0, 1.0],
            0.5,
            &[3.0, 4.0],
            SupportFilter::NonZero,
        );
        assert_eq!(value, 2.5);
    }

    #[test]
    fn test_filter_skips_small_alphas() {
        let samples = [[1.0], [1.0]];
        let alphas = [1e-9, 0.5];
        let exact = margin(
            &LinearKernel,
            &samples,
            &[1, 1],
            &alphas,
            0.0,
            &[1.0],
            SupportFilter::NonZero,
        );
        let pruned = margin(
            &LinearKernel,
            &samples,
            &[1, 1],
            &alphas,
            0.0,
            &[1.0],
            SupportFilter::Above(1e-7),
        );
        assert_eq!(exact, 0.5 + 1e-9);
        assert_eq!(pruned, 0.5);
    }

    #[test]
    fn test_filter_threshold_is_exclusive() {
        assert!(!SupportFilter::Above(0.1).accepts(0.1));
        assert!(SupportFilter::Above(0.1).accepts(0.1000001));
        assert!(!SupportFilter::NonZero.accepts(0.0));
        assert!(SupportFilter::NonZero.accepts(1e-300));
    }
}
