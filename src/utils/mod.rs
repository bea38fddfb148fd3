//! Utility functions for SVM operations

use crate::core::{InputError, Result};

/// Feature scaling utilities
pub mod scaling {
    use serde::{Deserialize, Serialize};

    /// Feature scaling methods
    #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
    pub enum ScalingMethod {
        /// Min-Max scaling to [min_val, max_val] range
        MinMax { min_val: f64, max_val: f64 },
        /// Standard (Z-score) normalization: (x - mean) / std
        StandardScore,
        /// Unit scaling: x / max(|x|)
        UnitScale,
    }

    impl Default for ScalingMethod {
        fn default() -> Self {
            Self::MinMax {
                min_val: -1.0,
                max_val: 1.0,
            }
        }
    }

    /// Statistics for a single feature column
    #[derive(Debug, Clone, PartialEq)]
    pub struct FeatureStats {
        pub min: f64,
        pub max: f64,
        pub mean: f64,
        pub std: f64,
    }

    /// Per-column scaling fitted on training data
    ///
    /// Fit once on the training samples and apply the same transform to
    /// training and test data. Columns beyond the fitted width pass through
    /// unchanged.
    #[derive(Debug, Clone)]
    pub struct FeatureScaler {
        method: ScalingMethod,
        stats: Vec<FeatureStats>,
    }

    impl FeatureScaler {
        /// Compute scaling parameters from training data
        pub fn fit<X: AsRef<[f64]>>(samples: &[X], method: ScalingMethod) -> Self {
            let dim = samples
                .iter()
                .map(|s| s.as_ref().len())
                .max()
                .unwrap_or(0);

            let stats = (0..dim)
                .map(|col| {
                    let values: Vec<f64> = samples
                        .iter()
                        .filter_map(|s| s.as_ref().get(col).copied())
                        .collect();
                    column_stats(&values)
                })
                .collect();

            Self { method, stats }
        }

        pub fn method(&self) -> ScalingMethod {
            self.method
        }

        /// Fitted statistics, one entry per column
        pub fn stats(&self) -> &[FeatureStats] {
            &self.stats
        }

        /// Scale a single sample
        pub fn transform(&self, sample: &[f64]) -> Vec<f64> {
            sample
                .iter()
                .enumerate()
                .map(|(col, &value)| match self.stats.get(col) {
                    Some(stats) => self.scale_value(value, stats),
                    None => value,
                })
                .collect()
        }

        /// Scale every sample
        pub fn transform_all<X: AsRef<[f64]>>(&self, samples: &[X]) -> Vec<Vec<f64>> {
            samples.iter().map(|s| self.transform(s.as_ref())).collect()
        }

        fn scale_value(&self, value: f64, stats: &FeatureStats) -> f64 {
            match self.method {
                ScalingMethod::MinMax { min_val, max_val } => {
                    if (stats.max - stats.min).abs() < 1e-12 {
                        // Constant feature
                        (min_val + max_val) / 2.0
                    } else {
                        let normalized = (value - stats.min) / (stats.max - stats.min);
                        min_val + normalized * (max_val - min_val)
                    }
                }
                ScalingMethod::StandardScore => {
                    if stats.std < 1e-12 {
                        0.0
                    } else {
                        (value - stats.mean) / stats.std
                    }
                }
                ScalingMethod::UnitScale => {
                    let max_abs = stats.max.abs().max(stats.min.abs());
                    if max_abs < 1e-12 {
                        0.0
                    } else {
                        value / max_abs
                    }
                }
            }
        }
    }

    fn column_stats(values: &[f64]) -> FeatureStats {
        if values.is_empty() {
            return FeatureStats {
                min: 0.0,
                max: 0.0,
                mean: 0.0,
                std: 0.0,
            };
        }

        let min = values.iter().fold(f64::INFINITY, |a, &b| a.min(b));
        let max = values.iter().fold(f64::NEG_INFINITY, |a, &b| a.max(b));
        let mean = values.iter().sum::<f64>() / values.len() as f64;

        // Sample variance
        let variance = if values.len() > 1 {
            values.iter().map(|&x| (x - mean).powi(2)).sum::<f64>() / (values.len() - 1) as f64
        } else {
            0.0
        };

        FeatureStats {
            min,
            max,
            mean,
            std: variance.sqrt(),
        }
    }

    /// Convenience function: fit and transform in one step
    pub fn fit_transform<X: AsRef<[f64]>>(
        samples: &[X],
        method: ScalingMethod,
    ) -> (Vec<Vec<f64>>, FeatureScaler) {
        let scaler = FeatureScaler::fit(samples, method);
        let transformed = scaler.transform_all(samples);
        (transformed, scaler)
    }
}

/// Validation and preprocessing utilities
pub mod validation {
    use super::*;

    /// Check a training set and return its feature dimension.
    ///
    /// Rejects an empty set, a label count that differs from the sample
    /// count, ragged feature vectors and labels other than -1/+1.
    pub fn check_training_set<X: AsRef<[f64]>>(samples: &[X], labels: &[i32]) -> Result<usize> {
        if samples.is_empty() {
            return Err(InputError::EmptyDataset.into());
        }
        if labels.len() != samples.len() {
            return Err(InputError::LabelCountMismatch {
                expected: samples.len(),
                actual: labels.len(),
            }
            .into());
        }

        let dim = samples[0].as_ref().len();
        check_features(samples, dim)?;
        check_labels(labels)?;
        Ok(dim)
    }

    /// Every sample must have exactly `dim` features
    pub fn check_features<X: AsRef<[f64]>>(samples: &[X], dim: usize) -> Result<()> {
        for (index, sample) in samples.iter().enumerate() {
            let actual = sample.as_ref().len();
            if actual != dim {
                return Err(InputError::DimensionMismatch {
                    index,
                    expected: dim,
                    actual,
                }
                .into());
            }
        }
        Ok(())
    }

    /// Every label must be -1 or +1
    pub fn check_labels(labels: &[i32]) -> Result<()> {
        match labels
            .iter()
            .enumerate()
            .find(|&(_, &label)| label != 1 && label != -1)
        {
            Some((index, &label)) => Err(InputError::InvalidLabel { index, label }.into()),
            None => Ok(()),
        }
    }

    /// Count positive and negative labels and their ratio
    pub fn label_balance(labels: &[i32]) -> (usize, usize, f64) {
        let positive_count = labels.iter().filter(|&&l| l > 0).count();
        let negative_count = labels.len() - positive_count;
        let balance_ratio = if negative_count == 0 {
            f64::INFINITY
        } else {
            positive_count as f64 / negative_count as f64
        };
        (positive_count, negative_count, balance_ratio)
    }
}
