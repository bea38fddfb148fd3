//! Core traits for SVM implementation

/// Dataset abstraction over dense labeled samples
pub trait Dataset: Send + Sync {
    /// Number of samples in the dataset
    fn len(&self) -> usize;

    /// Number of features (dimensionality)
    fn dim(&self) -> usize;

    /// Feature vectors, one per sample
    fn samples(&self) -> &[Vec<f64>];

    /// Labels in {-1, +1}, one per sample
    fn labels(&self) -> &[i32];

    /// Check if the dataset is empty
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
