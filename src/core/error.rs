//! Error types for SVM implementation

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SVMError {
    #[error("Invalid input: {0}")]
    InvalidInput(#[from] InputError),

    #[error("Failed to allocate training state for {0} samples")]
    AllocationFailure(usize),

    #[error("Model not trained")]
    ModelNotTrained,

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Configuration error: {0}")]
    ConfigError(#[from] serde_json::Error),
}

/// Reasons a dataset handed to fit, predict or score is rejected
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InputError {
    #[error("empty dataset")]
    EmptyDataset,

    #[error("expected {expected} labels, got {actual}")]
    LabelCountMismatch { expected: usize, actual: usize },

    #[error("sample {index} has {actual} features, expected {expected}")]
    DimensionMismatch {
        index: usize,
        expected: usize,
        actual: usize,
    },

    #[error("label {label} at index {index}: expected -1 or +1")]
    InvalidLabel { index: usize, label: i32 },

    #[error("training set has {actual} samples but the model was fit on {expected}")]
    TrainingSetMismatch { expected: usize, actual: usize },
}

impl SVMError {
    /// True for errors caused by a malformed dataset
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, SVMError::InvalidInput(_))
    }
}

pub type Result<T> = std::result::Result<T, SVMError>;
