//! Data loading
//!
//! Loaders for the LibSVM and CSV formats. Both produce a
//! [`DenseDataset`](crate::core::DenseDataset) with labels mapped to -1/+1.

pub mod csv;
pub mod libsvm;

use crate::core::{DenseDataset, Result};
use log::{debug, warn};
use std::path::Path;

/// On-disk dataset format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DataFormat {
    /// Decide from the file extension
    #[default]
    Auto,
    LibSVM,
    Csv,
}

/// Guess the format from a file extension, falling back to LibSVM
pub fn detect_format(path: &Path) -> DataFormat {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("csv") => DataFormat::Csv,
        Some("libsvm") | Some("svm") => DataFormat::LibSVM,
        Some(_) => {
            warn!("Unknown file extension for {path:?}, assuming LibSVM format");
            DataFormat::LibSVM
        }
        None => {
            warn!("No file extension for {path:?}, assuming LibSVM format");
            DataFormat::LibSVM
        }
    }
}

/// Load a dataset from `path`
pub fn load<P: AsRef<Path>>(path: P, format: DataFormat) -> Result<DenseDataset> {
    let path = path.as_ref();
    let format = match format {
        DataFormat::Auto => detect_format(path),
        explicit => explicit,
    };

    debug!("Loading {path:?} as {format:?}");

    match format {
        DataFormat::Csv => csv::from_file(path),
        _ => libsvm::from_file(path),
    }
}
