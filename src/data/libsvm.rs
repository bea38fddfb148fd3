//! LibSVM format loader
//!
//! Supports loading datasets in the libsvm format:
//! label index:value index:value ...
//!
//! Example:
//! +1 1:0.5 3:1.2 7:0.8
//! -1 2:0.3 5:2.1
//!
//! Indices are 1-based. Rows are densified to the largest index seen in
//! the file; missing features are zero.

use crate::core::{DenseDataset, InputError, Result, SVMError};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Largest accepted 1-based feature index. Rows are stored densely, so the
/// index bounds the width of every row in the file.
pub const MAX_FEATURE_INDEX: usize = 1 << 22;

/// One parsed line: label and 0-based (index, value) pairs
#[derive(Debug, Clone, PartialEq)]
pub struct SparseRow {
    pub label: i32,
    pub features: Vec<(usize, f64)>,
}

impl SparseRow {
    /// Number of dense columns needed to hold this row
    pub fn width(&self) -> usize {
        self.features.iter().map(|&(i, _)| i + 1).max().unwrap_or(0)
    }

    /// Expand into a dense vector of `dim` features
    pub fn to_dense(&self, dim: usize) -> Vec<f64> {
        let mut dense = vec![0.0; dim];
        for &(index, value) in &self.features {
            if index < dim {
                dense[index] = value;
            }
        }
        dense
    }
}

/// Load a dataset from a LibSVM format file
pub fn from_file<P: AsRef<Path>>(path: P) -> Result<DenseDataset> {
    let file = File::open(path).map_err(SVMError::IoError)?;
    from_reader(BufReader::new(file))
}

/// Load a dataset from a reader
pub fn from_reader<R: BufRead>(reader: R) -> Result<DenseDataset> {
    let mut rows = Vec::new();
    let mut dimensions = 0;

    for (line_num, line) in reader.lines().enumerate() {
        let line = line.map_err(SVMError::IoError)?;
        let line = line.trim();

        // Skip empty lines and comments
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let row = parse_line(line).map_err(|e| {
            SVMError::ParseError(format!("Error parsing line {}: {}", line_num + 1, e))
        })?;
        dimensions = dimensions.max(row.width());
        rows.push(row);
    }

    if rows.is_empty() {
        return Err(InputError::EmptyDataset.into());
    }

    let labels = rows.iter().map(|r| r.label).collect();
    let samples = rows.iter().map(|r| r.to_dense(dimensions)).collect();
    DenseDataset::new(samples, labels)
}

/// Parse a single line in libsvm format
///
/// Labels above zero become +1, everything else -1.
pub fn parse_line(line: &str) -> Result<SparseRow> {
    let mut parts = line.split_whitespace();

    let label_str = parts
        .next()
        .ok_or_else(|| SVMError::ParseError("Empty line".to_string()))?;
    let label = label_str
        .parse::<f64>()
        .map_err(|_| SVMError::ParseError(format!("Invalid label: {label_str}")))?;
    let label = if label > 0.0 { 1 } else { -1 };

    let mut features = Vec::new();
    for feature_str in parts {
        // Trailing comments are allowed
        if feature_str.starts_with('#') {
            break;
        }

        let (index_str, value_str) = feature_str.split_once(':').ok_or_else(|| {
            SVMError::ParseError(format!("Invalid feature format: {feature_str}"))
        })?;

        let index = index_str
            .parse::<usize>()
            .map_err(|_| SVMError::ParseError(format!("Invalid feature index: {index_str}")))?;
        let value = value_str
            .parse::<f64>()
            .map_err(|_| SVMError::ParseError(format!("Invalid feature value: {value_str}")))?;

        // libsvm uses 1-based indexing, convert to 0-based
        if index == 0 {
            return Err(SVMError::ParseError(format!(
                "Feature index must be positive: {index}"
            )));
        }
        if index > MAX_FEATURE_INDEX {
            return Err(SVMError::ParseError(format!(
                "Feature index {index} exceeds the maximum of {MAX_FEATURE_INDEX}"
            )));
        }
        features.push((index - 1, value));
    }

    Ok(SparseRow { label, features })
}
