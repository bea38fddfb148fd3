//! CSV format loader
//!
//! Supports loading datasets from CSV files where:
//! - The last column is the label
//! - All other columns are features
//! - First row can be headers (automatically detected)
//!
//! Every data row must have the same number of columns.

use crate::core::{DenseDataset, InputError, Result, SVMError};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Load a dataset from a CSV file
///
/// The last column is assumed to be the label.
/// Headers are automatically detected if present.
pub fn from_file<P: AsRef<Path>>(path: P) -> Result<DenseDataset> {
    let file = File::open(path).map_err(SVMError::IoError)?;
    from_reader(BufReader::new(file))
}

/// Load a dataset from a reader, detecting a header row
pub fn from_reader<R: BufRead>(reader: R) -> Result<DenseDataset> {
    from_reader_with_options(reader, true)
}

/// Load a dataset from a reader with explicit header option
pub fn from_reader_with_options<R: BufRead>(
    reader: R,
    auto_detect_header: bool,
) -> Result<DenseDataset> {
    let mut samples: Vec<Vec<f64>> = Vec::new();
    let mut labels = Vec::new();
    let mut width = None;
    let mut first_data_line = true;

    for (line_num, line) in reader.lines().enumerate() {
        let line = line.map_err(SVMError::IoError)?;
        let line = line.trim();

        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if first_data_line {
            first_data_line = false;
            if auto_detect_header && is_header_line(line) {
                continue;
            }
        }

        let (features, label) = parse_data_line(line).map_err(|e| {
            SVMError::ParseError(format!("Error parsing line {}: {}", line_num + 1, e))
        })?;

        match width {
            None => width = Some(features.len()),
            Some(expected) if expected != features.len() => {
                return Err(SVMError::ParseError(format!(
                    "Line {} has {} features, expected {}",
                    line_num + 1,
                    features.len(),
                    expected
                )));
            }
            Some(_) => {}
        }

        samples.push(features);
        labels.push(label);
    }

    if samples.is_empty() {
        return Err(InputError::EmptyDataset.into());
    }

    DenseDataset::new(samples, labels)
}

/// Check if a line appears to be a header
///
/// A line is a header when more than half of its feature fields (the
/// label column excluded) fail to parse as numbers.
pub fn is_header_line(line: &str) -> bool {
    let fields: Vec<&str> = line.split(',').collect();

    if fields.len() < 2 {
        return false;
    }

    let non_numeric_count = fields
        .iter()
        .take(fields.len() - 1) // Exclude last column (label)
        .filter(|field| field.trim().parse::<f64>().is_err())
        .count();

    non_numeric_count * 2 > fields.len() - 1
}

/// Parse a CSV data line into features and a label
///
/// Labels above zero become +1, everything else -1.
pub fn parse_data_line(line: &str) -> Result<(Vec<f64>, i32)> {
    let fields: Vec<&str> = line.split(',').map(str::trim).collect();

    let Some((label_str, feature_fields)) = fields.split_last() else {
        return Err(SVMError::ParseError(format!("Line has too few fields: {line}")));
    };
    if feature_fields.is_empty() {
        return Err(SVMError::ParseError(format!("Line has too few fields: {line}")));
    }

    let label = label_str
        .parse::<f64>()
        .map_err(|_| SVMError::ParseError(format!("Invalid label: {label_str}")))?;
    let label = if label > 0.0 { 1 } else { -1 };

    let features = feature_fields
        .iter()
        .enumerate()
        .map(|(idx, field)| {
            field.parse::<f64>().map_err(|_| {
                SVMError::ParseError(format!(
                    "Invalid feature value at column {}: {}",
                    idx + 1,
                    field
                ))
            })
        })
        .collect::<Result<Vec<f64>>>()?;

    Ok((features, label))
}
