//! Dataset loading for the Indian Pines CSV layout.
//!
//! One row per ground-reference sample: the spectral band columns first,
//! then a categorical label column named `Class`. Labels are encoded to
//! contiguous indices in lexicographic order; the original names are kept
//! for reporting and plot axes.

use std::path::Path;

use csv::ReaderBuilder;

use crate::error::{EspectroError, Result};
use crate::primitives::Matrix;

/// Name of the label column in the input file.
pub const LABEL_COLUMN: &str = "Class";

/// An immutable feature matrix with aligned encoded labels.
#[derive(Debug, Clone)]
pub struct Dataset {
    /// Feature matrix, one row per sample.
    pub features: Matrix<f32>,
    /// Encoded class label per sample, aligned with `features` rows.
    pub labels: Vec<usize>,
    /// Class names in encoding order (lexicographic).
    pub class_names: Vec<String>,
}

impl Dataset {
    /// Number of samples.
    #[must_use]
    pub fn n_samples(&self) -> usize {
        self.features.n_rows()
    }

    /// Number of spectral band features.
    #[must_use]
    pub fn n_features(&self) -> usize {
        self.features.n_cols()
    }

    /// Per-class sample counts, indexed by encoded label.
    #[must_use]
    pub fn class_counts(&self) -> Vec<usize> {
        let mut counts = vec![0usize; self.class_names.len()];
        for &label in &self.labels {
            counts[label] += 1;
        }
        counts
    }
}

/// Loads a comma-delimited dataset with a header row.
///
/// Every column before `Class` is parsed as a numeric feature; rows whose
/// width differs from the header, or with non-numeric band values, abort
/// the load.
///
/// # Errors
///
/// - [`EspectroError::Io`] when the file cannot be read.
/// - [`EspectroError::DataFormat`] on a missing `Class` header, a ragged
///   row, or a non-numeric feature field.
pub fn load_dataset<P: AsRef<Path>>(path: P) -> Result<Dataset> {
    let mut reader = ReaderBuilder::new().has_headers(true).from_path(path)?;

    let headers = reader.headers()?.clone();
    let label_col = headers
        .iter()
        .position(|h| h == LABEL_COLUMN)
        .ok_or_else(|| EspectroError::DataFormat {
            message: format!("header row has no `{LABEL_COLUMN}` column"),
        })?;
    if label_col == 0 {
        return Err(EspectroError::DataFormat {
            message: "no feature columns precede the label column".to_string(),
        });
    }
    let n_features = label_col;

    let mut feature_data: Vec<f32> = Vec::new();
    let mut raw_labels: Vec<String> = Vec::new();

    for (row_idx, record) in reader.records().enumerate() {
        let record = record?;
        if record.len() != headers.len() {
            return Err(EspectroError::DataFormat {
                message: format!(
                    "row {} has {} fields, expected {}",
                    row_idx + 1,
                    record.len(),
                    headers.len()
                ),
            });
        }
        for col in 0..n_features {
            let field = &record[col];
            let value: f32 = field.trim().parse().map_err(|_| EspectroError::DataFormat {
                message: format!(
                    "row {}, column {}: `{}` is not numeric",
                    row_idx + 1,
                    col + 1,
                    field
                ),
            })?;
            feature_data.push(value);
        }
        raw_labels.push(record[label_col].trim().to_string());
    }

    let n_samples = raw_labels.len();
    if n_samples == 0 {
        return Err(EspectroError::DataFormat {
            message: "file contains a header but no samples".to_string(),
        });
    }

    let (labels, class_names) = encode_labels(&raw_labels);
    let features = Matrix::from_vec(n_samples, n_features, feature_data)
        .map_err(|e| EspectroError::Other(e.to_string()))?;

    Ok(Dataset {
        features,
        labels,
        class_names,
    })
}

/// Maps string labels to contiguous indices in lexicographic name order.
fn encode_labels(raw: &[String]) -> (Vec<usize>, Vec<String>) {
    let mut names: Vec<String> = raw.to_vec();
    names.sort();
    names.dedup();

    let labels = raw
        .iter()
        .map(|name| {
            names
                .binary_search(name)
                .expect("every raw label is in the deduplicated name list")
        })
        .collect();

    (labels, names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_csv(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(content.as_bytes()).expect("write csv");
        file
    }

    #[test]
    fn test_load_basic() {
        let file = write_csv("b1,b2,b3,Class\n1.0,2.0,3.0,corn\n4.0,5.0,6.0,wheat\n");
        let ds = load_dataset(file.path()).expect("load should succeed");
        assert_eq!(ds.n_samples(), 2);
        assert_eq!(ds.n_features(), 3);
        assert_eq!(ds.class_names, vec!["corn", "wheat"]);
        assert_eq!(ds.labels, vec![0, 1]);
        assert_eq!(ds.features.row(1), &[4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_labels_encoded_lexicographically() {
        let file = write_csv("b1,Class\n1.0,wheat\n2.0,alfalfa\n3.0,wheat\n4.0,corn\n");
        let ds = load_dataset(file.path()).expect("load should succeed");
        assert_eq!(ds.class_names, vec!["alfalfa", "corn", "wheat"]);
        assert_eq!(ds.labels, vec![2, 0, 2, 1]);
    }

    #[test]
    fn test_class_counts() {
        let file = write_csv("b1,Class\n1.0,a\n2.0,b\n3.0,b\n");
        let ds = load_dataset(file.path()).expect("load should succeed");
        assert_eq!(ds.class_counts(), vec![1, 2]);
    }

    #[test]
    fn test_missing_label_column() {
        let file = write_csv("b1,b2,Label\n1.0,2.0,corn\n");
        let err = load_dataset(file.path()).expect_err("should fail");
        assert!(err.to_string().contains("Class"));
    }

    #[test]
    fn test_non_numeric_feature() {
        let file = write_csv("b1,b2,Class\n1.0,oops,corn\n");
        let err = load_dataset(file.path()).expect_err("should fail");
        assert!(err.to_string().contains("not numeric"));
    }

    #[test]
    fn test_empty_file_fails() {
        let file = write_csv("b1,b2,Class\n");
        let err = load_dataset(file.path()).expect_err("should fail");
        assert!(err.to_string().contains("no samples"));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load_dataset("/definitely/not/here.csv").expect_err("should fail");
        assert!(matches!(err, EspectroError::Io(_)));
    }

    #[test]
    fn test_label_column_first_fails() {
        let file = write_csv("Class,b1\ncorn,1.0\n");
        let err = load_dataset(file.path()).expect_err("should fail");
        assert!(err.to_string().contains("no feature columns"));
    }
}
