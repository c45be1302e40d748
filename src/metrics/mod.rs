//! Evaluation metrics for classifiers.
//!
//! Includes accuracy, precision, recall, F1-score with macro, micro and
//! weighted averaging, confusion matrices (raw and row-normalized), and a
//! tabular classification report.

pub mod classification;

pub use classification::{
    accuracy, classification_report, confusion_matrix, f1_per_class, f1_score,
    normalize_confusion, precision, recall, Average,
};
