//! Error types for espectro operations.
//!
//! One crate-wide enum; every stage fails fast and propagates upward.

use std::fmt;

/// Main error type for espectro operations.
///
/// # Examples
///
/// ```
/// use espectro::error::EspectroError;
///
/// let err = EspectroError::DimensionMismatch {
///     expected: "9144x220".to_string(),
///     actual: "9144x219".to_string(),
/// };
/// assert!(err.to_string().contains("dimension mismatch"));
/// ```
#[derive(Debug)]
pub enum EspectroError {
    /// Matrix/vector dimensions don't match for the operation.
    DimensionMismatch {
        /// Expected dimensions description
        expected: String,
        /// Actual dimensions found
        actual: String,
    },

    /// Input file is malformed (wrong column count, non-numeric band, missing header).
    DataFormat {
        /// What was wrong, with row/column context where available
        message: String,
    },

    /// A class has too few samples for the requested fold count or neighbor count.
    InsufficientClassSamples {
        /// Class name or encoded index
        class: String,
        /// Samples available
        available: usize,
        /// Samples required
        required: usize,
    },

    /// Invalid hyperparameter value provided.
    InvalidHyperparameter {
        /// Parameter name
        param: String,
        /// Provided value
        value: String,
        /// Constraint description
        constraint: String,
    },

    /// I/O error (file not found, permission denied, etc.).
    Io(std::io::Error),

    /// Generic error with string message.
    Other(String),
}

impl fmt::Display for EspectroError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EspectroError::DimensionMismatch { expected, actual } => {
                write!(f, "dimension mismatch: expected {expected}, got {actual}")
            }
            EspectroError::DataFormat { message } => {
                write!(f, "malformed input data: {message}")
            }
            EspectroError::InsufficientClassSamples {
                class,
                available,
                required,
            } => {
                write!(
                    f,
                    "class {class} has {available} samples, needs at least {required}"
                )
            }
            EspectroError::InvalidHyperparameter {
                param,
                value,
                constraint,
            } => {
                write!(
                    f,
                    "invalid hyperparameter: {param} = {value}, expected {constraint}"
                )
            }
            EspectroError::Io(e) => write!(f, "I/O error: {e}"),
            EspectroError::Other(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for EspectroError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EspectroError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for EspectroError {
    fn from(err: std::io::Error) -> Self {
        EspectroError::Io(err)
    }
}

impl From<&str> for EspectroError {
    fn from(msg: &str) -> Self {
        EspectroError::Other(msg.to_string())
    }
}

impl From<String> for EspectroError {
    fn from(msg: String) -> Self {
        EspectroError::Other(msg)
    }
}

impl From<csv::Error> for EspectroError {
    fn from(err: csv::Error) -> Self {
        let message = err.to_string();
        match err.into_kind() {
            csv::ErrorKind::Io(io_err) => EspectroError::Io(io_err),
            _ => EspectroError::DataFormat { message },
        }
    }
}

/// Convenience type alias for Results.
pub type Result<T> = std::result::Result<T, EspectroError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimension_mismatch_display() {
        let err = EspectroError::DimensionMismatch {
            expected: "100x220".to_string(),
            actual: "100x219".to_string(),
        };
        assert!(err.to_string().contains("dimension mismatch"));
        assert!(err.to_string().contains("100x220"));
    }

    #[test]
    fn test_data_format_display() {
        let err = EspectroError::DataFormat {
            message: "row 7 has 220 fields, expected 221".to_string(),
        };
        assert!(err.to_string().contains("malformed input data"));
        assert!(err.to_string().contains("row 7"));
    }

    #[test]
    fn test_insufficient_class_samples_display() {
        let err = EspectroError::InsufficientClassSamples {
            class: "oats".to_string(),
            available: 3,
            required: 5,
        };
        let msg = err.to_string();
        assert!(msg.contains("oats"));
        assert!(msg.contains("3 samples"));
        assert!(msg.contains("at least 5"));
    }

    #[test]
    fn test_invalid_hyperparameter_display() {
        let err = EspectroError::InvalidHyperparameter {
            param: "truncation_factor".to_string(),
            value: "1.5".to_string(),
            constraint: "[-1, 1]".to_string(),
        };
        assert!(err.to_string().contains("truncation_factor"));
        assert!(err.to_string().contains("1.5"));
    }

    #[test]
    fn test_from_str() {
        let err: EspectroError = "test error".into();
        assert!(matches!(err, EspectroError::Other(_)));
        assert_eq!(err.to_string(), "test error");
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err: EspectroError = io_err.into();
        assert!(matches!(err, EspectroError::Io(_)));
        assert!(err.to_string().contains("I/O error"));
    }

    #[test]
    fn test_error_source_io() {
        use std::error::Error;
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err = EspectroError::Io(io_err);
        assert!(err.source().is_some());
    }

    #[test]
    fn test_error_source_other() {
        use std::error::Error;
        let err = EspectroError::Other("test".to_string());
        assert!(err.source().is_none());
    }
}
