//! Error types for docrec operations.
//!
//! Startup failures (unreadable datasets, classifiers that refuse to fit)
//! and query-time failures (unknown symptoms, bad thresholds) share one enum
//! so callers can propagate everything with `?`.

use std::fmt;
use std::path::PathBuf;

/// Main error type for docrec operations.
///
/// # Examples
///
/// ```
/// use docrec::error::DocrecError;
///
/// let err = DocrecError::UnknownSymptom {
///     symptom: "glowing".to_string(),
/// };
/// assert!(err.to_string().contains("glowing"));
/// ```
#[derive(Debug)]
pub enum DocrecError {
    /// Matrix/label dimensions don't match for the operation.
    DimensionMismatch {
        /// Expected dimensions description
        expected: String,
        /// Actual dimensions found
        actual: String,
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

    /// CSV reader/writer error.
    Csv(csv::Error),

    /// A dataset file exists but its content is unusable.
    DataFormat {
        /// File the problem was found in
        path: PathBuf,
        /// Error description
        message: String,
    },

    /// A classifier refused to fit the training data.
    ModelFit {
        /// Display name of the classifier
        model: String,
        /// Underlying failure
        source: Box<DocrecError>,
    },

    /// Prediction was requested before `fit`.
    NotFitted {
        /// Display name of the classifier
        model: String,
    },

    /// A prediction query selected no symptoms.
    EmptySelection,

    /// A prediction query named a symptom outside the trained universe.
    UnknownSymptom {
        /// The offending symptom
        symptom: String,
    },

    /// Confidence threshold outside 0..=100.
    InvalidThreshold {
        /// Provided threshold
        value: u32,
    },

    /// Serialization/deserialization error.
    Serialization(String),

    /// Generic error with string message.
    Other(String),
}

impl fmt::Display for DocrecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocrecError::DimensionMismatch { expected, actual } => {
                write!(f, "Dimension mismatch: expected {expected}, got {actual}")
            }
            DocrecError::InvalidHyperparameter {
                param,
                value,
                constraint,
            } => {
                write!(
                    f,
                    "Invalid hyperparameter: {param} = {value}, expected {constraint}"
                )
            }
            DocrecError::Io(e) => write!(f, "I/O error: {e}"),
            DocrecError::Csv(e) => write!(f, "CSV error: {e}"),
            DocrecError::DataFormat { path, message } => {
                write!(f, "Malformed dataset {}: {message}", path.display())
            }
            DocrecError::ModelFit { model, source } => {
                write!(f, "{model} failed to fit: {source}")
            }
            DocrecError::NotFitted { model } => write!(f, "{model} is not fitted"),
            DocrecError::EmptySelection => write!(f, "No symptoms selected"),
            DocrecError::UnknownSymptom { symptom } => {
                write!(f, "Unknown symptom: '{symptom}'")
            }
            DocrecError::InvalidThreshold { value } => {
                write!(f, "Invalid threshold: {value}, expected 0..=100")
            }
            DocrecError::Serialization(msg) => write!(f, "Serialization error: {msg}"),
            DocrecError::Other(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for DocrecError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DocrecError::Io(e) => Some(e),
            DocrecError::Csv(e) => Some(e),
            DocrecError::ModelFit { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

impl From<std::io::Error> for DocrecError {
    fn from(err: std::io::Error) -> Self {
        DocrecError::Io(err)
    }
}

impl From<csv::Error> for DocrecError {
    fn from(err: csv::Error) -> Self {
        DocrecError::Csv(err)
    }
}

impl From<serde_json::Error> for DocrecError {
    fn from(err: serde_json::Error) -> Self {
        DocrecError::Serialization(err.to_string())
    }
}

impl From<&str> for DocrecError {
    fn from(msg: &str) -> Self {
        DocrecError::Other(msg.to_string())
    }
}

impl From<String> for DocrecError {
    fn from(msg: String) -> Self {
        DocrecError::Other(msg)
    }
}

impl DocrecError {
    /// Create a dimension mismatch error with descriptive context
    #[must_use]
    pub fn dimension_mismatch(context: &str, expected: usize, actual: usize) -> Self {
        Self::DimensionMismatch {
            expected: format!("{context}={expected}"),
            actual: format!("{actual}"),
        }
    }

    /// Create a malformed-dataset error for `path`
    #[must_use]
    pub fn data_format(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::DataFormat {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Wrap a fit failure with the name of the classifier that raised it
    #[must_use]
    pub fn model_fit(model: &str, source: DocrecError) -> Self {
        Self::ModelFit {
            model: model.to_string(),
            source: Box::new(source),
        }
    }
}

#[allow(clippy::cmp_owned)]
impl PartialEq<&str> for DocrecError {
    fn eq(&self, other: &&str) -> bool {
        self.to_string() == *other
    }
}

/// Convenience type alias for Results.
pub type Result<T> = std::result::Result<T, DocrecError>;
