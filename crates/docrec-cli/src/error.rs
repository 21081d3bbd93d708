//! Error types for docrec-cli

use docrec::DocrecError;
use std::process::ExitCode;
use thiserror::Error;

/// Result type alias for CLI operations
pub(crate) type Result<T> = std::result::Result<T, CliError>;

/// CLI error types
#[derive(Error, Debug)]
pub(crate) enum CliError {
    /// Config file unreadable or invalid
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Dataset missing or malformed
    #[error("Dataset error: {0}")]
    Data(String),

    /// A classifier failed to train
    #[error("Training failed: {0}")]
    Training(String),

    /// Bad symptom or threshold in the query
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON output failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Any other library error
    #[error("{0}")]
    Docrec(String),
}

impl CliError {
    /// Get exit code for this error
    pub(crate) fn exit_code(&self) -> ExitCode {
        match self {
            Self::Docrec(_) => ExitCode::from(1),
            Self::Data(_) => ExitCode::from(3),
            Self::Training(_) => ExitCode::from(4),
            Self::InvalidQuery(_) => ExitCode::from(5),
            Self::Config(_) => ExitCode::from(6),
            Self::Io(_) => ExitCode::from(7),
            Self::Json(_) => ExitCode::from(8),
        }
    }
}

impl From<DocrecError> for CliError {
    fn from(e: DocrecError) -> Self {
        let msg = e.to_string();
        match e {
            DocrecError::DataFormat { .. } | DocrecError::Csv(_) => Self::Data(msg),
            DocrecError::ModelFit { .. } => Self::Training(msg),
            DocrecError::UnknownSymptom { .. }
            | DocrecError::InvalidThreshold { .. }
            | DocrecError::EmptySelection => Self::InvalidQuery(msg),
            DocrecError::Io(io) => Self::Io(io),
            _ => Self::Docrec(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_errors_map_to_classes() {
        let err = CliError::from(DocrecError::UnknownSymptom {
            symptom: "glowing".to_string(),
        });
        assert!(matches!(err, CliError::InvalidQuery(_)));
        assert!(err.to_string().contains("glowing"));

        let err = CliError::from(DocrecError::data_format("x.csv", "no data rows"));
        assert!(matches!(err, CliError::Data(_)));

        let err = CliError::from(DocrecError::model_fit("SVM", "bad".into()));
        assert!(matches!(err, CliError::Training(_)));

        let err = CliError::from(DocrecError::InvalidThreshold { value: 150 });
        assert!(matches!(err, CliError::InvalidQuery(_)));
    }

    #[test]
    fn test_exit_codes_are_distinct() {
        let errors = [
            CliError::Docrec(String::new()),
            CliError::Data(String::new()),
            CliError::Training(String::new()),
            CliError::InvalidQuery(String::new()),
            CliError::Config(String::new()),
            CliError::Io(std::io::Error::other("x")),
        ];
        let codes: Vec<String> = errors
            .iter()
            .map(|e| format!("{:?}", e.exit_code()))
            .collect();
        for (i, a) in codes.iter().enumerate() {
            for b in &codes[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
