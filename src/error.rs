//! Error taxonomy for the analytics pipeline.

use thiserror::Error;

/// Errors surfaced by the generation and analysis pipeline.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Invalid or inconsistent configuration: empty catalog, inverted
    /// ranges, zero record counts. Never retried.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A loaded dataset row violates the data model.
    #[error("data integrity error at row {row}: {reason}")]
    DataIntegrity { row: usize, reason: String },

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

impl PipelineError {
    /// Shorthand for a configuration error with a formatted message.
    pub fn config(msg: impl Into<String>) -> Self {
        PipelineError::Configuration(msg.into())
    }

    /// Shorthand for a data integrity error at a given row.
    pub fn integrity(row: usize, reason: impl Into<String>) -> Self {
        PipelineError::DataIntegrity {
            row,
            reason: reason.into(),
        }
    }
}

/// Convenience result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_error_display() {
        let err = PipelineError::config("catalog is empty");
        assert_eq!(err.to_string(), "configuration error: catalog is empty");
    }

    #[test]
    fn test_data_integrity_error_display() {
        let err = PipelineError::integrity(42, "quantity must be positive");
        assert_eq!(
            err.to_string(),
            "data integrity error at row 42: quantity must be positive"
        );
    }
}
