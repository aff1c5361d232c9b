//! Error types for the voice quality engine
//!
//! Errors fall into two groups:
//!
//! - **Per-tick errors** - a statistics report, record or numeric field is
//!   missing in this poll. The sampler logs them and tries again on the next
//!   tick; they never end a quality test on their own.
//! - **Setup errors** - configuration or input files that cannot be used.

use std::io;
use thiserror::Error;

/// Result type for voice quality operations
pub type Result<T> = std::result::Result<T, QualityError>;

/// Error types for voice quality operations
#[derive(Debug, Error)]
pub enum QualityError {
    /// A required statistics type, media kind or codec id is absent
    #[error("{0}")]
    NotFound(String),

    /// A required numeric field is undefined, or a computation over the
    /// available counters has no meaningful value (division by zero)
    #[error("{field} is undefined")]
    MissingField { field: &'static str },

    /// Generic lookup failure that is not classified as not-found
    #[error("{0}")]
    Other(String),

    /// The statistics source failed to produce a report
    #[error("Stats source error: {0}")]
    Source(String),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Malformed statistics JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Malformed configuration file
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl QualityError {
    pub(crate) fn missing(field: &'static str) -> Self {
        QualityError::MissingField { field }
    }

    /// Check if the error means a report or record is absent this cycle
    pub fn is_not_found(&self) -> bool {
        matches!(self, QualityError::NotFound(_))
    }

    /// Check if the error means a numeric field could not be used
    pub fn is_missing_field(&self) -> bool {
        matches!(self, QualityError::MissingField { .. })
    }

    /// Check if the error only spoils the current poll cycle
    ///
    /// Per-tick errors are logged by the sampler and the test continues.
    pub fn is_per_tick(&self) -> bool {
        match self {
            QualityError::NotFound(_)
            | QualityError::MissingField { .. }
            | QualityError::Other(_)
            | QualityError::Source(_) => true,

            QualityError::Config(_)
            | QualityError::Json(_)
            | QualityError::Toml(_)
            | QualityError::Io(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(
            QualityError::missing("jitter").to_string(),
            "jitter is undefined"
        );
        assert_eq!(
            QualityError::NotFound("No \"track\" stats".into()).to_string(),
            "No \"track\" stats"
        );
    }

    #[test]
    fn test_classification() {
        assert!(QualityError::NotFound("x".into()).is_per_tick());
        assert!(QualityError::missing("jitter").is_per_tick());
        assert!(QualityError::Source("closed".into()).is_per_tick());
        assert!(!QualityError::Config("bad".into()).is_per_tick());

        assert!(!QualityError::Other("No track with id=t1".into()).is_not_found());
        assert!(QualityError::missing("roundTripTime").is_missing_field());
    }
}
