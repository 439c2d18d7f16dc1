//! Error types for loading and saving simulation data.
//!
//! The turn pipeline itself never fails: it clamps, logs and continues.
//! Errors only surface at the I/O edges (content, config, scenarios).

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading, validating or saving simulation data.
#[derive(Debug, Error)]
pub enum SimError {
    /// JSON could not be parsed or produced.
    #[error("failed to parse simulation data: {0}")]
    Parse(#[from] serde_json::Error),
    /// A file could not be read.
    #[error("failed to read {path:?}: {source}")]
    ReadFailed {
        /// File that was being read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// A file could not be written.
    #[error("failed to write {path:?}: {source}")]
    WriteFailed {
        /// File that was being written.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// A resource name did not match any known resource.
    #[error("unknown resource: {0}")]
    UnknownResource(String),
    /// A scenario is structurally broken (dangling ids, size mismatches).
    #[error("invalid scenario: {0}")]
    InvalidScenario(String),
}

/// Result alias for fallible simulation I/O.
pub type SimResult<T> = Result<T, SimError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_resource_display() {
        let err = SimError::UnknownResource("copper".to_string());
        assert_eq!(err.to_string(), "unknown resource: copper");
    }

    #[test]
    fn test_read_failed_keeps_source() {
        let err = SimError::ReadFailed {
            path: PathBuf::from("missing.json"),
            source: io::Error::new(io::ErrorKind::NotFound, "gone"),
        };
        let message = err.to_string();
        assert!(message.contains("missing.json"));
        assert!(message.contains("gone"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
