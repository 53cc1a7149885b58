//! Error types for insight generation
//!
//! Errors are classified by who has to fix them:
//! - Caller bugs: unknown domain tag, domain tag that disagrees with the context
//! - Deployment: unreadable or invalid detector configuration
//!
//! Missing data is never an error. Detectors abstain instead.

use thiserror::Error;

use crate::types::Domain;

/// Error types for insight generation
#[derive(Debug, Error)]
pub enum EngineError {
    // Caller bugs
    #[error("Unknown domain: {0}")]
    InvalidDomain(String),

    #[error("Domain mismatch: requested {expected} insights for a {actual} context")]
    DomainMismatch { expected: Domain, actual: Domain },

    // Deployment errors
    #[error("Invalid detector configuration: {0}")]
    Config(String),

    #[error("Failed to parse detector configuration: {0}")]
    ConfigParse(String),

    #[error("IO error: {0}")]
    Io(String),
}

impl EngineError {
    /// Returns true if the error indicates a bug in the calling code rather
    /// than a problem with configuration on disk.
    pub fn is_caller_bug(&self) -> bool {
        matches!(
            self,
            EngineError::InvalidDomain(_) | EngineError::DomainMismatch { .. }
        )
    }
}

impl From<std::io::Error> for EngineError {
    fn from(err: std::io::Error) -> Self {
        EngineError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for EngineError {
    fn from(err: serde_json::Error) -> Self {
        EngineError::ConfigParse(err.to_string())
    }
}
