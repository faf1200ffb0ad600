use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::codes;

/// Error returned across the gateway boundary
#[derive(Error, Debug, Clone, PartialEq)]
pub enum IntakeError {
    /// The anonymization invariant was found violated
    #[error("Anonymization is mandatory and cannot be disabled")]
    AnonymizationDisabled,

    /// The detection engine failed, the text cannot be returned safely
    #[error("Entity detection failed: {0}")]
    DetectionFailed(String),

    /// Every provider in the chain failed
    #[error("All providers failed (attempted: {}); original error: {original}", attempted.join(", "))]
    ProvidersExhausted {
        attempted: Vec<String>,
        original: String,
    },

    /// A collaborator outside the core failed (speech-to-text, ...)
    #[error("External service error: {0}")]
    ExternalError(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Internal system errors
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Coarse classification used for logging and caller-facing responses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Fatal,
    Provider,
    External,
    Configuration,
    Validation,
}

impl IntakeError {
    /// Stable code from [`crate::codes`]
    pub fn code(&self) -> &'static str {
        match self {
            Self::AnonymizationDisabled => codes::anonymization::DISABLED,
            Self::DetectionFailed(_) => codes::anonymization::DETECTION_FAILED,
            Self::ProvidersExhausted { .. } => codes::provider::CHAIN_EXHAUSTED,
            Self::ExternalError(_) => codes::provider::EXTERNAL_FAILURE,
            Self::ConfigError(_) => codes::configuration::INVALID_CONFIG,
            Self::ValidationError(_) => codes::validation::INVALID_INPUT,
            Self::InternalError(_) => codes::system::INTERNAL,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::AnonymizationDisabled | Self::DetectionFailed(_) | Self::InternalError(_) => {
                ErrorKind::Fatal
            }
            Self::ProvidersExhausted { .. } => ErrorKind::Provider,
            Self::ExternalError(_) => ErrorKind::External,
            Self::ConfigError(_) => ErrorKind::Configuration,
            Self::ValidationError(_) => ErrorKind::Validation,
        }
    }

    pub fn is_fatal(&self) -> bool {
        self.kind() == ErrorKind::Fatal
    }

    /// Message safe to hand to a caller.
    ///
    /// Fatal errors collapse to a generic message so that internal details
    /// (engine addresses, stack context) stay inside the boundary.
    pub fn public_message(&self) -> String {
        match self.kind() {
            ErrorKind::Fatal => "Internal error while anonymizing the request".to_string(),
            _ => self.to_string(),
        }
    }
}

/// Result type alias for gateway operations
pub type Result<T> = std::result::Result<T, IntakeError>;

/// Serializable error body handed to the transport layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub kind: ErrorKind,
    pub message: String,
    pub request_id: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exhausted_error_names_every_provider() {
        let error = IntakeError::ProvidersExhausted {
            attempted: vec!["openai".to_string(), "anthropic".to_string(), "local".to_string()],
            original: "connection refused".to_string(),
        };

        let message = error.to_string();
        assert!(message.contains("openai, anthropic, local"));
        assert!(message.contains("connection refused"));
        assert_eq!(error.code(), codes::provider::CHAIN_EXHAUSTED);
        assert!(!error.is_fatal());
    }

    #[test]
    fn test_fatal_errors_hide_details() {
        let error = IntakeError::DetectionFailed("ner.internal:8443 refused".to_string());

        assert!(error.is_fatal());
        assert!(!error.public_message().contains("ner.internal"));
    }
}
