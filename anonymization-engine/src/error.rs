use error_common::IntakeError;
use thiserror::Error;

/// Failure reported by a detection engine
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DetectionError {
    #[error("Detection engine unavailable: {0}")]
    Unavailable(String),

    #[error("Detection engine timed out after {0} seconds")]
    Timeout(u64),

    #[error("Invalid detection response: {0}")]
    InvalidResponse(String),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnonymizationError {
    #[error("Anonymization is mandatory and cannot be disabled")]
    Disabled,

    #[error(transparent)]
    Detection(#[from] DetectionError),

    #[error("Detected span [{start}, {end}) is invalid for text of {length} characters")]
    InvalidSpan { start: usize, end: usize, length: usize },

    #[error("Invalid anonymization configuration: {0}")]
    InvalidConfig(String),
}

pub type AnonymizationResult<T> = Result<T, AnonymizationError>;

impl From<AnonymizationError> for IntakeError {
    fn from(error: AnonymizationError) -> Self {
        match error {
            AnonymizationError::Disabled => IntakeError::AnonymizationDisabled,
            AnonymizationError::Detection(e) => IntakeError::DetectionFailed(e.to_string()),
            AnonymizationError::InvalidSpan { .. } => IntakeError::DetectionFailed(error.to_string()),
            AnonymizationError::InvalidConfig(message) => IntakeError::ConfigError(message),
        }
    }
}
