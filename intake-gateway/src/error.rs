use ai_provider_chain::ProviderError;
use anonymization_engine::AnonymizationError;
use error_common::IntakeError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Transcription error: {0}")]
    Transcription(String),

    #[error("Runtime error: {0}")]
    Runtime(String),

    #[error("Anonymization error: {0}")]
    Anonymization(#[from] AnonymizationError),

    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type GatewayResult<T> = Result<T, GatewayError>;

impl From<GatewayError> for IntakeError {
    fn from(error: GatewayError) -> Self {
        match error {
            GatewayError::Config(message) => IntakeError::ConfigError(message),
            GatewayError::Transcription(message) => IntakeError::ExternalError(message),
            GatewayError::Runtime(message) => IntakeError::InternalError(message),
            GatewayError::Anonymization(e) => e.into(),
            GatewayError::Provider(e) => e.into(),
            GatewayError::Network(e) => IntakeError::ExternalError(e.to_string()),
            GatewayError::Serialization(e) => IntakeError::InternalError(e.to_string()),
        }
    }
}
