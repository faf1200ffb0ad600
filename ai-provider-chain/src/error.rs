use error_common::IntakeError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProviderError {
    #[error("Provider {0} is not configured")]
    NotConfigured(String),

    #[error("Unknown provider: {0}")]
    UnknownProvider(String),

    #[error("Request to {provider} failed: {message}")]
    Request { provider: String, message: String },

    #[error("{provider} returned HTTP {status}: {message}")]
    Http {
        provider: String,
        status: u16,
        message: String,
    },

    #[error("Invalid response from {provider}: {message}")]
    InvalidResponse { provider: String, message: String },

    #[error("{provider} did not answer within {seconds} seconds")]
    Timeout { provider: String, seconds: u64 },

    #[error("Invalid provider chain: {0}")]
    InvalidChain(String),

    #[error("All providers failed (attempted: {}); original error: {original}", attempted.join(", "))]
    Exhausted {
        attempted: Vec<String>,
        original: String,
    },
}

pub type Result<T> = std::result::Result<T, ProviderError>;

impl From<ProviderError> for IntakeError {
    fn from(error: ProviderError) -> Self {
        match error {
            ProviderError::Exhausted { attempted, original } => {
                IntakeError::ProvidersExhausted { attempted, original }
            }
            ProviderError::NotConfigured(_)
            | ProviderError::UnknownProvider(_)
            | ProviderError::InvalidChain(_) => IntakeError::ConfigError(error.to_string()),
            other => IntakeError::ExternalError(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exhausted_maps_to_boundary_error() {
        let error = ProviderError::Exhausted {
            attempted: vec!["openai".to_string(), "local".to_string()],
            original: "HTTP 503".to_string(),
        };
        assert_eq!(
            IntakeError::from(error),
            IntakeError::ProvidersExhausted {
                attempted: vec!["openai".to_string(), "local".to_string()],
                original: "HTTP 503".to_string(),
            }
        );
    }

    #[test]
    fn test_configuration_errors_stay_configuration_errors() {
        let error = IntakeError::from(ProviderError::UnknownProvider("mistral".to_string()));
        assert!(matches!(error, IntakeError::ConfigError(_)));
    }
}
