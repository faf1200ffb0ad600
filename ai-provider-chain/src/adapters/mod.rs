//! HTTP adapters for the supported backends
//!
//! Each adapter speaks its vendor's native API with `reqwest`. Missing API
//! keys are reported per call as [`ProviderError::NotConfigured`], so a
//! half-configured chain still falls through to the next backend.

pub mod anthropic;
pub mod google;
pub mod local;
pub mod openai;

pub use anthropic::AnthropicProvider;
pub use google::GoogleProvider;
pub use local::LocalProvider;
pub use openai::OpenAiProvider;

use lazy_static::lazy_static;
use logger_redacted::PiiRedactor;
use serde::de::DeserializeOwned;

use crate::error::{ProviderError, Result};
use crate::provider::ProviderId;

const MAX_ERROR_BODY_CHARS: usize = 200;

lazy_static! {
    static ref ERROR_REDACTOR: PiiRedactor = PiiRedactor::default();
}

pub(crate) fn build_client(provider: ProviderId) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(concat!("intake-gateway/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| ProviderError::Request {
            provider: provider.to_string(),
            message: e.to_string(),
        })
}

/// Scrub and shorten vendor error text before it is logged or propagated
pub(crate) fn sanitize_error_text(text: &str) -> String {
    let redacted = ERROR_REDACTOR.redact(text.trim());
    if redacted.chars().count() > MAX_ERROR_BODY_CHARS {
        let mut short: String = redacted.chars().take(MAX_ERROR_BODY_CHARS).collect();
        short.push('…');
        short
    } else {
        redacted
    }
}

/// Send a request and decode a JSON body, mapping every failure mode
pub(crate) async fn send_json<T: DeserializeOwned>(
    provider: ProviderId,
    request: reqwest::RequestBuilder,
) -> Result<T> {
    let response = request.send().await.map_err(|e| ProviderError::Request {
        provider: provider.to_string(),
        message: sanitize_error_text(&e.to_string()),
    })?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ProviderError::Http {
            provider: provider.to_string(),
            status: status.as_u16(),
            message: sanitize_error_text(&body),
        });
    }

    response.json::<T>().await.map_err(|e| ProviderError::InvalidResponse {
        provider: provider.to_string(),
        message: e.to_string(),
    })
}

pub(crate) fn empty_response(provider: ProviderId) -> ProviderError {
    ProviderError::InvalidResponse {
        provider: provider.to_string(),
        message: "response contained no text".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_text_is_redacted_and_truncated() {
        let text = sanitize_error_text("quota exceeded for arzt@praxis.ch");
        assert!(!text.contains("arzt@praxis.ch"));

        let long = "x".repeat(500);
        assert_eq!(sanitize_error_text(&long).chars().count(), MAX_ERROR_BODY_CHARS + 1);
    }
}
