use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::analysis::{AnalysisOptions, AnalysisType};
use crate::error::{ProviderError, Result};

/// Identifier of a registered backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    OpenAi,
    Anthropic,
    Google,
    /// Self-hosted Ollama, the only backend that keeps data on premises
    Local,
}

impl ProviderId {
    pub const ALL: [ProviderId; 4] = [Self::OpenAi, Self::Anthropic, Self::Google, Self::Local];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Anthropic => "anthropic",
            Self::Google => "google",
            Self::Local => "local",
        }
    }

    pub fn is_cloud(&self) -> bool {
        !matches!(self, Self::Local)
    }

    /// Parse a comma separated list such as `anthropic,google,local`
    pub fn parse_list(list: &str) -> Result<Vec<ProviderId>> {
        list.split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(str::parse)
            .collect()
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderId {
    type Err = ProviderError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|id| id.as_str() == normalized)
            .ok_or_else(|| ProviderError::UnknownProvider(s.to_string()))
    }
}

/// Result of a successful analysis, disclaimer included
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderResult {
    pub text: String,
    pub has_disclaimer: bool,
    pub disclaimer_text: String,
    pub provider: ProviderId,
    pub is_cloud: bool,
    /// Latency of the successful call
    pub latency_ms: f64,
    /// Providers that failed before this one answered, in chain order
    pub failed_providers: Vec<ProviderId>,
}

/// Capability every AI backend exposes
#[async_trait]
pub trait AnalysisProvider: Send + Sync {
    fn id(&self) -> ProviderId;

    fn is_cloud(&self) -> bool {
        self.id().is_cloud()
    }

    /// Raw model output, without disclaimer
    async fn analyze(&self, text: &str, analysis_type: AnalysisType, options: &AnalysisOptions) -> Result<String>;

    /// Live probe. The default sends a minimal query.
    async fn is_available(&self) -> bool {
        match self
            .analyze("Test", AnalysisType::GeneralQuery, &AnalysisOptions::probe())
            .await
        {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!(provider = %self.id(), error = %e, "Provider availability check failed");
                false
            }
        }
    }

    fn disclaimer(&self, analysis_type: AnalysisType) -> &'static str {
        analysis_type.disclaimer()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_local_is_on_premises() {
        assert!(ProviderId::OpenAi.is_cloud());
        assert!(ProviderId::Google.is_cloud());
        assert!(!ProviderId::Local.is_cloud());
    }

    #[test]
    fn test_parse_list_keeps_declared_order() {
        let ids = ProviderId::parse_list(" anthropic, google ,local,").unwrap();
        assert_eq!(ids, vec![ProviderId::Anthropic, ProviderId::Google, ProviderId::Local]);

        let err = ProviderId::parse_list("openai,mistral").unwrap_err();
        assert_eq!(err, ProviderError::UnknownProvider("mistral".to_string()));
    }
}
