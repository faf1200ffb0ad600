use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::error::{ProviderError, Result};
use crate::provider::ProviderId;

pub const DEFAULT_PROVIDER_TIMEOUT_SECS: u64 = 30;

/// Connection settings of one backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderSettings {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
}

impl ProviderSettings {
    pub fn defaults_for(id: ProviderId) -> Self {
        let (base_url, model) = match id {
            ProviderId::OpenAi => ("https://api.openai.com", "gpt-4o"),
            ProviderId::Anthropic => ("https://api.anthropic.com", "claude-3-5-sonnet-20241022"),
            ProviderId::Google => ("https://generativelanguage.googleapis.com", "gemini-1.5-pro"),
            ProviderId::Local => ("http://localhost:11434", "llama3.1"),
        };
        Self {
            api_key: None,
            base_url: base_url.to_string(),
            model: model.to_string(),
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// API key, or `NotConfigured` when it is missing or blank
    pub fn require_api_key(&self, id: ProviderId) -> Result<&str> {
        self.api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| ProviderError::NotConfigured(id.to_string()))
    }

    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

/// Chain ordering and per-backend settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderChainConfig {
    pub default_provider: ProviderId,
    pub fallback_providers: Vec<ProviderId>,
    pub timeout_secs: u64,
    pub openai: ProviderSettings,
    pub anthropic: ProviderSettings,
    pub google: ProviderSettings,
    pub local: ProviderSettings,
}

impl Default for ProviderChainConfig {
    fn default() -> Self {
        Self {
            default_provider: ProviderId::OpenAi,
            fallback_providers: vec![ProviderId::Anthropic, ProviderId::Google, ProviderId::Local],
            timeout_secs: DEFAULT_PROVIDER_TIMEOUT_SECS,
            openai: ProviderSettings::defaults_for(ProviderId::OpenAi),
            anthropic: ProviderSettings::defaults_for(ProviderId::Anthropic),
            google: ProviderSettings::defaults_for(ProviderId::Google),
            local: ProviderSettings::defaults_for(ProviderId::Local),
        }
    }
}

impl ProviderChainConfig {
    /// Default provider first, then the fallbacks in declared order
    pub fn chain(&self) -> Vec<ProviderId> {
        std::iter::once(self.default_provider)
            .chain(self.fallback_providers.iter().copied())
            .collect()
    }

    pub fn settings(&self, id: ProviderId) -> &ProviderSettings {
        match id {
            ProviderId::OpenAi => &self.openai,
            ProviderId::Anthropic => &self.anthropic,
            ProviderId::Google => &self.google,
            ProviderId::Local => &self.local,
        }
    }

    pub fn settings_mut(&mut self, id: ProviderId) -> &mut ProviderSettings {
        match id {
            ProviderId::OpenAi => &mut self.openai,
            ProviderId::Anthropic => &mut self.anthropic,
            ProviderId::Google => &mut self.google,
            ProviderId::Local => &mut self.local,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.timeout_secs == 0 {
            return Err(ProviderError::InvalidChain(
                "Provider timeout must be greater than zero".to_string(),
            ));
        }

        let mut seen = BTreeSet::new();
        for id in self.chain() {
            if !seen.insert(id) {
                return Err(ProviderError::InvalidChain(format!(
                    "Provider {} appears more than once in the chain",
                    id
                )));
            }
        }
        Ok(())
    }
}
