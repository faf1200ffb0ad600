use std::collections::BTreeMap;
use std::sync::Arc;

use crate::adapters::{AnthropicProvider, GoogleProvider, LocalProvider, OpenAiProvider};
use crate::config::{ProviderChainConfig, ProviderSettings};
use crate::error::{ProviderError, Result};
use crate::provider::{AnalysisProvider, ProviderId};

/// Builds one provider from its settings
pub type ProviderFactory = fn(&ProviderSettings) -> Result<Arc<dyn AnalysisProvider>>;

/// Lookup table from provider identifier to constructor, resolved once at
/// startup.
#[derive(Clone)]
pub struct ProviderRegistry {
    factories: BTreeMap<ProviderId, ProviderFactory>,
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ProviderRegistry {
    pub fn empty() -> Self {
        Self {
            factories: BTreeMap::new(),
        }
    }

    /// Registry holding the four HTTP adapters
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        registry.register(ProviderId::OpenAi, |settings| Ok(Arc::new(OpenAiProvider::new(settings)?)));
        registry.register(ProviderId::Anthropic, |settings| {
            Ok(Arc::new(AnthropicProvider::new(settings)?))
        });
        registry.register(ProviderId::Google, |settings| Ok(Arc::new(GoogleProvider::new(settings)?)));
        registry.register(ProviderId::Local, |settings| Ok(Arc::new(LocalProvider::new(settings)?)));
        registry
    }

    /// Register or replace the factory for `id`
    pub fn register(&mut self, id: ProviderId, factory: ProviderFactory) {
        self.factories.insert(id, factory);
    }

    pub fn contains(&self, id: ProviderId) -> bool {
        self.factories.contains_key(&id)
    }

    pub fn registered(&self) -> Vec<ProviderId> {
        self.factories.keys().copied().collect()
    }

    pub fn create(&self, id: ProviderId, settings: &ProviderSettings) -> Result<Arc<dyn AnalysisProvider>> {
        let factory = self
            .factories
            .get(&id)
            .ok_or_else(|| ProviderError::UnknownProvider(id.to_string()))?;
        factory(settings)
    }

    /// Instantiate the configured chain in order
    pub fn create_chain(&self, config: &ProviderChainConfig) -> Result<Vec<Arc<dyn AnalysisProvider>>> {
        config
            .chain()
            .into_iter()
            .map(|id| self.create(id, config.settings(id)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_registry_covers_every_provider() {
        let registry = ProviderRegistry::builtin();
        assert_eq!(registry.registered(), ProviderId::ALL.to_vec());

        let config = ProviderChainConfig::default();
        let providers = registry.create_chain(&config).unwrap();
        let ids: Vec<ProviderId> = providers.iter().map(|p| p.id()).collect();
        assert_eq!(ids, config.chain());
        assert!(!providers[3].is_cloud());
    }

    #[test]
    fn test_unregistered_provider_is_rejected() {
        let registry = ProviderRegistry::empty();
        let err = registry
            .create(ProviderId::Local, &ProviderSettings::defaults_for(ProviderId::Local))
            .err()
            .unwrap();
        assert_eq!(err, ProviderError::UnknownProvider("local".to_string()));
    }

    #[test]
    fn test_cloud_adapter_without_key_fails_per_call() {
        let registry = ProviderRegistry::builtin();
        let provider = registry
            .create(ProviderId::Anthropic, &ProviderSettings::defaults_for(ProviderId::Anthropic))
            .unwrap();

        let err = tokio_test::block_on(provider.analyze(
            "Husten",
            crate::AnalysisType::ExtractSymptoms,
            &crate::AnalysisOptions::default(),
        ))
        .unwrap_err();
        assert_eq!(err, ProviderError::NotConfigured("anthropic".to_string()));
    }
}
