use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::{Duration, Instant};
use telemetry::MetricsCollector;
use tracing::{error, info, warn};

use crate::analysis::{AnalysisOptions, AnalysisType};
use crate::config::ProviderChainConfig;
use crate::error::{ProviderError, Result};
use crate::provider::{AnalysisProvider, ProviderId, ProviderResult};
use crate::registry::ProviderRegistry;

/// Ordered default-then-fallback dispatcher.
///
/// Providers are tried strictly in chain order, once each. Every attempt
/// is recorded in the metrics collector, and the winning result always
/// carries the disclaimer for its analysis type.
pub struct ProviderChain {
    providers: Vec<Arc<dyn AnalysisProvider>>,
    timeout: Duration,
    metrics: Option<Arc<MetricsCollector>>,
}

impl ProviderChain {
    pub fn new(providers: Vec<Arc<dyn AnalysisProvider>>, timeout: Duration) -> Result<Self> {
        if providers.is_empty() {
            return Err(ProviderError::InvalidChain("Provider chain is empty".to_string()));
        }
        let mut seen = BTreeSet::new();
        for provider in &providers {
            if !seen.insert(provider.id()) {
                return Err(ProviderError::InvalidChain(format!(
                    "Provider {} appears more than once in the chain",
                    provider.id()
                )));
            }
        }

        Ok(Self {
            providers,
            timeout,
            metrics: None,
        })
    }

    pub fn from_config(config: &ProviderChainConfig, registry: &ProviderRegistry) -> Result<Self> {
        config.validate()?;
        let chain = Self::new(registry.create_chain(config)?, Duration::from_secs(config.timeout_secs))?;

        info!(
            chain = ?chain.chain(),
            timeout_secs = config.timeout_secs,
            "Provider chain initialized"
        );
        Ok(chain)
    }

    pub fn with_metrics(mut self, metrics: Arc<MetricsCollector>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Identifiers in dispatch order, default first
    pub fn chain(&self) -> Vec<ProviderId> {
        self.providers.iter().map(|p| p.id()).collect()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub async fn analyze(
        &self,
        text: &str,
        analysis_type: AnalysisType,
        options: &AnalysisOptions,
    ) -> Result<ProviderResult> {
        let mut attempted: Vec<String> = Vec::with_capacity(self.providers.len());
        let mut failed: Vec<ProviderId> = Vec::new();
        let mut original: Option<String> = None;

        for provider in &self.providers {
            let id = provider.id();
            attempted.push(id.to_string());

            let started = Instant::now();
            let outcome = match tokio::time::timeout(self.timeout, provider.analyze(text, analysis_type, options)).await {
                Ok(outcome) => outcome,
                Err(_) => Err(ProviderError::Timeout {
                    provider: id.to_string(),
                    seconds: self.timeout.as_secs(),
                }),
            };
            let latency_ms = started.elapsed().as_secs_f64() * 1000.0;

            if let Some(metrics) = &self.metrics {
                metrics.record_provider_request(id.as_str(), outcome.is_ok(), latency_ms, provider.is_cloud());
            }

            match outcome {
                Ok(raw) => {
                    if !failed.is_empty() {
                        info!(
                            provider = %id,
                            failed = ?failed,
                            "Fallback provider succeeded"
                        );
                    }
                    let disclaimer = provider.disclaimer(analysis_type);
                    return Ok(ProviderResult {
                        text: attach_disclaimer(&raw, disclaimer),
                        has_disclaimer: true,
                        disclaimer_text: disclaimer.to_string(),
                        provider: id,
                        is_cloud: provider.is_cloud(),
                        latency_ms,
                        failed_providers: failed,
                    });
                }
                Err(e) => {
                    warn!(
                        provider = %id,
                        analysis_type = %analysis_type,
                        latency_ms,
                        error = %e,
                        "Provider failed, trying next in chain"
                    );
                    original.get_or_insert_with(|| e.to_string());
                    failed.push(id);
                }
            }
        }

        let error = ProviderError::Exhausted {
            attempted,
            original: original.unwrap_or_default(),
        };
        error!(error = %error, "Provider chain exhausted");
        Err(error)
    }

    /// Probe every provider in the chain, keeping chain order
    pub async fn available_providers(&self) -> Vec<ProviderId> {
        let mut available = Vec::new();
        for provider in &self.providers {
            match tokio::time::timeout(self.timeout, provider.is_available()).await {
                Ok(true) => available.push(provider.id()),
                Ok(false) => {}
                Err(_) => warn!(provider = %provider.id(), "Availability probe timed out"),
            }
        }
        available
    }
}

/// Move `disclaimer` to the end of the text, keeping a single copy
/// wherever the model already placed it
fn attach_disclaimer(text: &str, disclaimer: &str) -> String {
    let body = text.replace(disclaimer, "");
    format!("{}\n\n{}", body.trim(), disclaimer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct Fixed {
        id: ProviderId,
        reply: std::result::Result<&'static str, &'static str>,
    }

    #[async_trait]
    impl AnalysisProvider for Fixed {
        fn id(&self) -> ProviderId {
            self.id
        }

        async fn analyze(&self, _text: &str, _analysis_type: AnalysisType, _options: &AnalysisOptions) -> Result<String> {
            self.reply.map(str::to_string).map_err(|message| ProviderError::Request {
                provider: self.id.to_string(),
                message: message.to_string(),
            })
        }
    }

    fn fixed(id: ProviderId, reply: std::result::Result<&'static str, &'static str>) -> Arc<dyn AnalysisProvider> {
        Arc::new(Fixed { id, reply })
    }

    #[test]
    fn test_disclaimer_is_attached_once() {
        let disclaimer = AnalysisType::Summarize.disclaimer();
        let once = attach_disclaimer("Befund unauffällig.", disclaimer);
        assert_eq!(once.matches(disclaimer).count(), 1);
        assert_eq!(attach_disclaimer(&once, disclaimer), once);
    }

    #[test]
    fn test_disclaimer_echoed_by_the_model_is_not_duplicated() {
        let disclaimer = AnalysisType::SuggestDiagnosis.disclaimer();
        let reply = format!("{}\n\nVerdacht auf Bronchitis.", disclaimer);

        let text = attach_disclaimer(&reply, disclaimer);
        assert_eq!(text.matches(disclaimer).count(), 1);
        assert_eq!(text, format!("Verdacht auf Bronchitis.\n\n{}", disclaimer));
    }

    #[test]
    fn test_empty_or_duplicate_chain_is_rejected() {
        assert!(ProviderChain::new(Vec::new(), Duration::from_secs(1)).is_err());

        let providers = vec![fixed(ProviderId::Local, Ok("a")), fixed(ProviderId::Local, Ok("b"))];
        assert!(matches!(
            ProviderChain::new(providers, Duration::from_secs(1)),
            Err(ProviderError::InvalidChain(_))
        ));
    }

    #[tokio::test]
    async fn test_default_provider_wins_when_healthy() {
        let chain = ProviderChain::new(
            vec![fixed(ProviderId::OpenAi, Ok("Zusammenfassung")), fixed(ProviderId::Local, Ok("lokal"))],
            Duration::from_secs(1),
        )
        .unwrap();

        let result = chain
            .analyze("Text", AnalysisType::Summarize, &AnalysisOptions::default())
            .await
            .unwrap();
        assert_eq!(result.provider, ProviderId::OpenAi);
        assert!(result.is_cloud);
        assert!(result.failed_providers.is_empty());
        assert!(result.text.starts_with("Zusammenfassung\n\n"));
    }

    #[tokio::test]
    async fn test_original_error_is_the_first_failure() {
        let chain = ProviderChain::new(
            vec![fixed(ProviderId::OpenAi, Err("rate limited")), fixed(ProviderId::Google, Err("bad gateway"))],
            Duration::from_secs(1),
        )
        .unwrap();

        let err = chain
            .analyze("Text", AnalysisType::GeneralQuery, &AnalysisOptions::default())
            .await
            .unwrap_err();
        match err {
            ProviderError::Exhausted { attempted, original } => {
                assert_eq!(attempted, vec!["openai", "google"]);
                assert!(original.contains("rate limited"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
