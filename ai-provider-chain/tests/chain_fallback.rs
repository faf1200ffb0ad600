use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use ai_provider_chain::{
    AnalysisOptions, AnalysisProvider, AnalysisType, ProviderChain, ProviderError, ProviderId,
};
use telemetry::MetricsCollector;

/// Provider with a scripted outcome that counts its calls
struct Scripted {
    id: ProviderId,
    reply: Option<&'static str>,
    delay: Duration,
    calls: AtomicUsize,
}

impl Scripted {
    fn ok(id: ProviderId, reply: &'static str) -> Arc<Self> {
        Arc::new(Self { id, reply: Some(reply), delay: Duration::ZERO, calls: AtomicUsize::new(0) })
    }

    fn failing(id: ProviderId) -> Arc<Self> {
        Arc::new(Self { id, reply: None, delay: Duration::ZERO, calls: AtomicUsize::new(0) })
    }

    fn hanging(id: ProviderId) -> Arc<Self> {
        Arc::new(Self { id, reply: Some("zu spät"), delay: Duration::from_secs(30), calls: AtomicUsize::new(0) })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AnalysisProvider for Scripted {
    fn id(&self) -> ProviderId {
        self.id
    }

    async fn analyze(&self, _text: &str, _analysis_type: AnalysisType, _options: &AnalysisOptions) -> Result<String, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.reply.map(str::to_string).ok_or_else(|| ProviderError::Http {
            provider: self.id.to_string(),
            status: 503,
            message: "service unavailable".to_string(),
        })
    }
}

fn as_dyn(providers: &[Arc<Scripted>]) -> Vec<Arc<dyn AnalysisProvider>> {
    providers.iter().map(|p| p.clone() as Arc<dyn AnalysisProvider>).collect()
}

#[tokio::test]
async fn test_first_fallback_answers_when_default_fails() {
    let providers = [Scripted::failing(ProviderId::OpenAi), Scripted::ok(ProviderId::Local, "Medikamente: Ibuprofen 400 mg")];
    let metrics = Arc::new(MetricsCollector::new());
    let chain = ProviderChain::new(as_dyn(&providers), Duration::from_secs(5))
        .unwrap()
        .with_metrics(metrics.clone());

    let result = chain
        .analyze("[PERSON] nimmt Ibuprofen", AnalysisType::ExtractMedications, &AnalysisOptions::default())
        .await
        .unwrap();

    assert_eq!(result.provider, ProviderId::Local);
    assert!(!result.is_cloud);
    assert!(result.has_disclaimer);
    assert_eq!(result.disclaimer_text, AnalysisType::ExtractMedications.disclaimer());
    assert_eq!(result.text.matches(&result.disclaimer_text).count(), 1);
    assert_eq!(result.failed_providers, vec![ProviderId::OpenAi]);

    let stats = metrics.provider_metrics();
    assert_eq!(stats["openai"].failure_count, 1);
    assert!(stats["openai"].is_cloud_provider);
    assert_eq!(stats["local"].success_count, 1);
    assert!(!stats["local"].is_cloud_provider);
}

#[tokio::test]
async fn test_exhausted_chain_tries_each_provider_exactly_once() {
    let providers = [
        Scripted::failing(ProviderId::OpenAi),
        Scripted::failing(ProviderId::Anthropic),
        Scripted::failing(ProviderId::Google),
    ];
    let metrics = Arc::new(MetricsCollector::new());
    let chain = ProviderChain::new(as_dyn(&providers), Duration::from_secs(5))
        .unwrap()
        .with_metrics(metrics.clone());

    let err = chain
        .analyze("Text", AnalysisType::SuggestDiagnosis, &AnalysisOptions::default())
        .await
        .unwrap_err();

    assert!(providers.iter().all(|p| p.calls() == 1));
    let failures: u64 = metrics.provider_metrics().values().map(|s| s.failure_count).sum();
    assert_eq!(failures, 3);

    match err {
        ProviderError::Exhausted { attempted, original } => {
            assert_eq!(attempted, vec!["openai", "anthropic", "google"]);
            assert!(original.contains("503"));
        }
        other => panic!("expected exhaustion, got {other:?}"),
    }
}

#[tokio::test]
async fn test_hanging_provider_times_out_and_falls_through() {
    let providers = [Scripted::hanging(ProviderId::Anthropic), Scripted::ok(ProviderId::Google, "Symptome: Fieber")];
    let chain = ProviderChain::new(as_dyn(&providers), Duration::from_millis(50)).unwrap();

    let result = chain
        .analyze("Text", AnalysisType::ExtractSymptoms, &AnalysisOptions::default())
        .await
        .unwrap();

    assert_eq!(result.provider, ProviderId::Google);
    assert_eq!(result.failed_providers, vec![ProviderId::Anthropic]);
}

#[tokio::test]
async fn test_chain_reports_declared_order_and_availability() {
    let providers = [
        Scripted::failing(ProviderId::OpenAi),
        Scripted::ok(ProviderId::Anthropic, "ok"),
        Scripted::ok(ProviderId::Local, "ok"),
    ];
    let chain = ProviderChain::new(as_dyn(&providers), Duration::from_secs(5)).unwrap();

    assert_eq!(chain.chain(), vec![ProviderId::OpenAi, ProviderId::Anthropic, ProviderId::Local]);
    assert_eq!(chain.available_providers().await, vec![ProviderId::Anthropic, ProviderId::Local]);
}
