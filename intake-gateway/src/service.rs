use ai_provider_chain::{
    AnalysisOptions, AnalysisProvider, AnalysisType, ProviderChain, ProviderError, ProviderId,
    ProviderRegistry, ProviderResult,
};
use anonymization_engine::{
    AnonymizationError, AnonymizationGuarantee, AnonymizationOrchestrator, AnonymizationOutcome,
    AnonymizationStatus, DetectionError, Entity, EntityDetector, EntityId, PatternDetector,
};
use audit_engine::{AuditEvent, AuditEventType, AuditTrail, EventSeverity};
use error_common::{new_request_id, ErrorContext, ErrorReporter, IntakeError};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use telemetry::{MetricsCollector, MetricsSnapshot};
use tracing::{debug, info};

use crate::config::GatewayConfig;
use crate::dialect::{DialectDetector, DialectResult, SwissGermanDetector};
use crate::error::GatewayResult;
use crate::transcription::{Transcriber, WhisperTranscriber};

type Result<T> = std::result::Result<T, IntakeError>;

/// Anonymized text plus the request it belongs to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnonymizationResponse {
    pub request_id: String,
    #[serde(flatten)]
    pub outcome: AnonymizationOutcome,
}

/// Dialect detection with the regional medical vocabulary found
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DialectReport {
    #[serde(flatten)]
    pub result: DialectResult,
    pub medical_terms: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResponse {
    pub request_id: String,
    pub result: ProviderResult,
    /// The text actually sent to the provider
    pub anonymized_text: String,
    pub entity_count: usize,
    pub is_swiss_german: bool,
    pub processing_time_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptionResponse {
    pub request_id: String,
    pub language: String,
    pub duration_seconds: f64,
    pub dialect: Option<DialectReport>,
    #[serde(flatten)]
    pub anonymization: AnonymizationOutcome,
    pub processing_time_ms: u64,
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}

/// Gateway façade: every text that enters is anonymized before anything
/// else sees it.
pub struct IntakeService {
    orchestrator: AnonymizationOrchestrator,
    chain: ProviderChain,
    transcriber: Arc<dyn Transcriber>,
    dialect_detector: Option<Arc<dyn DialectDetector>>,
    metrics: Arc<MetricsCollector>,
    audit: Arc<AuditTrail>,
    reporter: ErrorReporter,
    detection_timeout: Duration,
}

/// Wires an [`IntakeService`], defaulting every collaborator from the
/// configuration
pub struct IntakeServiceBuilder {
    config: GatewayConfig,
    detector: Option<Arc<dyn EntityDetector>>,
    providers: Option<Vec<Arc<dyn AnalysisProvider>>>,
    registry: ProviderRegistry,
    transcriber: Option<Arc<dyn Transcriber>>,
    dialect_detector: Option<Arc<dyn DialectDetector>>,
    metrics: Option<Arc<MetricsCollector>>,
}

impl IntakeServiceBuilder {
    pub fn new(config: GatewayConfig) -> Self {
        Self {
            config,
            detector: None,
            providers: None,
            registry: ProviderRegistry::builtin(),
            transcriber: None,
            dialect_detector: None,
            metrics: None,
        }
    }

    pub fn detector(mut self, detector: Arc<dyn EntityDetector>) -> Self {
        self.detector = Some(detector);
        self
    }

    /// Use these providers, in this order, instead of the configured chain
    pub fn providers(mut self, providers: Vec<Arc<dyn AnalysisProvider>>) -> Self {
        self.providers = Some(providers);
        self
    }

    pub fn registry(mut self, registry: ProviderRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn transcriber(mut self, transcriber: Arc<dyn Transcriber>) -> Self {
        self.transcriber = Some(transcriber);
        self
    }

    pub fn dialect_detector(mut self, detector: Arc<dyn DialectDetector>) -> Self {
        self.dialect_detector = Some(detector);
        self
    }

    pub fn metrics(mut self, metrics: Arc<MetricsCollector>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn build(self) -> GatewayResult<IntakeService> {
        let config = self.config;
        config.validate()?;

        let metrics = self.metrics.unwrap_or_else(|| Arc::new(MetricsCollector::new()));

        let guarantee = AnonymizationGuarantee::verify(&config.anonymization)?;
        let detector = self.detector.unwrap_or_else(|| Arc::new(PatternDetector::new()));
        let orchestrator = AnonymizationOrchestrator::new(guarantee, detector)?.with_metrics(metrics.clone());

        let chain = match self.providers {
            Some(providers) => ProviderChain::new(providers, Duration::from_secs(config.providers.timeout_secs))?,
            None => ProviderChain::from_config(&config.providers, &self.registry)?,
        }
        .with_metrics(metrics.clone());

        let transcriber = match self.transcriber {
            Some(transcriber) => transcriber,
            None => Arc::new(WhisperTranscriber::new(&config.transcription)?),
        };

        let dialect_detector = if config.dialect.enabled {
            Some(
                self.dialect_detector
                    .unwrap_or_else(|| Arc::new(SwissGermanDetector::new(&config.dialect))),
            )
        } else {
            None
        };

        let audit = Arc::new(AuditTrail::new(config.audit_trail_capacity).with_metrics(metrics.clone()));
        audit.record(
            AuditEvent::new(AuditEventType::Configuration, "gateway_started").with_data(json!({
                "provider_chain": chain.chain(),
                "confidence_threshold": config.anonymization.confidence_threshold,
                "review_queue_capacity": config.anonymization.review_queue_capacity,
                "dialect_detection": config.dialect.enabled,
            })),
        );

        info!(
            provider_chain = ?chain.chain(),
            dialect_detection = config.dialect.enabled,
            "Intake service initialized"
        );

        Ok(IntakeService {
            orchestrator,
            chain,
            transcriber,
            dialect_detector,
            metrics,
            audit,
            reporter: ErrorReporter::new(),
            detection_timeout: Duration::from_secs(config.detection_timeout_secs),
        })
    }
}

impl IntakeService {
    pub fn builder(config: GatewayConfig) -> IntakeServiceBuilder {
        IntakeServiceBuilder::new(config)
    }

    /// Log an error at the boundary and convert it
    fn fail(&self, request_id: &str, operation: &str, error: impl Into<IntakeError>) -> IntakeError {
        let error = error.into();
        let context = ErrorContext::for_request(request_id).with_operation(operation);
        self.reporter.report(&context, &error);
        error
    }

    async fn anonymize(&self, request_id: &str, text: &str) -> Result<AnonymizationOutcome> {
        let outcome = match tokio::time::timeout(self.detection_timeout, self.orchestrator.process_text(text)).await {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(e)) => return Err(self.fail(request_id, "anonymize", e)),
            Err(_) => {
                let timeout = AnonymizationError::Detection(DetectionError::Timeout(self.detection_timeout.as_secs()));
                return Err(self.fail(request_id, "anonymize", timeout));
            }
        };

        let threshold = self.orchestrator.confidence_threshold();
        let needing_review = outcome.entities.iter().filter(|e| e.needs_review(threshold)).count();
        let mut entity_types: BTreeMap<&str, usize> = BTreeMap::new();
        for entity in &outcome.entities {
            *entity_types.entry(entity.entity_type.as_str()).or_insert(0) += 1;
        }

        let severity = if outcome.status == AnonymizationStatus::ReviewRequired {
            EventSeverity::Warning
        } else {
            EventSeverity::Info
        };
        self.audit.record(
            AuditEvent::new(AuditEventType::Anonymization, "text_anonymized")
                .with_severity(severity)
                .with_request_id(request_id)
                .with_data(json!({
                    "entity_count": outcome.entities.len(),
                    "entity_types": entity_types,
                    "queued_for_review": outcome.queued_for_review,
                    "review_skipped_queue_full": needing_review.saturating_sub(outcome.queued_for_review),
                    "processing_time_ms": outcome.processing_time_ms,
                })),
        );

        Ok(outcome)
    }

    fn run_dialect_detection(&self, request_id: &str, text: &str) -> Option<DialectReport> {
        let detector = self.dialect_detector.as_ref()?;
        let result = detector.detect(text);
        let medical_terms = detector.extract_medical_terms(text);

        self.metrics.record_dialect_detection(
            result.is_swiss_german,
            result.confidence,
            medical_terms.len() as u64,
        );
        self.audit.record(
            AuditEvent::new(AuditEventType::DialectDetection, "dialect_detected")
                .with_request_id(request_id)
                .with_data(json!({
                    "is_swiss_german": result.is_swiss_german,
                    "confidence": result.confidence,
                    "marker_count": result.markers.len(),
                    "medical_term_count": medical_terms.len(),
                })),
        );

        Some(DialectReport { result, medical_terms })
    }

    /// Anonymize free text
    pub async fn process_text(&self, text: &str) -> Result<AnonymizationResponse> {
        let request_id = new_request_id();
        self.metrics.record_request();
        debug!(request_id = %request_id, text_chars = text.chars().count(), "Anonymization request received");

        let outcome = self.anonymize(&request_id, text).await?;
        Ok(AnonymizationResponse { request_id, outcome })
    }

    /// Resolve a pending review. `Ok(None)` when the entity is not pending.
    pub fn review_decision(&self, entity_id: &str, approved: bool, replacement: Option<&str>) -> Result<Option<Entity>> {
        let request_id = new_request_id();
        self.metrics.record_request();

        let id: EntityId = entity_id.parse().map_err(|_| {
            self.fail(
                &request_id,
                "review_decision",
                IntakeError::ValidationError(format!("Invalid entity id: {}", entity_id)),
            )
        })?;

        let decided = self
            .orchestrator
            .review_decision(&id, approved, replacement)
            .map_err(|e| self.fail(&request_id, "review_decision", e))?;

        if let Some(entity) = &decided {
            self.audit.record(
                AuditEvent::new(
                    AuditEventType::ReviewDecision,
                    if approved { "entity_approved" } else { "entity_rejected" },
                )
                .with_request_id(&request_id)
                .with_data(json!({
                    "entity_id": entity.id.to_string(),
                    "entity_type": entity.entity_type.as_str(),
                    "replacement_applied": approved && replacement.is_some_and(|r| !r.trim().is_empty()),
                })),
            );
        }
        Ok(decided)
    }

    pub fn pending_reviews(&self) -> Vec<Entity> {
        self.orchestrator.pending_reviews()
    }

    /// Anonymize `text`, then run the analysis on the anonymized text
    /// through the provider chain
    pub async fn analyze(
        &self,
        text: &str,
        analysis_type: AnalysisType,
        options: AnalysisOptions,
    ) -> Result<AnalysisResponse> {
        let request_id = new_request_id();
        self.metrics.record_request();
        let started = Instant::now();

        let outcome = self.anonymize(&request_id, text).await?;

        let mut options = options;
        if let Some(report) = self.run_dialect_detection(&request_id, text) {
            options.is_swiss_german |= report.result.is_swiss_german;
        }

        match self.chain.analyze(&outcome.redacted_text, analysis_type, &options).await {
            Ok(result) => {
                if !result.failed_providers.is_empty() {
                    self.audit.record(
                        AuditEvent::new(AuditEventType::ProviderFallback, "provider_fallback")
                            .with_severity(EventSeverity::Warning)
                            .with_request_id(&request_id)
                            .with_data(json!({
                                "failed_providers": result.failed_providers,
                                "provider": result.provider,
                                "is_cloud": result.is_cloud,
                            })),
                    );
                }
                info!(
                    request_id = %request_id,
                    provider = %result.provider,
                    is_cloud = result.is_cloud,
                    analysis_type = %analysis_type,
                    "Text analysis completed"
                );

                Ok(AnalysisResponse {
                    request_id,
                    result,
                    entity_count: outcome.entities.len(),
                    anonymized_text: outcome.redacted_text,
                    is_swiss_german: options.is_swiss_german,
                    processing_time_ms: elapsed_ms(started),
                })
            }
            Err(e) => {
                if let ProviderError::Exhausted { attempted, .. } = &e {
                    self.audit.record(
                        AuditEvent::new(AuditEventType::ProviderChainExhausted, "provider_chain_exhausted")
                            .with_severity(EventSeverity::Error)
                            .with_request_id(&request_id)
                            .with_data(json!({ "attempted": attempted })),
                    );
                }
                Err(self.fail(&request_id, "analyze", e))
            }
        }
    }

    /// Transcribe dictated audio. The transcript is always anonymized
    /// before it is returned.
    pub async fn transcribe_and_anonymize(&self, audio: &[u8], file_name: &str) -> Result<TranscriptionResponse> {
        let request_id = new_request_id();
        self.metrics.record_request();
        let started = Instant::now();

        let transcript = self
            .transcriber
            .transcribe(audio, file_name)
            .await
            .map_err(|e| self.fail(&request_id, "transcribe", e))?;

        let dialect = self.run_dialect_detection(&request_id, &transcript.text);
        let anonymization = self.anonymize(&request_id, &transcript.text).await?;

        info!(
            request_id = %request_id,
            language = %transcript.language,
            entity_count = anonymization.entities.len(),
            "Transcription anonymized"
        );

        Ok(TranscriptionResponse {
            request_id,
            language: transcript.language,
            duration_seconds: transcript.duration_seconds,
            dialect,
            anonymization,
            processing_time_ms: elapsed_ms(started),
        })
    }

    /// Dialect detection alone, `None` when it is switched off
    pub fn detect_dialect(&self, text: &str) -> Option<DialectReport> {
        let request_id = new_request_id();
        self.run_dialect_detection(&request_id, text)
    }

    pub async fn available_providers(&self) -> Vec<ProviderId> {
        self.chain.available_providers().await
    }

    pub fn provider_chain(&self) -> Vec<ProviderId> {
        self.chain.chain()
    }

    pub fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    pub fn metrics(&self) -> &Arc<MetricsCollector> {
        &self.metrics
    }

    pub fn audit_trail(&self) -> &Arc<AuditTrail> {
        &self.audit
    }
}
