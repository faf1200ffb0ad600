use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;
use telemetry::MetricsCollector;
use tracing::{debug, error, info, warn};

use crate::allow_list::{AllowList, MEDICAL_CONDITIONS};
use crate::detector::EntityDetector;
use crate::entity::{Entity, EntityId, EntityType};
use crate::error::{AnonymizationError, AnonymizationResult};
use crate::policy::ReplacementPolicy;
use crate::queue::{ReviewQueue, DEFAULT_REVIEW_QUEUE_CAPACITY};
use crate::redaction::{normalize_spans, redact, CharIndex};

pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.8;

/// Anonymization settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnonymizationConfig {
    /// Must be true. A config with `false` never yields an orchestrator.
    pub enabled: bool,
    pub confidence_threshold: f64,
    pub review_queue_capacity: usize,
    /// Label → token overrides layered over the default token table
    pub replacement_tokens: BTreeMap<String, String>,
    pub allow_list: Vec<String>,
}

impl Default for AnonymizationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            review_queue_capacity: DEFAULT_REVIEW_QUEUE_CAPACITY,
            replacement_tokens: BTreeMap::new(),
            allow_list: MEDICAL_CONDITIONS.iter().map(|term| term.to_string()).collect(),
        }
    }
}

impl AnonymizationConfig {
    pub fn validate(&self) -> AnonymizationResult<()> {
        if !self.enabled {
            return Err(AnonymizationError::Disabled);
        }
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(AnonymizationError::InvalidConfig(format!(
                "Confidence threshold must be within [0, 1], got {}",
                self.confidence_threshold
            )));
        }
        if self.review_queue_capacity == 0 {
            return Err(AnonymizationError::InvalidConfig(
                "Review queue capacity must be greater than zero".to_string(),
            ));
        }
        ReplacementPolicy::with_overrides(&self.replacement_tokens)?;
        Ok(())
    }
}

/// Proof that a configuration keeps anonymization switched on.
///
/// The only way to obtain one is [`AnonymizationGuarantee::verify`], and
/// the only way to build an [`AnonymizationOrchestrator`] is to hand one
/// over.
#[derive(Debug, Clone)]
pub struct AnonymizationGuarantee {
    config: AnonymizationConfig,
}

impl AnonymizationGuarantee {
    pub fn verify(config: &AnonymizationConfig) -> AnonymizationResult<Self> {
        if let Err(e) = config.validate() {
            error!(error = %e, "Anonymization configuration rejected");
            return Err(e);
        }
        Ok(Self { config: config.clone() })
    }

    pub fn config(&self) -> &AnonymizationConfig {
        &self.config
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnonymizationStatus {
    Completed,
    /// At least one entity scored below the confidence threshold
    ReviewRequired,
}

/// Result of one `process_text` call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnonymizationOutcome {
    pub redacted_text: String,
    pub entities: Vec<Entity>,
    pub status: AnonymizationStatus,
    /// Mean entity score, 1.0 when nothing was detected
    pub average_confidence: f64,
    pub processing_time_ms: u64,
    /// Entities that actually entered the review queue
    pub queued_for_review: usize,
}

/// Detection, confidence gating, redaction and review handling
pub struct AnonymizationOrchestrator {
    config: AnonymizationConfig,
    policy: ReplacementPolicy,
    allow_list: AllowList,
    review_queue: ReviewQueue,
    detector: Arc<dyn EntityDetector>,
    metrics: Option<Arc<MetricsCollector>>,
}

impl AnonymizationOrchestrator {
    pub fn new(guarantee: AnonymizationGuarantee, detector: Arc<dyn EntityDetector>) -> AnonymizationResult<Self> {
        let config = guarantee.config;
        config.validate()?;

        let policy = ReplacementPolicy::with_overrides(&config.replacement_tokens)?;
        let allow_list = AllowList::from_terms(&config.allow_list);
        let review_queue = ReviewQueue::new(config.review_queue_capacity);

        info!(
            confidence_threshold = config.confidence_threshold,
            review_queue_capacity = config.review_queue_capacity,
            allow_list_terms = allow_list.len(),
            "Anonymization orchestrator initialized"
        );

        Ok(Self {
            config,
            policy,
            allow_list,
            review_queue,
            detector,
            metrics: None,
        })
    }

    pub fn with_metrics(mut self, metrics: Arc<MetricsCollector>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    fn ensure_enforced(&self) -> AnonymizationResult<()> {
        if !self.config.enabled {
            error!("Anonymization found disabled, refusing to process");
            return Err(AnonymizationError::Disabled);
        }
        Ok(())
    }

    /// Detect, redact and gate `text`.
    ///
    /// Detector failures and malformed spans abort the call, so partially
    /// redacted text is never returned. A full review queue only reduces
    /// review coverage.
    pub async fn process_text(&self, text: &str) -> AnonymizationResult<AnonymizationOutcome> {
        self.ensure_enforced()?;
        let started = Instant::now();

        let spans = match self.detector.detect(text, &self.allow_list).await {
            Ok(spans) => spans,
            Err(e) => {
                error!(error = %e, "Entity detection failed");
                return Err(e.into());
            }
        };

        let index = CharIndex::new(text);
        let spans = normalize_spans(spans, index.char_len())?;

        let mut entities = Vec::with_capacity(spans.len());
        for span in spans {
            let original = index.slice(span.start, span.end).ok_or(AnonymizationError::InvalidSpan {
                start: span.start,
                end: span.end,
                length: index.char_len(),
            })?;
            let entity_type = EntityType::from_label(&span.entity_type);
            let score = if span.score.is_finite() { span.score.clamp(0.0, 1.0) } else { 0.0 };

            entities.push(Entity {
                id: EntityId::generate(),
                entity_type,
                text: original.to_string(),
                start: span.start,
                end: span.end,
                score,
                anonymized_text: Some(self.policy.token_for(entity_type).to_string()),
            });
        }

        let redacted_text = redact(text, &entities);

        let mut needs_review = 0usize;
        let mut queued_for_review = 0usize;
        for entity in &entities {
            let mut queued = false;
            if entity.needs_review(self.config.confidence_threshold) {
                needs_review += 1;
                queued = self.review_queue.add(entity.clone());
                if queued {
                    queued_for_review += 1;
                } else {
                    warn!(
                        entity_id = %entity.id,
                        entity_type = %entity.entity_type,
                        "Review queue full, entity redacted without review"
                    );
                }
            }
            if let Some(metrics) = &self.metrics {
                metrics.record_anonymization_entity(entity.entity_type.as_str(), entity.score, queued);
            }
        }

        let average_confidence = if entities.is_empty() {
            1.0
        } else {
            entities.iter().map(|e| e.score).sum::<f64>() / entities.len() as f64
        };
        let status = if needs_review > 0 {
            AnonymizationStatus::ReviewRequired
        } else {
            AnonymizationStatus::Completed
        };
        let processing_time_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        debug!(
            entities = entities.len(),
            queued_for_review,
            processing_time_ms,
            "Text anonymized"
        );

        Ok(AnonymizationOutcome {
            redacted_text,
            entities,
            status,
            average_confidence,
            processing_time_ms,
            queued_for_review,
        })
    }

    /// Close out a pending review.
    ///
    /// Returns `Ok(None)` when the entity is not (or no longer) queued. On
    /// approval a non-empty `replacement` overwrites the entity's
    /// anonymized text. The entry leaves the queue on any decision.
    pub fn review_decision(
        &self,
        entity_id: &EntityId,
        approved: bool,
        replacement: Option<&str>,
    ) -> AnonymizationResult<Option<Entity>> {
        self.ensure_enforced()?;

        let Some(mut entity) = self.review_queue.take(entity_id) else {
            debug!(entity_id = %entity_id, "Review decision for unknown entity");
            return Ok(None);
        };

        if approved {
            if let Some(replacement) = replacement.filter(|r| !r.trim().is_empty()) {
                entity.anonymized_text = Some(replacement.to_string());
            }
        }

        if let Some(metrics) = &self.metrics {
            metrics.record_entity_review(approved);
        }
        info!(entity_id = %entity_id, approved, "Review decision applied");

        Ok(Some(entity))
    }

    pub fn pending_reviews(&self) -> Vec<Entity> {
        self.review_queue.all()
    }

    pub fn review_queue(&self) -> &ReviewQueue {
        &self.review_queue
    }

    pub fn policy(&self) -> &ReplacementPolicy {
        &self.policy
    }

    pub fn allow_list(&self) -> &AllowList {
        &self.allow_list
    }

    pub fn confidence_threshold(&self) -> f64 {
        self.config.confidence_threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detector::MockEntityDetector;
    use crate::entity::DetectedSpan;
    use crate::error::DetectionError;

    fn orchestrator(detector: MockEntityDetector) -> AnonymizationOrchestrator {
        let guarantee = AnonymizationGuarantee::verify(&AnonymizationConfig::default()).unwrap();
        AnonymizationOrchestrator::new(guarantee, Arc::new(detector)).unwrap()
    }

    #[test]
    fn test_disabled_config_yields_no_guarantee() {
        let config = AnonymizationConfig { enabled: false, ..Default::default() };
        assert_eq!(AnonymizationGuarantee::verify(&config).unwrap_err(), AnonymizationError::Disabled);
    }

    #[test]
    fn test_config_validation() {
        let config = AnonymizationConfig { confidence_threshold: 1.5, ..Default::default() };
        assert!(matches!(config.validate(), Err(AnonymizationError::InvalidConfig(_))));

        let config = AnonymizationConfig { review_queue_capacity: 0, ..Default::default() };
        assert!(config.validate().is_err());

        let mut config = AnonymizationConfig::default();
        config.replacement_tokens.insert("NOT_A_TYPE".to_string(), "[X]".to_string());
        assert!(config.validate().is_err());
    }

    #[tokio::test]
    async fn test_detector_failure_is_fatal() {
        let mut detector = MockEntityDetector::new();
        detector
            .expect_detect()
            .times(1)
            .returning(|_, _| Err(DetectionError::Unavailable("connection refused".to_string())));

        let err = orchestrator(detector).process_text("Herr Meier").await.unwrap_err();
        assert!(matches!(err, AnonymizationError::Detection(DetectionError::Unavailable(_))));
    }

    #[tokio::test]
    async fn test_out_of_range_span_is_rejected() {
        let mut detector = MockEntityDetector::new();
        detector
            .expect_detect()
            .returning(|_, _| Ok(vec![DetectedSpan::new("PERSON", 0, 50, 0.9)]));

        let err = orchestrator(detector).process_text("kurz").await.unwrap_err();
        assert!(matches!(err, AnonymizationError::InvalidSpan { length: 4, .. }));
    }

    #[tokio::test]
    async fn test_detector_receives_allow_list() {
        let mut detector = MockEntityDetector::new();
        detector
            .expect_detect()
            .withf(|text, allow_list| text == "Asthma seit 2019" && allow_list.contains("ASTHMA"))
            .returning(|_, _| Ok(Vec::new()));

        let outcome = orchestrator(detector).process_text("Asthma seit 2019").await.unwrap();
        assert_eq!(outcome.redacted_text, "Asthma seit 2019");
        assert_eq!(outcome.status, AnonymizationStatus::Completed);
        assert_eq!(outcome.average_confidence, 1.0);
    }

    #[tokio::test]
    async fn test_unknown_type_uses_default_token() {
        let mut detector = MockEntityDetector::new();
        detector
            .expect_detect()
            .returning(|_, _| Ok(vec![DetectedSpan::new("IBAN_CODE", 5, 24, 0.95)]));

        let outcome = orchestrator(detector)
            .process_text("IBAN CH93 0076 2011 6238 5295 7")
            .await
            .unwrap();
        assert_eq!(outcome.entities[0].entity_type, EntityType::Other);
        assert_eq!(outcome.redacted_text, "IBAN [VERTRAULICH] 5295 7");
    }

    #[tokio::test]
    async fn test_rejected_review_keeps_default_token() {
        let mut detector = MockEntityDetector::new();
        detector
            .expect_detect()
            .returning(|_, _| Ok(vec![DetectedSpan::new("PERSON", 5, 10, 0.4)]));

        let orchestrator = orchestrator(detector);
        let outcome = orchestrator.process_text("Herr Meier").await.unwrap();
        let id = outcome.entities[0].id;

        let entity = orchestrator.review_decision(&id, false, Some("[IGNORED]")).unwrap().unwrap();
        assert_eq!(entity.anonymized_text.as_deref(), Some("[PERSON]"));
        assert!(orchestrator.review_decision(&id, false, None).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_metrics_are_recorded() {
        let mut detector = MockEntityDetector::new();
        detector.expect_detect().returning(|_, _| {
            Ok(vec![
                DetectedSpan::new("PERSON", 0, 4, 0.5),
                DetectedSpan::new("PHONE_NUMBER", 5, 9, 0.9),
            ])
        });

        let metrics = Arc::new(MetricsCollector::new());
        let orchestrator = orchestrator(detector).with_metrics(metrics.clone());
        let outcome = orchestrator.process_text("Anna 0791").await.unwrap();
        orchestrator.review_decision(&outcome.entities[0].id, true, None).unwrap();

        let stats = metrics.anonymization_metrics();
        assert_eq!(stats.total_entities, 2);
        assert_eq!(stats.entities_reviewed, 1);
        assert_eq!(stats.entities_approved, 1);
        assert_eq!(stats.entities_needing_review, 0);
        assert!((stats.average_confidence - 0.7).abs() < 1e-9);
    }
}
