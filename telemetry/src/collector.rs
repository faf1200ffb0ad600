use chrono::Utc;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::time::Instant;

use crate::snapshot::{
    running_average, AnonymizationStats, AuditStats, DialectStats, EventSeverity,
    MetricsSnapshot, ProviderStats, RequestMetrics,
};

#[derive(Debug)]
struct MetricsState {
    started_at: Instant,
    total_requests: u64,
    providers: BTreeMap<String, ProviderStats>,
    anonymization: AnonymizationStats,
    dialect: DialectStats,
    audit: AuditStats,
}

impl MetricsState {
    fn new() -> Self {
        Self {
            started_at: Instant::now(),
            total_requests: 0,
            providers: BTreeMap::new(),
            anonymization: AnonymizationStats::default(),
            dialect: DialectStats::default(),
            audit: AuditStats::default(),
        }
    }
}

/// Thread-safe accumulator shared by the gateway components.
///
/// One lock guards the whole state: every recording is a single critical
/// section and [`MetricsCollector::snapshot`] copies all groups under the
/// same lock.
#[derive(Debug)]
pub struct MetricsCollector {
    state: RwLock<MetricsState>,
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsCollector {
    pub fn new() -> Self {
        tracing::debug!("Metrics collector initialized");
        Self {
            state: RwLock::new(MetricsState::new()),
        }
    }

    pub fn record_request(&self) {
        self.state.write().total_requests += 1;
        metrics::counter!("intake_requests_total").increment(1);
    }

    /// Record one provider attempt, successful or not
    pub fn record_provider_request(&self, provider: &str, success: bool, latency_ms: f64, is_cloud: bool) {
        {
            let mut state = self.state.write();
            let stats = state
                .providers
                .entry(provider.to_string())
                .or_insert_with(|| ProviderStats {
                    is_cloud_provider: is_cloud,
                    ..ProviderStats::default()
                });

            stats.request_count += 1;
            if success {
                stats.success_count += 1;
            } else {
                stats.failure_count += 1;
            }
            stats.is_cloud_provider = is_cloud;
            stats.average_latency_ms =
                running_average(stats.average_latency_ms, stats.request_count, latency_ms);
        }

        let outcome = if success { "success" } else { "failure" };
        metrics::counter!(
            "intake_provider_requests_total",
            "provider" => provider.to_string(),
            "outcome" => outcome
        )
        .increment(1);
        metrics::histogram!("intake_provider_latency_ms", "provider" => provider.to_string())
            .record(latency_ms);
    }

    /// Record one detected entity. `queued_for_review` is true only when the
    /// entity actually entered the review queue.
    pub fn record_anonymization_entity(&self, entity_type: &str, confidence: f64, queued_for_review: bool) {
        {
            let mut state = self.state.write();
            let stats = &mut state.anonymization;

            stats.total_entities += 1;
            *stats.entity_types.entry(entity_type.to_string()).or_insert(0) += 1;
            if queued_for_review {
                stats.entities_needing_review += 1;
            }
            stats.average_confidence =
                running_average(stats.average_confidence, stats.total_entities, confidence);
        }

        metrics::counter!("intake_entities_total", "entity_type" => entity_type.to_string())
            .increment(1);
    }

    pub fn record_entity_review(&self, approved: bool) {
        {
            let mut state = self.state.write();
            let stats = &mut state.anonymization;

            stats.entities_reviewed += 1;
            if approved {
                stats.entities_approved += 1;
            }
            stats.entities_needing_review = stats.entities_needing_review.saturating_sub(1);
        }

        metrics::counter!("intake_entity_reviews_total", "approved" => approved.to_string())
            .increment(1);
    }

    pub fn record_dialect_detection(&self, detected: bool, confidence: f64, medical_terms: u64) {
        let mut state = self.state.write();
        let stats = &mut state.dialect;

        stats.detection_count += 1;
        if detected {
            stats.detected_count += 1;
        }
        stats.average_confidence =
            running_average(stats.average_confidence, stats.detection_count, confidence);
        stats.medical_terms_detected += medical_terms;
    }

    pub fn record_audit_event(&self, severity: EventSeverity) {
        {
            let mut state = self.state.write();
            let stats = &mut state.audit;

            stats.total_events += 1;
            match severity {
                EventSeverity::Info => stats.info_events += 1,
                EventSeverity::Warning => stats.warning_events += 1,
                EventSeverity::Error => stats.error_events += 1,
            }
        }

        metrics::counter!("intake_audit_events_total", "severity" => severity.as_str())
            .increment(1);
    }

    pub fn total_requests(&self) -> u64 {
        self.state.read().total_requests
    }

    pub fn provider_metrics(&self) -> BTreeMap<String, ProviderStats> {
        self.state.read().providers.clone()
    }

    pub fn anonymization_metrics(&self) -> AnonymizationStats {
        self.state.read().anonymization.clone()
    }

    pub fn dialect_metrics(&self) -> DialectStats {
        self.state.read().dialect.clone()
    }

    pub fn audit_metrics(&self) -> AuditStats {
        self.state.read().audit.clone()
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let state = self.state.read();
        MetricsSnapshot {
            taken_at: Utc::now(),
            requests: RequestMetrics {
                total_requests: state.total_requests,
                uptime_seconds: state.started_at.elapsed().as_secs(),
            },
            providers: state.providers.clone(),
            anonymization: state.anonymization.clone(),
            dialect: state.dialect.clone(),
            audit: state.audit.clone(),
        }
    }

    /// Reset all counters. Intended for tests.
    pub fn reset(&self) {
        *self.state.write() = MetricsState::new();
    }
}
