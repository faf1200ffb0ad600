use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::Result;

/// Severity of an audit event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventSeverity {
    Info,
    Warning,
    Error,
}

impl EventSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestMetrics {
    pub total_requests: u64,
    pub uptime_seconds: u64,
}

/// Outcome counters for one AI backend
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderStats {
    pub request_count: u64,
    pub success_count: u64,
    pub failure_count: u64,
    pub average_latency_ms: f64,
    pub is_cloud_provider: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnonymizationStats {
    pub total_entities: u64,
    /// Entities currently parked in the review queue
    pub entities_needing_review: u64,
    pub entities_reviewed: u64,
    pub entities_approved: u64,
    pub average_confidence: f64,
    pub entity_types: BTreeMap<String, u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DialectStats {
    pub detection_count: u64,
    pub detected_count: u64,
    pub average_confidence: f64,
    pub medical_terms_detected: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuditStats {
    pub total_events: u64,
    pub info_events: u64,
    pub warning_events: u64,
    pub error_events: u64,
}

/// Point-in-time copy of every counter group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub taken_at: DateTime<Utc>,
    pub requests: RequestMetrics,
    pub providers: BTreeMap<String, ProviderStats>,
    pub anonymization: AnonymizationStats,
    pub dialect: DialectStats,
    pub audit: AuditStats,
}

impl MetricsSnapshot {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Incremental mean: `(old * (n - 1) + x) / n`, `n` counting `x`
pub(crate) fn running_average(old: f64, count: u64, sample: f64) -> f64 {
    if count == 0 {
        return 0.0;
    }
    let n = count as f64;
    (old * (n - 1.0) + sample) / n
}
