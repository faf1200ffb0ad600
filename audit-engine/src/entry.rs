// Audit entry types and structures
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use telemetry::EventSeverity;
use uuid::Uuid;

use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditEventType {
    Anonymization,
    ReviewDecision,
    ProviderFallback,
    ProviderChainExhausted,
    DialectDetection,
    Configuration,
}

/// An event before it is sealed into the trail
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEvent {
    pub event_type: AuditEventType,
    pub severity: EventSeverity,
    pub action: String,
    pub request_id: Option<String>,
    pub data: serde_json::Value,
}

impl AuditEvent {
    pub fn new(event_type: AuditEventType, action: impl Into<String>) -> Self {
        Self {
            event_type,
            severity: EventSeverity::Info,
            action: action.into(),
            request_id: None,
            data: serde_json::Value::Null,
        }
    }

    pub fn with_severity(mut self, severity: EventSeverity) -> Self {
        self.severity = severity;
        self
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = data;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: Uuid,
    pub sequence: u64,
    pub timestamp: DateTime<Utc>,
    pub event: AuditEvent,
    pub previous_hash: String,
    pub hash: String,
}

impl AuditEntry {
    pub(crate) fn seal(sequence: u64, event: AuditEvent, previous_hash: String) -> Result<Self> {
        let id = Uuid::new_v4();
        let timestamp = Utc::now();
        let hash = Self::compute_hash(&previous_hash, sequence, &id, &timestamp, &event)?;

        Ok(Self {
            id,
            sequence,
            timestamp,
            event,
            previous_hash,
            hash,
        })
    }

    pub(crate) fn recompute_hash(&self) -> Result<String> {
        Self::compute_hash(&self.previous_hash, self.sequence, &self.id, &self.timestamp, &self.event)
    }

    fn compute_hash(
        previous_hash: &str,
        sequence: u64,
        id: &Uuid,
        timestamp: &DateTime<Utc>,
        event: &AuditEvent,
    ) -> Result<String> {
        let payload = serde_json::to_vec(event)?;

        let mut hasher = Sha256::new();
        hasher.update(previous_hash.as_bytes());
        hasher.update(sequence.to_be_bytes());
        hasher.update(id.as_bytes());
        hasher.update(timestamp.to_rfc3339().as_bytes());
        hasher.update(&payload);

        Ok(format!("{:x}", hasher.finalize()))
    }
}
