use parking_lot::RwLock;
use std::collections::VecDeque;
use std::sync::Arc;
use telemetry::{EventSeverity, MetricsCollector};

use crate::entry::{AuditEntry, AuditEvent};
use crate::error::{AuditError, Result};

const GENESIS_HASH: &str = "genesis";

#[derive(Debug)]
struct TrailState {
    entries: VecDeque<AuditEntry>,
    next_sequence: u64,
    last_hash: String,
}

/// Bounded, hash-chained, in-memory audit trail
#[derive(Debug)]
pub struct AuditTrail {
    state: RwLock<TrailState>,
    capacity: usize,
    metrics: Option<Arc<MetricsCollector>>,
}

impl AuditTrail {
    pub fn new(capacity: usize) -> Self {
        Self {
            state: RwLock::new(TrailState {
                entries: VecDeque::with_capacity(capacity.min(1024)),
                next_sequence: 0,
                last_hash: GENESIS_HASH.to_string(),
            }),
            capacity: capacity.max(1),
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<MetricsCollector>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Seal an event into the trail and return the stored entry.
    ///
    /// Returns `None` only if the event payload could not be serialized for
    /// hashing; the failure is logged and auditing never blocks a request.
    pub fn record(&self, event: AuditEvent) -> Option<AuditEntry> {
        let severity = event.severity;
        let event_type = event.event_type;
        let action = event.action.clone();
        let request_id = event.request_id.clone();

        let sealed = {
            let mut state = self.state.write();
            let sealed = AuditEntry::seal(state.next_sequence, event, state.last_hash.clone());
            match sealed {
                Ok(entry) => {
                    state.next_sequence += 1;
                    state.last_hash = entry.hash.clone();
                    if state.entries.len() >= self.capacity {
                        state.entries.pop_front();
                    }
                    state.entries.push_back(entry.clone());
                    Some(entry)
                }
                Err(e) => {
                    tracing::error!(error = %e, action = %action, "Failed to seal audit entry");
                    None
                }
            }
        };

        if let Some(metrics) = &self.metrics {
            metrics.record_audit_event(severity);
        }

        let request_id = request_id.as_deref().unwrap_or("none");
        match severity {
            EventSeverity::Info => {
                tracing::info!(request_id, ?event_type, action = %action, "Audit event")
            }
            EventSeverity::Warning => {
                tracing::warn!(request_id, ?event_type, action = %action, "Audit event")
            }
            EventSeverity::Error => {
                tracing::error!(request_id, ?event_type, action = %action, "Audit event")
            }
        }

        sealed
    }

    pub fn entries(&self) -> Vec<AuditEntry> {
        self.state.read().entries.iter().cloned().collect()
    }

    pub fn entries_for_request(&self, request_id: &str) -> Vec<AuditEntry> {
        self.state
            .read()
            .entries
            .iter()
            .filter(|entry| entry.event.request_id.as_deref() == Some(request_id))
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.state.read().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Verify every retained entry against its own hash and its predecessor.
    ///
    /// The oldest retained entry anchors the chain, entries evicted for
    /// capacity are not required.
    pub fn verify_integrity(&self) -> Result<()> {
        let state = self.state.read();
        let mut expected_previous: Option<&str> = None;

        for entry in &state.entries {
            if let Some(previous) = expected_previous {
                if entry.previous_hash != previous {
                    return Err(AuditError::IntegrityCheckError {
                        sequence: entry.sequence,
                    });
                }
            }
            if entry.recompute_hash()? != entry.hash {
                return Err(AuditError::IntegrityCheckError {
                    sequence: entry.sequence,
                });
            }
            expected_previous = Some(entry.hash.as_str());
        }

        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn tamper<F: FnOnce(&mut AuditEntry)>(&self, index: usize, mutate: F) {
        if let Some(entry) = self.state.write().entries.get_mut(index) {
            mutate(entry);
        }
    }
}
