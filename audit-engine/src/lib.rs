//! Audit trail for the medical intake gateway
//!
//! Every anonymization run, review decision, provider fallback and chain
//! exhaustion is appended to an [`AuditTrail`]. The trail lives in memory
//! only and is bounded; the oldest entries are dropped once it is full.
//!
//! Entries are hash-chained: each entry stores the SHA-256 of its
//! predecessor and its own hash over `(previous_hash, sequence, payload)`,
//! so [`AuditTrail::verify_integrity`] detects any entry that was altered
//! after the fact. Each append also bumps the audit severity counters of
//! the shared [`telemetry::MetricsCollector`].
//!
//! Entity original text never enters the trail. Callers record identifiers,
//! types and counts only.
//!
//! # Example
//!
//! ```rust
//! use audit_engine::{AuditEvent, AuditEventType, AuditTrail};
//! use serde_json::json;
//!
//! let trail = AuditTrail::new(100);
//! trail.record(
//!     AuditEvent::new(AuditEventType::ReviewDecision, "entity_approved")
//!         .with_request_id("req_42")
//!         .with_data(json!({ "entity_id": "3f1c", "entity_type": "PERSON" })),
//! );
//!
//! assert_eq!(trail.len(), 1);
//! assert!(trail.verify_integrity().is_ok());
//! ```

pub mod entry;
pub mod error;
pub mod trail;

pub use entry::*;
pub use error::*;
pub use trail::*;
pub use telemetry::EventSeverity;
