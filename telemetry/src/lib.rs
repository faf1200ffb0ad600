//! Metrics collection for the medical intake gateway
//!
//! The [`MetricsCollector`] is shared by the anonymization pipeline and the
//! provider chain. It keeps five counter groups:
//!
//! - **Requests**: total requests handled and uptime
//! - **Providers**: request/success/failure counts and running average
//!   latency per AI backend, with its cloud/local flag
//! - **Anonymization**: detected entities, entities pending and resolved
//!   review, running average confidence, per-type counts
//! - **Dialect**: Swiss German detection outcomes
//! - **Audit**: audit events by severity
//!
//! Readers only ever receive owned copies ([`MetricsSnapshot`] and the group
//! structs), so an in-flight read can never observe a half-applied update.
//! Every recording is also forwarded to the `metrics` facade so a Prometheus
//! exporter installed with [`install_prometheus_exporter`] can scrape it.
//!
//! # Example
//!
//! ```rust
//! use telemetry::{EventSeverity, MetricsCollector};
//!
//! let metrics = MetricsCollector::new();
//! metrics.record_request();
//! metrics.record_provider_request("openai", false, 120.0, true);
//! metrics.record_provider_request("local", true, 480.0, false);
//! metrics.record_audit_event(EventSeverity::Warning);
//!
//! let snapshot = metrics.snapshot();
//! assert_eq!(snapshot.requests.total_requests, 1);
//! assert_eq!(snapshot.providers["openai"].failure_count, 1);
//! assert_eq!(snapshot.audit.warning_events, 1);
//! ```

pub mod collector;
pub mod error;
pub mod exporter;
pub mod snapshot;

pub use collector::*;
pub use error::*;
pub use exporter::*;
pub use snapshot::*;
