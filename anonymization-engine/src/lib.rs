//! Mandatory anonymization pipeline for medical free text
//!
//! Every text entering the intake gateway passes through the
//! [`AnonymizationOrchestrator`]:
//!
//! 1. An [`EntityDetector`] reports typed, scored character spans. Terms on
//!    the [`AllowList`] (disease and condition names) are never reported.
//! 2. Overlapping spans are merged, each span becomes an [`Entity`] with a
//!    fresh [`EntityId`] and the replacement token of its type.
//! 3. The original text is redacted in a single pass over the original
//!    offsets.
//! 4. Entities scoring below the confidence threshold go to the bounded
//!    [`ReviewQueue`]. A full queue is logged and never blocks redaction.
//!
//! Anonymization cannot be switched off. An orchestrator can only be built
//! from an [`AnonymizationGuarantee`], which is only issued for a config
//! with `enabled = true`, and every entry point re-checks it.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use anonymization_engine::{
//!     AnonymizationConfig, AnonymizationGuarantee, AnonymizationOrchestrator, PatternDetector,
//! };
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let guarantee = AnonymizationGuarantee::verify(&AnonymizationConfig::default())?;
//! let orchestrator = AnonymizationOrchestrator::new(guarantee, Arc::new(PatternDetector::new()))?;
//!
//! let outcome = orchestrator
//!     .process_text("AHV 756.1234.5678.90, Tel. 079 123 45 67")
//!     .await?;
//! assert_eq!(outcome.redacted_text, "AHV [AHV-NUMMER], Tel. [TELEFON]");
//! # Ok(())
//! # }
//! ```

pub mod allow_list;
pub mod detector;
pub mod entity;
pub mod error;
pub mod orchestrator;
pub mod pattern;
pub mod policy;
pub mod queue;
pub mod redaction;

pub use allow_list::*;
pub use detector::*;
pub use entity::*;
pub use error::*;
pub use orchestrator::*;
pub use pattern::*;
pub use policy::*;
pub use queue::*;
pub use redaction::{normalize_spans, redact};
