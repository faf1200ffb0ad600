//! Common error handling utilities for the medical intake gateway
//!
//! Every library crate in the workspace owns its own error enum. None of
//! those types cross the gateway boundary: the gateway converts them into
//! [`IntakeError`], logs them with a stable request identifier through the
//! [`ErrorReporter`], and only then hands them to the caller.
//!
//! # Error Categories
//!
//! - **Fatal**: anonymization disabled, detection engine unreachable. The
//!   request is aborted, partially redacted text is never returned.
//! - **Capacity**: review queue full. Logged only, never surfaced.
//! - **Not found**: review decision for an unknown entity. Modelled as an
//!   absent value by the callers, not as an error.
//! - **Provider**: the whole provider chain was exhausted. Aggregates every
//!   attempted provider and the originating failure.
//! - **Configuration** and **Validation**: rejected settings or input.
//!
//! # Example
//!
//! ```rust
//! use error_common::{ErrorContext, ErrorReporter, IntakeError};
//!
//! let context = ErrorContext::for_request("req_42");
//! let error = IntakeError::DetectionFailed("engine offline".to_string());
//!
//! let response = ErrorReporter::new().report(&context, &error);
//! assert_eq!(response.code, error_common::codes::anonymization::DETECTION_FAILED);
//! assert_eq!(response.request_id.as_deref(), Some("req_42"));
//! ```

pub mod codes;
pub mod context;
pub mod reporting;
pub mod types;

pub use context::*;
pub use reporting::*;
pub use types::*;
