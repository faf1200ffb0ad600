//! Logging for the medical intake gateway
//!
//! Two concerns live here:
//!
//! - **Subscriber bootstrap**: [`init_logging`] installs a `tracing` registry
//!   with an `EnvFilter`, a pretty or Bunyan JSON console layer and an
//!   optional daily-rolling file sink.
//! - **Free-text redaction**: [`PiiRedactor`] scrubs e-mail addresses, Swiss
//!   phone numbers, AHV/insurance numbers and IP addresses from text that has
//!   to be logged but did not go through the anonymization pipeline, such as
//!   error messages returned by AI backends.
//!
//! # Detected Data Types
//!
//! - **Email Addresses**: hans.muster@example.ch → EMAIL[...] or h***@e***
//! - **Phone Numbers**: 079 123 45 67 → PHONE[...] or *** *** ** **
//! - **AHV / insurance numbers**: 756.1234.5678.90 → AHV[...] or ***.****.****.**
//! - **IP Addresses**: 192.168.1.1 → IP[...] or 192.***.***.1
//!
//! # Example
//!
//! ```rust
//! use logger_redacted::{PiiRedactor, RedactionConfig};
//!
//! let redactor = PiiRedactor::new(RedactionConfig::default());
//! let line = redactor.redact("upstream rejected payload for hans.muster@example.ch");
//! assert!(!line.contains("hans.muster"));
//! ```

pub mod config;
pub mod redactor;
pub mod subscriber;

pub use config::*;
pub use redactor::*;
pub use subscriber::*;

#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    #[error("Invalid log filter: {0}")]
    InvalidFilter(String),

    #[error("Logger already initialized: {0}")]
    AlreadyInitialized(String),
}

pub type Result<T> = std::result::Result<T, LoggerError>;
