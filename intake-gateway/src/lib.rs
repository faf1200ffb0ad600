//! Intake gateway for clinical text and dictation.
//!
//! Every piece of text that enters the gateway, typed or transcribed, is
//! run through the anonymization orchestrator before it is returned,
//! logged in any form or forwarded to an AI provider. Analysis requests
//! go through the provider chain, which falls back across the configured
//! providers in order and always attaches the medical disclaimer.
//!
//! # Example
//!
//! ```rust,no_run
//! use ai_provider_chain::{AnalysisOptions, AnalysisType};
//! use intake_gateway::{GatewayConfig, IntakeService};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = GatewayConfig::from_env()?;
//! let service = IntakeService::builder(config).build()?;
//!
//! let anonymized = service
//!     .process_text("Herr Meier, AHV 756.1234.5678.97, klagt über Fieber.")
//!     .await?;
//! println!("{}", anonymized.outcome.redacted_text);
//!
//! let analysis = service
//!     .analyze("Patient mit Husten seit 3 Tagen", AnalysisType::ExtractSymptoms, AnalysisOptions::default())
//!     .await?;
//! println!("{} via {}", analysis.result.text, analysis.result.provider);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod dialect;
pub mod error;
pub mod runtime;
pub mod service;
pub mod transcription;

pub use config::*;
pub use dialect::*;
pub use error::*;
pub use runtime::*;
pub use service::*;
pub use transcription::*;
