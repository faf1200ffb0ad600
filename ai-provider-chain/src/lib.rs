//! AI analysis backends with ordered fallback
//!
//! Analysis requests on already anonymized text are served by one of
//! several interchangeable [`AnalysisProvider`]s. The [`ProviderChain`]
//! calls the default provider first and falls back through the configured
//! list in declared order, once per provider, until one answers.
//!
//! - Every attempt, failed or not, is recorded in the shared
//!   [`telemetry::MetricsCollector`] with its latency and cloud/local flag.
//! - Each call is bounded by the chain timeout. A timeout counts as a
//!   provider failure.
//! - The result of the winning provider always carries the disclaimer for
//!   its [`AnalysisType`], attached exactly once.
//! - When every provider fails, [`ProviderError::Exhausted`] names each
//!   attempted provider and the first failure.
//!
//! Providers are built from a [`ProviderRegistry`], a static table from
//! [`ProviderId`] to constructor.
//!
//! # Example
//!
//! ```rust,no_run
//! use ai_provider_chain::{
//!     AnalysisOptions, AnalysisType, ProviderChain, ProviderChainConfig, ProviderRegistry,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ProviderChainConfig::default();
//! let chain = ProviderChain::from_config(&config, &ProviderRegistry::builtin())?;
//!
//! let result = chain
//!     .analyze("[PERSON] klagt über Kopfschmerzen", AnalysisType::ExtractSymptoms, &AnalysisOptions::default())
//!     .await?;
//! println!("{} (via {}, cloud: {})", result.text, result.provider, result.is_cloud);
//! # Ok(())
//! # }
//! ```

pub mod adapters;
pub mod analysis;
pub mod chain;
pub mod config;
pub mod error;
pub mod provider;
pub mod registry;

pub use analysis::*;
pub use chain::*;
pub use config::*;
pub use error::*;
pub use provider::*;
pub use registry::*;
