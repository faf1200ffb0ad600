use ai_provider_chain::{ProviderChainConfig, ProviderId, DEFAULT_PROVIDER_TIMEOUT_SECS};
use anonymization_engine::{AnonymizationConfig, EntityType, DEFAULT_TOKEN_KEY};
use logger_redacted::LoggerConfig;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

use crate::error::{GatewayError, GatewayResult};

pub const DEFAULT_WORKER_THREADS: usize = 4;
pub const DEFAULT_DETECTION_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_AUDIT_TRAIL_CAPACITY: usize = 1000;

/// Swiss German detection thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DialectConfig {
    pub enabled: bool,
    pub min_confidence: f64,
    pub min_matches: usize,
}

impl Default for DialectConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            min_confidence: 0.7,
            min_matches: 2,
        }
    }
}

/// Whisper-compatible speech-to-text endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptionConfig {
    pub api_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub language: String,
}

impl Default for TranscriptionConfig {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:8000".to_string(),
            api_key: None,
            model: "whisper-1".to_string(),
            language: "de".to_string(),
        }
    }
}

/// Gateway configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewayConfig {
    pub anonymization: AnonymizationConfig,
    pub providers: ProviderChainConfig,
    pub dialect: DialectConfig,
    pub transcription: TranscriptionConfig,
    pub worker_threads: usize,
    pub detection_timeout_secs: u64,
    pub audit_trail_capacity: usize,
    /// Prometheus scrape endpoint, off when unset
    pub metrics_listen_address: Option<SocketAddr>,
    pub logging: LoggerConfig,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            anonymization: AnonymizationConfig::default(),
            providers: ProviderChainConfig::default(),
            dialect: DialectConfig::default(),
            transcription: TranscriptionConfig::default(),
            worker_threads: DEFAULT_WORKER_THREADS,
            detection_timeout_secs: DEFAULT_DETECTION_TIMEOUT_SECS,
            audit_trail_capacity: DEFAULT_AUDIT_TRAIL_CAPACITY,
            metrics_listen_address: None,
            logging: LoggerConfig::default(),
        }
    }
}

fn env_prefix(id: ProviderId) -> &'static str {
    match id {
        ProviderId::OpenAi => "OPENAI",
        ProviderId::Anthropic => "ANTHROPIC",
        ProviderId::Google => "GOOGLE",
        ProviderId::Local => "OLLAMA",
    }
}

impl GatewayConfig {
    /// Load configuration from environment variables, after reading an
    /// optional `.env` file
    pub fn from_env() -> GatewayResult<Self> {
        dotenvy::dotenv().ok();
        let mut config = Self::from_lookup(|key| std::env::var(key).ok())?;
        config.logging = LoggerConfig::from_env();
        Ok(config)
    }

    /// Build the configuration from any key/value source
    pub fn from_lookup<F>(lookup: F) -> GatewayResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let parsed = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        // Anything but an explicit "true" switches anonymization off, which
        // validation then rejects.
        let enabled = parsed("ANONYMIZATION_ENABLED")
            .map(|value| value.trim().eq_ignore_ascii_case("true"))
            .unwrap_or(true);

        let confidence_threshold = parsed("ANONYMIZATION_CONFIDENCE_THRESHOLD")
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(defaults.anonymization.confidence_threshold);

        let review_queue_capacity = parsed("ANONYMIZATION_REVIEW_QUEUE_SIZE")
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(defaults.anonymization.review_queue_capacity);

        let mut replacement_tokens = defaults.anonymization.replacement_tokens.clone();
        let labels = EntityType::ALL
            .iter()
            .map(|t| t.as_str())
            .chain(std::iter::once(DEFAULT_TOKEN_KEY));
        for label in labels {
            if let Some(token) = parsed(&format!("ANONYMIZATION_TOKEN_{}", label)) {
                replacement_tokens.insert(label.to_string(), token);
            }
        }

        let anonymization = AnonymizationConfig {
            enabled,
            confidence_threshold,
            review_queue_capacity,
            replacement_tokens,
            ..defaults.anonymization
        };

        let mut providers = ProviderChainConfig::default();
        if let Some(value) = parsed("DEFAULT_PROVIDER") {
            providers.default_provider = value
                .parse()
                .map_err(|e: ai_provider_chain::ProviderError| GatewayError::Config(e.to_string()))?;
        }
        if let Some(value) = lookup("FALLBACK_PROVIDERS") {
            providers.fallback_providers =
                ProviderId::parse_list(&value).map_err(|e| GatewayError::Config(e.to_string()))?;
        }
        providers.timeout_secs = parsed("PROVIDER_TIMEOUT_SECS")
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(DEFAULT_PROVIDER_TIMEOUT_SECS);
        for id in ProviderId::ALL {
            let prefix = env_prefix(id);
            let settings = providers.settings_mut(id);
            if let Some(key) = parsed(&format!("{}_API_KEY", prefix)) {
                settings.api_key = Some(key);
            }
            if let Some(url) = parsed(&format!("{}_BASE_URL", prefix)) {
                settings.base_url = url;
            }
            if let Some(model) = parsed(&format!("{}_MODEL", prefix)) {
                settings.model = model;
            }
        }

        let dialect = DialectConfig {
            enabled: parsed("SWISS_GERMAN_ENABLED")
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(defaults.dialect.enabled),
            min_confidence: parsed("SWISS_GERMAN_MIN_CONFIDENCE")
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(defaults.dialect.min_confidence),
            min_matches: parsed("SWISS_GERMAN_MIN_MATCHES")
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(defaults.dialect.min_matches),
        };

        let transcription = TranscriptionConfig {
            api_url: parsed("WHISPER_API_URL").unwrap_or(defaults.transcription.api_url),
            api_key: parsed("WHISPER_API_KEY"),
            model: parsed("WHISPER_MODEL").unwrap_or(defaults.transcription.model),
            language: parsed("WHISPER_LANGUAGE").unwrap_or(defaults.transcription.language),
        };

        let metrics_listen_address = parsed("METRICS_LISTEN_ADDR")
            .map(|value| {
                value
                    .trim()
                    .parse::<SocketAddr>()
                    .map_err(|e| GatewayError::Config(format!("Invalid METRICS_LISTEN_ADDR '{}': {}", value, e)))
            })
            .transpose()?;

        let config = Self {
            anonymization,
            providers,
            dialect,
            transcription,
            worker_threads: parsed("WORKER_THREADS")
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(defaults.worker_threads),
            detection_timeout_secs: parsed("DETECTION_TIMEOUT_SECS")
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(defaults.detection_timeout_secs),
            audit_trail_capacity: parsed("AUDIT_TRAIL_CAPACITY")
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(defaults.audit_trail_capacity),
            metrics_listen_address,
            logging: defaults.logging,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> GatewayResult<()> {
        self.anonymization.validate()?;
        self.providers.validate()?;

        if !(0.0..=1.0).contains(&self.dialect.min_confidence) {
            return Err(GatewayError::Config(format!(
                "SWISS_GERMAN_MIN_CONFIDENCE must be within [0, 1], got {}",
                self.dialect.min_confidence
            )));
        }
        if self.worker_threads == 0 {
            return Err(GatewayError::Config("WORKER_THREADS must be greater than zero".to_string()));
        }
        if self.detection_timeout_secs == 0 {
            return Err(GatewayError::Config(
                "DETECTION_TIMEOUT_SECS must be greater than zero".to_string(),
            ));
        }
        if self.audit_trail_capacity == 0 {
            return Err(GatewayError::Config(
                "AUDIT_TRAIL_CAPACITY must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
