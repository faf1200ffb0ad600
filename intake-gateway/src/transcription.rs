use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::TranscriptionConfig;
use crate::error::{GatewayError, GatewayResult};

/// Speech-to-text output. Raw transcripts never leave the gateway, they
/// are anonymized before being returned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptionResult {
    pub text: String,
    pub language: String,
    pub duration_seconds: f64,
}

/// Speech-to-text engine
#[async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(&self, audio: &[u8], file_name: &str) -> GatewayResult<TranscriptionResult>;
}

/// Client for a Whisper server exposing the OpenAI-compatible
/// `/v1/audio/transcriptions` endpoint (self-hosted by default)
pub struct WhisperTranscriber {
    client: reqwest::Client,
    config: TranscriptionConfig,
}

#[derive(Deserialize)]
struct VerboseTranscription {
    text: String,
    #[serde(default)]
    language: Option<String>,
    #[serde(default)]
    duration: Option<f64>,
}

impl WhisperTranscriber {
    pub fn new(config: &TranscriptionConfig) -> GatewayResult<Self> {
        Ok(Self {
            client: reqwest::Client::builder().build()?,
            config: config.clone(),
        })
    }
}

#[async_trait]
impl Transcriber for WhisperTranscriber {
    async fn transcribe(&self, audio: &[u8], file_name: &str) -> GatewayResult<TranscriptionResult> {
        if audio.is_empty() {
            return Err(GatewayError::Transcription("Audio payload is empty".to_string()));
        }
        debug!(audio_size = audio.len(), model = %self.config.model, "Transcribing audio");

        let file = reqwest::multipart::Part::bytes(audio.to_vec()).file_name(file_name.to_string());
        let form = reqwest::multipart::Form::new()
            .part("file", file)
            .text("model", self.config.model.clone())
            .text("language", self.config.language.clone())
            .text("response_format", "verbose_json");

        let url = format!("{}/v1/audio/transcriptions", self.config.api_url.trim_end_matches('/'));
        let mut request = self.client.post(url).multipart(form);
        if let Some(key) = self.config.api_key.as_deref() {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::Transcription(format!(
                "Speech-to-text service returned HTTP {}",
                status.as_u16()
            )));
        }

        let body: VerboseTranscription = response.json().await?;
        Ok(TranscriptionResult {
            text: body.text.trim().to_string(),
            language: body.language.unwrap_or_else(|| self.config.language.clone()),
            duration_seconds: body.duration.unwrap_or_default(),
        })
    }
}
