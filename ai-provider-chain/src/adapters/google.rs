//! Google Gemini generateContent

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use super::{build_client, empty_response, send_json};
use crate::analysis::{AnalysisOptions, AnalysisType};
use crate::config::ProviderSettings;
use crate::error::Result;
use crate::provider::{AnalysisProvider, ProviderId};

pub struct GoogleProvider {
    client: reqwest::Client,
    settings: ProviderSettings,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Content,
}

#[derive(Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

impl GoogleProvider {
    pub fn new(settings: &ProviderSettings) -> Result<Self> {
        Ok(Self {
            client: build_client(ProviderId::Google)?,
            settings: settings.clone(),
        })
    }
}

#[async_trait]
impl AnalysisProvider for GoogleProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Google
    }

    async fn analyze(&self, text: &str, analysis_type: AnalysisType, options: &AnalysisOptions) -> Result<String> {
        let api_key = self.settings.require_api_key(self.id())?;
        let model = options.model.as_deref().unwrap_or(&self.settings.model);

        let body = json!({
            "systemInstruction": { "parts": [{ "text": options.system_prompt(analysis_type) }] },
            "contents": [{ "role": "user", "parts": [{ "text": text }] }],
            "generationConfig": {
                "temperature": options.temperature,
                "maxOutputTokens": options.max_tokens,
            },
        });

        debug!(model, analysis_type = %analysis_type, "Calling Google Gemini");
        let request = self
            .client
            .post(self.settings.endpoint(&format!("/v1beta/models/{}:generateContent", model)))
            .header("x-goog-api-key", api_key)
            .json(&body);

        let response: GenerateResponse = send_json(self.id(), request).await?;
        let text: String = response
            .candidates
            .into_iter()
            .next()
            .map(|candidate| {
                candidate
                    .content
                    .parts
                    .into_iter()
                    .filter_map(|part| part.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(empty_response(self.id()));
        }
        Ok(text)
    }
}
