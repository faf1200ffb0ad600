//! Anthropic messages API

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use super::{build_client, empty_response, send_json};
use crate::analysis::{AnalysisOptions, AnalysisType};
use crate::config::ProviderSettings;
use crate::error::Result;
use crate::provider::{AnalysisProvider, ProviderId};

const API_VERSION: &str = "2023-06-01";

pub struct AnthropicProvider {
    client: reqwest::Client,
    settings: ProviderSettings,
}

#[derive(Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

impl AnthropicProvider {
    pub fn new(settings: &ProviderSettings) -> Result<Self> {
        Ok(Self {
            client: build_client(ProviderId::Anthropic)?,
            settings: settings.clone(),
        })
    }
}

#[async_trait]
impl AnalysisProvider for AnthropicProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Anthropic
    }

    async fn analyze(&self, text: &str, analysis_type: AnalysisType, options: &AnalysisOptions) -> Result<String> {
        let api_key = self.settings.require_api_key(self.id())?;
        let model = options.model.as_deref().unwrap_or(&self.settings.model);

        let body = json!({
            "model": model,
            "system": options.system_prompt(analysis_type),
            "max_tokens": options.max_tokens,
            "temperature": options.temperature,
            "messages": [{ "role": "user", "content": text }],
        });

        debug!(model, analysis_type = %analysis_type, "Calling Anthropic");
        let request = self
            .client
            .post(self.settings.endpoint("/v1/messages"))
            .header("x-api-key", api_key)
            .header("anthropic-version", API_VERSION)
            .json(&body);

        let response: MessagesResponse = send_json(self.id(), request).await?;
        let text: String = response
            .content
            .into_iter()
            .filter(|block| block.kind == "text")
            .filter_map(|block| block.text)
            .collect::<Vec<_>>()
            .join("\n");

        if text.trim().is_empty() {
            return Err(empty_response(self.id()));
        }
        Ok(text)
    }
}
