//! OpenAI chat completions

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use super::{build_client, empty_response, send_json};
use crate::analysis::{AnalysisOptions, AnalysisType};
use crate::config::ProviderSettings;
use crate::error::Result;
use crate::provider::{AnalysisProvider, ProviderId};

pub struct OpenAiProvider {
    client: reqwest::Client,
    settings: ProviderSettings,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Deserialize)]
struct Message {
    content: Option<String>,
}

impl OpenAiProvider {
    pub fn new(settings: &ProviderSettings) -> Result<Self> {
        Ok(Self {
            client: build_client(ProviderId::OpenAi)?,
            settings: settings.clone(),
        })
    }
}

#[async_trait]
impl AnalysisProvider for OpenAiProvider {
    fn id(&self) -> ProviderId {
        ProviderId::OpenAi
    }

    async fn analyze(&self, text: &str, analysis_type: AnalysisType, options: &AnalysisOptions) -> Result<String> {
        let api_key = self.settings.require_api_key(self.id())?;
        let model = options.model.as_deref().unwrap_or(&self.settings.model);

        let body = json!({
            "model": model,
            "messages": [
                { "role": "system", "content": options.system_prompt(analysis_type) },
                { "role": "user", "content": text },
            ],
            "temperature": options.temperature,
            "max_tokens": options.max_tokens,
        });

        debug!(model, analysis_type = %analysis_type, "Calling OpenAI");
        let request = self
            .client
            .post(self.settings.endpoint("/v1/chat/completions"))
            .bearer_auth(api_key)
            .json(&body);

        let response: ChatResponse = send_json(self.id(), request).await?;
        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| empty_response(self.id()))
    }
}
