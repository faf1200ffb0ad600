//! Self-hosted Ollama. Nothing leaves the premises, so results are
//! reported as local processing.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

use super::{build_client, empty_response, send_json};
use crate::analysis::{AnalysisOptions, AnalysisType};
use crate::config::ProviderSettings;
use crate::error::Result;
use crate::provider::{AnalysisProvider, ProviderId};

pub struct LocalProvider {
    client: reqwest::Client,
    settings: ProviderSettings,
}

#[derive(Deserialize)]
struct ChatResponse {
    message: Option<Message>,
}

#[derive(Deserialize)]
struct Message {
    content: String,
}

impl LocalProvider {
    pub fn new(settings: &ProviderSettings) -> Result<Self> {
        Ok(Self {
            client: build_client(ProviderId::Local)?,
            settings: settings.clone(),
        })
    }
}

#[async_trait]
impl AnalysisProvider for LocalProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Local
    }

    async fn analyze(&self, text: &str, analysis_type: AnalysisType, options: &AnalysisOptions) -> Result<String> {
        let model = options.model.as_deref().unwrap_or(&self.settings.model);

        let body = json!({
            "model": model,
            "stream": false,
            "messages": [
                { "role": "system", "content": options.system_prompt(analysis_type) },
                { "role": "user", "content": text },
            ],
            "options": {
                "temperature": options.temperature,
                "num_predict": options.max_tokens,
            },
        });

        debug!(model, analysis_type = %analysis_type, "Calling local Ollama");
        let request = self.client.post(self.settings.endpoint("/api/chat")).json(&body);

        let response: ChatResponse = send_json(self.id(), request).await?;
        response
            .message
            .map(|message| message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| empty_response(self.id()))
    }

    /// Listing installed models is enough to know the daemon is up
    async fn is_available(&self) -> bool {
        match self.client.get(self.settings.endpoint("/api/tags")).send().await {
            Ok(response) if response.status().is_success() => true,
            Ok(response) => {
                warn!(status = response.status().as_u16(), "Ollama probe rejected");
                false
            }
            Err(e) => {
                warn!(error = %e, "Ollama not reachable");
                false
            }
        }
    }
}
