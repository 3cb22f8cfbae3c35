use async_trait::async_trait;
use log::debug;
use reqwest::Client;

use crate::config::AnalyzerConfig;
use crate::error::AnalysisError;
use crate::llm::types::*;

/// A backend that turns a list of chat messages into one completion.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, AnalysisError>;
}

/// Client for OpenAI-compatible `/v1/chat/completions` endpoints.
#[derive(Clone)]
pub struct OpenAiClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    temperature: Option<f32>,
}

impl OpenAiClient {
    pub fn new(config: &AnalyzerConfig) -> Self {
        Self {
            client: Client::new(),
            api_key: config.api_key.clone(),
            base_url: config.base_url.clone(),
            model: config.model.clone(),
            temperature: config.temperature,
        }
    }
}

#[async_trait]
impl CompletionProvider for OpenAiClient {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, AnalysisError> {
        let url = format!("{}/v1/chat/completions", self.base_url);
        let payload = ChatCompletionRequest {
            model: &self.model,
            messages,
            temperature: self.temperature,
        };

        debug!(
            "Completion request to {} (model {}, {} messages)",
            url,
            self.model,
            messages.len()
        );

        let res = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await?;
        let status = res.status();

        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(AnalysisError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let body: ChatCompletionResponse = res
            .json()
            .await
            .map_err(|e| AnalysisError::MalformedResponse(e.to_string()))?;

        body.choices
            .into_iter()
            .next()
            .ok_or_else(|| AnalysisError::MalformedResponse("No choices returned".to_string()))?
            .message
            .content
            .ok_or_else(|| {
                AnalysisError::MalformedResponse("Choice has no text content".to_string())
            })
    }
}
