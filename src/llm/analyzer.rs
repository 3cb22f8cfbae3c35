use log::{info, warn};
use std::sync::Arc;

use crate::config::AnalyzerConfig;
use crate::error::AnalysisError;
use crate::llm::client::{CompletionProvider, OpenAiClient};
use crate::llm::prompts::PromptTemplate;
use crate::schema::AnalysisReport;

/// Sends extracted statements to the completion backend with the analyst prompt.
#[derive(Clone)]
pub struct FinancialAnalyzer {
    provider: Arc<dyn CompletionProvider>,
    prompt: PromptTemplate,
}

impl FinancialAnalyzer {
    pub fn new(provider: Arc<dyn CompletionProvider>, prompt: PromptTemplate) -> Self {
        Self { provider, prompt }
    }

    /// Builds an analyzer backed by the OpenAI client described by `config`.
    pub fn from_config(config: &AnalyzerConfig) -> Self {
        Self::new(Arc::new(OpenAiClient::new(config)), config.prompt.clone())
    }

    pub fn prompt(&self) -> &PromptTemplate {
        &self.prompt
    }

    /// Makes exactly one completion request for `content`.
    pub async fn analyze(&self, content: &str) -> Result<AnalysisReport, AnalysisError> {
        let messages = self.prompt.messages(content);
        info!(
            "Requesting analysis of {} chars with prompt '{}'",
            content.len(),
            self.prompt.name
        );

        let text = self.provider.complete(&messages).await?;
        info!("Analysis received: {} lines", text.split('\n').count());
        Ok(AnalysisReport::new(text))
    }

    /// Like [`analyze`](Self::analyze) but folds a failure into the text
    /// itself, prefixed with `"Erro na análise: "`.
    pub async fn analyze_or_message(&self, content: &str) -> String {
        match self.analyze(content).await {
            Ok(report) => report.text,
            Err(e) => {
                warn!("Analysis failed: {}", e);
                e.user_message()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::types::{ChatMessage, Role};
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingProvider {
        seen: Mutex<Vec<Vec<ChatMessage>>>,
    }

    #[async_trait]
    impl CompletionProvider for RecordingProvider {
        async fn complete(&self, messages: &[ChatMessage]) -> Result<String, AnalysisError> {
            self.seen.lock().unwrap().push(messages.to_vec());
            Ok("Margem bruta: 40%".to_string())
        }
    }

    struct FailingProvider;

    #[async_trait]
    impl CompletionProvider for FailingProvider {
        async fn complete(&self, _messages: &[ChatMessage]) -> Result<String, AnalysisError> {
            Err(AnalysisError::Api {
                status: 503,
                body: "service unavailable".to_string(),
            })
        }
    }

    #[tokio::test]
    async fn test_one_request_with_two_messages() {
        let provider = Arc::new(RecordingProvider::default());
        let analyzer = FinancialAnalyzer::new(provider.clone(), PromptTemplate::default());

        assert_eq!(analyzer.prompt().name, "accounting-analyst");
        let report = analyzer.analyze("Receita: 1000").await.unwrap();
        assert_eq!(report.text, "Margem bruta: 40%");

        let seen = provider.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].len(), 2);
        assert_eq!(seen[0][0].role, Role::System);
        assert!(seen[0][1].content.ends_with("Receita: 1000"));
    }

    #[tokio::test]
    async fn test_failure_is_folded_into_prefixed_text() {
        let analyzer = FinancialAnalyzer::new(Arc::new(FailingProvider), PromptTemplate::default());

        let text = analyzer.analyze_or_message("Receita: 1000").await;
        assert!(text.starts_with("Erro na análise: "));
        assert!(text.contains("503"));

        assert!(analyzer.analyze("Receita: 1000").await.is_err());
    }
}
