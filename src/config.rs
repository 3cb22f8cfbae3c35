use log::info;
use std::path::Path;

use crate::error::{FinancialAnalysisError, Result};
use crate::llm::prompts::PromptTemplate;

pub const API_KEY_VAR: &str = "OPENAI_API_KEY";
pub const MODEL_VAR: &str = "OPENAI_MODEL";
pub const BASE_URL_VAR: &str = "OPENAI_BASE_URL";
pub const PROMPT_FILE_VAR: &str = "ANALYZER_PROMPT_FILE";

pub const DEFAULT_MODEL: &str = "gpt-4";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";

/// Everything the completion client needs. The credential is required up
/// front so a missing key fails at startup, not on the first upload.
#[derive(Clone)]
pub struct AnalyzerConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub temperature: Option<f32>,
    pub prompt: PromptTemplate,
}

impl std::fmt::Debug for AnalyzerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalyzerConfig")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("temperature", &self.temperature)
            .field("prompt", &self.prompt.name)
            .finish()
    }
}

impl AnalyzerConfig {
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(FinancialAnalysisError::MissingCredential(
                API_KEY_VAR.to_string(),
            ));
        }

        Ok(Self {
            api_key,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            temperature: None,
            prompt: PromptTemplate::default(),
        })
    }

    /// Reads the credential and optional overrides from the process environment.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var(API_KEY_VAR)
            .map_err(|_| FinancialAnalysisError::MissingCredential(API_KEY_VAR.to_string()))?;
        let mut config = Self::new(api_key)?;

        if let Some(model) = non_empty_var(MODEL_VAR) {
            config.model = model;
        }
        if let Some(base_url) = non_empty_var(BASE_URL_VAR) {
            config = config.with_base_url(base_url);
        }
        if let Some(path) = non_empty_var(PROMPT_FILE_VAR) {
            config.prompt = PromptTemplate::from_file(Path::new(&path))?;
        }

        info!(
            "Analyzer configured: model={}, endpoint={}, prompt={}",
            config.model, config.base_url, config.prompt.name
        );
        Ok(config)
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_prompt(mut self, prompt: PromptTemplate) -> Self {
        self.prompt = prompt;
        self
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_credential_fails_fast() {
        let err = AnalyzerConfig::new("   ").unwrap_err();
        assert!(
            matches!(err, FinancialAnalysisError::MissingCredential(ref var) if var == "OPENAI_API_KEY")
        );
    }

    #[test]
    fn test_defaults_and_overrides() {
        let config = AnalyzerConfig::new("sk-test")
            .unwrap()
            .with_model("gpt-4o-mini")
            .with_base_url("http://localhost:9000/")
            .with_temperature(0.2);

        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.base_url, "http://localhost:9000");
        assert_eq!(config.temperature, Some(0.2));
        assert_eq!(config.prompt, PromptTemplate::accounting_analyst());
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let config = AnalyzerConfig::new("sk-secret").unwrap();
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("sk-secret"));
        assert!(rendered.contains("gpt-4"));
    }
}
