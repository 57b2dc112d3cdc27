use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

use crate::service::normalize::{ExtractionRecord, normalize};
use crate::service::prompts::{SYSTEM_PROMPT, extraction_prompt};

#[derive(Debug)]
pub enum ExtractionError {
    RequestError(String),
    ApiError(String),
    ParseError(String),
}

impl std::fmt::Display for ExtractionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExtractionError::RequestError(msg) => write!(f, "Request error: {}", msg),
            ExtractionError::ApiError(msg) => write!(f, "API error: {}", msg),
            ExtractionError::ParseError(msg) => write!(f, "Parse error: {}", msg),
        }
    }
}

impl std::error::Error for ExtractionError {}

pub struct LlmClientConfig {
    pub api_url: String,
    pub api_key: String,
    pub model: String,
    pub timeout_secs: u64,
}

impl LlmClientConfig {
    /// Fills in defaults for anything the environment leaves unset.
    fn resolve(api_url: Option<String>, api_key: Option<String>, model: Option<String>) -> Self {
        Self {
            api_url: api_url
                .unwrap_or_else(|| "https://api.openai.com/v1/chat/completions".to_string()),
            api_key: api_key.unwrap_or_default(),
            model: model.unwrap_or_else(|| "gpt-4o-mini".to_string()),
            timeout_secs: 120,
        }
    }
}

impl Default for LlmClientConfig {
    fn default() -> Self {
        Self::resolve(
            env::var("LLM_API_URL").ok(),
            env::var("OPENAI_API_KEY").ok(),
            env::var("LLM_MODEL").ok(),
        )
    }
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: String,
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    response_format: ResponseFormat,
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessageContent,
}

#[derive(Deserialize)]
struct ChatMessageContent {
    content: String,
}

/// Seam for document/clause extraction so handlers can run against a stub
/// instead of a live completion endpoint.
#[async_trait]
pub trait ClauseExtractor: Send + Sync {
    async fn extract(&self, pdf_text: &str) -> Result<ExtractionRecord, ExtractionError>;
}

/// Extraction backed by an OpenAI-style chat-completions endpoint. One
/// request per call, JSON-object response format, zero temperature. No
/// retries: any transport, API, or decode failure is terminal.
pub struct OpenAiExtractor {
    client: Client,
    config: LlmClientConfig,
}

impl OpenAiExtractor {
    pub fn new(config: LlmClientConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { client, config })
    }

    pub fn from_env() -> Result<Self, reqwest::Error> {
        Self::new(LlmClientConfig::default())
    }
}

#[async_trait]
impl ClauseExtractor for OpenAiExtractor {
    async fn extract(&self, pdf_text: &str) -> Result<ExtractionRecord, ExtractionError> {
        let request = ChatRequest {
            model: self.config.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: extraction_prompt(pdf_text),
                },
            ],
            response_format: ResponseFormat {
                format_type: "json_object".to_string(),
            },
            temperature: 0.0,
        };

        let response = self
            .client
            .post(&self.config.api_url)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| ExtractionError::RequestError(e.without_url().to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ExtractionError::ApiError(format!("{}: {}", status, body)));
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| ExtractionError::ParseError(e.without_url().to_string()))?;

        let content = chat_response
            .choices
            .first()
            .map(|choice| choice.message.content.as_str())
            .ok_or_else(|| ExtractionError::ApiError("No choices in response".to_string()))?;

        parse_extraction(content)
    }
}

/// Decodes the model's message content as JSON and normalizes it into the
/// guaranteed record shape.
fn parse_extraction(content: &str) -> Result<ExtractionRecord, ExtractionError> {
    let raw: serde_json::Value = serde_json::from_str(content)
        .map_err(|e| ExtractionError::ParseError(format!("Invalid JSON from model: {}", e)))?;

    Ok(normalize(&raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_normalizes_model_content() {
        let content = r#"{
            "document": { "title": "X" },
            "clauses": []
        }"#;

        let record = parse_extraction(content).expect("valid content");
        assert_eq!(record.document.title.as_deref(), Some("X"));
        assert_eq!(record.document.document_type, None);
        assert_eq!(record.document.effective_date, None);
        assert!(record.clauses.is_empty());
    }

    #[test]
    fn non_json_content_is_a_parse_error() {
        let result = parse_extraction("Sure! Here is the extraction you asked for:");
        assert!(matches!(result, Err(ExtractionError::ParseError(_))));
    }

    #[test]
    fn config_defaults_fill_in_endpoint_and_model() {
        let config = LlmClientConfig::resolve(None, None, None);

        assert_eq!(config.api_url, "https://api.openai.com/v1/chat/completions");
        assert_eq!(config.api_key, "");
        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.timeout_secs, 120);
    }

    #[test]
    fn config_env_values_override_defaults() {
        let config = LlmClientConfig::resolve(
            Some("http://localhost:11434/v1/chat/completions".to_string()),
            Some("secret".to_string()),
            Some("llama3".to_string()),
        );

        assert_eq!(config.api_url, "http://localhost:11434/v1/chat/completions");
        assert_eq!(config.api_key, "secret");
        assert_eq!(config.model, "llama3");

        let extractor = OpenAiExtractor::new(config).expect("build client");
        assert_eq!(extractor.config.model, "llama3");
    }
}
