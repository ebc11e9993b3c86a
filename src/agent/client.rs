//! Chat-completions client for JSON-mode auditing.
//!
//! Speaks the OpenAI-compatible `/chat/completions` protocol (Groq by
//! default) and always requests a JSON object response.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Failure of a chat-completions call.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Request timed out after {0}s")]
    Timeout(u64),

    #[error("Cannot connect to LLM endpoint at {0}")]
    Connect(String),

    #[error("Model failed to produce valid JSON: {0}")]
    InvalidJson(String),

    #[error("Rate limited by LLM provider")]
    RateLimited,

    #[error("LLM API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("LLM returned an empty response")]
    EmptyResponse,

    #[error("Failed to parse LLM response: {0}")]
    Parse(String),

    #[error("Failed to send request: {0}")]
    Request(String),
}

/// Configuration for the chat client.
#[derive(Debug, Clone)]
pub struct ChatConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub model_name: String,
    pub timeout_seconds: u64,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.groq.com/openai/v1".to_string(),
            api_key: None,
            model_name: "llama-3.3-70b-versatile".to_string(),
            timeout_seconds: 120,
        }
    }
}

/// Message in the chat history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: &str) -> Self {
        Self {
            role: "system".to_string(),
            content: content.to_string(),
        }
    }

    pub fn user(content: &str) -> Self {
        Self {
            role: "user".to_string(),
            content: content.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

/// Chat-completions request body.
#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    response_format: ResponseFormat,
}

/// Chat-completions response body.
#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// The chat-completions client.
#[derive(Clone)]
pub struct ChatClient {
    config: ChatConfig,
    http_client: reqwest::Client,
}

impl ChatClient {
    /// Create a new client.
    pub fn new(config: ChatConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .context("Failed to create LLM HTTP client")?;

        Ok(Self {
            config,
            http_client,
        })
    }

    pub fn model_name(&self) -> &str {
        &self.config.model_name
    }

    /// Send a system + user prompt and parse the reply as a JSON value.
    pub async fn complete_json(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        temperature: f32,
    ) -> Result<Value, LlmError> {
        let url = format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        );

        let request = ChatRequest {
            model: self.config.model_name.clone(),
            messages: vec![ChatMessage::system(system_prompt), ChatMessage::user(user_prompt)],
            temperature,
            response_format: ResponseFormat {
                kind: "json_object",
            },
        };

        debug!(
            "Sending chat request to {} ({} prompt chars)",
            url,
            user_prompt.len()
        );

        let mut builder = self.http_client.post(&url).json(&request);
        if let Some(key) = self.config.api_key.as_deref().filter(|k| !k.is_empty()) {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                LlmError::Timeout(self.config.timeout_seconds)
            } else if e.is_connect() {
                LlmError::Connect(self.config.base_url.clone())
            } else {
                LlmError::Request(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_failure(status.as_u16(), body));
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Parse(e.to_string()))?;

        let content = chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or(LlmError::EmptyResponse)?;

        parse_json_content(&content)
    }
}

/// Map an error status to the matching variant.
fn classify_failure(status: u16, body: String) -> LlmError {
    match status {
        429 => LlmError::RateLimited,
        400 => LlmError::InvalidJson(body),
        _ if body.contains("json_validate_failed") => LlmError::InvalidJson(body),
        _ => LlmError::Api { status, body },
    }
}

/// Parse a JSON object from model output, tolerating surrounding prose or fences.
pub fn parse_json_content(content: &str) -> Result<Value, LlmError> {
    let trimmed = content.trim();
    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        return Ok(value);
    }

    match (trimmed.find('{'), trimmed.rfind('}')) {
        (Some(start), Some(end)) if start < end => {
            serde_json::from_str::<Value>(&trimmed[start..=end])
                .map_err(|e| LlmError::Parse(e.to_string()))
        }
        _ => Err(LlmError::Parse("no JSON object in response".to_string())),
    }
}
