//! OpenAI chat-completions client
//!
//! The model is steered purely through the textual action protocol, so the
//! request carries no function-calling fields and temperature is pinned to
//! zero for deterministic sampling.
//! Uses a long-lived reqwest::Client for connection pooling.

use crate::config::AgentConfig;
use crate::error::AgentError;
use crate::models::Message;
use crate::Result;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error};

/// The single external boundary of the control loop: one synchronous
/// round-trip per turn, full transcript in, one assistant message out.
#[async_trait::async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete(&self, messages: &[Message]) -> Result<String>;
}

/// Reusable OpenAI client (connection-pooled)
pub struct OpenAiClient {
    client: Client,
    api_key: String,
    model: String,
    url: String,
}

impl OpenAiClient {
    pub fn new(config: &AgentConfig) -> Result<Self> {
        let client = Client::builder()
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(8)
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            url: format!("{}/chat/completions", config.base_url),
        })
    }
}

#[async_trait::async_trait]
impl CompletionBackend for OpenAiClient {
    async fn complete(&self, messages: &[Message]) -> Result<String> {
        if self.api_key.is_empty() {
            return Err(AgentError::Config(
                "OPENAI_API_KEY not configured".to_string(),
            ));
        }

        let request = ChatRequest {
            model: self.model.clone(),
            temperature: 0.0,
            messages: messages.iter().map(ChatMessage::from).collect(),
        };

        debug!(model = %self.model, transcript_len = messages.len(), "Calling OpenAI API");

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                error!("OpenAI API request failed: {}", e);
                AgentError::Llm(format!("OpenAI API error: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            error!(%status, "OpenAI API error response: {}", error_text);
            return Err(AgentError::Llm(format!(
                "OpenAI API returned {}: {}",
                status, error_text
            )));
        }

        let completion: ChatResponse = response.json().await.map_err(|e| {
            error!("Failed to parse OpenAI response: {}", e);
            AgentError::Llm(format!("OpenAI parse error: {}", e))
        })?;

        let choice = completion
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AgentError::Llm("No choices in OpenAI response".to_string()))?;

        Ok(choice.message.content)
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    temperature: f32,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

impl From<&Message> for ChatMessage {
    fn from(message: &Message) -> Self {
        Self {
            role: message.role.to_string(),
            content: message.content.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;

    #[test]
    fn test_request_serialization() {
        let messages = vec![
            Message::system("You are a personal finance assistant"),
            Message::user("What did I spend on food?"),
        ];

        let request = ChatRequest {
            model: "gpt-4o-mini".to_string(),
            temperature: 0.0,
            messages: messages.iter().map(ChatMessage::from).collect(),
        };

        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains("\"temperature\":0.0"));
        assert!(json.contains("What did I spend on food?"));
        assert!(json.contains("\"role\":\"system\""));
    }

    #[test]
    fn test_response_deserialization() {
        let body = r#"{
            "choices": [
                {"message": {"role": "assistant", "content": "Answer: 42."}}
            ]
        }"#;

        let parsed: ChatResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.choices[0].message.content, "Answer: 42.");
    }

    #[test]
    fn test_role_serializes_lowercase() {
        assert_eq!(Role::Assistant.to_string(), "assistant");
    }
}
