//! Groq adapter, speaking the OpenAI-compatible chat completions protocol.

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::catalog::{ModelDescriptor, Provider};
use crate::config::Config;
use crate::error::GatewayError;
use crate::types::GenerationRequest;

use super::{ProviderAdapter, error_message_from_body};

/// Chat-style completion against Groq's `/chat/completions` endpoint.
#[derive(Clone)]
pub struct GroqAdapter {
    api_key: SecretString,
    base_url: String,
    http_client: HttpClient,
}

impl GroqAdapter {
    pub fn new(api_key: SecretString, base_url: impl Into<String>, http_client: HttpClient) -> Self {
        Self {
            api_key,
            base_url: base_url.into(),
            http_client,
        }
    }

    /// Build from configuration; fails when the credential is absent.
    pub fn from_config(config: &Config, http_client: HttpClient) -> Result<Self, GatewayError> {
        let api_key = config
            .groq_api_key
            .clone()
            .ok_or(GatewayError::MissingCredential("GROQ_API_KEY"))?;
        Ok(Self::new(api_key, config.groq_base_url.clone(), http_client))
    }

    fn build_request_body(model: &str, request: &GenerationRequest) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: model.to_string(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: request.prompt.clone(),
            }],
            max_tokens: request.max_output_tokens,
            temperature: request.temperature,
            top_p: request.top_p,
        }
    }
}

#[async_trait]
impl ProviderAdapter for GroqAdapter {
    fn provider(&self) -> Provider {
        Provider::Groq
    }

    async fn invoke(
        &self,
        model: &ModelDescriptor,
        request: &GenerationRequest,
    ) -> Result<String, GatewayError> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = Self::build_request_body(model.name, request);

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(self.api_key.expose_secret())
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Api {
                status: status.as_u16(),
                message: error_message_from_body(&body),
            });
        }

        let parsed: ChatCompletionResponse = response.json().await?;
        let text = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default();

        if text.is_empty() {
            return Err(GatewayError::EmptyResponse);
        }
        Ok(text)
    }
}

/// OpenAI-compatible chat completion request body.
#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    pub temperature: f64,
    pub top_p: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

/// The fields we consume from a chat completion response.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Choice {
    pub message: ResponseMessage,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResponseMessage {
    pub content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_body_matches_the_chat_shape() {
        let request = GenerationRequest::new("ping").with_temperature(0.2);
        let body = GroqAdapter::build_request_body("llama-3.3-70b-versatile", &request);
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(
            value,
            json!({
                "model": "llama-3.3-70b-versatile",
                "messages": [{"role": "user", "content": "ping"}],
                "max_tokens": 2500,
                "temperature": 0.2,
                "top_p": 0.9
            })
        );
    }

    #[test]
    fn response_parses_official_shape() {
        let raw = json!({
            "id": "chatcmpl-123",
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": "{\"ok\": true}"},
                "finish_reason": "stop"
            }],
            "usage": {"prompt_tokens": 4, "completion_tokens": 6}
        });
        let parsed: ChatCompletionResponse = serde_json::from_value(raw).unwrap();
        assert_eq!(
            parsed.choices[0].message.content.as_deref(),
            Some("{\"ok\": true}")
        );
    }
}
