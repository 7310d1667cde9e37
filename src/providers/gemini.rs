//! Google Generative Language API adapter (`generateContent`).
//!
//! Wire types follow the official API reference:
//! <https://ai.google.dev/api/generate-content>

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::catalog::{ModelDescriptor, Provider};
use crate::config::Config;
use crate::error::GatewayError;
use crate::types::GenerationRequest;

use super::{ProviderAdapter, error_message_from_body};

/// Single-turn prompt completion against the Gemini API.
#[derive(Clone)]
pub struct GeminiAdapter {
    api_key: SecretString,
    base_url: String,
    http_client: HttpClient,
}

impl GeminiAdapter {
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
            .gemini_api_key
            .clone()
            .ok_or(GatewayError::MissingCredential("GEMINI_API_KEY"))?;
        Ok(Self::new(api_key, config.gemini_base_url.clone(), http_client))
    }

    fn build_request_body(request: &GenerationRequest) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: request.prompt.clone(),
                }],
            }],
            generation_config: Some(GenerationConfig {
                temperature: Some(request.temperature),
                top_p: Some(request.top_p),
                max_output_tokens: Some(request.max_output_tokens as i32),
            }),
        }
    }
}

#[async_trait]
impl ProviderAdapter for GeminiAdapter {
    fn provider(&self) -> Provider {
        Provider::Google
    }

    async fn invoke(
        &self,
        model: &ModelDescriptor,
        request: &GenerationRequest,
    ) -> Result<String, GatewayError> {
        let url = format!("{}/models/{}:generateContent", self.base_url, model.name);
        let body = Self::build_request_body(request);

        let response = self
            .http_client
            .post(&url)
            .header("x-goog-api-key", self.api_key.expose_secret())
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

        let parsed: GenerateContentResponse = response.json().await?;
        let text = parsed
            .candidates
            .into_iter()
            .next()
            .map(|candidate| {
                candidate
                    .content
                    .parts
                    .into_iter()
                    .map(|part| part.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if text.is_empty() {
            return Err(GatewayError::EmptyResponse);
        }
        Ok(text)
    }
}

/// Gemini `generateContent` request body.
#[derive(Debug, Clone, Serialize)]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none", rename = "generationConfig")]
    pub generation_config: Option<GenerationConfig>,
}

/// A single conversation turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

/// One content part. Only text parts are produced or consumed here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Part {
    #[serde(default)]
    pub text: String,
}

/// Sampling controls for a `generateContent` call.
#[derive(Debug, Clone, Default, Serialize)]
pub struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", rename = "topP")]
    pub top_p: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", rename = "maxOutputTokens")]
    pub max_output_tokens: Option<i32>,
}

/// Gemini `generateContent` response body (the fields we consume).
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Candidate {
    #[serde(default = "empty_content")]
    pub content: Content,
    #[serde(rename = "finishReason")]
    pub finish_reason: Option<String>,
}

fn empty_content() -> Content {
    Content {
        role: None,
        parts: Vec::new(),
    }
}
