//! Provider adapters: one uniform call interface over two wire protocols.
//!
//! An adapter translates a [`GenerationRequest`] into the provider's call
//! shape and returns the raw response text. Adapters never retry, never
//! parse JSON out of the text, and never swallow errors; retry and fallback
//! policy lives in the orchestrator.

pub mod gemini;
pub mod groq;

use std::sync::Arc;

use async_trait::async_trait;
use tracing::error;

use crate::catalog::{ModelDescriptor, Provider};
use crate::config::Config;
use crate::error::GatewayError;
use crate::types::GenerationRequest;

pub use gemini::GeminiAdapter;
pub use groq::GroqAdapter;

/// Uniform call interface over heterogeneous generation backends.
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    /// Which provider this adapter speaks to.
    fn provider(&self) -> Provider;

    /// Invoke the model and return the provider's raw text output.
    ///
    /// All failures propagate: transport problems as
    /// [`GatewayError::Http`], provider rejections as
    /// [`GatewayError::Api`].
    async fn invoke(
        &self,
        model: &ModelDescriptor,
        request: &GenerationRequest,
    ) -> Result<String, GatewayError>;
}

/// The set of adapters constructed at startup.
///
/// A provider whose credential is missing is disabled (logged at error
/// level) without affecting the other provider. Constructing a set where
/// no provider is usable is a hard error.
#[derive(Clone)]
pub struct Adapters {
    inner: Vec<Arc<dyn ProviderAdapter>>,
}

impl Adapters {
    /// Build every adapter the configuration has a credential for.
    pub fn from_config(config: &Config) -> Result<Self, GatewayError> {
        let http_client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        let mut inner: Vec<Arc<dyn ProviderAdapter>> = Vec::new();

        match GeminiAdapter::from_config(config, http_client.clone()) {
            Ok(adapter) => inner.push(Arc::new(adapter)),
            Err(err) => error!(provider = %Provider::Google, error = %err, "provider disabled"),
        }
        match GroqAdapter::from_config(config, http_client) {
            Ok(adapter) => inner.push(Arc::new(adapter)),
            Err(err) => error!(provider = %Provider::Groq, error = %err, "provider disabled"),
        }

        if inner.is_empty() {
            return Err(GatewayError::NoUsableProvider);
        }
        Ok(Self { inner })
    }

    /// Build a set from explicit adapter instances (tests, custom wiring).
    pub fn from_adapters(adapters: Vec<Arc<dyn ProviderAdapter>>) -> Result<Self, GatewayError> {
        if adapters.is_empty() {
            return Err(GatewayError::NoUsableProvider);
        }
        Ok(Self { inner: adapters })
    }

    /// The adapter for a provider, if that provider is usable.
    pub fn get(&self, provider: Provider) -> Option<&Arc<dyn ProviderAdapter>> {
        self.inner.iter().find(|a| a.provider() == provider)
    }

    /// Providers with a usable adapter.
    pub fn providers(&self) -> impl Iterator<Item = Provider> + '_ {
        self.inner.iter().map(|a| a.provider())
    }
}

/// Pull a human-readable message out of a provider error body.
///
/// Both backends wrap errors as `{"error": {"message": ...}}`; fall back
/// to the raw body when the shape differs.
pub(crate) fn error_message_from_body(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")?
                .get("message")?
                .as_str()
                .map(ToOwned::to_owned)
        })
        .unwrap_or_else(|| body.trim().to_string())
}
