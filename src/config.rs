//! Process-wide configuration, resolved once at startup.
//!
//! Credentials come from the environment; base URLs and the per-call HTTP
//! timeout are overridable for tests and self-hosted gateways. Adapters are
//! constructed from a `Config` exactly once and passed by shared ownership
//! into the orchestrator, so no module-level mutable state exists.

use std::env;
use std::time::Duration;

use secrecy::SecretString;

/// Default base URL for the Google Generative Language API.
pub const DEFAULT_GEMINI_BASE_URL: &str =
    "https://generativelanguage.googleapis.com/v1beta";
/// Default base URL for Groq's OpenAI-compatible API.
pub const DEFAULT_GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";
/// Default bound on a single provider call.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Gateway configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Google API key; `None` disables the Google adapter.
    pub gemini_api_key: Option<SecretString>,
    /// Groq API key; `None` disables the Groq adapter.
    pub groq_api_key: Option<SecretString>,
    pub gemini_base_url: String,
    pub groq_base_url: String,
    /// Upper bound on each provider HTTP call. Unbounded calls are a
    /// latency hazard: the retry-and-fallback loop multiplies them.
    pub request_timeout: Duration,
}

impl Config {
    /// Read configuration from the environment.
    ///
    /// Recognized variables: `GEMINI_API_KEY`, `GROQ_API_KEY`,
    /// `GEMINI_BASE_URL`, `GROQ_BASE_URL`.
    pub fn from_env() -> Self {
        Self {
            gemini_api_key: read_secret("GEMINI_API_KEY"),
            groq_api_key: read_secret("GROQ_API_KEY"),
            gemini_base_url: env::var("GEMINI_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_GEMINI_BASE_URL.to_string()),
            groq_base_url: env::var("GROQ_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_GROQ_BASE_URL.to_string()),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Override the per-call HTTP timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

fn read_secret(var: &str) -> Option<SecretString> {
    match env::var(var) {
        Ok(value) if !value.is_empty() => Some(SecretString::from(value)),
        _ => None,
    }
}
