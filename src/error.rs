//! Error types for the generation gateway.
//!
//! Provider-level failures (`Http`, `Api`, `EmptyResponse`) are recovered
//! inside the orchestrator's retry loop and never surface per-attempt; the
//! terminal outcomes a caller can observe are `AllModelsExhausted`,
//! `InvalidRequest`, the startup errors, and `Store` failures from the
//! admission path.

use thiserror::Error;

/// Unified error type for the gateway.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GatewayError {
    /// Transport-level failure (connection, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider rejected the call (auth, quota, bad request, 5xx).
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// The provider answered 2xx but the response carried no text content.
    #[error("provider response contained no text content")]
    EmptyResponse,

    /// A provider was requested but its credential is not configured.
    #[error("missing credential for {0}")]
    MissingCredential(&'static str),

    /// No provider had a usable credential at startup.
    #[error("no provider has a usable credential")]
    NoUsableProvider,

    /// Every model/try combination failed to yield a JSON object.
    #[error("all models exhausted without a parseable JSON object")]
    AllModelsExhausted {
        /// Stringified error from the last failed attempt, for diagnostics.
        last_error: Option<String>,
    },

    /// The admission controller denied the request. Terminal for the
    /// current call only; the caller may retry after backoff.
    #[error("quota exceeded: more than {limit} requests in {window_secs}s")]
    QuotaDenied { limit: u32, window_secs: u64 },

    /// The rate-limit counter store failed.
    #[error("counter store error: {0}")]
    Store(#[from] redis::RedisError),

    /// The generation request failed validation before any provider call.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl GatewayError {
    /// Construct an API error from a status code and message.
    pub fn api_error(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Whether this error is terminal for the whole `generate` call, as
    /// opposed to a per-attempt failure the orchestrator recovers from.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::AllModelsExhausted { .. }
                | Self::QuotaDenied { .. }
                | Self::InvalidRequest(_)
                | Self::NoUsableProvider
                | Self::MissingCredential(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_display_includes_status_and_message() {
        let err = GatewayError::api_error(429, "rate limited upstream");
        assert_eq!(err.to_string(), "API error 429: rate limited upstream");
    }

    #[test]
    fn terminal_classification() {
        assert!(
            GatewayError::AllModelsExhausted { last_error: None }.is_terminal()
        );
        assert!(GatewayError::InvalidRequest("bad".into()).is_terminal());
        assert!(
            GatewayError::QuotaDenied {
                limit: 5,
                window_secs: 60
            }
            .is_terminal()
        );
        assert!(!GatewayError::api_error(500, "boom").is_terminal());
        assert!(!GatewayError::EmptyResponse.is_terminal());
    }

    #[test]
    fn quota_denial_and_exhaustion_stay_distinguishable() {
        // Collapsing these two loses diagnostic value at the boundary.
        let denied = GatewayError::QuotaDenied {
            limit: 5,
            window_secs: 60,
        };
        let exhausted = GatewayError::AllModelsExhausted { last_error: None };
        assert!(matches!(denied, GatewayError::QuotaDenied { .. }));
        assert!(matches!(
            exhausted,
            GatewayError::AllModelsExhausted { .. }
        ));
    }
}
