//! # Promptgate
//!
//! A resilient structured-JSON generation gateway for LLM providers.
//!
//! Unreliable, rate-limited, heterogeneous backends are made to behave
//! like one dependable "produce a JSON object for this prompt" service:
//!
//! - **Model catalog**: a static registry of provider/model descriptors
//!   with quota and capability flags.
//! - **Provider adapters**: one uniform `invoke` over two wire protocols
//!   (Gemini `generateContent` and Groq's OpenAI-compatible chat).
//! - **Response extraction**: best-effort recovery of a JSON value from
//!   prose-wrapped, fenced, or double-encoded model output.
//! - **Orchestrator**: a fresh random model permutation per call, two
//!   tries per model, early termination on the first usable object.
//! - **Admission control**: fixed-window per-subject rate limiting in a
//!   shared counter store, checked before any provider call.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use promptgate::prelude::*;
//! use std::time::Duration;
//!
//! # async fn run() -> Result<(), GatewayError> {
//! let config = Config::from_env();
//! let adapters = Adapters::from_config(&config)?;
//! let orchestrator = Orchestrator::new(Catalog::builtin(), adapters);
//!
//! let limiter = RateLimiter::new(RedisCounterStore::connect("redis://redis:6379/0").await?);
//! match limiter.check_and_consume("user-42", "lesson_generate", 5, Duration::from_secs(60)).await? {
//!     Decision::Deny => { /* surface "too many requests" */ }
//!     Decision::Allow => {
//!         let lesson = orchestrator
//!             .generate(&GenerationRequest::new("Return a JSON lesson about ownership"))
//!             .await?;
//!         println!("{lesson:?}");
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! Quota denial ([`Decision::Deny`]) and generation exhaustion
//! ([`GatewayError::AllModelsExhausted`]) are deliberately distinct at the
//! boundary; collapsing them loses diagnostic value.

pub mod catalog;
pub mod config;
pub mod error;
pub mod extract;
pub mod orchestrator;
pub mod providers;
pub mod ratelimit;
pub mod types;

pub use catalog::{Catalog, ModelDescriptor, ModelTier, Provider};
pub use config::Config;
pub use error::GatewayError;
pub use extract::extract_json;
pub use orchestrator::Orchestrator;
pub use providers::{Adapters, GeminiAdapter, GroqAdapter, ProviderAdapter};
pub use ratelimit::{
    CounterStore, Decision, MemoryCounterStore, RateLimiter, RedisCounterStore,
};
pub use types::GenerationRequest;

/// Commonly used types, importable in one line.
pub mod prelude {
    pub use crate::catalog::{Catalog, ModelDescriptor, ModelTier, Provider};
    pub use crate::config::Config;
    pub use crate::error::GatewayError;
    pub use crate::orchestrator::Orchestrator;
    pub use crate::providers::{Adapters, GeminiAdapter, GroqAdapter, ProviderAdapter};
    pub use crate::ratelimit::{
        CounterStore, Decision, MemoryCounterStore, RateLimiter, RedisCounterStore,
    };
    pub use crate::types::GenerationRequest;
}
