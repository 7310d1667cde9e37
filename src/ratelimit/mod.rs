//! Fixed-window admission control over a shared counter store.
//!
//! The gate runs before any provider call, so denied requests spend no
//! provider quota and no generation latency. Counters live in the store
//! (Redis for multi-process deployments) under
//! `ratelimit:{operation}:{subject}` with a TTL equal to the window; a
//! denied attempt still consumes a slot, so probing the limit is never
//! free.

mod memory;
mod redis_store;

use std::time::Duration;

use async_trait::async_trait;
use tracing::warn;

use crate::error::GatewayError;

pub use memory::MemoryCounterStore;
pub use redis_store::RedisCounterStore;

/// Default request budget per window.
pub const DEFAULT_LIMIT: u32 = 5;
/// Default window length.
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(60);

/// Outcome of an admission check.
///
/// A `Deny` is terminal for the current request only; callers may retry
/// after backoff. It must surface to the user-facing layer as an explicit
/// "too many requests" condition, distinct from generation failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny,
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }
}

/// A shared counter store with atomic increment-with-expiry semantics.
///
/// Implementations must guarantee that when N concurrent callers hit a
/// fresh key, exactly one observes count 1 and sets the expiry, and no
/// increment is lost. A counter without an expiry would permanently lock
/// out its subject.
#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Increment `key` and return the post-increment count. A count of 1
    /// starts a new window: the implementation sets the key to expire
    /// `window` from now.
    async fn incr_with_window(&self, key: &str, window: Duration)
    -> Result<u64, GatewayError>;
}

/// Fixed-window rate limiter gating a subject's access to an operation.
#[derive(Clone)]
pub struct RateLimiter<S> {
    store: S,
}

impl<S: CounterStore> RateLimiter<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Atomically consume one slot and decide admission.
    ///
    /// Counts 1..=limit within a window yield `Allow`; anything beyond
    /// yields `Deny` with the slot kept consumed.
    pub async fn check_and_consume(
        &self,
        subject: &str,
        operation: &str,
        limit: u32,
        window: Duration,
    ) -> Result<Decision, GatewayError> {
        let key = format!("ratelimit:{operation}:{subject}");
        let count = self.store.incr_with_window(&key, window).await?;

        if count > u64::from(limit) {
            warn!(subject, operation, count, limit, "admission denied");
            return Ok(Decision::Deny);
        }
        Ok(Decision::Allow)
    }

    /// [`check_and_consume`](Self::check_and_consume) with the default
    /// limit of 5 requests per 60 seconds.
    pub async fn check_and_consume_default(
        &self,
        subject: &str,
        operation: &str,
    ) -> Result<Decision, GatewayError> {
        self.check_and_consume(subject, operation, DEFAULT_LIMIT, DEFAULT_WINDOW)
            .await
    }

    /// Like [`check_and_consume`](Self::check_and_consume), but folds a
    /// denial into [`GatewayError::QuotaDenied`] for callers that route
    /// admission through their error flow.
    pub async fn enforce(
        &self,
        subject: &str,
        operation: &str,
        limit: u32,
        window: Duration,
    ) -> Result<(), GatewayError> {
        match self
            .check_and_consume(subject, operation, limit, window)
            .await?
        {
            Decision::Allow => Ok(()),
            Decision::Deny => Err(GatewayError::QuotaDenied {
                limit,
                window_secs: window.as_secs(),
            }),
        }
    }
}
