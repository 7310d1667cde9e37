//! Redis-backed counter store for multi-process deployments.

use std::time::Duration;

use async_trait::async_trait;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;

use crate::error::GatewayError;

use super::CounterStore;

/// Counter store over a shared Redis instance.
///
/// `INCR` is atomic server-side, so among N concurrent first-time callers
/// exactly one observes count 1 and issues the `EXPIRE`; every other
/// caller sees a higher count and leaves the TTL alone. That upholds the
/// one-expiry-per-window invariant across process instances without any
/// in-process locking.
#[derive(Clone)]
pub struct RedisCounterStore {
    manager: ConnectionManager,
}

impl RedisCounterStore {
    /// Connect to Redis, e.g. `redis://redis:6379/0`.
    pub async fn connect(url: &str) -> Result<Self, GatewayError> {
        let client = redis::Client::open(url)?;
        let manager = client.get_connection_manager().await?;
        Ok(Self { manager })
    }

    /// Wrap an existing connection manager.
    pub fn from_manager(manager: ConnectionManager) -> Self {
        Self { manager }
    }
}

#[async_trait]
impl CounterStore for RedisCounterStore {
    async fn incr_with_window(
        &self,
        key: &str,
        window: Duration,
    ) -> Result<u64, GatewayError> {
        let mut conn = self.manager.clone();
        let count: u64 = conn.incr(key, 1u64).await?;
        if count == 1 {
            let _: () = conn.expire(key, window.as_secs() as i64).await?;
        }
        Ok(count)
    }
}
