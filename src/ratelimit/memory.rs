//! In-process counter store for tests and single-instance deployments.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;

use crate::error::GatewayError;

use super::CounterStore;

struct CounterEntry {
    count: u64,
    expires_at: Instant,
}

/// Mutex-guarded counter map with per-key expiry.
///
/// Expired entries are replaced lazily on the next increment; the mutex
/// makes increment-and-set-expiry atomic within the process. Multi-process
/// deployments need [`RedisCounterStore`](super::RedisCounterStore)
/// instead.
#[derive(Default)]
pub struct MemoryCounterStore {
    entries: Mutex<HashMap<String, CounterEntry>>,
}

impl MemoryCounterStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Live count for a key, if its window has not lapsed.
    pub fn current_count(&self, key: &str) -> Option<u64> {
        let entries = self
            .entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        entries
            .get(key)
            .filter(|entry| entry.expires_at > Instant::now())
            .map(|entry| entry.count)
    }
}

#[async_trait]
impl CounterStore for MemoryCounterStore {
    async fn incr_with_window(
        &self,
        key: &str,
        window: Duration,
    ) -> Result<u64, GatewayError> {
        let mut entries = self
            .entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let now = Instant::now();

        let entry = entries.entry(key.to_string()).or_insert(CounterEntry {
            count: 0,
            expires_at: now + window,
        });
        if entry.expires_at <= now {
            // Window lapsed: this increment starts a fresh one.
            entry.count = 0;
            entry.expires_at = now + window;
        }
        entry.count += 1;
        Ok(entry.count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fresh_key_counts_from_one() {
        let store = MemoryCounterStore::new();
        let window = Duration::from_secs(60);
        assert_eq!(store.incr_with_window("k", window).await.unwrap(), 1);
        assert_eq!(store.incr_with_window("k", window).await.unwrap(), 2);
        assert_eq!(store.current_count("k"), Some(2));
    }

    #[tokio::test]
    async fn lapsed_window_restarts_at_one() {
        let store = MemoryCounterStore::new();
        let window = Duration::from_millis(20);
        assert_eq!(store.incr_with_window("k", window).await.unwrap(), 1);
        assert_eq!(store.incr_with_window("k", window).await.unwrap(), 2);

        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(store.current_count("k"), None);
        assert_eq!(store.incr_with_window("k", window).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn intermediate_increments_do_not_extend_the_window() {
        let store = MemoryCounterStore::new();
        let window = Duration::from_millis(50);
        store.incr_with_window("k", window).await.unwrap();

        tokio::time::sleep(Duration::from_millis(30)).await;
        // Second increment lands mid-window and must not push expiry out.
        store.incr_with_window("k", window).await.unwrap();

        tokio::time::sleep(Duration::from_millis(30)).await;
        // 60ms after the first increment the window has lapsed.
        assert_eq!(store.incr_with_window("k", window).await.unwrap(), 1);
    }
}
