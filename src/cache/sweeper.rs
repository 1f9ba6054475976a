//! Background eviction of expired volatile entries.
//!
//! Housekeeping only: lazy expiry on the read path is what guarantees
//! correctness. The sweeper merely bounds memory growth from expired keys
//! nobody re-reads, so it can be disabled (`enable_sweeper = false`)
//! without changing observable cache behavior.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::debug;

use super::config::CacheConfig;
use super::memory::MemoryStore;

/// Handle to the spawned sweep task. Aborted at shutdown.
pub struct MemorySweeper {
    handle: JoinHandle<()>,
}

impl MemorySweeper {
    /// Spawn the periodic sweep loop if the configuration enables it.
    pub fn spawn(memory: Arc<MemoryStore>, config: &CacheConfig) -> Option<Self> {
        if !config.enable_sweeper {
            return None;
        }
        Some(Self::spawn_with_interval(
            memory,
            Duration::from_secs(config.sweep_interval_secs),
        ))
    }

    pub fn spawn_with_interval(memory: Arc<MemoryStore>, interval: Duration) -> Self {
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await; // Skip the first immediate tick
            loop {
                ticker.tick().await;
                let evicted = memory.sweep_expired();
                if evicted > 0 {
                    debug!(
                        target = "pactum_cache::sweeper",
                        evicted, "swept expired volatile entries"
                    );
                }
            }
        });
        Self { handle }
    }

    /// Stop the sweep loop. Safe to call more than once.
    pub fn abort(&self) {
        self.handle.abort();
    }

    /// Stop the sweep loop and wait for the task to finish.
    pub async fn shutdown(self) {
        self.handle.abort();
        let _ = self.handle.await;
    }
}

#[cfg(test)]
mod tests {
    use time::OffsetDateTime;

    use crate::cache::memory::CachedValue;
    use crate::domain::inference::ModelResponse;

    use super::*;

    fn stale_entry(store: &MemoryStore, key: &str) {
        let past = OffsetDateTime::now_utc() - time::Duration::seconds(1);
        store.insert_with_deadline(
            key,
            CachedValue::Response(ModelResponse {
                content: "stale".to_string(),
                model: "m".to_string(),
                total_tokens: None,
            }),
            Some(past),
        );
    }

    #[tokio::test]
    async fn disabled_config_spawns_nothing() {
        let config = CacheConfig {
            enable_sweeper: false,
            ..Default::default()
        };
        assert!(MemorySweeper::spawn(Arc::new(MemoryStore::new()), &config).is_none());
    }

    #[tokio::test]
    async fn sweeps_on_each_interval_tick() {
        let memory = Arc::new(MemoryStore::new());
        stale_entry(&memory, "llm:stale");

        let sweeper =
            MemorySweeper::spawn_with_interval(Arc::clone(&memory), Duration::from_millis(20));

        tokio::time::sleep(Duration::from_millis(200)).await;

        // The background task already evicted the entry, so a manual sweep
        // finds nothing left to do.
        assert_eq!(memory.sweep_expired(), 0);
        sweeper.shutdown().await;
    }

    #[tokio::test]
    async fn abort_stops_the_task() {
        let memory = Arc::new(MemoryStore::new());
        let sweeper =
            MemorySweeper::spawn_with_interval(Arc::clone(&memory), Duration::from_secs(3600));
        sweeper.shutdown().await;
    }
}
