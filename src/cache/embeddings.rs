//! Embedding cache.
//!
//! Keyed by the SHA-256 of the trimmed input text plus the embedding model
//! identifier, so the same passage embedded under two models is cached
//! independently. The durable tier retains embeddings with no expiry until
//! they are explicitly purged.

use std::sync::Arc;
use std::time::Instant;

use metrics::{counter, histogram};
use tracing::warn;

use crate::application::stores::{EmbeddingStore, StoreError};

use super::config::CacheConfig;
use super::keys::{EMBEDDING_PREFIX, digest_text, embedding_key};
use super::memory::{CachedValue, MemoryStore};
use super::{
    METRIC_L2_HIT_TOTAL, METRIC_L2_LOOKUP_MS, METRIC_L2_MISS_TOTAL, METRIC_L2_WRITE_ERROR_TOTAL,
};

const DOMAIN: &str = "embeddings";

pub struct EmbeddingCache {
    memory: Arc<MemoryStore>,
    store: Arc<dyn EmbeddingStore>,
    l1_ttl_secs: i64,
}

impl EmbeddingCache {
    pub fn new(
        memory: Arc<MemoryStore>,
        store: Arc<dyn EmbeddingStore>,
        config: &CacheConfig,
    ) -> Self {
        Self {
            memory,
            store,
            l1_ttl_secs: config.embedding_l1_ttl_secs,
        }
    }

    /// Content digest for an embedding input, as used in keys and durable
    /// records.
    pub fn digest(text: &str) -> String {
        digest_text(text)
    }

    /// Read through both tiers. Durable-tier failures propagate.
    pub async fn read(&self, text: &str, model: &str) -> Result<Option<Vec<f32>>, StoreError> {
        let digest = digest_text(text);
        let key = embedding_key(&digest, model);

        if let Some(CachedValue::Embedding(vector)) = self.memory.get(&key) {
            return Ok(Some(vector));
        }

        let started = Instant::now();
        let lookup = self.store.find_by_key(&digest, model).await?;
        histogram!(METRIC_L2_LOOKUP_MS, "domain" => DOMAIN)
            .record(started.elapsed().as_secs_f64() * 1000.0);

        let Some(record) = lookup else {
            counter!(METRIC_L2_MISS_TOTAL, "domain" => DOMAIN).increment(1);
            return Ok(None);
        };

        counter!(METRIC_L2_HIT_TOTAL, "domain" => DOMAIN).increment(1);
        self.memory.set(
            key,
            CachedValue::Embedding(record.vector.clone()),
            Some(self.l1_ttl_secs),
        );
        Ok(Some(record.vector))
    }

    /// Write through both tiers; the durable upsert is best-effort.
    pub async fn write(&self, text: &str, model: &str, vector: Vec<f32>) {
        let digest = digest_text(text);
        let key = embedding_key(&digest, model);

        self.memory.set(
            key,
            CachedValue::Embedding(vector.clone()),
            Some(self.l1_ttl_secs),
        );

        if let Err(err) = self.store.upsert(&digest, model, &vector).await {
            counter!(METRIC_L2_WRITE_ERROR_TOTAL, "domain" => DOMAIN).increment(1);
            warn!(
                target = "pactum_cache::embeddings",
                digest = %digest,
                model = %model,
                error = %err,
                "embedding persistence failed; entry remains volatile-only"
            );
        }
    }

    /// Remove a cached embedding from both tiers.
    pub async fn invalidate(&self, digest: &str, model: &str) -> Result<(), StoreError> {
        self.memory.delete(&embedding_key(digest, model));
        self.store.delete(digest, model).await
    }

    /// Drop every embedding: this domain's volatile prefix plus its durable
    /// table. Other domains sharing the volatile tier are untouched.
    pub async fn clear(&self) -> Result<u64, StoreError> {
        self.memory.clear_prefix(EMBEDDING_PREFIX);
        self.store.delete_all().await
    }
}
