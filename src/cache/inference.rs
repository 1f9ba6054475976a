//! Model-response cache.
//!
//! Keyed by the SHA-256 of the prompt and input text hashed as one stream,
//! plus the model identifier. Both tiers use bounded retention: a short
//! volatile TTL and a caller-tunable durable TTL.

use std::sync::Arc;
use std::time::Instant;

use metrics::{counter, histogram};
use time::{Duration, OffsetDateTime};
use tracing::{debug, warn};

use crate::application::stores::{NewResponse, ResponseStore, StoreError};
use crate::domain::inference::ModelResponse;

use super::config::CacheConfig;
use super::keys::{INFERENCE_PREFIX, digest_prompt_input, inference_key};
use super::memory::{CachedValue, MemoryStore};
use super::{
    METRIC_L2_HIT_TOTAL, METRIC_L2_LOOKUP_MS, METRIC_L2_MISS_TOTAL, METRIC_L2_WRITE_ERROR_TOTAL,
};

const DOMAIN: &str = "inference";

pub struct InferenceCache {
    memory: Arc<MemoryStore>,
    store: Arc<dyn ResponseStore>,
    l1_ttl_secs: i64,
    default_l2_ttl_secs: i64,
}

impl InferenceCache {
    pub fn new(
        memory: Arc<MemoryStore>,
        store: Arc<dyn ResponseStore>,
        config: &CacheConfig,
    ) -> Self {
        Self {
            memory,
            store,
            l1_ttl_secs: config.inference_l1_ttl_secs,
            default_l2_ttl_secs: config.inference_l2_ttl_secs,
        }
    }

    /// Content digest for a prompt/input pair, as used in keys and durable
    /// records.
    pub fn digest(prompt: &str, input: &str) -> String {
        digest_prompt_input(prompt, input)
    }

    /// Read through both tiers. Durable-tier failures propagate.
    pub async fn read(
        &self,
        prompt: &str,
        input: &str,
        model: &str,
    ) -> Result<Option<ModelResponse>, StoreError> {
        let digest = digest_prompt_input(prompt, input);
        let key = inference_key(&digest, model);

        if let Some(CachedValue::Response(response)) = self.memory.get(&key) {
            return Ok(Some(response));
        }

        let started = Instant::now();
        let lookup = self.store.find_by_key(&digest, model).await?;
        histogram!(METRIC_L2_LOOKUP_MS, "domain" => DOMAIN)
            .record(started.elapsed().as_secs_f64() * 1000.0);

        let Some(record) = lookup else {
            counter!(METRIC_L2_MISS_TOTAL, "domain" => DOMAIN).increment(1);
            return Ok(None);
        };

        let now = OffsetDateTime::now_utc();
        if record.expires_at.is_some_and(|deadline| now > deadline) {
            debug!(
                target = "pactum_cache::inference",
                digest = %digest,
                model = %model,
                "expired response record dropped on read"
            );
            if let Err(err) = self.store.delete(&digest, model).await {
                warn!(
                    target = "pactum_cache::inference",
                    digest = %digest,
                    model = %model,
                    error = %err,
                    "failed to delete stale response record"
                );
            }
            counter!(METRIC_L2_MISS_TOTAL, "domain" => DOMAIN).increment(1);
            return Ok(None);
        }

        counter!(METRIC_L2_HIT_TOTAL, "domain" => DOMAIN).increment(1);
        self.memory.set(
            key,
            CachedValue::Response(record.response.clone()),
            Some(self.l1_ttl_secs),
        );
        Ok(Some(record.response))
    }

    /// Write through both tiers; the durable upsert is best-effort.
    /// `l2_ttl_secs` overrides the configured default durable retention.
    pub async fn write(
        &self,
        prompt: &str,
        input: &str,
        model: &str,
        response: ModelResponse,
        l2_ttl_secs: Option<i64>,
    ) {
        let digest = digest_prompt_input(prompt, input);
        let key = inference_key(&digest, model);
        let now = OffsetDateTime::now_utc();

        self.memory.set(
            key,
            CachedValue::Response(response.clone()),
            Some(self.l1_ttl_secs),
        );

        let ttl = l2_ttl_secs.unwrap_or(self.default_l2_ttl_secs);
        let record = NewResponse {
            digest: digest.clone(),
            model: model.to_string(),
            response,
            expires_at: (ttl > 0).then(|| now + Duration::seconds(ttl)),
        };

        if let Err(err) = self.store.upsert(record).await {
            counter!(METRIC_L2_WRITE_ERROR_TOTAL, "domain" => DOMAIN).increment(1);
            warn!(
                target = "pactum_cache::inference",
                digest = %digest,
                model = %model,
                error = %err,
                "response persistence failed; entry remains volatile-only"
            );
        }
    }

    /// Remove a cached response from both tiers.
    pub async fn invalidate(&self, digest: &str, model: &str) -> Result<(), StoreError> {
        self.memory.delete(&inference_key(digest, model));
        self.store.delete(digest, model).await
    }

    /// Drop every cached response: this domain's volatile prefix plus its
    /// durable table. Other domains sharing the volatile tier are untouched.
    pub async fn clear(&self) -> Result<u64, StoreError> {
        self.memory.clear_prefix(INFERENCE_PREFIX);
        self.store.delete_all().await
    }
}
