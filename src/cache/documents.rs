//! Parse-result cache.
//!
//! Keyed by the SHA-256 of the raw document bytes, so re-uploading an
//! identical contract never re-parses it. Parse metadata (strategy,
//! completeness, warnings) rides along with the payload; on a durable-tier
//! backfill the `parsed_at` marker is reconstructed from the stored
//! record's creation time.

use std::sync::Arc;
use std::time::Instant;

use metrics::{counter, histogram};
use time::{Duration, OffsetDateTime};
use tracing::{debug, warn};

use crate::application::stores::{FingerprintStore, NewFingerprint, StoreError};
use crate::domain::documents::{CachedDocument, ParseOutcome};

use super::config::CacheConfig;
use super::keys::{DOCUMENT_PREFIX, digest_bytes, document_key};
use super::memory::{CachedValue, MemoryStore};
use super::{
    METRIC_L2_HIT_TOTAL, METRIC_L2_LOOKUP_MS, METRIC_L2_MISS_TOTAL, METRIC_L2_WRITE_ERROR_TOTAL,
};

const DOMAIN: &str = "documents";

pub struct DocumentCache {
    memory: Arc<MemoryStore>,
    store: Arc<dyn FingerprintStore>,
    l1_ttl_secs: i64,
    default_l2_ttl_secs: i64,
}

impl DocumentCache {
    pub fn new(
        memory: Arc<MemoryStore>,
        store: Arc<dyn FingerprintStore>,
        config: &CacheConfig,
    ) -> Self {
        Self {
            memory,
            store,
            l1_ttl_secs: config.document_l1_ttl_secs,
            default_l2_ttl_secs: config.document_l2_ttl_secs,
        }
    }

    /// Content digest for a document payload, as used in keys and durable
    /// records. Exposed so callers can invalidate by digest later.
    pub fn digest(bytes: &[u8]) -> String {
        digest_bytes(bytes)
    }

    /// Read through both tiers.
    ///
    /// Durable-tier failures propagate: a swallowed lookup error would be
    /// indistinguishable from a true miss and silently skip the caller's
    /// recomputation path.
    pub async fn read(&self, bytes: &[u8]) -> Result<Option<CachedDocument>, StoreError> {
        let digest = digest_bytes(bytes);
        let key = document_key(&digest);

        if let Some(CachedValue::Document(document)) = self.memory.get(&key) {
            return Ok(Some(document));
        }

        let started = Instant::now();
        let lookup = self.store.find_by_digest(&digest).await;
        histogram!(METRIC_L2_LOOKUP_MS, "domain" => DOMAIN)
            .record(started.elapsed().as_secs_f64() * 1000.0);

        let record = match lookup {
            Ok(Some(record)) => record,
            Ok(None) => {
                counter!(METRIC_L2_MISS_TOTAL, "domain" => DOMAIN).increment(1);
                return Ok(None);
            }
            Err(StoreError::Integrity { message }) => {
                // Unreadable row: treat as a miss and drop it so the next
                // write can repopulate cleanly.
                warn!(
                    target = "pactum_cache::documents",
                    digest = %digest,
                    error = %message,
                    "discarding malformed fingerprint record"
                );
                self.delete_durable_quietly(&digest).await;
                counter!(METRIC_L2_MISS_TOTAL, "domain" => DOMAIN).increment(1);
                return Ok(None);
            }
            Err(err) => return Err(err),
        };

        let now = OffsetDateTime::now_utc();
        if record.expires_at.is_some_and(|deadline| now > deadline) {
            debug!(
                target = "pactum_cache::documents",
                digest = %digest,
                "expired fingerprint record dropped on read"
            );
            self.delete_durable_quietly(&digest).await;
            counter!(METRIC_L2_MISS_TOTAL, "domain" => DOMAIN).increment(1);
            return Ok(None);
        }

        counter!(METRIC_L2_HIT_TOTAL, "domain" => DOMAIN).increment(1);
        let document = CachedDocument {
            contract: record.contract,
            strategy: record.strategy,
            completeness: record.completeness,
            warnings: record.warnings,
            parsed_at: record.created_at,
        };
        self.memory.set(
            key,
            CachedValue::Document(document.clone()),
            Some(self.l1_ttl_secs),
        );
        Ok(Some(document))
    }

    /// Write through both tiers.
    ///
    /// The volatile write always succeeds; the durable upsert is
    /// best-effort and never fails the caller. `l2_ttl_secs` overrides the
    /// configured default durable retention for this record only.
    pub async fn write(&self, bytes: &[u8], outcome: ParseOutcome, l2_ttl_secs: Option<i64>) {
        let digest = digest_bytes(bytes);
        let key = document_key(&digest);
        let now = OffsetDateTime::now_utc();

        let document = CachedDocument::from_outcome(outcome, now);
        self.memory.set(
            key,
            CachedValue::Document(document.clone()),
            Some(self.l1_ttl_secs),
        );

        let ttl = l2_ttl_secs.unwrap_or(self.default_l2_ttl_secs);
        let record = NewFingerprint {
            digest: digest.clone(),
            contract: document.contract,
            strategy: document.strategy,
            completeness: document.completeness,
            warnings: document.warnings,
            expires_at: (ttl > 0).then(|| now + Duration::seconds(ttl)),
        };

        if let Err(err) = self.store.upsert(record).await {
            counter!(METRIC_L2_WRITE_ERROR_TOTAL, "domain" => DOMAIN).increment(1);
            warn!(
                target = "pactum_cache::documents",
                digest = %digest,
                error = %err,
                "fingerprint persistence failed; entry remains volatile-only"
            );
        }
    }

    /// Remove a cached parse result from both tiers.
    pub async fn invalidate(&self, digest: &str) -> Result<(), StoreError> {
        self.memory.delete(&document_key(digest));
        self.store.delete(digest).await
    }

    /// Drop every parse result: this domain's volatile prefix plus its
    /// durable table. Other domains sharing the volatile tier are untouched.
    pub async fn clear(&self) -> Result<u64, StoreError> {
        self.memory.clear_prefix(DOCUMENT_PREFIX);
        self.store.delete_all().await
    }

    async fn delete_durable_quietly(&self, digest: &str) {
        if let Err(err) = self.store.delete(digest).await {
            warn!(
                target = "pactum_cache::documents",
                digest = %digest,
                error = %err,
                "failed to delete stale fingerprint record"
            );
        }
    }
}
