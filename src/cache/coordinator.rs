//! Whole-system cache observability and maintenance.
//!
//! The coordinator owns no cache state: it reads the volatile tier's
//! counters and asks the durable stores for row counts (only they can
//! count rows cheaply), and fans bulk maintenance out to the tiers.

use std::sync::Arc;

use serde::Serialize;
use time::OffsetDateTime;
use tracing::info;

use crate::application::stores::{EmbeddingStore, FingerprintStore, ResponseStore, StoreError};

use super::memory::MemoryStore;

/// Decimal places kept on the reported hit rate, for presentation stability.
const HIT_RATE_PRECISION: f64 = 10_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MemoryTierReport {
    pub size: usize,
    pub hits: u64,
    pub misses: u64,
    pub hit_rate: f64,
}

/// Row counts for a durable table with bounded retention.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ExpirableTierReport {
    pub count: u64,
    pub expired_count: u64,
}

/// Row count for the embedding table, which never expires rows.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PermanentTierReport {
    pub count: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CacheStatsReport {
    pub memory: MemoryTierReport,
    pub fingerprints: ExpirableTierReport,
    pub embeddings: PermanentTierReport,
    pub responses: ExpirableTierReport,
}

/// Expired durable rows removed per domain by [`CacheCoordinator::clean_expired`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ExpiredSweepReport {
    pub fingerprints: u64,
    pub responses: u64,
}

pub struct CacheCoordinator {
    memory: Arc<MemoryStore>,
    fingerprints: Arc<dyn FingerprintStore>,
    embeddings: Arc<dyn EmbeddingStore>,
    responses: Arc<dyn ResponseStore>,
}

impl CacheCoordinator {
    pub fn new(
        memory: Arc<MemoryStore>,
        fingerprints: Arc<dyn FingerprintStore>,
        embeddings: Arc<dyn EmbeddingStore>,
        responses: Arc<dyn ResponseStore>,
    ) -> Self {
        Self {
            memory,
            fingerprints,
            embeddings,
            responses,
        }
    }

    /// Aggregate statistics across the volatile tier and the three durable
    /// tables.
    pub async fn stats(&self) -> Result<CacheStatsReport, StoreError> {
        let now = OffsetDateTime::now_utc();
        let tier = self.memory.stats(None);

        let memory = MemoryTierReport {
            size: self.memory.size(),
            hits: tier.hits,
            misses: tier.misses,
            hit_rate: (tier.hit_rate * HIT_RATE_PRECISION).round() / HIT_RATE_PRECISION,
        };

        let (
            fingerprint_count,
            fingerprint_expired,
            embedding_count,
            response_count,
            response_expired,
        ) = futures::try_join!(
            self.fingerprints.count(),
            self.fingerprints.count_expired(now),
            self.embeddings.count(),
            self.responses.count(),
            self.responses.count_expired(now),
        )?;

        Ok(CacheStatsReport {
            memory,
            fingerprints: ExpirableTierReport {
                count: fingerprint_count,
                expired_count: fingerprint_expired,
            },
            embeddings: PermanentTierReport {
                count: embedding_count,
            },
            responses: ExpirableTierReport {
                count: response_count,
                expired_count: response_expired,
            },
        })
    }

    /// Reset the routine cache state: the whole volatile tier plus the
    /// durable parse results.
    ///
    /// Embedding and response durable rows are intentionally not touched;
    /// their retention outlives cache resets.
    pub async fn clear_all(&self) -> Result<(), StoreError> {
        self.memory.clear();
        let removed = self.fingerprints.delete_all().await?;
        info!(
            target = "pactum_cache::coordinator",
            fingerprints_removed = removed,
            "cache cleared"
        );
        Ok(())
    }

    /// Sweep expired rows out of the time-boxed durable tables and report
    /// how many were removed per domain.
    pub async fn clean_expired(&self) -> Result<ExpiredSweepReport, StoreError> {
        let now = OffsetDateTime::now_utc();
        let fingerprints = self.fingerprints.delete_expired(now).await?;
        let responses = self.responses.delete_expired(now).await?;

        info!(
            target = "pactum_cache::coordinator",
            fingerprints_removed = fingerprints,
            responses_removed = responses,
            "expired durable records swept"
        );

        Ok(ExpiredSweepReport {
            fingerprints,
            responses,
        })
    }
}
