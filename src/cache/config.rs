//! Cache tuning configuration.
//!
//! Per-domain TTLs are fixed at construction; the durable-tier TTLs for
//! documents and inference are defaults that individual writes may override.
//! Embeddings have no durable TTL: they are retained until purged.

use serde::Deserialize;

const DEFAULT_DOCUMENT_L1_TTL_SECS: i64 = 24 * 60 * 60;
const DEFAULT_EMBEDDING_L1_TTL_SECS: i64 = 7 * 24 * 60 * 60;
const DEFAULT_INFERENCE_L1_TTL_SECS: i64 = 60 * 60;
const DEFAULT_DOCUMENT_L2_TTL_SECS: i64 = 7 * 24 * 60 * 60;
const DEFAULT_INFERENCE_L2_TTL_SECS: i64 = 30 * 24 * 60 * 60;
const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 60 * 60;

/// Cache configuration derived from the `[cache]` settings section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Volatile-tier TTL for parse results.
    pub document_l1_ttl_secs: i64,
    /// Volatile-tier TTL for embeddings.
    pub embedding_l1_ttl_secs: i64,
    /// Volatile-tier TTL for model responses.
    pub inference_l1_ttl_secs: i64,
    /// Default durable-tier TTL for parse results.
    pub document_l2_ttl_secs: i64,
    /// Default durable-tier TTL for model responses.
    pub inference_l2_ttl_secs: i64,
    /// Interval between background sweeps of expired volatile entries.
    pub sweep_interval_secs: u64,
    /// Spawn the background sweeper. Lazy expiry alone is sufficient for
    /// correctness, so tests run with this off.
    pub enable_sweeper: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            document_l1_ttl_secs: DEFAULT_DOCUMENT_L1_TTL_SECS,
            embedding_l1_ttl_secs: DEFAULT_EMBEDDING_L1_TTL_SECS,
            inference_l1_ttl_secs: DEFAULT_INFERENCE_L1_TTL_SECS,
            document_l2_ttl_secs: DEFAULT_DOCUMENT_L2_TTL_SECS,
            inference_l2_ttl_secs: DEFAULT_INFERENCE_L2_TTL_SECS,
            sweep_interval_secs: DEFAULT_SWEEP_INTERVAL_SECS,
            enable_sweeper: true,
        }
    }
}

impl From<&crate::config::CacheSettings> for CacheConfig {
    fn from(settings: &crate::config::CacheSettings) -> Self {
        Self {
            document_l1_ttl_secs: settings.document_l1_ttl_secs,
            embedding_l1_ttl_secs: settings.embedding_l1_ttl_secs,
            inference_l1_ttl_secs: settings.inference_l1_ttl_secs,
            document_l2_ttl_secs: settings.document_l2_ttl_secs,
            inference_l2_ttl_secs: settings.inference_l2_ttl_secs,
            sweep_interval_secs: settings.sweep_interval_secs,
            enable_sweeper: settings.enable_sweeper,
        }
    }
}
