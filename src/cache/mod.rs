//! Pactum Cache System
//!
//! Two-tier caching for the platform's expensive operations:
//!
//! - **Volatile tier**: in-process TTL store shared by all domains
//! - **Durable tier**: content-addressed Postgres tables, one per domain
//!
//! Three domain caches compose the tiers behind a uniform
//! read-through/write-through policy:
//!
//! - [`DocumentCache`]: parse results, keyed by document bytes
//! - [`EmbeddingCache`]: vectors, keyed by text + model
//! - [`InferenceCache`]: model responses, keyed by prompt + input + model
//!
//! ## Configuration
//!
//! TTLs and the sweep cadence are controlled via `pactum.toml`:
//!
//! ```toml
//! [cache]
//! document_l1_ttl_secs = 86400
//! inference_l1_ttl_secs = 3600
//! # ... see config.rs for all options
//! ```

mod config;
mod coordinator;
mod documents;
mod embeddings;
mod inference;
pub mod keys;
mod lock;
mod memory;
mod sweeper;

pub use config::CacheConfig;
pub use coordinator::{
    CacheCoordinator, CacheStatsReport, ExpirableTierReport, ExpiredSweepReport, MemoryTierReport,
    PermanentTierReport,
};
pub use documents::DocumentCache;
pub use embeddings::EmbeddingCache;
pub use inference::InferenceCache;
pub use memory::{CachedValue, MemoryStore, TierStats, hit_rate};
pub use sweeper::MemorySweeper;

pub(crate) const METRIC_L1_HIT_TOTAL: &str = "pactum_cache_l1_hit_total";
pub(crate) const METRIC_L1_MISS_TOTAL: &str = "pactum_cache_l1_miss_total";
pub(crate) const METRIC_L1_EXPIRED_TOTAL: &str = "pactum_cache_l1_expired_total";
pub(crate) const METRIC_L2_HIT_TOTAL: &str = "pactum_cache_l2_hit_total";
pub(crate) const METRIC_L2_MISS_TOTAL: &str = "pactum_cache_l2_miss_total";
pub(crate) const METRIC_L2_WRITE_ERROR_TOTAL: &str = "pactum_cache_l2_write_error_total";
pub(crate) const METRIC_L2_LOOKUP_MS: &str = "pactum_cache_l2_lookup_ms";
