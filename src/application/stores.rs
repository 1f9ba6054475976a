//! Durable-tier store traits describing persistence adapters.
//!
//! The durable tier is an external collaborator: these traits define the
//! operations the cache consumes, and `infra::db` supplies the Postgres
//! implementation. Records are keyed by content digest (plus model where
//! the same input may be cached per model), and writes are idempotent
//! upserts so concurrent writers racing to the same key both succeed.

use async_trait::async_trait;
use thiserror::Error;
use time::OffsetDateTime;

use crate::domain::documents::{ParseStrategy, ParsedContract};
use crate::domain::inference::ModelResponse;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("duplicate record violates unique constraint `{constraint}`")]
    Duplicate { constraint: String },
    #[error("record not found")]
    NotFound,
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
    #[error("integrity error: {message}")]
    Integrity { message: String },
    #[error("database timeout")]
    Timeout,
}

impl StoreError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }

    pub fn integrity(message: impl Into<String>) -> Self {
        Self::Integrity {
            message: message.into(),
        }
    }
}

/// A parse result to be persisted. `created_at` is assigned by the store.
#[derive(Debug, Clone)]
pub struct NewFingerprint {
    pub digest: String,
    pub contract: ParsedContract,
    pub strategy: ParseStrategy,
    pub completeness: f32,
    pub warnings: Vec<String>,
    pub expires_at: Option<OffsetDateTime>,
}

/// A persisted parse result.
#[derive(Debug, Clone)]
pub struct FingerprintRecord {
    pub digest: String,
    pub contract: ParsedContract,
    pub strategy: ParseStrategy,
    pub completeness: f32,
    pub warnings: Vec<String>,
    pub created_at: OffsetDateTime,
    pub expires_at: Option<OffsetDateTime>,
}

/// A persisted embedding vector. Embeddings carry no expiry: they are
/// retained until explicitly removed.
#[derive(Debug, Clone)]
pub struct EmbeddingRecord {
    pub digest: String,
    pub model: String,
    pub vector: Vec<f32>,
    pub created_at: OffsetDateTime,
}

/// A model response to be persisted. `created_at` is assigned by the store.
#[derive(Debug, Clone)]
pub struct NewResponse {
    pub digest: String,
    pub model: String,
    pub response: ModelResponse,
    pub expires_at: Option<OffsetDateTime>,
}

/// A persisted model response.
#[derive(Debug, Clone)]
pub struct ResponseRecord {
    pub digest: String,
    pub model: String,
    pub response: ModelResponse,
    pub created_at: OffsetDateTime,
    pub expires_at: Option<OffsetDateTime>,
}

/// Durable store for parse results, keyed by document digest.
#[async_trait]
pub trait FingerprintStore: Send + Sync {
    /// Insert or overwrite the record for `record.digest`.
    async fn upsert(&self, record: NewFingerprint) -> Result<(), StoreError>;
    async fn find_by_digest(&self, digest: &str) -> Result<Option<FingerprintRecord>, StoreError>;
    async fn delete(&self, digest: &str) -> Result<(), StoreError>;
    /// Remove every record. Returns the number removed.
    async fn delete_all(&self) -> Result<u64, StoreError>;
    async fn count(&self) -> Result<u64, StoreError>;
    async fn count_expired(&self, now: OffsetDateTime) -> Result<u64, StoreError>;
    /// Remove records whose expiry has passed. Returns the number removed.
    async fn delete_expired(&self, now: OffsetDateTime) -> Result<u64, StoreError>;
}

/// Durable store for embeddings, keyed by `(digest, model)`.
#[async_trait]
pub trait EmbeddingStore: Send + Sync {
    async fn upsert(&self, digest: &str, model: &str, vector: &[f32]) -> Result<(), StoreError>;
    async fn find_by_key(
        &self,
        digest: &str,
        model: &str,
    ) -> Result<Option<EmbeddingRecord>, StoreError>;
    async fn delete(&self, digest: &str, model: &str) -> Result<(), StoreError>;
    async fn delete_all(&self) -> Result<u64, StoreError>;
    async fn count(&self) -> Result<u64, StoreError>;
}

/// Durable store for model responses, keyed by `(digest, model)`.
#[async_trait]
pub trait ResponseStore: Send + Sync {
    async fn upsert(&self, record: NewResponse) -> Result<(), StoreError>;
    async fn find_by_key(
        &self,
        digest: &str,
        model: &str,
    ) -> Result<Option<ResponseRecord>, StoreError>;
    async fn delete(&self, digest: &str, model: &str) -> Result<(), StoreError>;
    async fn delete_all(&self) -> Result<u64, StoreError>;
    async fn count(&self) -> Result<u64, StoreError>;
    async fn count_expired(&self, now: OffsetDateTime) -> Result<u64, StoreError>;
    async fn delete_expired(&self, now: OffsetDateTime) -> Result<u64, StoreError>;
}
