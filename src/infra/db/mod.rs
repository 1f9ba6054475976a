//! Postgres-backed durable store implementations.
//!
//! The durable tables belong to the host application's schema; this adapter
//! expects:
//!
//! ```sql
//! CREATE TABLE document_fingerprints (
//!     digest       TEXT PRIMARY KEY,
//!     payload      JSONB NOT NULL,
//!     strategy     TEXT NOT NULL,
//!     completeness REAL NOT NULL,
//!     warnings     TEXT[] NOT NULL,
//!     created_at   TIMESTAMPTZ NOT NULL,
//!     expires_at   TIMESTAMPTZ
//! );
//! CREATE TABLE contract_embeddings (
//!     digest     TEXT NOT NULL,
//!     model      TEXT NOT NULL,
//!     vector     REAL[] NOT NULL,
//!     created_at TIMESTAMPTZ NOT NULL,
//!     PRIMARY KEY (digest, model)
//! );
//! CREATE TABLE model_responses (
//!     digest     TEXT NOT NULL,
//!     model      TEXT NOT NULL,
//!     payload    JSONB NOT NULL,
//!     created_at TIMESTAMPTZ NOT NULL,
//!     expires_at TIMESTAMPTZ,
//!     PRIMARY KEY (digest, model)
//! );
//! ```
//!
//! The composite primary keys make every write an idempotent upsert, which
//! is what lets concurrent writers race to populate the same logical entry
//! without corruption.

mod embeddings;
mod fingerprints;
mod responses;
mod util;

pub use util::map_sqlx_error;

use std::sync::Arc;

use sqlx::{
    postgres::{PgPool, PgPoolOptions},
    query,
};

use super::error::InfraError;

/// One handle implementing all three durable store traits.
#[derive(Clone)]
pub struct PostgresCacheStore {
    pool: Arc<PgPool>,
}

impl PostgresCacheStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn connect(url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
        PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await
    }

    pub async fn health_check(&self) -> Result<(), InfraError> {
        query("SELECT 1")
            .execute(self.pool())
            .await
            .map(|_| ())
            .map_err(|err| InfraError::database(err.to_string()))
    }
}
