//! Multi-tier caching layer for the Pactum contract platform.
//!
//! Fronts the platform's three expensive operations (contract document
//! parsing, text-embedding generation, and model inference) with a
//! process-local volatile tier and a Postgres-backed durable tier behind
//! read-through/write-through domain caches.
//!
//! The crate is consumed in-process; it exposes no network surface of its
//! own. See [`cache`] for the tiered stores and [`application::stores`] for
//! the durable-tier contract.

pub mod application;
pub mod cache;
pub mod config;
pub mod domain;
pub mod infra;
