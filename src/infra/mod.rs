//! Infrastructure adapters: Postgres persistence and telemetry.

pub mod db;
pub mod error;
pub mod telemetry;
