//! Application layer: contracts between the cache and its collaborators.

pub mod stores;
