//! Cross-cutting service plumbing: config loading, tracing setup,
//! request-id middleware and serde helpers.

pub mod config;
pub mod middleware;
pub mod serde;
pub mod tracing;
