//! Service plumbing shared by albaran binaries: env config, tracing setup,
//! request ids, health probes and serde helpers.

pub mod config;
pub mod health;
pub mod middleware;
pub mod serde;
pub mod tracing;
