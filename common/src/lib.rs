//! # Lattice Common
//!
//! Models, configuration and the shared in-memory state used by every other crate
//! in the workspace.
//!
//! * **[`cache`]**: the two concurrent, time-evicted maps (backoff registry and token cache).
//! * **[`config`]**: every tunable of the service, with the deployed values as defaults.
//! * **[`network`]**: probe targets.
//! * **[`stats`]**: process-wide counters.

pub mod cache;
pub mod config;
pub mod error;
pub mod network;
pub mod stats;
