//! # Lattice Core
//!
//! The moving parts of the service:
//!
//! * **[`scanner`]**: random-address discovery feeding a bounded probe worker pool.
//! * **[`sweeper`]**: periodic eviction of aged cache entries.
//! * **[`gate`]**: the payment-gated token issuer and verifier.
//! * **[`guard`]**: decides which process of a deployment runs the background tasks.
//! * **[`api`]**: the HTTP surface over all of the above.
//! * **[`context`]**: the shared state they all hang off.

pub mod api;
pub mod context;
pub mod gate;
pub mod guard;
pub mod network;
pub mod scanner;
pub mod sweeper;
