//! # Token Cache
//!
//! Holds every issued token with its issuance time. Verification is a plain lookup: a token
//! stays verifiable until a sweep removes it, which may lag its nominal TTL by up to one
//! sweep interval.

use std::time::{Duration, Instant};

use dashmap::DashMap;

pub struct TokenCache {
    issued: DashMap<String, Instant>,
    ttl: Duration,
}

impl TokenCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            issued: DashMap::new(),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Stores a freshly issued token.
    pub fn issue(&self, token: impl Into<String>, now: Instant) {
        self.issued.insert(token.into(), now);
    }

    /// Whether `token` is present. Does not mutate and does not check age.
    pub fn verify(&self, token: &str) -> bool {
        self.issued.contains_key(token)
    }

    pub fn len(&self) -> usize {
        self.issued.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issued.is_empty()
    }

    /// Removes every token at least one TTL old. Returns how many were removed.
    pub fn prune(&self, now: Instant) -> usize {
        let before: usize = self.issued.len();
        self.issued
            .retain(|_, issued_at| !super::is_older_than(*issued_at, now, self.ttl));
        before.saturating_sub(self.issued.len())
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
