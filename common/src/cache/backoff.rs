//! # Backoff Registry
//!
//! Remembers when each target last answered a probe positively, so the scanner can skip
//! targets it has confirmed recently.
//!
//! Two windows govern a record:
//! * the **suppression window**: while a record is younger than this, [`BackoffRegistry::should_probe`]
//!   returns `false` for its target;
//! * the **retention window**: the sweeper drops records older than this. It is always longer
//!   than the suppression window, so history outlives the suppression it enforces.
//!
//! Two workers racing on the same target may both probe it once. That extra probe is accepted.

use std::time::{Duration, Instant};

use dashmap::DashMap;

use crate::error::{Error, Result};
use crate::network::target::Target;

pub struct BackoffRegistry {
    records: DashMap<String, Instant>,
    suppression: Duration,
    retention: Duration,
}

impl BackoffRegistry {
    /// Creates an empty registry.
    ///
    /// Fails unless `retention > suppression`.
    pub fn new(suppression: Duration, retention: Duration) -> Result<Self> {
        if retention <= suppression {
            return Err(Error::RetentionTooShort {
                suppression,
                retention,
            });
        }

        Ok(Self {
            records: DashMap::new(),
            suppression,
            retention,
        })
    }

    pub fn suppression_window(&self) -> Duration {
        self.suppression
    }

    pub fn retention_window(&self) -> Duration {
        self.retention
    }

    /// Returns `false` only when `target` was confirmed less than one suppression window ago.
    pub fn should_probe(&self, target: &Target, now: Instant) -> bool {
        match self.records.get(&target.key()) {
            Some(last_hit) => super::is_older_than(*last_hit, now, self.suppression),
            None => true,
        }
    }

    /// Records a positive probe of `target` at `now`, replacing any earlier stamp.
    pub fn record_hit(&self, target: &Target, now: Instant) {
        self.records.insert(target.key(), now);
    }

    /// Timestamp of the last positive probe of `target`, if still retained.
    pub fn last_hit(&self, target: &Target) -> Option<Instant> {
        self.records.get(&target.key()).map(|stamp| *stamp)
    }

    /// Number of live records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Removes every record at least one retention window old. Returns how many were removed.
    pub fn prune(&self, now: Instant) -> usize {
        let before: usize = self.records.len();
        self.records
            .retain(|_, stamped| !super::is_older_than(*stamped, now, self.retention));
        before.saturating_sub(self.records.len())
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
