//! Concurrent in-memory caches keyed by string and stamped with an [`std::time::Instant`].
//!
//! Both caches are plain [`dashmap::DashMap`]s underneath: every mutation is either an
//! unconditional upsert or a per-key age check during a sweep, so no external locking is
//! ever needed. Nothing here is persisted; a restart starts from empty maps.

pub mod backoff;
pub mod tokens;

use std::time::{Duration, Instant};

/// Whether a record stamped at `stamped` is at least `window` old at `now`.
///
/// A stamp from the future (possible when callers race on `Instant::now()`) counts as fresh.
pub(crate) fn is_older_than(stamped: Instant, now: Instant, window: Duration) -> bool {
    now.checked_duration_since(stamped)
        .is_some_and(|age| age >= window)
}
