//! Periodic eviction of aged cache entries.
//!
//! Every `interval` the sweeper prunes the token cache by its TTL and, when this process owns
//! one, the backoff registry by its retention window. Each cache is pruned in isolation: a
//! panic while pruning one is logged and the pass carries on with the next.
//!
//! Isolation stops at the cache. Inside one, the per-key check is a checked timestamp
//! comparison in `DashMap::retain` with nothing left in it to panic, so every key of a
//! cache that starts pruning is visited.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::{Duration, Instant};

use lattice_common::cache::backoff::BackoffRegistry;
use lattice_common::cache::tokens::TokenCache;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SweepReport {
    pub tokens_removed: usize,
    pub records_removed: usize,
}

pub struct Sweeper {
    tokens: Arc<TokenCache>,
    registry: Option<Arc<BackoffRegistry>>,
    interval: Duration,
}

impl Sweeper {
    pub fn new(
        tokens: Arc<TokenCache>,
        registry: Option<Arc<BackoffRegistry>>,
        interval: Duration,
    ) -> Self {
        Self {
            tokens,
            registry,
            interval,
        }
    }

    /// One independent pass over every cache this sweeper owns.
    pub fn sweep_once(&self, now: Instant) -> SweepReport {
        let tokens_removed: usize = prune_isolated("token cache", || self.tokens.prune(now));
        let records_removed: usize = match &self.registry {
            Some(registry) => prune_isolated("backoff registry", || registry.prune(now)),
            None => 0,
        };

        SweepReport {
            tokens_removed,
            records_removed,
        }
    }

    /// Sweeps every `interval` until `shutdown` turns `true` or its sender is dropped.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately
        ticker.tick().await;

        info!(interval = ?self.interval, "eviction sweeper started");
        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = shutdown.changed() => break,
            }

            let report: SweepReport = self.sweep_once(Instant::now());
            debug!(
                tokens = report.tokens_removed,
                records = report.records_removed,
                live_tokens = self.tokens.len(),
                "sweep finished"
            );
        }
        info!("eviction sweeper stopped");
    }
}

fn prune_isolated(cache: &'static str, prune: impl FnOnce() -> usize) -> usize {
    match panic::catch_unwind(AssertUnwindSafe(prune)) {
        Ok(removed) => removed,
        Err(_) => {
            error!(cache, "pruning panicked, skipping to the next cache");
            0
        }
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
