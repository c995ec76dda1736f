//! The discovery **orchestrator**.
//!
//! Wires the pieces of a scan together:
//!
//! ```text
//! AddressGenerator ──▶ BackoffRegistry::should_probe ──▶ ProbePool ──▶ Prober
//!                                                              └──▶ BackoffRegistry::record_hit
//! ```
//!
//! The scanner itself never fails: a probe that errors is just a negative. It runs until the
//! shutdown signal fires (or the generator runs dry, which only happens in tests), then drains
//! the pool before returning.

use std::sync::Arc;
use std::time::{Duration, Instant};

use lattice_common::cache::backoff::BackoffRegistry;
use lattice_common::network::target::Target;
use tokio::sync::watch;
use tracing::{debug, info};

pub mod generator;
pub mod pool;

use pool::ProbePool;

/// Counters for one scanner run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ScanSummary {
    pub generated: u64,
    pub suppressed: u64,
    pub submitted: u64,
}

pub struct DiscoveryScanner<G> {
    generator: G,
    registry: Arc<BackoffRegistry>,
    pool: ProbePool,
    batch_size: usize,
    batch_delay: Duration,
}

impl<G> DiscoveryScanner<G>
where
    G: Iterator<Item = Target> + Send,
{
    /// `batch_size` targets are submitted between two `batch_delay` pauses.
    pub fn new(
        generator: G,
        registry: Arc<BackoffRegistry>,
        pool: ProbePool,
        batch_size: usize,
        batch_delay: Duration,
    ) -> Self {
        Self {
            generator,
            registry,
            pool,
            batch_size: batch_size.max(1),
            batch_delay,
        }
    }

    /// Runs until `shutdown` turns `true` or its sender is dropped.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) -> ScanSummary {
        let mut summary = ScanSummary::default();
        info!(
            workers = self.pool.worker_count(),
            batch = self.batch_size,
            "discovery scanner started"
        );

        'scan: loop {
            if *shutdown.borrow() {
                break;
            }

            let mut emitted: usize = 0;
            for target in self.generator.by_ref().take(self.batch_size) {
                emitted += 1;
                summary.generated += 1;

                if !self.registry.should_probe(&target, Instant::now()) {
                    summary.suppressed += 1;
                    continue;
                }

                tokio::select! {
                    submitted = self.pool.submit(target) => {
                        if submitted.is_err() {
                            break 'scan;
                        }
                        summary.submitted += 1;
                    }
                    _ = shutdown.changed() => break 'scan,
                }
            }

            if emitted == 0 {
                debug!("address generator exhausted");
                break;
            }

            if !self.batch_delay.is_zero() {
                tokio::select! {
                    _ = tokio::time::sleep(self.batch_delay) => {}
                    _ = shutdown.changed() => break 'scan,
                }
            }
        }

        info!(pending = self.pool.pending(), "draining probe workers");
        self.pool.shutdown().await;
        info!(
            generated = summary.generated,
            suppressed = summary.suppressed,
            submitted = summary.submitted,
            "discovery scanner stopped"
        );
        summary
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
