//! Fixed-size probe worker pool.
//!
//! Targets travel from the scanner to `workers` long-lived tasks through one bounded queue.
//! When every worker is busy and the queue is full, [`ProbePool::submit`] waits until a slot
//! frees up, so a fast generator can never pile up unbounded in-flight probes.

use std::sync::Arc;
use std::time::Instant;

use lattice_common::cache::backoff::BackoffRegistry;
use lattice_common::error::{Error, Result};
use lattice_common::network::target::Target;
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::network::probe::{Outcome, Prober};

type SharedQueue = Arc<Mutex<mpsc::Receiver<Target>>>;

pub struct ProbePool {
    queue: mpsc::Sender<Target>,
    workers: Vec<JoinHandle<()>>,
}

impl ProbePool {
    /// Spawns `workers` tasks draining a queue of `queue_depth` targets.
    ///
    /// Must be called from within a tokio runtime. Both sizes must be non-zero.
    pub fn spawn(
        prober: Arc<dyn Prober>,
        registry: Arc<BackoffRegistry>,
        workers: usize,
        queue_depth: usize,
    ) -> Self {
        let (tx, rx) = mpsc::channel::<Target>(queue_depth);
        let rx: SharedQueue = Arc::new(Mutex::new(rx));

        let workers: Vec<JoinHandle<()>> = (0..workers)
            .map(|id| {
                tokio::spawn(run_worker(
                    id,
                    rx.clone(),
                    prober.clone(),
                    registry.clone(),
                ))
            })
            .collect();

        Self { queue: tx, workers }
    }

    /// Queues `target`, waiting while the queue is full.
    pub async fn submit(&self, target: Target) -> Result<()> {
        self.queue.send(target).await.map_err(|_| Error::PoolClosed)
    }

    /// Targets queued but not yet taken by a worker.
    pub fn pending(&self) -> usize {
        self.queue.max_capacity() - self.queue.capacity()
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Closes the queue and waits for the workers to finish what is already queued.
    pub async fn shutdown(self) {
        let Self { queue, workers } = self;
        drop(queue);

        for worker in workers {
            if let Err(e) = worker.await {
                error!("Probe worker ended abnormally: {e}");
            }
        }
    }
}

async fn run_worker(
    id: usize,
    queue: SharedQueue,
    prober: Arc<dyn Prober>,
    registry: Arc<BackoffRegistry>,
) {
    loop {
        let next: Option<Target> = queue.lock().await.recv().await;
        let Some(target) = next else {
            break;
        };

        if prober.probe(target).await == Outcome::Positive {
            info!(host = %target, "well-known resource found");
            registry.record_hit(&target, Instant::now());
        }
    }
    debug!(worker = id, "probe worker stopped");
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
