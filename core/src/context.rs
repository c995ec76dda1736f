//! Application context.
//!
//! Owns the process-wide shared state, built once at startup and handed out by `Arc` to
//! every component that needs it.

use std::sync::Arc;

use lattice_common::cache::backoff::BackoffRegistry;
use lattice_common::cache::tokens::TokenCache;
use lattice_common::config::Config;
use lattice_common::stats::{Stats, StatsSnapshot};
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::gate::{Challenge, PresenceOnly, RequestGate};
use crate::network::probe::{HttpProber, Prober};
use crate::scanner::DiscoveryScanner;
use crate::scanner::generator::AddressGenerator;
use crate::scanner::pool::ProbePool;
use crate::sweeper::Sweeper;

#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<Config>,
    pub registry: Arc<BackoffRegistry>,
    pub tokens: Arc<TokenCache>,
    pub stats: Arc<Stats>,
}

impl AppContext {
    pub fn new(config: Config) -> lattice_common::error::Result<Self> {
        config.validate()?;

        let registry = BackoffRegistry::new(
            config.cache.suppression_window,
            config.cache.retention_window,
        )?;
        let tokens = TokenCache::new(config.cache.token_ttl);

        Ok(Self {
            config: Arc::new(config),
            registry: Arc::new(registry),
            tokens: Arc::new(tokens),
            stats: Arc::new(Stats::new()),
        })
    }

    pub fn stats_snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            total_solves: self.stats.solves(),
            leads: self.registry.len(),
        }
    }

    /// A gate that accepts any non-blank proof.
    pub fn request_gate(&self) -> RequestGate {
        RequestGate::new(
            self.tokens.clone(),
            self.stats.clone(),
            Challenge::from_config(&self.config.gate),
            Box::new(PresenceOnly),
        )
    }

    /// The prober configured for this deployment.
    pub fn http_prober(&self) -> anyhow::Result<HttpProber> {
        let scan = &self.config.scan;
        HttpProber::new(
            scan.probe_timeout,
            scan.probe_path.clone(),
            self.config.gate.pay_to.clone(),
        )
    }

    /// Builds the scanner and spawns its worker pool. Needs a tokio runtime.
    pub fn discovery_scanner(
        &self,
        prober: Arc<dyn Prober>,
    ) -> DiscoveryScanner<AddressGenerator<StdRng>> {
        let scan = &self.config.scan;
        let generator = AddressGenerator::new(StdRng::from_os_rng(), scan.ports.clone());
        let batch_size: usize = generator.targets_per_host();
        let pool = ProbePool::spawn(prober, self.registry.clone(), scan.workers, scan.queue_depth);

        DiscoveryScanner::new(
            generator,
            self.registry.clone(),
            pool,
            batch_size,
            scan.batch_delay,
        )
    }

    /// Primaries sweep both caches; replicas only their own tokens.
    pub fn sweeper(&self, primary: bool) -> Sweeper {
        let registry: Option<Arc<BackoffRegistry>> = primary.then(|| self.registry.clone());
        Sweeper::new(self.tokens.clone(), registry, self.config.cache.sweep_interval)
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
