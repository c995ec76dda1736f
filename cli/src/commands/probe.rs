use std::time::Duration;

use lattice_common::config::Config;
use lattice_common::network::target::Target;
use lattice_core::network::probe::{HttpProber, Outcome, Prober};
use tracing::{info, warn};

pub async fn probe(target: Target, timeout_ms: Option<u64>, path: Option<String>) -> anyhow::Result<()> {
    let cfg = Config::default();
    let timeout: Duration = timeout_ms
        .map(Duration::from_millis)
        .unwrap_or(cfg.scan.probe_timeout);
    let path: String = path.unwrap_or(cfg.scan.probe_path);

    let prober = HttpProber::new(timeout, path.as_str(), cfg.gate.pay_to)?;
    match prober.probe(target).await {
        Outcome::Positive => info!("{target}{path} is POSITIVE"),
        Outcome::Negative => warn!("{target}{path} is NEGATIVE"),
    }
    Ok(())
}
