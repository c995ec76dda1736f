use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use lattice_common::config::Config;
use lattice_core::api::{self, ApiState};
use lattice_core::context::AppContext;
use lattice_core::gate::PrimaryLink;
use lattice_core::guard::{self, Ownership};
use lattice_core::network::probe::Prober;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

const PRIMARY_LINK_TIMEOUT: Duration = Duration::from_secs(2);

pub async fn serve(cfg: Config) -> anyhow::Result<()> {
    let ctx: AppContext = AppContext::new(cfg).context("invalid configuration")?;
    let config = ctx.config.clone();

    let ownership: Ownership = guard::acquire(&config.role, &config.lock_path)?;
    let primary: bool = ownership.is_primary();

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let mut background: Vec<JoinHandle<()>> = Vec::new();

    if primary {
        let prober: Arc<dyn Prober> = Arc::new(ctx.http_prober()?);
        let scanner = ctx.discovery_scanner(prober);
        let rx = shutdown_rx.clone();
        background.push(tokio::spawn(async move {
            scanner.run(rx).await;
        }));
    }
    background.push(tokio::spawn(ctx.sweeper(primary).run(shutdown_rx)));

    warn!("Payment proofs are accepted on presence alone, no settlement check is made");
    let mut state = ApiState::new(ctx.clone(), ctx.request_gate());
    if let (false, Some(url)) = (primary, &config.primary_url) {
        info!("Unknown tokens will be checked against the primary at {url}");
        state = state.with_primary(PrimaryLink::new(url.as_str(), PRIMARY_LINK_TIMEOUT)?);
    }

    let listener: TcpListener = TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;
    info!("Listening on {}", config.bind_addr);

    axum::serve(listener, api::router(state))
        .with_graceful_shutdown(ctrl_c())
        .await
        .context("HTTP server failed")?;

    info!("Stopping background tasks");
    let _ = shutdown_tx.send(true);
    for task in background {
        if let Err(e) = task.await {
            error!("Background task ended abnormally: {e}");
        }
    }

    drop(ownership);
    Ok(())
}

async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for Ctrl-C: {e}");
        std::future::pending::<()>().await;
    }
}
