#![cfg(test)]
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::Router;
use axum::routing::get;
use lattice_common::cache::backoff::BackoffRegistry;
use lattice_common::config::{Config, DEFAULT_PROBE_PATH};
use lattice_common::network::target::Target;
use lattice_core::context::AppContext;
use lattice_core::network::probe::{HttpProber, Prober};
use lattice_core::scanner::{DiscoveryScanner, ScanSummary};
use lattice_core::scanner::pool::ProbePool;
use tokio::sync::watch;

/// Serves the well-known resource on a loopback port.
async fn live_target() -> Target {
    let listener = tokio::net::TcpListener::bind((Ipv4Addr::LOCALHOST, 0))
        .await
        .unwrap();
    let SocketAddr::V4(addr) = listener.local_addr().unwrap() else {
        panic!("expected an IPv4 listener");
    };
    let router = Router::new().route(DEFAULT_PROBE_PATH, get(|| async { "{}" }));
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    Target::from(addr)
}

/// A loopback port with nothing listening.
fn dead_target() -> Target {
    let listener = std::net::TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).unwrap();
    let port: u16 = listener.local_addr().unwrap().port();
    drop(listener);
    Target::new(Ipv4Addr::LOCALHOST, port)
}

fn context() -> AppContext {
    let mut config = Config::default();
    config.scan.workers = 4;
    config.scan.queue_depth = 2;
    AppContext::new(config).unwrap()
}

#[tokio::test]
async fn scan_records_only_live_hosts() {
    let ctx: AppContext = context();
    let live: Target = live_target().await;
    let dead: Target = dead_target();

    let prober: Arc<dyn Prober> = Arc::new(ctx.http_prober().unwrap());
    let pool = ProbePool::spawn(prober, ctx.registry.clone(), 4, 2);
    let scanner = DiscoveryScanner::new(
        vec![live, dead].into_iter(),
        ctx.registry.clone(),
        pool,
        2,
        Duration::ZERO,
    );

    let (_tx, rx) = watch::channel(false);
    let summary: ScanSummary = scanner.run(rx).await;

    assert_eq!(summary.submitted, 2);
    assert_eq!(ctx.registry.len(), 1);
    assert!(ctx.registry.last_hit(&live).is_some());
    assert!(ctx.registry.last_hit(&dead).is_none());
    assert_eq!(ctx.stats_snapshot().leads, 1);
}

#[tokio::test]
async fn confirmed_host_is_not_probed_again_within_suppression() {
    let ctx: AppContext = context();
    let live: Target = live_target().await;

    let prober: Arc<dyn Prober> = Arc::new(ctx.http_prober().unwrap());
    let run_once = |registry: Arc<BackoffRegistry>, prober: Arc<dyn Prober>| async move {
        let pool = ProbePool::spawn(prober, registry.clone(), 2, 1);
        let scanner = DiscoveryScanner::new(
            std::iter::once(live),
            registry,
            pool,
            1,
            Duration::ZERO,
        );
        let (_tx, rx) = watch::channel(false);
        scanner.run(rx).await
    };

    let first: ScanSummary = run_once(ctx.registry.clone(), prober.clone()).await;
    let stamped: Instant = ctx.registry.last_hit(&live).expect("live host not recorded");

    let second: ScanSummary = run_once(ctx.registry.clone(), prober).await;

    assert_eq!(first.submitted, 1);
    assert_eq!(second.submitted, 0);
    assert_eq!(second.suppressed, 1);
    assert_eq!(ctx.registry.last_hit(&live), Some(stamped));
}

#[tokio::test]
async fn prober_uses_configured_path() {
    let live: Target = live_target().await;
    let wrong_path = HttpProber::new(Duration::from_millis(500), "/nope", "0x0").unwrap();
    let right_path = HttpProber::new(Duration::from_millis(500), DEFAULT_PROBE_PATH, "0x0").unwrap();

    assert_eq!(
        wrong_path.probe(live).await,
        lattice_core::network::probe::Outcome::Negative
    );
    assert_eq!(
        right_path.probe(live).await,
        lattice_core::network::probe::Outcome::Positive
    );
}
