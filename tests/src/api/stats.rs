#![cfg(test)]
use std::net::Ipv4Addr;
use std::time::Instant;

use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use lattice_common::config::Config;
use lattice_common::network::target::Target;
use lattice_core::api::{self, ApiState, GATED_PATH};
use lattice_core::context::AppContext;
use lattice_core::gate::PROOF_HEADER;
use serde_json::Value;
use tower::ServiceExt;

async fn json(router: &axum::Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status: StatusCode = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn uri(path: &str) -> Request<Body> {
    Request::builder().uri(path).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn stats_report_solves_and_leads() {
    let ctx: AppContext = AppContext::new(Config::default()).unwrap();
    let router = api::router(ApiState::new(ctx.clone(), ctx.request_gate()));

    let (status, body) = json(&router, uri("/stats")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_solves"], 0);
    assert_eq!(body["leads"], 0);

    ctx.registry
        .record_hit(&Target::new(Ipv4Addr::new(192, 0, 2, 1), 80), Instant::now());
    for _ in 0..3 {
        let request = Request::builder()
            .uri(GATED_PATH)
            .header(PROOF_HEADER, "proof")
            .body(Body::empty())
            .unwrap();
        json(&router, request).await;
    }

    let (_, body) = json(&router, uri("/stats")).await;
    assert_eq!(body["total_solves"], 3);
    assert_eq!(body["leads"], 1);
}

#[tokio::test]
async fn manifest_describes_the_service() {
    let ctx: AppContext = AppContext::new(Config::default()).unwrap();
    let router = api::router(ApiState::new(ctx.clone(), ctx.request_gate()));

    let (status, body) = json(&router, uri("/.well-known/agent.json")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], ctx.config.gate.service_name.as_str());
    assert_eq!(body["cost"], "1.00 USDC");
    assert_eq!(ctx.stats.solves(), 0);
}
