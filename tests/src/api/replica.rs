#![cfg(test)]
use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use lattice_common::config::Config;
use lattice_core::api::{self, ApiState};
use lattice_core::context::AppContext;
use lattice_core::gate::{GateOutcome, PrimaryLink, TOKEN_LEN};
use serde_json::Value;
use tower::ServiceExt;

const LINK_TIMEOUT: Duration = Duration::from_secs(2);

/// Serves a primary instance on a loopback port.
async fn primary() -> (AppContext, SocketAddr) {
    let ctx: AppContext = AppContext::new(Config::default()).unwrap();
    let router: Router = api::router(ApiState::new(ctx.clone(), ctx.request_gate()));
    let listener = tokio::net::TcpListener::bind((Ipv4Addr::LOCALHOST, 0))
        .await
        .unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    (ctx, addr)
}

/// A replica with its own empty token cache, falling back to `primary_url`.
fn replica(primary_url: &str) -> (AppContext, Router) {
    let ctx: AppContext = AppContext::new(Config::default()).unwrap();
    let link: PrimaryLink = PrimaryLink::new(primary_url, LINK_TIMEOUT).unwrap();
    let state: ApiState = ApiState::new(ctx.clone(), ctx.request_gate()).with_primary(link);
    (ctx, api::router(state))
}

fn issue(ctx: &AppContext) -> String {
    let GateOutcome::Settled { token } = ctx.request_gate().handle(Some("proof")) else {
        panic!("expected settlement");
    };
    token
}

async fn verify(router: &Router, token: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .uri(format!("/verify/{token}"))
        .body(Body::empty())
        .unwrap();
    let response = router.clone().oneshot(request).await.unwrap();

    let status: StatusCode = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

#[tokio::test]
async fn replica_verifies_tokens_issued_by_the_primary() {
    let (primary_ctx, addr) = primary().await;
    let (replica_ctx, router) = replica(&format!("http://{addr}"));

    let token: String = issue(&primary_ctx);
    assert!(replica_ctx.tokens.is_empty());

    let (status, body) = verify(&router, &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "verified");
}

#[tokio::test]
async fn replica_rejects_tokens_the_primary_never_issued() {
    let (primary_ctx, addr) = primary().await;
    let (_, router) = replica(&format!("http://{addr}/"));
    issue(&primary_ctx);

    let (status, body) = verify(&router, &"0".repeat(TOKEN_LEN)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["status"], "invalid");
}

#[tokio::test]
async fn encoded_dot_segments_never_reach_other_primary_routes() {
    let (primary_ctx, addr) = primary().await;
    let (_, router) = replica(&format!("http://{addr}"));
    issue(&primary_ctx);

    // Both would answer 200 on the primary if the token escaped its path segment
    for token in ["..%2Fstats", "..%2F.well-known%2Fagent.json", "%2E%2E%2Fstats"] {
        let (status, body) = verify(&router, token).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{token} should not verify");
        assert_eq!(body["status"], "invalid");
    }
}

#[tokio::test]
async fn unreachable_primary_means_invalid() {
    let port: u16 = {
        let listener = std::net::TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).unwrap();
        listener.local_addr().unwrap().port()
    };
    let (replica_ctx, router) = replica(&format!("http://127.0.0.1:{port}"));

    let (status, body) = verify(&router, &"ab".repeat(TOKEN_LEN / 2)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["status"], "invalid");

    // Local tokens still verify without the primary
    let token: String = issue(&replica_ctx);
    let (status, _) = verify(&router, &token).await;
    assert_eq!(status, StatusCode::OK);
}
