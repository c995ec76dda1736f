#![cfg(test)]
use std::time::{Duration, Instant};

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{HeaderValue, Request, StatusCode, header};
use lattice_common::config::Config;
use lattice_core::api::{self, ApiState, GATED_PATH};
use lattice_core::context::AppContext;
use lattice_core::gate::{PROOF_HEADER, TOKEN_LEN};
use serde_json::Value;
use tower::ServiceExt;

fn app() -> (AppContext, Router) {
    let ctx: AppContext = AppContext::new(Config::default()).unwrap();
    let router: Router = api::router(ApiState::new(ctx.clone(), ctx.request_gate()));
    (ctx, router)
}

async fn get(router: &Router, uri: &str, proof: Option<&str>) -> (StatusCode, header::HeaderMap, Value) {
    let mut request = Request::builder().uri(uri);
    if let Some(proof) = proof {
        request = request.header(PROOF_HEADER, proof);
    }

    let response = router
        .clone()
        .oneshot(request.body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status: StatusCode = response.status();
    let headers = response.headers().clone();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, headers, body)
}

#[tokio::test]
async fn request_without_proof_is_challenged() {
    let (ctx, router) = app();

    let (status, headers, body) = get(&router, GATED_PATH, None).await;

    assert_eq!(status, StatusCode::PAYMENT_REQUIRED);
    let challenge: &str = headers
        .get(header::WWW_AUTHENTICATE)
        .expect("challenge header missing")
        .to_str()
        .unwrap();
    let gate = &ctx.config.gate;
    assert!(challenge.starts_with("x402 "));
    assert!(challenge.contains(&format!(r#"price="{}""#, gate.price)));
    assert!(challenge.contains(&format!(r#"address="{}""#, gate.pay_to)));
    assert!(challenge.contains(&format!(r#"facilitator="{}""#, gate.facilitator_url)));
    assert!(challenge.contains(&format!(r#"token="{}""#, gate.asset)));

    assert_eq!(body["price"], gate.price.as_str());
    assert_eq!(body["address"], gate.pay_to.as_str());

    assert_eq!(ctx.stats.solves(), 0);
    assert!(ctx.tokens.is_empty());
}

#[tokio::test]
async fn empty_proof_header_is_challenged() {
    let (ctx, router) = app();
    let (status, _, _) = get(&router, GATED_PATH, Some("")).await;

    assert_eq!(status, StatusCode::PAYMENT_REQUIRED);
    assert_eq!(ctx.stats.solves(), 0);
}

#[tokio::test]
async fn opaque_proof_bytes_still_settle() {
    let (ctx, router) = app();
    let proof: HeaderValue = HeaderValue::from_bytes(b"pay\xffload").unwrap();
    assert!(proof.to_str().is_err());

    let request = Request::builder()
        .uri(GATED_PATH)
        .header(PROOF_HEADER, proof)
        .body(Body::empty())
        .unwrap();
    let response = router.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["status"], "settled");
    assert_eq!(ctx.stats.solves(), 1);
}

#[tokio::test]
async fn proof_settles_and_token_verifies() {
    let (ctx, router) = app();

    let (status, _, body) = get(&router, GATED_PATH, Some("signed-payload")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "settled");

    let token: &str = body["solve"].as_str().expect("solve missing");
    assert_eq!(token.len(), TOKEN_LEN);
    assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
    assert_eq!(ctx.stats.solves(), 1);

    let (status, _, body) = get(&router, &format!("/verify/{token}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "verified");

    // Verification never consumes the token
    let (status, _, _) = get(&router, &format!("/verify/{token}"), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn unknown_token_is_invalid() {
    let (_, router) = app();
    let (status, _, body) = get(&router, "/verify/not-a-token", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["status"], "invalid");

    let (status, _, _) = get(&router, &format!("/verify/{}", "0".repeat(TOKEN_LEN)), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn swept_token_stops_verifying() {
    let (ctx, router) = app();
    let (_, _, body) = get(&router, GATED_PATH, Some("proof")).await;
    let token: String = body["solve"].as_str().unwrap().to_string();

    let sweeper = ctx.sweeper(true);
    let ttl: Duration = ctx.config.cache.token_ttl;

    // Still inside the TTL: survives the sweep
    sweeper.sweep_once(Instant::now() + ttl - Duration::from_secs(1));
    let (status, _, _) = get(&router, &format!("/verify/{token}"), None).await;
    assert_eq!(status, StatusCode::OK);

    // Past the TTL: gone
    sweeper.sweep_once(Instant::now() + ttl + Duration::from_secs(1));
    let (status, _, _) = get(&router, &format!("/verify/{token}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn responses_carry_the_server_header() {
    let (ctx, router) = app();
    let (_, headers, _) = get(&router, "/verify/x", None).await;

    assert_eq!(
        headers.get(header::SERVER).unwrap(),
        ctx.config.server_name.as_str()
    );
}
