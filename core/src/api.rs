//! HTTP surface.
//!
//! | Route                       | Purpose                                   |
//! |-----------------------------|-------------------------------------------|
//! | `GET /.well-known/agent.json` | static manifest                         |
//! | `GET /alert`                | payment-gated token issuance              |
//! | `GET /verify/{token}`       | token lookup                              |
//! | `GET /stats`                | solve counter and discovered host count   |

use std::borrow::Cow;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    middleware,
    response::{IntoResponse, Response},
    routing::get,
};
use lattice_common::config::DEFAULT_PROBE_PATH;
use lattice_common::stats::StatsSnapshot;
use serde::Serialize;

use crate::context::AppContext;
use crate::gate::{GateOutcome, PROOF_HEADER, PrimaryLink, RequestGate, is_well_formed};

pub const GATED_PATH: &str = "/alert";

#[derive(Clone)]
pub struct ApiState {
    ctx: AppContext,
    gate: Arc<RequestGate>,
    primary: Option<Arc<PrimaryLink>>,
}

impl ApiState {
    pub fn new(ctx: AppContext, gate: RequestGate) -> Self {
        Self {
            ctx,
            gate: Arc::new(gate),
            primary: None,
        }
    }

    /// Falls back to `primary` for tokens this instance does not know.
    pub fn with_primary(mut self, primary: PrimaryLink) -> Self {
        self.primary = Some(Arc::new(primary));
        self
    }
}

#[derive(Serialize)]
struct Manifest {
    name: String,
    cost: String,
}

#[derive(Serialize)]
struct Settled {
    status: &'static str,
    solve: String,
}

#[derive(Serialize)]
struct Verification {
    status: &'static str,
}

pub fn router(state: ApiState) -> Router {
    let server: HeaderValue = HeaderValue::from_str(&state.ctx.config.server_name)
        .unwrap_or_else(|_| HeaderValue::from_static("Lattice"));

    Router::new()
        .route(DEFAULT_PROBE_PATH, get(manifest))
        .route(GATED_PATH, get(gated))
        .route("/verify/{token}", get(verify))
        .route("/stats", get(stats))
        .with_state(state)
        .layer(middleware::map_response(move |mut res: Response| {
            let server: HeaderValue = server.clone();
            async move {
                res.headers_mut().insert(header::SERVER, server);
                res
            }
        }))
}

async fn manifest(State(state): State<ApiState>) -> Json<Manifest> {
    let gate = &state.ctx.config.gate;
    Json(Manifest {
        name: gate.service_name.clone(),
        cost: format!("{} {}", gate.price, gate.asset_symbol),
    })
}

async fn gated(State(state): State<ApiState>, headers: HeaderMap) -> Response {
    // Proofs are opaque; bytes outside visible ASCII still count as presented.
    let proof: Option<Cow<'_, str>> = headers
        .get(PROOF_HEADER)
        .map(|value| String::from_utf8_lossy(value.as_bytes()));

    match state.gate.handle(proof.as_deref()) {
        GateOutcome::Challenge(challenge) => (
            StatusCode::PAYMENT_REQUIRED,
            [(header::WWW_AUTHENTICATE, challenge.header_value())],
            Json(challenge),
        )
            .into_response(),
        GateOutcome::Settled { token } => Json(Settled {
            status: "settled",
            solve: token,
        })
        .into_response(),
    }
}

async fn verify(State(state): State<ApiState>, Path(token): Path<String>) -> Response {
    let found: bool = if !is_well_formed(&token) {
        false
    } else if state.gate.verify(&token) {
        true
    } else if let Some(primary) = &state.primary {
        primary.verify(&token).await
    } else {
        false
    };

    if found {
        Json(Verification { status: "verified" }).into_response()
    } else {
        (StatusCode::NOT_FOUND, Json(Verification { status: "invalid" })).into_response()
    }
}

async fn stats(State(state): State<ApiState>) -> Json<StatsSnapshot> {
    Json(state.ctx.stats_snapshot())
}
