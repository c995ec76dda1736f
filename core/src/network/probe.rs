//! Existence checks against a single target.
//!
//! A probe is a header-only `HEAD` request for the well-known path with a short fixed
//! timeout. Only an explicit `200 OK` counts as [`Outcome::Positive`]; timeouts, refused
//! connections, TLS failures and every other status are [`Outcome::Negative`] and are
//! dropped without retry.

use std::time::Duration;

use async_trait::async_trait;
use lattice_common::network::target::Target;
use reqwest::{Client, StatusCode};
use tracing::trace;

/// Header carrying our pay-to address on every probe.
pub const WALLET_HEADER: &str = "X-Agent-Wallet";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Positive,
    Negative,
}

/// Strategy for classifying a single target.
#[async_trait]
pub trait Prober: Send + Sync {
    async fn probe(&self, target: Target) -> Outcome;
}

pub struct HttpProber {
    client: Client,
    path: String,
    wallet: String,
}

impl HttpProber {
    pub fn new(
        probe_timeout: Duration,
        path: impl Into<String>,
        wallet: impl Into<String>,
    ) -> anyhow::Result<Self> {
        let client: Client = Client::builder()
            .timeout(probe_timeout)
            .connect_timeout(probe_timeout)
            .build()?;

        Ok(Self {
            client,
            path: path.into(),
            wallet: wallet.into(),
        })
    }
}

#[async_trait]
impl Prober for HttpProber {
    async fn probe(&self, target: Target) -> Outcome {
        let url: String = target.url(&self.path);
        let response = self
            .client
            .head(&url)
            .header(WALLET_HEADER, &self.wallet)
            .send()
            .await;

        match response {
            Ok(resp) if resp.status() == StatusCode::OK => Outcome::Positive,
            Ok(resp) => {
                trace!(host = %target, status = %resp.status(), "negative probe");
                Outcome::Negative
            }
            Err(e) => {
                trace!(host = %target, "probe failed: {e}");
                Outcome::Negative
            }
        }
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
