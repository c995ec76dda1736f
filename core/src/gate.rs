//! # Request Gate
//!
//! Metered access to the solve endpoint. A request without a payment proof gets a
//! [`Challenge`] describing how to pay. A request carrying a proof the configured
//! [`ProofVerifier`] accepts is issued a fresh token, which is stored in the token cache and
//! can later be checked with [`RequestGate::verify`].
//!
//! Tokens are three SHA-256 digests of independent 6-byte slices of 18 random bytes, hex
//! encoded and concatenated (192 hex characters). They are opaque identifiers, not proofs
//! of work.

use std::sync::Arc;
use std::time::{Duration, Instant};

use lattice_common::cache::tokens::TokenCache;
use lattice_common::config::GateConfig;
use lattice_common::stats::Stats;
use reqwest::{Client, StatusCode, Url};
use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

/// Request header carrying the payment proof.
pub const PROOF_HEADER: &str = "X-PAYMENT";
pub const PAYMENT_SCHEME: &str = "x402";

pub const ENTROPY_LEN: usize = 18;
const SLICE_LEN: usize = 6;
/// Length of an issued token in hex characters.
pub const TOKEN_LEN: usize = (ENTROPY_LEN / SLICE_LEN) * 64;

/// What a client needs to settle a payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Challenge {
    pub scheme: &'static str,
    pub price: String,
    pub address: String,
    pub facilitator: String,
    pub token: String,
}

impl Challenge {
    pub fn from_config(cfg: &GateConfig) -> Self {
        Self {
            scheme: PAYMENT_SCHEME,
            price: cfg.price.clone(),
            address: cfg.pay_to.clone(),
            facilitator: cfg.facilitator_url.clone(),
            token: cfg.asset.clone(),
        }
    }

    /// Value of the `WWW-Authenticate` header sent with a 402.
    pub fn header_value(&self) -> String {
        format!(
            r#"{} price="{}", address="{}", facilitator="{}", token="{}""#,
            self.scheme, self.price, self.address, self.facilitator, self.token
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateOutcome {
    Challenge(Challenge),
    Settled { token: String },
}

/// Decides whether a payment proof is good enough to issue a token.
pub trait ProofVerifier: Send + Sync {
    fn accept(&self, proof: &str) -> bool;
}

/// Accepts any non-blank proof without contacting a settlement service.
pub struct PresenceOnly;

impl ProofVerifier for PresenceOnly {
    fn accept(&self, proof: &str) -> bool {
        !proof.trim().is_empty()
    }
}

pub struct RequestGate {
    tokens: Arc<TokenCache>,
    stats: Arc<Stats>,
    challenge: Challenge,
    verifier: Box<dyn ProofVerifier>,
}

impl RequestGate {
    pub fn new(
        tokens: Arc<TokenCache>,
        stats: Arc<Stats>,
        challenge: Challenge,
        verifier: Box<dyn ProofVerifier>,
    ) -> Self {
        Self {
            tokens,
            stats,
            challenge,
            verifier,
        }
    }

    /// Challenges or settles a single request given its proof header, if any.
    pub fn handle(&self, proof: Option<&str>) -> GateOutcome {
        match proof {
            Some(proof) if self.verifier.accept(proof) => GateOutcome::Settled {
                token: self.issue(),
            },
            _ => GateOutcome::Challenge(self.challenge.clone()),
        }
    }

    /// Whether `token` was issued here and not yet swept. Malformed tokens never verify.
    pub fn verify(&self, token: &str) -> bool {
        is_well_formed(token) && self.tokens.verify(token)
    }

    fn issue(&self) -> String {
        let entropy: [u8; ENTROPY_LEN] = rand::random();
        let token: String = derive_token(&entropy);

        self.tokens.issue(token.clone(), Instant::now());
        let total: u64 = self.stats.record_solve();
        debug!(total, "token issued");
        token
    }
}

/// Hashes each 6-byte slice of `entropy` and concatenates the hex digests.
pub fn derive_token(entropy: &[u8; ENTROPY_LEN]) -> String {
    entropy
        .chunks(SLICE_LEN)
        .map(|slice| hex::encode(Sha256::digest(slice)))
        .collect()
}

/// Whether `token` has the shape of an issued token: exactly [`TOKEN_LEN`] ASCII hex digits.
pub fn is_well_formed(token: &str) -> bool {
    token.len() == TOKEN_LEN && token.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Asks the primary instance about tokens this replica never issued.
pub struct PrimaryLink {
    client: Client,
    base_url: Url,
}

impl PrimaryLink {
    pub fn new(base_url: &str, request_timeout: Duration) -> anyhow::Result<Self> {
        let client: Client = Client::builder().timeout(request_timeout).build()?;
        let base_url: Url = Url::parse(base_url)?;
        anyhow::ensure!(
            !base_url.cannot_be_a_base(),
            "primary URL {base_url} cannot carry a path"
        );
        Ok(Self { client, base_url })
    }

    /// `{base}/verify/{token}`, with the token encoded as one path segment.
    fn verify_url(&self, token: &str) -> Option<Url> {
        let mut url: Url = self.base_url.clone();
        url.path_segments_mut()
            .ok()?
            .pop_if_empty()
            .push("verify")
            .push(token);
        Some(url)
    }

    pub async fn verify(&self, token: &str) -> bool {
        if !is_well_formed(token) {
            return false;
        }
        let Some(url) = self.verify_url(token) else {
            return false;
        };

        match self.client.get(url).send().await {
            Ok(resp) => resp.status() == StatusCode::OK,
            Err(e) => {
                warn!("Could not reach primary at {}: {e}", self.base_url);
                false
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
