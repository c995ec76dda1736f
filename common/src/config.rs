use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{Error, Result};

pub const DEFAULT_PROBE_PATH: &str = "/.well-known/agent.json";
pub const DEFAULT_PORTS: &[u16] = &[80, 443, 4021, 8080, 5000];

/// Which background duties a process takes on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Role {
    /// Always run the scanner and sweeper.
    Primary,
    /// Never run the scanner; only serve requests.
    Replica,
    /// Become primary if the lock file can be locked exclusively, replica otherwise.
    Auto,
}

impl FromStr for Role {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "primary" => Ok(Role::Primary),
            "replica" => Ok(Role::Replica),
            "auto" => Ok(Role::Auto),
            _ => Err(Error::InvalidRole(s.to_string())),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Role::Primary => "primary",
            Role::Replica => "replica",
            Role::Auto => "auto",
        };
        f.write_str(name)
    }
}

pub struct Config {
    /// Address the HTTP server listens on.
    pub bind_addr: SocketAddr,
    /// Sent as the `Server` response header.
    pub server_name: String,
    pub role: Role,
    /// Lock file contended for when `role` is [`Role::Auto`].
    pub lock_path: PathBuf,
    /// Base URL of the primary, used by replicas to verify tokens they did not issue.
    pub primary_url: Option<String>,
    pub scan: ScanConfig,
    pub cache: CacheConfig,
    pub gate: GateConfig,
}

pub struct ScanConfig {
    /// Number of concurrent probe workers.
    pub workers: usize,
    /// Capacity of the queue between the scanner and the workers.
    ///
    /// Submission waits once this many targets are pending.
    pub queue_depth: usize,
    pub probe_timeout: Duration,
    /// Pause after each generated host, capping the submission rate.
    pub batch_delay: Duration,
    pub probe_path: String,
    pub ports: Vec<u16>,
}

pub struct CacheConfig {
    pub suppression_window: Duration,
    pub retention_window: Duration,
    pub token_ttl: Duration,
    pub sweep_interval: Duration,
}

pub struct GateConfig {
    pub service_name: String,
    pub price: String,
    /// Destination address payments settle to. Also announced by probes.
    pub pay_to: String,
    pub facilitator_url: String,
    /// Asset contract address.
    pub asset: String,
    pub asset_symbol: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 4021)),
            server_name: "Lattice".to_string(),
            role: Role::Auto,
            lock_path: std::env::temp_dir().join("lattice.lock"),
            primary_url: None,
            scan: ScanConfig::default(),
            cache: CacheConfig::default(),
            gate: GateConfig::default(),
        }
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            workers: 50,
            queue_depth: 100,
            probe_timeout: Duration::from_millis(500),
            batch_delay: Duration::from_millis(10),
            probe_path: DEFAULT_PROBE_PATH.to_string(),
            ports: DEFAULT_PORTS.to_vec(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            suppression_window: Duration::from_secs(24 * 60 * 60),
            retention_window: Duration::from_secs(48 * 60 * 60),
            token_ttl: Duration::from_secs(60 * 60),
            sweep_interval: Duration::from_secs(60),
        }
    }
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            service_name: "Lattice-Fast-Solve".to_string(),
            price: "1.00".to_string(),
            pay_to: "0xCf2126b7e17b53D600323a7E37Be49AD15BcaF94".to_string(),
            facilitator_url: "https://api.cdp.coinbase.com/platform/v2/x402".to_string(),
            asset: "0x833589fCD6eDb6E08f4c7C32D4f71b54bdA02913".to_string(),
            asset_symbol: "USDC".to_string(),
        }
    }
}

impl Config {
    /// Rejects settings the background tasks cannot run with.
    pub fn validate(&self) -> Result<()> {
        let cache = &self.cache;
        if cache.retention_window <= cache.suppression_window {
            return Err(Error::RetentionTooShort {
                suppression: cache.suppression_window,
                retention: cache.retention_window,
            });
        }

        let required: [(&'static str, bool); 5] = [
            ("workers", self.scan.workers == 0),
            ("queue depth", self.scan.queue_depth == 0),
            ("ports", self.scan.ports.is_empty()),
            ("token ttl", cache.token_ttl.is_zero()),
            ("sweep interval", cache.sweep_interval.is_zero()),
        ];

        match required.into_iter().find(|(_, is_zero)| *is_zero) {
            Some((field, _)) => Err(Error::ZeroValue { field }),
            None => Ok(()),
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
