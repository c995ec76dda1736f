pub mod probe;
pub mod serve;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, Args, Parser, Subcommand};
use lattice_common::config::{Config, Role};
use lattice_common::network::target::Target;

#[derive(Parser)]
#[command(name = "lattice")]
#[command(about = "Discovery scanner and metered token API.")]
pub struct CommandLine {
    /// Raise log verbosity (-v debug, -vv trace); RUST_LOG overrides
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Serve the API; the primary instance also scans and sweeps (default)
    #[command(alias = "s")]
    Serve(ServeArgs),
    /// Probe a single address:port once and report the outcome
    #[command(alias = "p")]
    Probe {
        target: Target,
        /// Probe timeout in milliseconds
        #[arg(long)]
        timeout_ms: Option<u64>,
        /// Path requested on the target
        #[arg(long)]
        path: Option<String>,
    },
}

impl Default for Commands {
    fn default() -> Self {
        Commands::Serve(ServeArgs::default())
    }
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

/// Overrides for [`Config`]; anything left unset keeps its default.
#[derive(Args, Default)]
pub struct ServeArgs {
    /// Address to listen on
    #[arg(long)]
    pub bind: Option<SocketAddr>,
    /// primary, replica or auto (contend for the lock file)
    #[arg(long)]
    pub role: Option<Role>,
    /// Lock file used by --role auto
    #[arg(long)]
    pub lock_file: Option<PathBuf>,
    /// Base URL of the primary, for replicas verifying foreign tokens
    #[arg(long)]
    pub primary_url: Option<String>,
    /// Value of the Server response header
    #[arg(long)]
    pub server_name: Option<String>,

    /// Number of concurrent probe workers
    #[arg(long)]
    pub workers: Option<usize>,
    /// Targets queued ahead of the workers before submission waits
    #[arg(long)]
    pub queue_depth: Option<usize>,
    #[arg(long)]
    pub probe_timeout_ms: Option<u64>,
    /// Pause after each generated host
    #[arg(long)]
    pub batch_delay_ms: Option<u64>,
    #[arg(long)]
    pub probe_path: Option<String>,
    /// Ports probed on every generated host
    #[arg(long, value_delimiter = ',')]
    pub ports: Vec<u16>,

    /// How long a confirmed host is left alone
    #[arg(long)]
    pub suppression_secs: Option<u64>,
    /// How long discovery history is kept; must exceed the suppression window
    #[arg(long)]
    pub retention_secs: Option<u64>,
    #[arg(long)]
    pub token_ttl_secs: Option<u64>,
    #[arg(long)]
    pub sweep_interval_secs: Option<u64>,

    #[arg(long)]
    pub price: Option<String>,
    /// Address payments settle to
    #[arg(long)]
    pub pay_to: Option<String>,
    #[arg(long)]
    pub facilitator_url: Option<String>,
    /// Asset contract address
    #[arg(long)]
    pub asset: Option<String>,
}

impl ServeArgs {
    pub fn into_config(self) -> Config {
        let mut cfg = Config::default();

        if let Some(bind) = self.bind {
            cfg.bind_addr = bind;
        }
        if let Some(role) = self.role {
            cfg.role = role;
        }
        if let Some(path) = self.lock_file {
            cfg.lock_path = path;
        }
        cfg.primary_url = self.primary_url;
        if let Some(name) = self.server_name {
            cfg.server_name = name;
        }

        let scan = &mut cfg.scan;
        if let Some(workers) = self.workers {
            scan.workers = workers;
        }
        if let Some(depth) = self.queue_depth {
            scan.queue_depth = depth;
        }
        if let Some(ms) = self.probe_timeout_ms {
            scan.probe_timeout = Duration::from_millis(ms);
        }
        if let Some(ms) = self.batch_delay_ms {
            scan.batch_delay = Duration::from_millis(ms);
        }
        if let Some(path) = self.probe_path {
            scan.probe_path = path;
        }
        if !self.ports.is_empty() {
            scan.ports = self.ports;
        }

        let cache = &mut cfg.cache;
        if let Some(secs) = self.suppression_secs {
            cache.suppression_window = Duration::from_secs(secs);
        }
        if let Some(secs) = self.retention_secs {
            cache.retention_window = Duration::from_secs(secs);
        }
        if let Some(secs) = self.token_ttl_secs {
            cache.token_ttl = Duration::from_secs(secs);
        }
        if let Some(secs) = self.sweep_interval_secs {
            cache.sweep_interval = Duration::from_secs(secs);
        }

        let gate = &mut cfg.gate;
        if let Some(price) = self.price {
            gate.price = price;
        }
        if let Some(pay_to) = self.pay_to {
            gate.pay_to = pay_to;
        }
        if let Some(url) = self.facilitator_url {
            gate.facilitator_url = url;
        }
        if let Some(asset) = self.asset {
            gate.asset = asset;
        }

        cfg
    }
}
