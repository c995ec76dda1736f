//! # Probe Target Model
//!
//! A [`Target`] is a single `address:port` endpoint that the discovery scanner may probe.
//!
//! Targets have no lifecycle of their own: the address generator builds them on demand and
//! a probe consumes them immediately. Their canonical string form (`"1.2.3.4:80"`) is the
//! key used by the backoff registry.

use std::fmt;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::str::FromStr;

use crate::error::Error;

/// An IPv4 endpoint considered as a probe candidate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Target {
    pub addr: Ipv4Addr,
    pub port: u16,
}

impl Target {
    pub fn new(addr: Ipv4Addr, port: u16) -> Self {
        Self { addr, port }
    }

    /// The string form used as a registry key.
    pub fn key(&self) -> String {
        self.to_string()
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::V4(SocketAddrV4::new(self.addr, self.port))
    }

    /// Builds the `http://` URL of `path` on this target.
    ///
    /// `path` is expected to start with `/`; a missing slash is added.
    pub fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("http://{self}{path}")
        } else {
            format!("http://{self}/{path}")
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.addr, self.port)
    }
}

impl From<SocketAddrV4> for Target {
    fn from(addr: SocketAddrV4) -> Self {
        Self::new(*addr.ip(), addr.port())
    }
}

impl FromStr for Target {
    type Err = Error;

    /// Parses `"address:port"`, e.g. `"192.168.1.5:8080"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: String| Error::InvalidTarget {
            input: s.to_string(),
            reason,
        };

        let Some((addr_str, port_str)) = s.trim().rsplit_once(':') else {
            return Err(invalid("expected address:port".to_string()));
        };

        let addr = addr_str
            .parse::<Ipv4Addr>()
            .map_err(|e| invalid(format!("bad address '{addr_str}': {e}")))?;

        let port = port_str
            .parse::<u16>()
            .map_err(|e| invalid(format!("bad port '{port_str}': {e}")))?;

        Ok(Self::new(addr, port))
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
