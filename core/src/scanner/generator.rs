//! Endless supply of random IPv4 targets.
//!
//! Each address is four independently drawn octets, the first restricted to `1..=223` so it
//! never lands in `0.0.0.0/8` or the multicast/reserved space. Every address is paired with
//! each configured port in turn. The generator remembers nothing: duplicates are the backoff
//! registry's problem.

use std::net::Ipv4Addr;

use lattice_common::network::target::Target;
use rand::Rng;

const FIRST_OCTET_MIN: u8 = 1;
const FIRST_OCTET_MAX: u8 = 223;

pub struct AddressGenerator<R> {
    rng: R,
    ports: Vec<u16>,
    current: Ipv4Addr,
    next_port: usize,
}

impl<R: Rng> AddressGenerator<R> {
    /// Panics if `ports` is empty.
    pub fn new(rng: R, ports: Vec<u16>) -> Self {
        assert!(!ports.is_empty(), "address generator needs at least one port");
        let next_port: usize = ports.len();
        Self {
            rng,
            ports,
            current: Ipv4Addr::UNSPECIFIED,
            next_port,
        }
    }

    /// Number of targets produced per generated address.
    pub fn targets_per_host(&self) -> usize {
        self.ports.len()
    }

    fn random_addr(&mut self) -> Ipv4Addr {
        Ipv4Addr::new(
            self.rng.random_range(FIRST_OCTET_MIN..=FIRST_OCTET_MAX),
            self.rng.random(),
            self.rng.random(),
            self.rng.random(),
        )
    }
}

impl<R: Rng> Iterator for AddressGenerator<R> {
    type Item = Target;

    fn next(&mut self) -> Option<Target> {
        if self.next_port == self.ports.len() {
            self.current = self.random_addr();
            self.next_port = 0;
        }

        let port: u16 = self.ports[self.next_port];
        self.next_port += 1;
        Some(Target::new(self.current, port))
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
