use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Process-wide counters. Only ever incremented.
#[derive(Debug, Default)]
pub struct Stats {
    solves: AtomicU64,
}

impl Stats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts one issued token and returns the new total.
    pub fn record_solve(&self) -> u64 {
        self.solves.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn solves(&self) -> u64 {
        self.solves.load(Ordering::Relaxed)
    }
}

/// What `GET /stats` reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    pub total_solves: u64,
    pub leads: usize,
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
