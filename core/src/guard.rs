//! Single-instance guard.
//!
//! Decides at startup whether this process is the **primary** of its deployment, the one
//! process allowed to run the discovery scanner and sweep the backoff registry. The role is
//! either configured explicitly or contended for through an exclusive `flock(2)` on a
//! shared lock file; whoever holds the lock is primary until it exits.

use std::fs::{File, OpenOptions};
use std::io;
use std::path::Path;

use fs4::FileExt as _;
use lattice_common::config::Role;
use lattice_common::error::{Error, Result};
use tracing::{info, warn};

/// A held exclusive lock, released on drop.
pub struct InstanceLock(File);

impl Drop for InstanceLock {
    fn drop(&mut self) {
        if let Err(error) = self.0.unlock() {
            warn!("Failed to release instance lock: {error}");
        }
    }
}

pub enum Ownership {
    /// Keep the lock (if any) alive for as long as the background tasks run.
    Primary(Option<InstanceLock>),
    Replica,
}

impl Ownership {
    pub fn is_primary(&self) -> bool {
        matches!(self, Ownership::Primary(_))
    }
}

/// Resolves `role` into this process's ownership of the background tasks.
pub fn acquire(role: &Role, lock_path: &Path) -> Result<Ownership> {
    let ownership: Ownership = match role {
        Role::Primary => Ownership::Primary(None),
        Role::Replica => Ownership::Replica,
        Role::Auto => contend(lock_path)?,
    };

    let decided: &str = if ownership.is_primary() { "primary" } else { "replica" };
    info!("Running as {decided} (configured role: {role})");
    Ok(ownership)
}

fn contend(lock_path: &Path) -> Result<Ownership> {
    let lock_err = |source: io::Error| Error::LockFile {
        path: lock_path.to_path_buf(),
        source,
    };

    let file: File = OpenOptions::new()
        .create(true)
        .truncate(false)
        .write(true)
        .open(lock_path)
        .map_err(lock_err)?;

    match file.try_lock_exclusive() {
        Ok(()) => Ok(Ownership::Primary(Some(InstanceLock(file)))),
        Err(e) if is_contended(&e) => Ok(Ownership::Replica),
        Err(e) => Err(lock_err(e)),
    }
}

/// Whether `e` means another process holds the lock. The OS code differs per platform.
fn is_contended(e: &io::Error) -> bool {
    let contended: io::Error = fs4::lock_contended_error();
    e.kind() == io::ErrorKind::WouldBlock
        || (e.raw_os_error().is_some() && e.raw_os_error() == contended.raw_os_error())
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
