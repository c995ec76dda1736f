use std::io;
use std::path::PathBuf;
use std::time::Duration;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(
        "retention window ({retention:?}) must be longer than the suppression window ({suppression:?})"
    )]
    RetentionTooShort {
        suppression: Duration,
        retention: Duration,
    },

    #[error("{field} must be greater than zero")]
    ZeroValue { field: &'static str },

    #[error("invalid target '{input}': {reason}")]
    InvalidTarget { input: String, reason: String },

    #[error("invalid role '{0}', expected one of: primary, replica, auto")]
    InvalidRole(String),

    #[error("probe worker pool is closed")]
    PoolClosed,

    #[error("failed to open lock file {path}: {source}")]
    LockFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
