//! Unified error types surfaced by the runtime API.
//!
//! Wraps failures from the session driver, configuration loading and the
//! replay format so callers can bubble them up with consistent context.
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("session fault: {0}")]
    Session(String),

    #[error("session aborted after {faults} consecutive faults")]
    TooManyFaults {
        faults: u32,
        #[source]
        last: Box<RuntimeError>,
    },

    #[error("invalid snapshot")]
    InvalidSnapshot(#[from] game_core::SnapshotError),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to read {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed replay line {line}")]
    Replay {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
