//! Persistence adapters
//!
//! Icon positions live in an external per-file attribute store; the desktop
//! manager is restarted so it picks up written positions.

use std::path::PathBuf;

use thiserror::Error;

pub mod gio;
pub mod positions;
pub mod refresh;

pub use gio::GioBackend;
pub use positions::{AttributeBackend, PositionStore};
pub use refresh::{ManagerRefresher, ProcessRefresher, RefreshError};

/// Attribute store errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to list desktop directory {}: {source}", .path.display())]
    ListDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to run `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{program}` failed for {}: {detail}", .path.display())]
    CommandFailed {
        program: String,
        path: PathBuf,
        detail: String,
    },

    #[error("Malformed stored position {value:?}")]
    MalformedPosition { value: String },
}
