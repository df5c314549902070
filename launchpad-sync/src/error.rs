//! Error types for launchpad-sync.

use std::path::PathBuf;

use thiserror::Error;

use launchpad_core::{ConfigError, RemoteError};

/// All errors that can arise from reconciliation.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Missing or malformed configuration.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A remote call failed; carries the remote payload.
    #[error("remote error: {0}")]
    Remote(#[from] RemoteError),

    /// A release, listing or branch the operation depends on does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Input rejected before any remote call.
    #[error("invalid input: {0}")]
    Validation(String),

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience constructor for [`SyncError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Io {
        path: path.into(),
        source,
    }
}
