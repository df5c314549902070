//! Error types for launchpad-core.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from the credential store and configuration resolution.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Underlying I/O failure while reading or writing the store.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization error (write path).
    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Malformed store file.
    #[error("failed to parse configuration at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// A required key has no explicit value, no environment variable and no
    /// stored value.
    #[error("missing configuration value for {key}; pass it explicitly, export {key}, or run `launchpad config set {key} <value>`")]
    MissingKey { key: String },

    /// The source-control remote is not one this tool can talk to.
    #[error("unsupported remote '{url}': {reason}")]
    InvalidRemote { url: String, reason: String },

    /// HEAD is detached or the repository could not be queried.
    #[error("no branch checked out in {root}: {reason}")]
    NoCurrentBranch { root: PathBuf, reason: String },

    /// No `.git` directory in the working directory or any ancestor.
    #[error("no project root found above {start}; run this from inside a git repository")]
    ProjectRootNotFound { start: PathBuf },
}

/// Errors reported by a remote collaborator.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// Non-success HTTP status with the decoded error payload.
    #[error("remote returned {status}: {message}")]
    Status {
        status: u16,
        message: String,
        reason: Option<String>,
    },

    /// The request never produced a response (DNS, TLS, timeout, ...).
    #[error("transport error: {0}")]
    Transport(String),

    /// The remote already holds the object being created.
    #[error("remote conflict ({reason}): {message}")]
    Conflict { reason: String, message: String },

    /// A response arrived but could not be decoded.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Reading a local upload body failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl RemoteError {
    /// Whether retrying the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            RemoteError::Transport(_) => true,
            RemoteError::Status { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

/// Convenience constructor for [`RemoteError::Io`].
pub fn remote_io_err(path: impl Into<PathBuf>, source: std::io::Error) -> RemoteError {
    RemoteError::Io {
        path: path.into(),
        source,
    }
}
