#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Error types for the spm package manager.
//!
//! Each domain gets its own enum; [`Error`] aggregates them for crate
//! boundaries. Every variant maps to exactly one line of human-readable
//! text in the CLI's top-level handler — no error carries a pointer back
//! into parsed state.

mod network;
mod process;
mod resolver;
mod sandbox;
mod state;
mod storage;

pub use network::NetworkError;
pub use process::ProcessError;
pub use resolver::ResolverError;
pub use sandbox::SandboxError;
pub use state::StateError;
pub use storage::StorageError;

use thiserror::Error;

/// Crate-boundary error type for spm.
#[derive(Debug, Error)]
pub enum Error {
    #[error("network error: {0}")]
    Network(#[from] NetworkError),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("state error: {0}")]
    State(#[from] StateError),

    #[error("resolver error: {0}")]
    Resolver(#[from] ResolverError),

    #[error("sandbox error: {0}")]
    Sandbox(#[from] SandboxError),

    #[error("process error: {0}")]
    Process(#[from] ProcessError),

    #[error("manifest error: {0}")]
    Manifest(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("lock held by pid {0}")]
    LockHeld(u32),

    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("package not found in index: {0}")]
    PackageNotFound(String),

    #[error("package not installed: {0}")]
    PackageNotInstalled(String),

    #[error("version not found: {package}={version}")]
    VersionNotFound { package: String, version: String },

    #[error("verification failed for {package}={version}")]
    VerificationFailed { package: String, version: String },

    #[error("internal error: {0}")]
    Internal(String),

    #[error("I/O error: {message}")]
    Io {
        kind: std::io::ErrorKind,
        message: String,
        path: Option<std::path::PathBuf>,
    },
}

impl Error {
    /// Build an internal error from any displayable message.
    #[must_use]
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Attach a path to an I/O error for nicer diagnostics.
    #[must_use]
    pub fn io_with_path(err: &std::io::Error, path: impl Into<std::path::PathBuf>) -> Self {
        Self::Io {
            kind: err.kind(),
            message: err.to_string(),
            path: Some(path.into()),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            kind: err.kind(),
            message: err.to_string(),
            path: None,
        }
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Self::State(StateError::Parse {
            message: err.to_string(),
        })
    }
}

impl From<toml::ser::Error> for Error {
    fn from(err: toml::ser::Error) -> Self {
        Self::State(StateError::Parse {
            message: err.to_string(),
        })
    }
}

/// Result alias used throughout spm.
pub type Result<T> = std::result::Result<T, Error>;
