use std::path::PathBuf;

use thiserror::Error;

/// Why a credential file could not be turned into a [`crate::config::cnf::Credential`].
#[derive(Debug, Error)]
pub enum CnfError {
    #[error("credential file {} does not exist", .0.display())]
    Missing(PathBuf),

    #[error("credential file {} could not be parsed: {reason}", .path.display())]
    Parse { path: PathBuf, reason: String },
}

/// Failures talking to the server while opening or validating a session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectError {
    #[error("connect to {target} failed: {reason}")]
    Open { target: String, reason: String },

    #[error("server did not answer ping: {0}")]
    Ping(String),

    #[error("SELECT VERSION() failed: {0}")]
    Version(String),
}

#[derive(Debug, Error)]
pub enum SnaplockError {
    /// Every credential source was tried and none produced a live connection.
    #[error("No active auth credentials available! (tried {tried} credential files)")]
    AuthExhausted { tried: usize },
}
