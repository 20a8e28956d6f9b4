use anyhow::Result;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::config::cnf::Credential;
use crate::error::ConnectError;

pub mod mysql;

pub const DEFAULT_PORT: u16 = 3306;

/// A live administrative session against the database server.
///
/// Statements are plain text and executed one at a time in the order given.
pub trait ServerSession {
    fn execute(&mut self, statement: &str) -> Result<()>;

    /// Round-trip liveness check.
    fn ping(&mut self) -> Result<(), ConnectError>;

    /// Result of `SELECT VERSION()`.
    fn server_version(&mut self) -> Result<String, ConnectError>;
}

/// Opens sessions for a [`ConnectionTarget`].
pub trait Connector {
    type Session: ServerSession;

    fn connect(&self, target: &ConnectionTarget) -> Result<Self::Session, ConnectError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Address {
    Socket(PathBuf),
    Tcp { host: String, port: u16 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetRejection {
    /// Neither an existing socket nor a host.
    NoAddress,
    MissingUserOrPassword,
}

impl fmt::Display for TargetRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetRejection::NoAddress => write!(f, "no usable 'socket' or 'host' field"),
            TargetRejection::MissingUserOrPassword => write!(f, "missing 'user' or 'password' field"),
        }
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionTarget {
    pub user: String,
    pub password: String,
    pub address: Address,
}

impl ConnectionTarget {
    /// Prefers the unix socket when it exists on disk right now, then the host.
    pub fn from_credential(cred: &Credential) -> Result<Self, TargetRejection> {
        let address = if !cred.socket.is_empty() && Path::new(&cred.socket).exists() {
            Address::Socket(PathBuf::from(&cred.socket))
        } else if !cred.host.is_empty() {
            let (host, port) = split_host_port(&cred.host);
            Address::Tcp { host, port }
        } else {
            return Err(TargetRejection::NoAddress);
        };

        if cred.username.is_empty() || cred.password.is_empty() {
            return Err(TargetRejection::MissingUserOrPassword);
        }

        Ok(Self {
            user: cred.username.clone(),
            password: cred.password.clone(),
            address,
        })
    }
}

// Never prints the password.
impl fmt::Display for ConnectionTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.address {
            Address::Socket(path) => write!(f, "{}@unix({})", self.user, path.display()),
            Address::Tcp { host, port } => write!(f, "{}@tcp({}:{})", self.user, host, port),
        }
    }
}

impl fmt::Debug for ConnectionTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ConnectionTarget({})", self)
    }
}

fn split_host_port(host: &str) -> (String, u16) {
    if let Some((name, port)) = host.rsplit_once(':') {
        let bracketed = name.starts_with('[') && name.ends_with(']');
        if bracketed || !name.contains(':') {
            if let Ok(port) = port.parse::<u16>() {
                let name = name.trim_start_matches('[').trim_end_matches(']');
                return (name.to_string(), port);
            }
        }
    }
    (host.to_string(), DEFAULT_PORT)
}

/// An exclusively owned session plus the server version read right after it validated.
pub struct Connection<S> {
    pub session: S,
    pub version: String,
}
