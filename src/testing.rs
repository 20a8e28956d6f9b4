//! Fakes for the database and credential seams.

use anyhow::{Result, bail};
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::config::cnf::{Credential, CredentialParser};
use crate::drivers::{ConnectionTarget, Connector, ServerSession};
use crate::error::{CnfError, ConnectError};
use crate::signal::CancelToken;

/// Records every statement and ping; fails the ones it is told to.
#[derive(Default)]
pub struct FakeSession {
    pub issued: Vec<String>,
    pub pings: usize,
    version: Option<String>,
    failing: Vec<String>,
    fail_ping_from: Option<usize>,
    cancel_on_ping: Option<(usize, CancelToken)>,
}

impl FakeSession {
    pub fn healthy(version: &str) -> Self {
        Self {
            version: Some(version.to_string()),
            ..Self::default()
        }
    }

    pub fn failing_statement(mut self, statement: &str) -> Self {
        self.failing.push(statement.to_string());
        self
    }

    /// Pings numbered `n` (1-based) and later fail.
    pub fn failing_ping_from(mut self, n: usize) -> Self {
        self.fail_ping_from = Some(n);
        self
    }

    /// Cancels `token` during ping number `n`, standing in for a signal arriving mid-hold.
    pub fn cancelling_on_ping(mut self, n: usize, token: &CancelToken) -> Self {
        self.cancel_on_ping = Some((n, token.clone()));
        self
    }

    pub fn without_version(mut self) -> Self {
        self.version = None;
        self
    }
}

impl ServerSession for FakeSession {
    fn execute(&mut self, statement: &str) -> Result<()> {
        self.issued.push(statement.to_string());
        if self.failing.iter().any(|s| s == statement) {
            bail!("statement rejected: {}", statement);
        }
        Ok(())
    }

    fn ping(&mut self) -> Result<(), ConnectError> {
        self.pings += 1;
        if let Some((n, token)) = &self.cancel_on_ping {
            if self.pings == *n {
                token.cancel();
            }
        }
        if matches!(self.fail_ping_from, Some(n) if self.pings >= n) {
            return Err(ConnectError::Ping("MySQL server has gone away".into()));
        }
        Ok(())
    }

    fn server_version(&mut self) -> Result<String, ConnectError> {
        self.version
            .clone()
            .ok_or_else(|| ConnectError::Version("Table 'performance_schema.session_variables' doesn't exist".into()))
    }
}

/// Hands out [`FakeSession`]s keyed by the target's user name.
pub struct FakeConnector {
    pub connects: RefCell<Vec<ConnectionTarget>>,
    version: String,
    refused: Vec<String>,
    dead: Vec<(String, usize)>,
}

impl FakeConnector {
    pub fn new(version: &str) -> Self {
        Self {
            connects: RefCell::new(Vec::new()),
            version: version.to_string(),
            refused: Vec::new(),
            dead: Vec::new(),
        }
    }

    pub fn refusing(mut self, user: &str) -> Self {
        self.refused.push(user.to_string());
        self
    }

    /// Sessions for `user` open but never answer a ping.
    pub fn unresponsive(self, user: &str) -> Self {
        self.failing_pings_from(user, 1)
    }

    /// Sessions for `user` stop answering at ping number `n`.
    pub fn failing_pings_from(mut self, user: &str, n: usize) -> Self {
        self.dead.push((user.to_string(), n));
        self
    }

    pub fn connect_count(&self) -> usize {
        self.connects.borrow().len()
    }
}

impl Connector for FakeConnector {
    type Session = FakeSession;

    fn connect(&self, target: &ConnectionTarget) -> Result<FakeSession, ConnectError> {
        self.connects.borrow_mut().push(target.clone());
        if self.refused.contains(&target.user) {
            return Err(ConnectError::Open {
                target: target.to_string(),
                reason: format!("Access denied for user '{}'", target.user),
            });
        }
        let session = FakeSession::healthy(&self.version);
        match self.dead.iter().find(|(user, _)| *user == target.user) {
            Some((_, n)) => Ok(session.failing_ping_from(*n)),
            None => Ok(session),
        }
    }
}

/// In-memory credential files; unknown paths are reported missing.
#[derive(Default)]
pub struct FakeParser {
    pub calls: RefCell<Vec<PathBuf>>,
    files: HashMap<PathBuf, Option<Credential>>,
}

impl FakeParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, path: &str, user: &str, password: &str, host: &str, socket: &str) -> Self {
        self.files.insert(
            PathBuf::from(path),
            Some(Credential {
                username: user.into(),
                password: password.into(),
                host: host.into(),
                socket: socket.into(),
            }),
        );
        self
    }

    pub fn unparseable(mut self, path: &str) -> Self {
        self.files.insert(PathBuf::from(path), None);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }
}

impl CredentialParser for FakeParser {
    fn parse(&self, source: &Path) -> Result<Credential, CnfError> {
        self.calls.borrow_mut().push(source.to_path_buf());
        match self.files.get(source) {
            Some(Some(cred)) => Ok(cred.clone()),
            Some(None) => Err(CnfError::Parse {
                path: source.to_path_buf(),
                reason: "unexpected end of section header".into(),
            }),
            None => Err(CnfError::Missing(source.to_path_buf())),
        }
    }
}

pub fn paths(list: &[&str]) -> Vec<PathBuf> {
    list.iter().map(PathBuf::from).collect()
}
