//! Statement sequences that put the server into, and take it out of, the read-locked state.
//!
//! Every statement runs even if an earlier one failed. A failed `FLUSH TABLES WITH
//! READ LOCK` therefore still leads to `read_only = ON`, and a failed
//! `read_only = OFF` still leads to `UNLOCK TABLES`; failures are only logged.

use serde::Serialize;
use tracing::{error, info};

use crate::drivers::{Connection, ServerSession};
use crate::utils::version::version_ordinal;

pub mod hold;
pub mod session;

/// Servers newer than this get their engine logs flushed before locking.
pub const ENGINE_LOG_FLUSH_AFTER: &str = "5.5.0";
pub const FLUSH_ENGINE_LOGS: &str = "FLUSH ENGINE LOGS";

pub const LOCK_STATEMENTS: [&str; 3] = [
    "FLUSH LOGS",
    "FLUSH TABLES WITH READ LOCK",
    "SET GLOBAL read_only = ON",
];

pub const UNLOCK_STATEMENTS: [&str; 2] = ["SET GLOBAL read_only = OFF", "UNLOCK TABLES"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LockState {
    Idle,
    Locked,
    Releasing,
    Released,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SequenceReport {
    pub issued: Vec<String>,
    pub failed: Vec<String>,
}

impl SequenceReport {
    pub fn succeeded(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Run `statements` in order; a failure is logged and the next statement still runs.
pub fn run_sequence<S: ServerSession>(session: &mut S, statements: &[&str]) -> SequenceReport {
    let mut report = SequenceReport::default();
    for &statement in statements {
        info!("queue: {}", statement);
        report.issued.push(statement.to_string());
        if let Err(err) = session.execute(statement) {
            error!("{} failed: {:#}", statement, err);
            report.failed.push(statement.to_string());
        }
    }
    report
}

/// The lock sequence for a server reporting `version`.
pub fn lock_statements(version: &str) -> Vec<&'static str> {
    let mut statements = Vec::with_capacity(LOCK_STATEMENTS.len() + 1);
    if version_ordinal(version) > version_ordinal(ENGINE_LOG_FLUSH_AFTER) {
        statements.push(FLUSH_ENGINE_LOGS);
    }
    statements.extend(LOCK_STATEMENTS);
    statements
}

pub fn lock<S: ServerSession>(conn: &mut Connection<S>) -> SequenceReport {
    let statements = lock_statements(&conn.version);
    run_sequence(&mut conn.session, &statements)
}

pub fn unlock<S: ServerSession>(conn: &mut Connection<S>) -> SequenceReport {
    run_sequence(&mut conn.session, &UNLOCK_STATEMENTS)
}
