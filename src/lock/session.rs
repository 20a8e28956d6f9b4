use indicatif::ProgressBar;
use std::mem;
use std::time::Duration;
use tracing::info;

use super::hold::{HoldOutcome, hold};
use super::{LockState, SequenceReport, lock, unlock};
use crate::drivers::{Connection, ServerSession};
use crate::signal::CancelToken;

/// Lock lifecycle on one connection: Idle → Locked → Releasing → Released.
///
/// Once the lock sequence has been attempted the unlock sequence runs exactly
/// once, either from [`LockSession::release`] or, if the session is dropped
/// early (e.g. while unwinding), from `Drop`.
pub struct LockSession<'c, S: ServerSession> {
    conn: &'c mut Connection<S>,
    state: LockState,
    lock_report: SequenceReport,
    unlock_report: SequenceReport,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Released {
    pub state: LockState,
    pub lock_report: SequenceReport,
    pub unlock_report: SequenceReport,
}

impl<'c, S: ServerSession> LockSession<'c, S> {
    /// Run the lock sequence. The session is `Locked` afterwards even if
    /// individual statements failed.
    pub fn acquire(conn: &'c mut Connection<S>) -> Self {
        let mut session = Self {
            conn,
            state: LockState::Idle,
            lock_report: SequenceReport::default(),
            unlock_report: SequenceReport::default(),
        };
        session.lock_report = lock(&mut *session.conn);
        session.advance(LockState::Locked);
        session
    }

    pub fn state(&self) -> LockState {
        self.state
    }

    pub fn lock_report(&self) -> &SequenceReport {
        &self.lock_report
    }

    /// Hold the lock; see [`hold`]. Can only run once.
    pub fn hold(
        &mut self,
        timeout: u64,
        token: &CancelToken,
        interval: Duration,
        bar: &ProgressBar,
    ) -> HoldOutcome {
        assert_eq!(self.state, LockState::Locked, "hold loop entered twice");
        let outcome = hold(&mut self.conn.session, timeout, token, interval, bar);
        info!("hold ended: {:?} after {} probes", outcome.exit, outcome.probes);
        self.advance(LockState::Releasing);
        outcome
    }

    /// Run the unlock sequence and finish the session.
    pub fn release(mut self) -> Released {
        self.unlock_once();
        Released {
            state: self.state,
            lock_report: mem::take(&mut self.lock_report),
            unlock_report: mem::take(&mut self.unlock_report),
        }
    }

    fn unlock_once(&mut self) {
        if self.state == LockState::Released {
            return;
        }
        if self.state == LockState::Locked {
            self.advance(LockState::Releasing);
        }
        self.unlock_report = unlock(&mut *self.conn);
        self.advance(LockState::Released);
    }

    fn advance(&mut self, next: LockState) {
        assert!(next > self.state, "lock state cannot go from {:?} to {:?}", self.state, next);
        self.state = next;
    }
}

impl<S: ServerSession> Drop for LockSession<'_, S> {
    fn drop(&mut self) {
        self.unlock_once();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lock::hold::HoldExit;
    use crate::lock::{LOCK_STATEMENTS, UNLOCK_STATEMENTS};
    use crate::testing::FakeSession;

    fn conn(session: FakeSession) -> Connection<FakeSession> {
        Connection { session, version: "5.1.73".to_string() }
    }

    fn count(issued: &[String], statement: &str) -> usize {
        issued.iter().filter(|s| *s == statement).count()
    }

    fn hold_quick<S: ServerSession>(session: &mut LockSession<'_, S>, timeout: u64, token: &CancelToken) -> HoldOutcome {
        session.hold(timeout, token, Duration::ZERO, &ProgressBar::hidden())
    }

    #[test]
    fn full_lifecycle_issues_lock_then_unlock() {
        let mut c = conn(FakeSession::healthy(""));
        let mut session = LockSession::acquire(&mut c);
        assert_eq!(session.state(), LockState::Locked);

        let outcome = hold_quick(&mut session, 2, &CancelToken::new());
        assert_eq!(outcome.exit, HoldExit::Timeout);
        assert_eq!(session.state(), LockState::Releasing);

        let released = session.release();
        assert!(released.lock_report.succeeded());
        assert_eq!(released.unlock_report.issued, UNLOCK_STATEMENTS.to_vec());

        let expected: Vec<&str> = LOCK_STATEMENTS.iter().chain(UNLOCK_STATEMENTS.iter()).copied().collect();
        assert_eq!(c.session.issued, expected);
    }

    #[test]
    fn unlock_runs_once_for_every_exit_branch() {
        let token = CancelToken::new();
        let cases = [
            (FakeSession::healthy(""), CancelToken::new(), HoldExit::Timeout),
            (FakeSession::healthy("").cancelling_on_ping(1, &token), token.clone(), HoldExit::Cancelled),
            (FakeSession::healthy("").failing_ping_from(1), CancelToken::new(), HoldExit::Unhealthy),
        ];

        for (fake, token, expected) in cases {
            let mut c = conn(fake);
            let mut session = LockSession::acquire(&mut c);
            assert_eq!(hold_quick(&mut session, 10, &token).exit, expected);
            session.release();

            for statement in UNLOCK_STATEMENTS {
                assert_eq!(count(&c.session.issued, statement), 1, "{:?}", expected);
            }
        }
    }

    #[test]
    fn failed_lock_statements_still_lead_to_unlock() {
        let fake = FakeSession::healthy("")
            .failing_statement("FLUSH TABLES WITH READ LOCK")
            .failing_statement("UNLOCK TABLES");
        let mut c = conn(fake);
        let mut session = LockSession::acquire(&mut c);
        assert_eq!(session.state(), LockState::Locked);
        assert_eq!(session.lock_report().failed, vec!["FLUSH TABLES WITH READ LOCK"]);

        hold_quick(&mut session, 1, &CancelToken::new());
        let released = session.release();

        assert_eq!(released.unlock_report.failed, vec!["UNLOCK TABLES"]);
        assert_eq!(count(&c.session.issued, "SET GLOBAL read_only = OFF"), 1);
    }

    #[test]
    fn dropping_a_held_session_unlocks() {
        let mut c = conn(FakeSession::healthy(""));
        {
            let mut session = LockSession::acquire(&mut c);
            hold_quick(&mut session, 1, &CancelToken::new());
        }
        assert_eq!(count(&c.session.issued, "UNLOCK TABLES"), 1);
    }

    #[test]
    fn dropping_before_hold_unlocks() {
        let mut c = conn(FakeSession::healthy(""));
        drop(LockSession::acquire(&mut c));
        assert_eq!(count(&c.session.issued, "SET GLOBAL read_only = OFF"), 1);
        assert_eq!(count(&c.session.issued, "UNLOCK TABLES"), 1);
    }

    #[test]
    #[should_panic(expected = "hold loop entered twice")]
    fn hold_cannot_run_twice() {
        let mut c = conn(FakeSession::healthy(""));
        let mut session = LockSession::acquire(&mut c);
        hold_quick(&mut session, 1, &CancelToken::new());
        hold_quick(&mut session, 1, &CancelToken::new());
    }
}
