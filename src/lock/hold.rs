use indicatif::ProgressBar;
use serde::Serialize;
use std::thread;
use std::time::Duration;
use tracing::error;

use crate::drivers::ServerSession;
use crate::signal::CancelToken;

pub const HOLD_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HoldExit {
    Timeout,
    Cancelled,
    Unhealthy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HoldOutcome {
    pub exit: HoldExit,
    pub probes: u64,
}

/// Keep the session open for up to `timeout` ticks of `interval`.
///
/// Each tick sleeps, pings the server, then checks `token`. A failed ping cancels
/// the token, so a dead connection ends the hold the same way a signal does.
pub fn hold<S: ServerSession>(
    session: &mut S,
    timeout: u64,
    token: &CancelToken,
    interval: Duration,
    bar: &ProgressBar,
) -> HoldOutcome {
    let mut probes = 0;

    for tick in 0..timeout {
        thread::sleep(interval);
        probes += 1;

        let mut unhealthy = false;
        if let Err(err) = session.ping() {
            error!("liveness probe failed: {}", err);
            token.cancel();
            unhealthy = true;
        }

        if token.is_cancelled() {
            let exit = if unhealthy { HoldExit::Unhealthy } else { HoldExit::Cancelled };
            return HoldOutcome { exit, probes };
        }

        bar.set_message(format!("holding lock, {}s left", timeout - tick - 1));
        bar.inc(1);
    }

    HoldOutcome { exit: HoldExit::Timeout, probes }
}
