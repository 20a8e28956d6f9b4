use anyhow::Result;
use chrono::Local;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{info, warn};

use crate::config::cnf::CredentialParser;
use crate::drivers::Connector;
use crate::lock::session::LockSession;
use crate::report::{Summary, attempts_table};
use crate::resolver;
use crate::signal::CancelToken;

pub struct LockOptions {
    /// Maximum number of hold ticks.
    pub timeout: u64,
    pub interval: Duration,
    pub verbose: bool,
}

/// Find working credentials, lock the server, hold the lock and release it.
///
/// Fails only when no credential source yields a connection; everything after
/// that point is logged and the lock is always released.
pub fn do_lock<P, C>(
    sources: &[PathBuf],
    parser: &P,
    connector: &C,
    token: &CancelToken,
    opts: &LockOptions,
) -> Result<Summary>
where
    P: CredentialParser,
    C: Connector,
{
    info!(
        "credential files: {}",
        sources.iter().map(|s| s.display().to_string()).collect::<Vec<_>>().join(", ")
    );

    let resolution = resolver::resolve(sources, parser, connector);
    if opts.verbose {
        println!("{}", attempts_table(&resolution.attempts));
    }
    let attempts = resolution.attempts.clone();
    let mut resolved = resolution.into_connection()?;

    info!("awaiting signal or timeout in {} seconds", opts.timeout);
    let locked_at = Local::now();
    let started = Instant::now();

    let mut session = LockSession::acquire(&mut resolved.connection);
    let lock_report = session.lock_report();
    if lock_report.succeeded() {
        info!("server {:?} after {} statements", session.state(), lock_report.issued.len());
    } else {
        warn!("lock sequence incomplete, holding anyway: {} failed", lock_report.failed.join("; "));
    }
    let bar = create_hold_bar(opts);
    let outcome = session.hold(opts.timeout, token, opts.interval, &bar);
    bar.finish_and_clear();
    let released = session.release();
    info!("lock released");

    let mut failed_statements = released.lock_report.failed;
    failed_statements.extend(released.unlock_report.failed);

    Ok(Summary {
        source: resolved.source,
        target: resolved.target.to_string(),
        server_version: resolved.connection.version,
        attempts,
        exit: outcome.exit,
        probes: outcome.probes,
        state: released.state,
        failed_statements,
        locked_at,
        released_at: Local::now(),
        held_secs: started.elapsed().as_secs(),
    })
}

fn create_hold_bar(opts: &LockOptions) -> ProgressBar {
    if !opts.verbose {
        return ProgressBar::hidden();
    }
    // same stream as the verbose progress lines
    let bar = ProgressBar::with_draw_target(None, ProgressDrawTarget::stdout());
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        bar.set_style(style.tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ "));
    }
    bar.set_message("holding lock");
    bar.enable_steady_tick(Duration::from_millis(80));
    bar
}
