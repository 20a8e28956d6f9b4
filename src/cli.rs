use clap::Parser;
use std::path::PathBuf;

/// snaplock: hold a MySQL server read-locked while a physical backup runs
#[derive(Parser, Debug)]
#[command(
    name = "snaplock",
    version,
    about = "Lock a MySQL server read-only until a signal, a timeout or a lost connection, then unlock it.",
    long_about = None
)]
pub struct Cli {
    /// Seconds to hold the lock before releasing it
    #[arg(long, value_name = "SECONDS", default_value_t = 3600, env = "SNAPLOCK_TIMEOUT")]
    pub timeout: u64,

    /// Print progress lines to stdout
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress non-fatal error messages
    #[arg(short, long)]
    pub quiet: bool,

    /// Print a JSON summary of the run on exit
    #[arg(long)]
    pub json: bool,

    /// Skip the built-in credential files and try only CNF_FILE arguments
    #[arg(long, hide = true)]
    pub no_default_sources: bool,

    /// Extra credential files, tried after ~/.my.cnf, /etc/mysql/root.cnf and /etc/mysql/debian.cnf
    #[arg(value_name = "CNF_FILE")]
    pub cnf_files: Vec<PathBuf>,
}
