mod cli;
mod config;
mod drivers;
mod error;
mod lock;
mod logging;
mod ops;
mod report;
mod resolver;
mod signal;
mod utils;

#[cfg(test)]
mod testing;

use anyhow::Result;
use clap::Parser;
use colored::*;
use tracing::info;

use cli::Cli;
use config::{cnf::IniCnfParser, sources};
use drivers::mysql::MySqlConnector;
use lock::hold::HOLD_INTERVAL;
use ops::LockOptions;
use signal::CancelToken;

fn main() {
    if let Err(err) = run() {
        eprintln!("{} {}", "Error:".red().bold(), err);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.quiet);

    let token = CancelToken::new();
    signal::install(&token)?;

    let sources = sources::source_list(&cli.cnf_files, !cli.no_default_sources);
    let opts = LockOptions {
        timeout: cli.timeout,
        interval: HOLD_INTERVAL,
        verbose: cli.verbose,
    };

    let summary = ops::do_lock(&sources, &IniCnfParser, &MySqlConnector, &token, &opts)?;
    report::print_summary(&summary, cli.json, cli.verbose)?;

    info!("exiting");
    Ok(())
}
