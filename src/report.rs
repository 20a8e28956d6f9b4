use anyhow::Result;
use chrono::{DateTime, Local};
use colored::*;
use comfy_table::{Attribute, Cell, ContentArrangement, Table, presets::UTF8_FULL};
use serde::Serialize;
use std::path::PathBuf;

use crate::lock::LockState;
use crate::lock::hold::HoldExit;
use crate::resolver::{Attempt, Outcome};

/// What a finished run did, for humans (`--verbose`) or tooling (`--json`).
#[derive(Debug, Serialize)]
pub struct Summary {
    pub source: PathBuf,
    pub target: String,
    pub server_version: String,
    pub attempts: Vec<Attempt>,
    pub exit: HoldExit,
    pub probes: u64,
    pub state: LockState,
    pub failed_statements: Vec<String>,
    pub locked_at: DateTime<Local>,
    pub released_at: DateTime<Local>,
    pub held_secs: u64,
}

pub fn attempts_table(attempts: &[Attempt]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Credential file").add_attribute(Attribute::Bold),
            Cell::new("Result").add_attribute(Attribute::Bold),
            Cell::new("Detail").add_attribute(Attribute::Bold),
        ]);

    for a in attempts {
        let (result, detail) = match &a.outcome {
            Outcome::Connected => ("connected", ""),
            Outcome::Missing => ("missing", ""),
            Outcome::Unparseable(why) => ("unparseable", why.as_str()),
            Outcome::Rejected(why) => ("rejected", why.as_str()),
            Outcome::ConnectFailed(why) => ("connect failed", why.as_str()),
            Outcome::PingFailed(why) => ("ping failed", why.as_str()),
        };
        table.add_row(vec![
            Cell::new(a.source.display()),
            Cell::new(result),
            Cell::new(detail),
        ]);
    }
    table
}

pub fn render_json(summary: &Summary) -> Result<String> {
    Ok(serde_json::to_string_pretty(summary)?)
}

pub fn render_line(summary: &Summary) -> String {
    let exit = match summary.exit {
        HoldExit::Timeout => "timeout",
        HoldExit::Cancelled => "signal",
        HoldExit::Unhealthy => "lost connection",
    };
    let head = format!(
        "Released lock on {} (server {}) after {}s, ended by {}",
        summary.target, summary.server_version, summary.held_secs, exit
    );
    if summary.failed_statements.is_empty() {
        format!("{} {}", "✔".green().bold(), head.green())
    } else {
        format!(
            "{} {} ({} failed: {})",
            "!".yellow().bold(),
            head.yellow(),
            summary.failed_statements.len(),
            summary.failed_statements.join("; ")
        )
    }
}

pub fn print_summary(summary: &Summary, json: bool, verbose: bool) -> Result<()> {
    if json {
        println!("{}", render_json(summary)?);
    } else if verbose {
        println!("{}", render_line(summary));
    }
    Ok(())
}
