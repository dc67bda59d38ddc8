//! `dsl-lint` command-line interface.

use clap::{CommandFactory, Parser};
use std::env;
use std::path::PathBuf;

use crate::config;
use crate::lint::{find_all_transactions, lint_paths, LintOptions};

#[derive(Parser)]
#[command(name = "dsl-lint")]
#[command(about = "Lint .omt transaction protocol files", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Files to lint
    pub files: Vec<PathBuf>,

    /// Lint every transactions/*/transaction.omt under the protocol base
    #[arg(long)]
    pub all: bool,

    /// Apply obvious fixes in place, with backups
    #[arg(long)]
    pub fix: bool,

    /// Protocol base directory (overrides omt.toml)
    #[arg(long, value_name = "DIR")]
    pub base: Option<PathBuf>,

    /// Emit diagnostics as JSON, one object per file
    #[arg(long)]
    pub json: bool,
}

/// Entry point for the CLI. Returns the process exit code.
pub fn run_cli() -> Result<i32, Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if !cli.all && cli.files.is_empty() {
        Cli::command().print_help()?;
        return Ok(1);
    }

    let cwd = env::current_dir()?;
    let mut cfg = config::discover(&cwd);
    if let Some(base) = cli.base {
        cfg.protocol_base = base;
    }

    let files = if cli.all {
        let files = find_all_transactions(&cfg.transactions_pattern());
        if files.is_empty() {
            println!("No transaction files found");
            return Ok(1);
        }
        files
    } else {
        cli.files
    };

    let opts = LintOptions {
        fix: cli.fix,
        json: cli.json,
        protocol_base: cfg.protocol_base,
    };

    Ok(lint_paths(&files, &opts))
}
