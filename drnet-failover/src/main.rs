use anyhow::Result;
use clap::Parser;

mod backend;
mod baseline_cmd;
mod cli;
mod inspect_cmd;
mod probe_cmd;
mod reconcile_cmd;
mod records_cmd;

use cli::{Cli, Command};

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Reconcile(args) => reconcile_cmd::run_reconcile(args),
        Command::Inspect(args) => inspect_cmd::run_inspect(args),
        Command::Records(args) => records_cmd::run_records(args),
        Command::Baseline(args) => baseline_cmd::run_baseline(args),
        Command::Probe(args) => probe_cmd::run_probe(args),
    }
}
