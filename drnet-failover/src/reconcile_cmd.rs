use std::time::Duration;

use anyhow::{bail, Result};
use drnet_failover::engine::{reconcile, ReconcileOptions};
use drnet_failover::report::render_run_text;
use ipcfg_core::RecordStore;

use crate::backend::select_netops;
use crate::cli::{OutputFormat, ReconcileArgs};

pub fn run_reconcile(args: ReconcileArgs) -> Result<()> {
    let store = RecordStore::new(&args.state_dir);
    let mut netops = select_netops(
        args.snapshot.as_deref(),
        Duration::from_secs(args.probe_timeout_secs),
    )?;
    let options = ReconcileOptions {
        settle: Duration::from_secs(args.settle_secs),
    };

    let report = reconcile(netops.as_mut(), &store, &options)?;

    match args.format {
        OutputFormat::Text => println!("{}", render_run_text(&report, args.verbose)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }

    if report.errors > 0 {
        bail!("reconcile finished with {} interface error(s)", report.errors);
    }
    Ok(())
}
