use std::time::Duration;

use anyhow::{bail, Context, Result};
use drnet_failover::netops::NetOps;
use ipcfg_core::{RecordKind, RecordStore};

use crate::backend::select_netops;
use crate::cli::BaselineArgs;

const BASELINE_PROBE_TIMEOUT: Duration = Duration::from_secs(2);

pub fn run_baseline(args: BaselineArgs) -> Result<()> {
    let mut netops = select_netops(args.snapshot.as_deref(), BASELINE_PROBE_TIMEOUT)?;
    let states = netops
        .list_active_interfaces()
        .context("failed to inspect interfaces")?;

    let Some(state) = states.iter().find(|s| s.ordinal == args.ordinal) else {
        bail!(
            "no active interface with ordinal {} (found {})",
            args.ordinal,
            states.len()
        );
    };
    let Some(record) = state.to_record() else {
        bail!(
            "interface {} has an incomplete configuration; cannot capture a baseline",
            state.name
        );
    };

    let store = RecordStore::new(&args.state_dir);
    let kind = RecordKind::from(args.kind);
    store.save(kind, args.ordinal, &record)?;
    println!(
        "captured {} as {kind} record for ordinal {}: {record}",
        state.name, args.ordinal
    );
    Ok(())
}
