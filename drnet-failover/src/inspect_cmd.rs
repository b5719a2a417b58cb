use std::time::Duration;

use anyhow::{Context, Result};
use drnet_failover::netops::NetOps;
use drnet_failover::report::render_interfaces_text;

use crate::backend::select_netops;
use crate::cli::{InspectArgs, OutputFormat};

const INSPECT_PROBE_TIMEOUT: Duration = Duration::from_secs(2);

pub fn run_inspect(args: InspectArgs) -> Result<()> {
    let mut netops = select_netops(args.snapshot.as_deref(), INSPECT_PROBE_TIMEOUT)?;
    let states = netops
        .list_active_interfaces()
        .context("failed to inspect interfaces")?;

    match args.format {
        OutputFormat::Text => println!("{}", render_interfaces_text(&states)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&states)?),
    }
    Ok(())
}
