use std::time::Duration;

use anyhow::{bail, Result};
use drnet_failover::netops::{NetOps, SystemNetOps};

use crate::cli::ProbeArgs;

pub fn run_probe(args: ProbeArgs) -> Result<()> {
    let mut netops = SystemNetOps::new(Duration::from_secs(args.probe_timeout_secs));
    let reachable = netops.probe_gateway(args.gateway);
    println!("gateway {} reachable={reachable}", args.gateway);
    if !reachable {
        bail!("gateway {} did not answer any probe", args.gateway);
    }
    Ok(())
}
