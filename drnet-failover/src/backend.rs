use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use drnet_failover::netops::{NetOps, SnapshotNetOps, SystemNetOps};

/// Select the capability backend once at startup: a snapshot rehearsal when
/// a snapshot file is given, the live system otherwise.
pub fn select_netops(snapshot: Option<&Path>, probe_timeout: Duration) -> Result<Box<dyn NetOps>> {
    match snapshot {
        Some(path) => {
            let ops = SnapshotNetOps::from_file(path)
                .with_context(|| format!("failed to load snapshot {}", path.display()))?;
            Ok(Box::new(ops))
        }
        None => Ok(Box::new(SystemNetOps::new(probe_timeout))),
    }
}
