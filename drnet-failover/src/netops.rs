use std::net::Ipv4Addr;
use std::time::Duration;

use ipcfg_core::{InterfaceState, Ipv4Record};
use thiserror::Error;

pub mod snapshot;
pub mod system;

pub use snapshot::SnapshotNetOps;
pub use system::SystemNetOps;

/// Errors surfaced by a [`NetOps`] backend.
#[derive(Debug, Error)]
pub enum NetOpsError {
    /// Interface enumeration failed; fatal for the whole run.
    #[error("failed to enumerate interfaces: {0}")]
    Enumerate(String),
    /// Applying a configuration failed; fatal for that interface only.
    #[error("failed to apply configuration to {interface}: {reason}")]
    Apply { interface: String, reason: String },
}

/// The OS network capabilities the reconciliation engine consumes.
///
/// One implementation is selected at startup and used for the whole run;
/// the engine never branches on the underlying platform.
pub trait NetOps {
    /// Enumerate interfaces currently in the "up" operational state, ordered
    /// by their stable numeric index. Ordinals are positional within the
    /// returned sequence.
    fn list_active_interfaces(&mut self) -> Result<Vec<InterfaceState>, NetOpsError>;

    /// Clear the interface's addresses and routes, then set the record's
    /// address, prefix, gateway and DNS servers. Idempotent in effect.
    fn apply(&mut self, state: &InterfaceState, record: &Ipv4Record) -> Result<(), NetOpsError>;

    /// Send a bounded number of echo probes to `gateway`. `true` iff at
    /// least one answers. No response is a normal `false`, never an error.
    fn probe_gateway(&mut self, gateway: Ipv4Addr) -> bool;

    /// Wait for the network stack to converge after a configuration change.
    fn settle(&mut self, delay: Duration) {
        std::thread::sleep(delay);
    }
}
