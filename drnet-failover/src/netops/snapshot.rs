use std::collections::BTreeSet;
use std::fs;
use std::net::Ipv4Addr;
use std::path::Path;
use std::time::Duration;

use ipcfg_core::{InterfaceState, Ipv4Record};
use serde::Deserialize;
use thiserror::Error;

use super::{NetOps, NetOpsError};

/// Errors that can occur while loading a snapshot file.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("failed to read snapshot file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse snapshot file: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Deserialize)]
struct SnapshotFile {
    /// Gateways that answer echo probes in this rehearsal.
    #[serde(default)]
    reachable: Vec<Ipv4Addr>,
    #[serde(default, rename = "interface")]
    interfaces: Vec<SnapshotInterface>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct SnapshotInterface {
    name: String,
    #[serde(default)]
    address: Option<Ipv4Addr>,
    #[serde(default)]
    prefix_length: Option<u8>,
    #[serde(default)]
    gateway: Option<Ipv4Addr>,
    #[serde(default)]
    dns_primary: Option<Ipv4Addr>,
    #[serde(default)]
    dns_secondary: Option<Ipv4Addr>,
    #[serde(default)]
    dhcp: bool,
}

/// An application journaled by the snapshot backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedConfig {
    pub ordinal: u32,
    pub interface: String,
    pub record: Ipv4Record,
}

/// Rehearsal backend: interface states and gateway reachability come from a
/// TOML snapshot, applications mutate only in-memory state and are
/// journaled, and settling is instant.
#[derive(Debug)]
pub struct SnapshotNetOps {
    interfaces: Vec<InterfaceState>,
    reachable: BTreeSet<Ipv4Addr>,
    applied: Vec<AppliedConfig>,
}

impl SnapshotNetOps {
    pub fn new(
        interfaces: Vec<InterfaceState>,
        reachable: impl IntoIterator<Item = Ipv4Addr>,
    ) -> Self {
        Self {
            interfaces,
            reachable: reachable.into_iter().collect(),
            applied: Vec::new(),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, SnapshotError> {
        let raw = fs::read_to_string(path)?;
        let file: SnapshotFile = toml::from_str(&raw)?;
        let interfaces = file
            .interfaces
            .into_iter()
            .enumerate()
            .map(|(ordinal, iface)| InterfaceState {
                ordinal: ordinal as u32,
                name: iface.name,
                address: iface.address,
                prefix_length: iface.prefix_length,
                gateway: iface.gateway,
                dns_primary: iface.dns_primary,
                dns_secondary: iface.dns_secondary,
                dhcp_enabled: iface.dhcp,
            })
            .collect();
        Ok(Self::new(interfaces, file.reachable))
    }

    /// Every configuration applied during the run, in order.
    pub fn applied(&self) -> &[AppliedConfig] {
        &self.applied
    }

    /// The in-memory state of an interface after any applications.
    pub fn interface(&self, ordinal: u32) -> Option<&InterfaceState> {
        self.interfaces.iter().find(|i| i.ordinal == ordinal)
    }
}

impl NetOps for SnapshotNetOps {
    fn list_active_interfaces(&mut self) -> Result<Vec<InterfaceState>, NetOpsError> {
        Ok(self.interfaces.clone())
    }

    fn apply(&mut self, state: &InterfaceState, record: &Ipv4Record) -> Result<(), NetOpsError> {
        let entry = self
            .interfaces
            .iter_mut()
            .find(|i| i.ordinal == state.ordinal)
            .ok_or_else(|| NetOpsError::Apply {
                interface: state.name.clone(),
                reason: "interface not present in snapshot".to_string(),
            })?;
        entry.address = Some(record.address);
        entry.prefix_length = Some(record.prefix_length);
        entry.gateway = record.gateway;
        entry.dns_primary = Some(record.dns_primary);
        entry.dns_secondary = record.dns_secondary;
        entry.dhcp_enabled = false;
        self.applied.push(AppliedConfig {
            ordinal: state.ordinal,
            interface: state.name.clone(),
            record: record.clone(),
        });
        Ok(())
    }

    fn probe_gateway(&mut self, gateway: Ipv4Addr) -> bool {
        self.reachable.contains(&gateway)
    }

    fn settle(&mut self, _delay: Duration) {}
}
