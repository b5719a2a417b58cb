use std::net::Ipv4Addr;

use serde::{Deserialize, Serialize};

use crate::record::Ipv4Record;

/// The live IPv4 configuration of one "up" interface, captured fresh at the
/// start of a run and never persisted directly.
///
/// The ordinal is the interface's position among the up interfaces ordered by
/// their stable numeric index. It is the join key to on-disk records, since
/// interface names can change across driver reconfiguration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceState {
    pub ordinal: u32,
    pub name: String,
    pub address: Option<Ipv4Addr>,
    pub prefix_length: Option<u8>,
    pub gateway: Option<Ipv4Addr>,
    pub dns_primary: Option<Ipv4Addr>,
    pub dns_secondary: Option<Ipv4Addr>,
    pub dhcp_enabled: bool,
}

impl InterfaceState {
    /// Derive a persistable record from the observed values.
    ///
    /// Returns `None` when the interface has no address, prefix or primary
    /// DNS server; such a state cannot satisfy the record invariants.
    pub fn to_record(&self) -> Option<Ipv4Record> {
        let record = Ipv4Record {
            address: self.address?,
            prefix_length: self.prefix_length?,
            gateway: self.gateway,
            dns_primary: self.dns_primary?,
            dns_secondary: self.dns_secondary,
        };
        record.validate().ok()?;
        Some(record)
    }
}
