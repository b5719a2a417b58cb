use ipcfg_core::{InterfaceState, Ipv4Record};
use serde::Serialize;

/// What an interface's current configuration looks like, computed fresh each
/// run. The DHCP flag takes precedence even when a static-looking address is
/// also present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum InterfaceClass {
    Dhcp,
    MatchesProduction,
    MatchesDr,
    MatchesNeither,
}

impl InterfaceClass {
    pub fn as_str(self) -> &'static str {
        match self {
            InterfaceClass::Dhcp => "dhcp",
            InterfaceClass::MatchesProduction => "matches-production",
            InterfaceClass::MatchesDr => "matches-dr",
            InterfaceClass::MatchesNeither => "matches-neither",
        }
    }
}

/// Classify an interface's observed state against its stored records.
///
/// Comparison is by address only; an interface with no address at all falls
/// into `MatchesNeither` together with unrecognized static configurations.
pub fn classify(
    state: &InterfaceState,
    production: Option<&Ipv4Record>,
    dr: Option<&Ipv4Record>,
) -> InterfaceClass {
    if state.dhcp_enabled {
        return InterfaceClass::Dhcp;
    }
    let Some(address) = state.address else {
        return InterfaceClass::MatchesNeither;
    };
    if production.map(|record| record.address) == Some(address) {
        return InterfaceClass::MatchesProduction;
    }
    if dr.map(|record| record.address) == Some(address) {
        return InterfaceClass::MatchesDr;
    }
    InterfaceClass::MatchesNeither
}
