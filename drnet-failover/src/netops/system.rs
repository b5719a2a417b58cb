use std::fs;
use std::net::Ipv4Addr;
use std::path::PathBuf;
use std::process::Command;
use std::time::Duration;

use ipcfg_core::{InterfaceState, Ipv4Record};
use serde::Deserialize;

use super::{NetOps, NetOpsError};

const RESOLV_CONF: &str = "/etc/resolv.conf";
const PROBE_COUNT: u32 = 5;

/// Live backend driving the Linux network stack through `ip -json` and
/// `ping`.
#[derive(Debug)]
pub struct SystemNetOps {
    probe_timeout: Duration,
    resolv_conf: PathBuf,
}

#[derive(Debug, Deserialize)]
struct LinkEntry {
    ifindex: u32,
    ifname: String,
    #[serde(default)]
    operstate: String,
    #[serde(default)]
    link_type: String,
    #[serde(default)]
    addr_info: Vec<AddrInfo>,
}

#[derive(Debug, Deserialize)]
struct AddrInfo {
    #[serde(default)]
    family: String,
    // Kept as a string: inet6 entries share the field and must not fail the
    // whole parse.
    local: Option<String>,
    prefixlen: Option<u8>,
    #[serde(default)]
    dynamic: bool,
}

impl AddrInfo {
    fn ipv4(&self) -> Option<Ipv4Addr> {
        if self.family != "inet" {
            return None;
        }
        self.local.as_deref()?.parse().ok()
    }
}

#[derive(Debug, Deserialize)]
struct RouteEntry {
    gateway: Option<String>,
}

impl SystemNetOps {
    pub fn new(probe_timeout: Duration) -> Self {
        Self {
            probe_timeout,
            resolv_conf: PathBuf::from(RESOLV_CONF),
        }
    }

    fn default_gateway(&self, ifname: &str) -> Result<Option<Ipv4Addr>, NetOpsError> {
        let raw = run_ip(&["-json", "route", "show", "default", "dev", ifname])?;
        if raw.trim().is_empty() {
            return Ok(None);
        }
        let routes: Vec<RouteEntry> = serde_json::from_str(&raw)
            .map_err(|err| NetOpsError::Enumerate(format!("bad route output: {err}")))?;
        Ok(routes
            .into_iter()
            .find_map(|route| route.gateway.and_then(|g| g.parse().ok())))
    }

    fn resolver_addresses(&self) -> (Option<Ipv4Addr>, Option<Ipv4Addr>) {
        let Ok(raw) = fs::read_to_string(&self.resolv_conf) else {
            return (None, None);
        };
        let mut servers = raw.lines().filter_map(|line| {
            let rest = line.trim().strip_prefix("nameserver")?;
            rest.trim().parse::<Ipv4Addr>().ok()
        });
        (servers.next(), servers.next())
    }

    fn write_resolver(&self, record: &Ipv4Record, ifname: &str) -> Result<(), NetOpsError> {
        let mut body = format!("nameserver {}\n", record.dns_primary);
        if let Some(secondary) = record.dns_secondary {
            body.push_str(&format!("nameserver {secondary}\n"));
        }
        fs::write(&self.resolv_conf, body).map_err(|err| NetOpsError::Apply {
            interface: ifname.to_string(),
            reason: format!("failed to write resolver configuration: {err}"),
        })?;
        // Stale cache entries otherwise survive a failover; failure here is
        // non-fatal (resolved may not be running).
        let _ = Command::new("resolvectl").arg("flush-caches").status();
        Ok(())
    }
}

impl NetOps for SystemNetOps {
    fn list_active_interfaces(&mut self) -> Result<Vec<InterfaceState>, NetOpsError> {
        let raw = run_ip(&["-json", "addr", "show"])?;
        let mut links: Vec<LinkEntry> = serde_json::from_str(&raw)
            .map_err(|err| NetOpsError::Enumerate(format!("bad addr output: {err}")))?;
        links.retain(|link| link.operstate == "UP" && link.link_type != "loopback");
        links.sort_by_key(|link| link.ifindex);

        let (dns_primary, dns_secondary) = self.resolver_addresses();

        let mut states = Vec::with_capacity(links.len());
        for (ordinal, link) in links.into_iter().enumerate() {
            let inet = link.addr_info.iter().find(|info| info.ipv4().is_some());
            let gateway = self.default_gateway(&link.ifname)?;
            states.push(InterfaceState {
                ordinal: ordinal as u32,
                name: link.ifname,
                address: inet.and_then(|info| info.ipv4()),
                prefix_length: inet.and_then(|info| info.prefixlen),
                gateway,
                dns_primary,
                dns_secondary,
                dhcp_enabled: inet.map(|info| info.dynamic).unwrap_or(false),
            });
        }
        Ok(states)
    }

    fn apply(&mut self, state: &InterfaceState, record: &Ipv4Record) -> Result<(), NetOpsError> {
        let name = state.name.as_str();
        run_ip_apply(name, &["addr", "flush", "dev", name])?;
        let cidr = format!("{}/{}", record.address, record.prefix_length);
        run_ip_apply(name, &["addr", "add", &cidr, "dev", name])?;
        if let Some(gateway) = record.gateway {
            let via = gateway.to_string();
            run_ip_apply(name, &["route", "replace", "default", "via", &via, "dev", name])?;
        }
        self.write_resolver(record, name)
    }

    fn probe_gateway(&mut self, gateway: Ipv4Addr) -> bool {
        let wait = self.probe_timeout.as_secs().max(1).to_string();
        // iputils exits zero when at least one of the echoes is answered.
        Command::new("ping")
            .args(["-n", "-q", "-c", &PROBE_COUNT.to_string(), "-W", &wait])
            .arg(gateway.to_string())
            .output()
            .map(|output| output.status.success())
            .unwrap_or(false)
    }
}

fn run_ip(args: &[&str]) -> Result<String, NetOpsError> {
    let output = Command::new("ip")
        .args(args)
        .output()
        .map_err(|err| NetOpsError::Enumerate(format!("failed to run ip: {err}")))?;
    if !output.status.success() {
        return Err(NetOpsError::Enumerate(format!(
            "ip {} failed: {}",
            args.join(" "),
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }
    String::from_utf8(output.stdout)
        .map_err(|err| NetOpsError::Enumerate(format!("ip produced non-UTF-8 output: {err}")))
}

fn run_ip_apply(interface: &str, args: &[&str]) -> Result<(), NetOpsError> {
    let output = Command::new("ip")
        .args(args)
        .output()
        .map_err(|err| NetOpsError::Apply {
            interface: interface.to_string(),
            reason: format!("failed to run ip: {err}"),
        })?;
    if !output.status.success() {
        return Err(NetOpsError::Apply {
            interface: interface.to_string(),
            reason: format!(
                "ip {} failed: {}",
                args.join(" "),
                String::from_utf8_lossy(&output.stderr).trim()
            ),
        });
    }
    Ok(())
}
