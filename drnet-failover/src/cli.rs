use std::net::Ipv4Addr;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use ipcfg_core::RecordKind;

#[derive(Parser, Debug)]
#[command(name = "drnet-failover")]
#[command(about = "Reconcile host interfaces between production and disaster-recovery IPv4 configurations")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(clap::Subcommand, Debug)]
pub enum Command {
    /// Reconcile every active interface against its stored records.
    Reconcile(ReconcileArgs),
    /// Show the active interfaces as the inspector sees them.
    Inspect(InspectArgs),
    /// Show, write or delete stored per-interface records.
    Records(RecordsArgs),
    /// Capture an interface's current configuration as a stored record.
    Baseline(BaselineArgs),
    /// One-off gateway reachability check.
    Probe(ProbeArgs),
}

#[derive(Parser, Debug)]
pub struct ReconcileArgs {
    /// Directory holding the per-interface records.
    #[arg(long, default_value = "/var/lib/drnet-failover")]
    pub state_dir: PathBuf,
    /// Rehearse against a snapshot file instead of the live system.
    #[arg(long)]
    pub snapshot: Option<PathBuf>,
    /// Seconds to wait after each configuration change before probing.
    #[arg(long, default_value_t = 10)]
    pub settle_secs: u64,
    /// Per-probe reply timeout in seconds.
    #[arg(long, default_value_t = 2)]
    pub probe_timeout_secs: u64,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
    /// Also show info-level decision events.
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Parser, Debug)]
pub struct InspectArgs {
    /// Inspect a snapshot file instead of the live system.
    #[arg(long)]
    pub snapshot: Option<PathBuf>,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Parser, Debug)]
pub struct RecordsArgs {
    /// Directory holding the per-interface records.
    #[arg(long, default_value = "/var/lib/drnet-failover")]
    pub state_dir: PathBuf,
    #[command(subcommand)]
    pub command: RecordsCommand,
}

#[derive(clap::Subcommand, Debug)]
pub enum RecordsCommand {
    /// Dump stored records, for one ordinal or all of them.
    Show {
        ordinal: Option<u32>,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Write a record from flags or from a record file.
    Set(SetRecordArgs),
    /// Delete a record.
    Remove {
        #[arg(value_enum)]
        kind: KindArg,
        ordinal: u32,
    },
}

#[derive(Parser, Debug)]
pub struct SetRecordArgs {
    #[arg(value_enum)]
    pub kind: KindArg,
    pub ordinal: u32,
    /// Read the record from a flat key-value file instead of flags.
    #[arg(long, conflicts_with_all = ["address", "prefix_length", "gateway", "dns_primary", "dns_secondary"])]
    pub from_file: Option<PathBuf>,
    #[arg(long)]
    pub address: Option<Ipv4Addr>,
    #[arg(long)]
    pub prefix_length: Option<u8>,
    #[arg(long)]
    pub gateway: Option<Ipv4Addr>,
    #[arg(long)]
    pub dns_primary: Option<Ipv4Addr>,
    #[arg(long)]
    pub dns_secondary: Option<Ipv4Addr>,
}

#[derive(Parser, Debug)]
pub struct BaselineArgs {
    /// Directory holding the per-interface records.
    #[arg(long, default_value = "/var/lib/drnet-failover")]
    pub state_dir: PathBuf,
    /// Ordinal of the interface to capture.
    pub ordinal: u32,
    /// Record kind to write the capture as.
    #[arg(long, value_enum, default_value_t = KindArg::Production)]
    pub kind: KindArg,
    /// Capture from a snapshot file instead of the live system.
    #[arg(long)]
    pub snapshot: Option<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct ProbeArgs {
    /// Gateway address to probe.
    pub gateway: Ipv4Addr,
    /// Per-probe reply timeout in seconds.
    #[arg(long, default_value_t = 2)]
    pub probe_timeout_secs: u64,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum KindArg {
    Production,
    Dr,
    Previous,
}

impl From<KindArg> for RecordKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Production => RecordKind::Production,
            KindArg::Dr => RecordKind::Dr,
            KindArg::Previous => RecordKind::Previous,
        }
    }
}
