use std::fs;

use anyhow::{bail, Context, Result};
use drnet_failover::report::render_record_line;
use ipcfg_core::{parse_record, Ipv4Record, RecordKind, RecordStore};
use serde::Serialize;

use crate::cli::{KindArg, OutputFormat, RecordsArgs, RecordsCommand, SetRecordArgs};

#[derive(Debug, Serialize)]
struct RecordSet {
    ordinal: u32,
    production: Option<Ipv4Record>,
    dr: Option<Ipv4Record>,
    previous: Option<Ipv4Record>,
}

pub fn run_records(args: RecordsArgs) -> Result<()> {
    let store = RecordStore::new(&args.state_dir);
    match args.command {
        RecordsCommand::Show { ordinal, format } => show(&store, ordinal, format),
        RecordsCommand::Set(set_args) => set(&store, set_args),
        RecordsCommand::Remove { kind, ordinal } => remove(&store, kind, ordinal),
    }
}

fn show(store: &RecordStore, ordinal: Option<u32>, format: OutputFormat) -> Result<()> {
    let ordinals = match ordinal {
        Some(ordinal) => vec![ordinal],
        None => store.ordinals().context("failed to list record store")?,
    };

    let mut sets = Vec::with_capacity(ordinals.len());
    for ordinal in ordinals {
        sets.push(RecordSet {
            ordinal,
            production: store.load(RecordKind::Production, ordinal)?,
            dr: store.load(RecordKind::Dr, ordinal)?,
            previous: store.load(RecordKind::Previous, ordinal)?,
        });
    }

    match format {
        OutputFormat::Text => {
            if sets.is_empty() {
                println!("no records stored");
                return Ok(());
            }
            for set in sets {
                println!("ordinal {}", set.ordinal);
                println!(
                    "{}",
                    render_record_line(RecordKind::Production, set.production.as_ref())
                );
                println!("{}", render_record_line(RecordKind::Dr, set.dr.as_ref()));
                println!(
                    "{}",
                    render_record_line(RecordKind::Previous, set.previous.as_ref())
                );
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&sets)?),
    }
    Ok(())
}

fn set(store: &RecordStore, args: SetRecordArgs) -> Result<()> {
    let record = match args.from_file {
        Some(path) => {
            let raw = fs::read_to_string(&path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            parse_record(&raw).with_context(|| format!("invalid record in {}", path.display()))?
        }
        None => {
            let (Some(address), Some(prefix_length), Some(dns_primary)) =
                (args.address, args.prefix_length, args.dns_primary)
            else {
                bail!("--address, --prefix-length and --dns-primary are required without --from-file");
            };
            let record = Ipv4Record {
                address,
                prefix_length,
                gateway: args.gateway,
                dns_primary,
                dns_secondary: args.dns_secondary,
            };
            record.validate()?;
            record
        }
    };

    let kind = RecordKind::from(args.kind);
    store.save(kind, args.ordinal, &record)?;
    println!("saved {kind} record for ordinal {}: {record}", args.ordinal);
    Ok(())
}

fn remove(store: &RecordStore, kind: KindArg, ordinal: u32) -> Result<()> {
    let kind = RecordKind::from(kind);
    if store.remove(kind, ordinal)? {
        println!("removed {kind} record for ordinal {ordinal}");
    } else {
        println!("no {kind} record stored for ordinal {ordinal}");
    }
    Ok(())
}
