use std::fs;
use std::net::Ipv4Addr;

use ipcfg_core::{Ipv4Record, RecordKind, RecordStore};
use pretty_assertions::assert_eq;
use tempfile::tempdir;

fn record(last_octet: u8) -> Ipv4Record {
    Ipv4Record {
        address: Ipv4Addr::new(10, 1, 0, last_octet),
        prefix_length: 24,
        gateway: Some(Ipv4Addr::new(10, 1, 0, 1)),
        dns_primary: Ipv4Addr::new(10, 1, 0, 53),
        dns_secondary: Some(Ipv4Addr::new(10, 1, 0, 54)),
    }
}

#[test]
fn load_missing_record_is_none() {
    let dir = tempdir().expect("tempdir");
    let store = RecordStore::new(dir.path());
    let loaded = store.load(RecordKind::Production, 0).expect("load");
    assert_eq!(loaded, None);
}

#[test]
fn save_then_load_round_trips() {
    let dir = tempdir().expect("tempdir");
    let store = RecordStore::new(dir.path().join("state"));

    store
        .save(RecordKind::Dr, 2, &record(9))
        .expect("save record");
    let loaded = store.load(RecordKind::Dr, 2).expect("load").expect("some");
    assert_eq!(loaded, record(9));

    // Kinds and ordinals are independent namespaces.
    assert_eq!(store.load(RecordKind::Production, 2).expect("load"), None);
    assert_eq!(store.load(RecordKind::Dr, 0).expect("load"), None);
}

#[test]
fn save_overwrites_and_leaves_no_temp_file() {
    let dir = tempdir().expect("tempdir");
    let store = RecordStore::new(dir.path());

    store.save(RecordKind::Previous, 0, &record(5)).expect("save");
    store.save(RecordKind::Previous, 0, &record(6)).expect("overwrite");

    let loaded = store
        .load(RecordKind::Previous, 0)
        .expect("load")
        .expect("some");
    assert_eq!(loaded, record(6));

    let leftovers: Vec<_> = fs::read_dir(dir.path())
        .expect("read dir")
        .map(|e| e.expect("entry").file_name().to_string_lossy().into_owned())
        .filter(|name| name.ends_with(".tmp"))
        .collect();
    assert_eq!(leftovers, Vec::<String>::new());
}

#[test]
fn remove_reports_presence() {
    let dir = tempdir().expect("tempdir");
    let store = RecordStore::new(dir.path());

    store.save(RecordKind::Production, 1, &record(7)).expect("save");
    assert!(store.remove(RecordKind::Production, 1).expect("remove"));
    assert!(!store.remove(RecordKind::Production, 1).expect("remove again"));
    assert_eq!(store.load(RecordKind::Production, 1).expect("load"), None);
}

#[test]
fn ordinals_lists_every_interface_with_records() {
    let dir = tempdir().expect("tempdir");
    let store = RecordStore::new(dir.path());

    store.save(RecordKind::Production, 3, &record(3)).expect("save");
    store.save(RecordKind::Dr, 0, &record(4)).expect("save");
    store.save(RecordKind::Previous, 3, &record(5)).expect("save");

    assert_eq!(store.ordinals().expect("ordinals"), vec![0, 3]);
}

#[test]
fn ordinals_is_empty_for_missing_store_dir() {
    let dir = tempdir().expect("tempdir");
    let store = RecordStore::new(dir.path().join("does-not-exist"));
    assert_eq!(store.ordinals().expect("ordinals"), Vec::<u32>::new());
}

#[test]
fn load_rejects_truncated_record() {
    let dir = tempdir().expect("tempdir");
    let store = RecordStore::new(dir.path());
    fs::write(dir.path().join("production-0.toml"), "address = \"10.1.").expect("write");

    assert!(store.load(RecordKind::Production, 0).is_err());
}
