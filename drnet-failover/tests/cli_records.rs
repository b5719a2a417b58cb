use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

fn cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("drnet-failover"))
}

#[test]
fn set_from_flags_then_show() {
    let dir = tempdir().expect("tempdir");
    let state_dir = dir.path().join("state");

    cmd()
        .args(["records", "--state-dir"])
        .arg(&state_dir)
        .args([
            "set",
            "production",
            "0",
            "--address",
            "10.1.0.5",
            "--prefix-length",
            "24",
            "--gateway",
            "10.1.0.1",
            "--dns-primary",
            "10.1.0.53",
            "--dns-secondary",
            "10.1.0.54",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("saved production record for ordinal 0"));

    cmd()
        .args(["records", "--state-dir"])
        .arg(&state_dir)
        .args(["show", "0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ordinal 0"))
        .stdout(predicate::str::contains(
            "- production: 10.1.0.5/24 via 10.1.0.1 dns 10.1.0.53,10.1.0.54",
        ))
        .stdout(predicate::str::contains("- dr: none"))
        .stdout(predicate::str::contains("- previous: none"));
}

#[test]
fn set_from_file_round_trips() {
    let dir = tempdir().expect("tempdir");
    let state_dir = dir.path().join("state");
    let record = dir.path().join("dr.toml");
    fs::write(
        &record,
        r#"
address = "10.9.0.5"
prefix-length = 24
gateway = "10.9.0.1"
dns-primary = "10.9.0.53"
"#,
    )
    .expect("write record");

    cmd()
        .args(["records", "--state-dir"])
        .arg(&state_dir)
        .args(["set", "dr", "1", "--from-file"])
        .arg(&record)
        .assert()
        .success()
        .stdout(predicate::str::contains("saved dr record for ordinal 1"));

    cmd()
        .args(["records", "--state-dir"])
        .arg(&state_dir)
        .args(["show", "--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"ordinal\": 1"))
        .stdout(predicate::str::contains("\"address\": \"10.9.0.5\""));
}

#[test]
fn set_requires_core_fields_without_file() {
    let dir = tempdir().expect("tempdir");

    cmd()
        .args(["records", "--state-dir"])
        .arg(dir.path())
        .args(["set", "production", "0", "--address", "10.1.0.5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "--address, --prefix-length and --dns-primary are required",
        ));
}

#[test]
fn set_rejects_invalid_prefix() {
    let dir = tempdir().expect("tempdir");

    cmd()
        .args(["records", "--state-dir"])
        .arg(dir.path())
        .args([
            "set",
            "production",
            "0",
            "--address",
            "10.1.0.5",
            "--prefix-length",
            "33",
            "--dns-primary",
            "10.1.0.53",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid prefix length 33"));
}

#[test]
fn remove_reports_presence() {
    let dir = tempdir().expect("tempdir");
    let state_dir = dir.path().join("state");

    cmd()
        .args(["records", "--state-dir"])
        .arg(&state_dir)
        .args([
            "set",
            "previous",
            "2",
            "--address",
            "10.2.0.5",
            "--prefix-length",
            "24",
            "--dns-primary",
            "10.2.0.53",
        ])
        .assert()
        .success();

    cmd()
        .args(["records", "--state-dir"])
        .arg(&state_dir)
        .args(["remove", "previous", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("removed previous record for ordinal 2"));

    cmd()
        .args(["records", "--state-dir"])
        .arg(&state_dir)
        .args(["remove", "previous", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "no previous record stored for ordinal 2",
        ));
}

#[test]
fn show_with_empty_store_says_so() {
    let dir = tempdir().expect("tempdir");

    cmd()
        .args(["records", "--state-dir"])
        .arg(dir.path().join("state"))
        .arg("show")
        .assert()
        .success()
        .stdout(predicate::str::contains("no records stored"));
}
