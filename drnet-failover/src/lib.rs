//! Disaster-recovery failover for host IPv4 configurations.
//!
//! Each interface carries up to three on-disk records: `production` (normal
//! static settings), `dr` (the disaster-recovery alternative) and `previous`
//! (the configuration observed on the last run). One reconciliation run
//! inspects every "up" interface, classifies its current configuration
//! against those records, picks a target, applies it, and validates the
//! choice by probing the default gateway. When a probe fails it falls back
//! to the alternate configuration and finally to the observed pre-change
//! values.
//!
//! # Architecture
//!
//! - [`netops`]: the single capability seam over the OS network stack
//!   (list up interfaces, apply a configuration, probe a gateway), with a
//!   live system backend and a snapshot backend for rehearsal runs and tests
//! - [`classify`]: per-run classification of an interface's current state
//! - [`engine`]: the reconciliation decision table and fallback chains
//! - [`report`]: severity-tagged terminal rendering of run reports
//!
//! Record and state types, and the atomic record store, live in
//! `ipcfg-core`.

pub mod classify;
pub mod engine;
pub mod netops;
pub mod report;
