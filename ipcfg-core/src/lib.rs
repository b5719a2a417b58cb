//! Typed IPv4 interface configuration records and the atomic on-disk record
//! store used by higher-level reconciliation tools.

pub mod record;
pub mod state;
pub mod store;

pub use record::{parse_record, Ipv4Record, RecordError, RecordKind};
pub use state::InterfaceState;
pub use store::{RecordStore, StoreError};
