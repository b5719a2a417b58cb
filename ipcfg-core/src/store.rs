use std::collections::BTreeSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::record::{parse_record, Ipv4Record, RecordError, RecordKind};

/// Errors that can occur while accessing the on-disk record store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Store directory or record file could not be accessed.
    #[error("failed to access record store: {0}")]
    Io(#[from] std::io::Error),
    /// A stored record is malformed or could not be serialized.
    #[error(transparent)]
    Record(#[from] RecordError),
}

/// On-disk store of per-interface configuration records, keyed by
/// `(kind, ordinal)`.
///
/// Each record is one flat key-value file named `<kind>-<ordinal>.toml`.
/// Writes go through a temp file followed by a rename, so a crash mid-write
/// never leaves a truncated record behind.
#[derive(Debug, Clone)]
pub struct RecordStore {
    root: PathBuf,
}

impl RecordStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Load a record; a missing record is `Ok(None)`, not an error.
    pub fn load(&self, kind: RecordKind, ordinal: u32) -> Result<Option<Ipv4Record>, StoreError> {
        let path = self.record_path(kind, ordinal);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        Ok(Some(parse_record(&raw)?))
    }

    /// Atomically overwrite the record for `(kind, ordinal)`.
    pub fn save(
        &self,
        kind: RecordKind,
        ordinal: u32,
        record: &Ipv4Record,
    ) -> Result<(), StoreError> {
        record.validate()?;
        fs::create_dir_all(&self.root)?;
        let path = self.record_path(kind, ordinal);
        let tmp = path.with_extension("toml.tmp");
        fs::write(&tmp, record.to_toml()?)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    /// Remove a record. Returns whether a record existed.
    pub fn remove(&self, kind: RecordKind, ordinal: u32) -> Result<bool, StoreError> {
        match fs::remove_file(self.record_path(kind, ordinal)) {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(false),
            Err(err) => Err(err.into()),
        }
    }

    /// All ordinals that have at least one stored record, ascending.
    pub fn ordinals(&self) -> Result<Vec<u32>, StoreError> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };

        let mut ordinals = BTreeSet::new();
        for entry in entries {
            let entry = entry?;
            if let Some(ordinal) = parse_record_file_name(&entry.file_name().to_string_lossy()) {
                ordinals.insert(ordinal);
            }
        }
        Ok(ordinals.into_iter().collect())
    }

    fn record_path(&self, kind: RecordKind, ordinal: u32) -> PathBuf {
        self.root.join(format!("{}-{}.toml", kind.as_str(), ordinal))
    }
}

fn parse_record_file_name(name: &str) -> Option<u32> {
    let stem = name.strip_suffix(".toml")?;
    let (kind, ordinal) = stem.rsplit_once('-')?;
    if !RecordKind::ALL.iter().any(|k| k.as_str() == kind) {
        return None;
    }
    ordinal.parse().ok()
}
