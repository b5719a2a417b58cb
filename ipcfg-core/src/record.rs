use std::fmt;
use std::net::Ipv4Addr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while reading or writing an [`Ipv4Record`].
#[derive(Debug, Error)]
pub enum RecordError {
    /// Record file could not be read or written.
    #[error("failed to access record file: {0}")]
    Io(#[from] std::io::Error),
    /// Record file is not valid key-value data.
    #[error("failed to parse record: {0}")]
    Parse(#[from] toml::de::Error),
    /// Record could not be serialized.
    #[error("failed to serialize record: {0}")]
    Serialize(#[from] toml::ser::Error),
    /// Prefix length is outside the IPv4 range.
    #[error("invalid prefix length {0}: must be between 1 and 32")]
    InvalidPrefix(u8),
}

/// A complete static IPv4 configuration for one interface.
///
/// Three named instances exist per interface: `production`, `dr` and
/// `previous` (the last observed configuration). A record without a gateway
/// describes a no-default-route interface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Ipv4Record {
    pub address: Ipv4Addr,
    pub prefix_length: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gateway: Option<Ipv4Addr>,
    pub dns_primary: Ipv4Addr,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dns_secondary: Option<Ipv4Addr>,
}

impl Ipv4Record {
    /// Check structural validity (currently the prefix-length range).
    pub fn validate(&self) -> Result<(), RecordError> {
        if self.prefix_length == 0 || self.prefix_length > 32 {
            return Err(RecordError::InvalidPrefix(self.prefix_length));
        }
        Ok(())
    }

    /// Serialize into the flat key-value record format.
    pub fn to_toml(&self) -> Result<String, RecordError> {
        Ok(toml::to_string(self)?)
    }
}

impl fmt::Display for Ipv4Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.address, self.prefix_length)?;
        if let Some(gateway) = self.gateway {
            write!(f, " via {gateway}")?;
        }
        write!(f, " dns {}", self.dns_primary)?;
        if let Some(secondary) = self.dns_secondary {
            write!(f, ",{secondary}")?;
        }
        Ok(())
    }
}

/// Parse a flat key-value record file body into a validated [`Ipv4Record`].
pub fn parse_record(raw: &str) -> Result<Ipv4Record, RecordError> {
    let record: Ipv4Record = toml::from_str(raw)?;
    record.validate()?;
    Ok(record)
}

/// The three record kinds persisted per interface ordinal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    Production,
    Dr,
    Previous,
}

impl RecordKind {
    pub const ALL: [RecordKind; 3] = [
        RecordKind::Production,
        RecordKind::Dr,
        RecordKind::Previous,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RecordKind::Production => "production",
            RecordKind::Dr => "dr",
            RecordKind::Previous => "previous",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> Ipv4Record {
        Ipv4Record {
            address: Ipv4Addr::new(10, 1, 0, 5),
            prefix_length: 24,
            gateway: Some(Ipv4Addr::new(10, 1, 0, 1)),
            dns_primary: Ipv4Addr::new(10, 1, 0, 53),
            dns_secondary: None,
        }
    }

    #[test]
    fn rejects_out_of_range_prefix() {
        let mut bad = record();
        bad.prefix_length = 33;
        assert!(matches!(bad.validate(), Err(RecordError::InvalidPrefix(33))));
        bad.prefix_length = 0;
        assert!(matches!(bad.validate(), Err(RecordError::InvalidPrefix(0))));
    }

    #[test]
    fn parses_kebab_case_keys() {
        let parsed = parse_record(
            r#"
address = "10.1.0.5"
prefix-length = 24
gateway = "10.1.0.1"
dns-primary = "10.1.0.53"
"#,
        )
        .expect("parse");
        assert_eq!(parsed, record());
    }

    #[test]
    fn gateway_and_secondary_dns_are_optional() {
        let parsed = parse_record(
            r#"
address = "192.168.7.2"
prefix-length = 28
dns-primary = "192.168.7.53"
"#,
        )
        .expect("parse");
        assert_eq!(parsed.gateway, None);
        assert_eq!(parsed.dns_secondary, None);
    }

    #[test]
    fn parse_rejects_invalid_prefix() {
        let err = parse_record(
            r#"
address = "10.1.0.5"
prefix-length = 40
dns-primary = "10.1.0.53"
"#,
        )
        .expect_err("must fail");
        assert!(matches!(err, RecordError::InvalidPrefix(40)));
    }

    #[test]
    fn round_trips_through_toml() {
        let original = record();
        let raw = original.to_toml().expect("serialize");
        assert!(raw.contains("prefix-length = 24"));
        let reparsed = parse_record(&raw).expect("reparse");
        assert_eq!(reparsed, original);
    }
}
