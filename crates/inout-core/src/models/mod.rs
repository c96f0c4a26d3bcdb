//! Data models for gateway payloads.
//!
//! - `Location`: a physical entrance staff can scan at
//! - `ScanResult`, `ScanRequest`: one card submission and its outcome
//! - `LogEntry`: one row of the day's entry/exit log
//! - `PresenceStatus`: IN or OUT, shared by scans and log rows

pub mod entry;
pub mod location;
pub mod scan;

use serde::{Deserialize, Serialize};

pub use entry::{LogEntry, NOT_EXITED};
pub use location::Location;
pub use scan::{PresenceStatus, ScanRequest, ScanResult, PLACEHOLDER_IMAGE_URI, UNKNOWN_PATRON};

/// Identifier the gateway hands out for locations and log rows.
///
/// The gateway is free to use numbers or strings; whichever it sends is echoed
/// back unchanged, so a numeric location id stays numeric on the scan request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WireId {
    Number(i64),
    Text(String),
}

impl std::fmt::Display for WireId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WireId::Number(n) => write!(f, "{}", n),
            WireId::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for WireId {
    fn from(value: i64) -> Self {
        WireId::Number(value)
    }
}

impl From<&str> for WireId {
    fn from(value: &str) -> Self {
        WireId::Text(value.to_string())
    }
}

// Helper to deserialize a time that may arrive as a string, a number, or null
fn deserialize_time_or_sentinel<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de;

    struct TimeVisitor;

    impl<'de> de::Visitor<'de> for TimeVisitor {
        type Value = String;

        fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
            formatter.write_str("a time string, number, or null")
        }

        fn visit_str<E>(self, v: &str) -> Result<Self::Value, E> {
            if v.is_empty() {
                Ok(NOT_EXITED.to_string())
            } else {
                Ok(v.to_string())
            }
        }

        fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E> {
            Ok(v.to_string())
        }

        fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E> {
            Ok(v.to_string())
        }

        fn visit_none<E>(self) -> Result<Self::Value, E> {
            Ok(NOT_EXITED.to_string())
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E> {
            Ok(NOT_EXITED.to_string())
        }
    }

    deserializer.deserialize_any(TimeVisitor)
}

fn not_exited() -> String {
    NOT_EXITED.to_string()
}
