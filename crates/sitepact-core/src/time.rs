//! # Timestamps
//!
//! `Timestamp` is a UTC-only instant truncated to seconds precision.
//! One representation everywhere: record fields, event payloads, and
//! advisory deadlines all carry the same type, rendered as ISO 8601 with
//! a `Z` suffix.

use chrono::{DateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::error::EscrowError;

/// A UTC instant with seconds precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// The current UTC time, truncated to seconds.
    pub fn now() -> Self {
        Self(truncate(Utc::now()))
    }

    /// From a `chrono::DateTime<Utc>`, truncating sub-seconds.
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self(truncate(dt))
    }

    /// From a Unix epoch timestamp in seconds.
    ///
    /// # Errors
    ///
    /// Returns [`EscrowError::InvalidTimestamp`] if the value is outside
    /// the representable range.
    pub fn from_epoch_secs(secs: i64) -> Result<Self, EscrowError> {
        DateTime::from_timestamp(secs, 0)
            .map(Self)
            .ok_or_else(|| EscrowError::InvalidTimestamp(format!("epoch seconds {secs}")))
    }

    /// Parse an RFC 3339 string, converting any offset to UTC.
    ///
    /// # Errors
    ///
    /// Returns [`EscrowError::InvalidTimestamp`] if the string is not
    /// valid RFC 3339.
    pub fn parse(s: &str) -> Result<Self, EscrowError> {
        DateTime::parse_from_rfc3339(s)
            .map(|dt| Self(truncate(dt.with_timezone(&Utc))))
            .map_err(|e| EscrowError::InvalidTimestamp(format!("{s:?}: {e}")))
    }

    /// Unix epoch seconds.
    pub fn epoch_secs(&self) -> i64 {
        self.0.timestamp()
    }

    /// Render as ISO 8601 with `Z` suffix (e.g., `2026-08-05T12:00:00Z`).
    pub fn to_iso8601(&self) -> String {
        self.0.format("%Y-%m-%dT%H:%M:%SZ").to_string()
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_iso8601())
    }
}

fn truncate(dt: DateTime<Utc>) -> DateTime<Utc> {
    dt.with_nanosecond(0).unwrap_or(dt)
}
