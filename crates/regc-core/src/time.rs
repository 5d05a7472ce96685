//! # Temporal Types — UTC-Only Timestamps
//!
//! Defines [`Timestamp`], a UTC-only timestamp truncated to seconds
//! precision. Every validity bound in the engine — history record
//! boundaries, state interval bounds, cancelation instants — is a
//! `Timestamp`, so interval comparisons never mix timezones or sub-second
//! noise.
//!
//! Non-UTC inputs are rejected at construction; there is no silent
//! conversion that could introduce ambiguity between two representations
//! of the same instant.

use chrono::{DateTime, Duration, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::error::RegistryError;

/// A UTC-only timestamp, truncated to seconds precision.
///
/// # Construction
///
/// - [`Timestamp::now()`] — current UTC time, truncated.
/// - [`Timestamp::from_utc()`] — from a `DateTime<Utc>`, truncating
///   sub-seconds.
/// - [`Timestamp::parse()`] — from an RFC 3339 string, rejecting non-UTC
///   offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Create a timestamp from the current UTC time, truncated to seconds.
    pub fn now() -> Self {
        Self(truncate_to_seconds(Utc::now()))
    }

    /// Create a timestamp from a `chrono::DateTime<Utc>`, truncating
    /// sub-seconds.
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self(truncate_to_seconds(dt))
    }

    /// Parse a timestamp from an RFC 3339 string.
    ///
    /// **Rejects non-UTC inputs.** Only timestamps with the `Z` suffix are
    /// accepted — even `+00:00`, which is semantically equivalent, is
    /// rejected so that a given instant has exactly one accepted spelling.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::InvalidTimestamp`] if the string is not
    /// valid RFC 3339 or uses a non-Z timezone offset.
    pub fn parse(s: &str) -> Result<Self, RegistryError> {
        if !s.ends_with('Z') {
            return Err(RegistryError::InvalidTimestamp(format!(
                "must use Z suffix (UTC only), got: {s:?}"
            )));
        }

        let dt = DateTime::parse_from_rfc3339(s).map_err(|e| {
            RegistryError::InvalidTimestamp(format!("not RFC 3339: {s:?} ({e})"))
        })?;

        Ok(Self(truncate_to_seconds(dt.with_timezone(&Utc))))
    }

    /// Access the inner `DateTime<Utc>`.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Consume into the inner `DateTime<Utc>`.
    pub fn into_datetime(self) -> DateTime<Utc> {
        self.0
    }

    /// A timestamp `secs` seconds later.
    pub fn plus_seconds(&self, secs: i64) -> Self {
        Self(self.0 + Duration::seconds(secs))
    }

    /// A timestamp `secs` seconds earlier.
    pub fn minus_seconds(&self, secs: i64) -> Self {
        Self(self.0 - Duration::seconds(secs))
    }

    /// Render as ISO 8601 with Z suffix (e.g. `2026-01-15T12:00:00Z`).
    pub fn to_iso8601(&self) -> String {
        self.0.format("%Y-%m-%dT%H:%M:%SZ").to_string()
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_iso8601())
    }
}

/// Truncate a `DateTime<Utc>` to seconds precision (discard nanoseconds).
fn truncate_to_seconds(dt: DateTime<Utc>) -> DateTime<Utc> {
    dt.with_nanosecond(0).unwrap_or(dt)
}
