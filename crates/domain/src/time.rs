//! Server-clock timestamps.
//!
//! Record timestamps are always produced by the store at write time.
//! On the wire they travel as milliseconds since the Unix epoch, the
//! encoding used by realtime databases for server timestamps.

use chrono::{DateTime, TimeZone, Utc};

/// UTC timestamp assigned by the store.
pub type Timestamp = DateTime<Utc>;

/// Return the current UTC time according to the store's clock.
#[must_use]
pub fn now() -> Timestamp {
    Utc::now()
}

/// Convert a timestamp to epoch milliseconds.
#[must_use]
pub fn to_millis(ts: Timestamp) -> i64 {
    ts.timestamp_millis()
}

/// Build a timestamp from epoch milliseconds.
///
/// Returns `None` when the value is out of chrono's representable range.
#[must_use]
pub fn from_millis(millis: i64) -> Option<Timestamp> {
    Utc.timestamp_millis_opt(millis).single()
}

/// Serde helpers encoding a [`Timestamp`] as epoch milliseconds.
pub mod millis {
    use serde::{Deserialize, Deserializer, Serializer};

    use super::Timestamp;

    /// Serialize as an integer number of milliseconds.
    ///
    /// # Errors
    ///
    /// Propagates serializer errors.
    pub fn serialize<S: Serializer>(ts: &Timestamp, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(super::to_millis(*ts))
    }

    /// Deserialize from an integer number of milliseconds.
    ///
    /// # Errors
    ///
    /// Fails when the value is not an integer or is out of range.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Timestamp, D::Error> {
        let millis = i64::deserialize(deserializer)?;
        super::from_millis(millis)
            .ok_or_else(|| serde::de::Error::custom("timestamp out of range"))
    }
}
