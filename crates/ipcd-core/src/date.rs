//! Timestamps on the wire.
//!
//! Devices send and receive absolute times as an integer count of
//! milliseconds since the Unix epoch, never as formatted strings. Use the
//! module with `#[serde(with = "crate::date")]`, or `crate::date::option`
//! for optional fields.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serializer};

/// Wire form of a timestamp.
pub fn to_wire(t: &DateTime<Utc>) -> i64 {
    t.timestamp_millis()
}

/// Parse the wire form back into a timestamp.
pub fn from_wire(millis: i64) -> Result<DateTime<Utc>, DateOutOfRange> {
    DateTime::from_timestamp_millis(millis).ok_or(DateOutOfRange(millis))
}

/// Milliseconds value that does not map to a representable timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("timestamp out of range: {0} ms")]
pub struct DateOutOfRange(pub i64);

pub fn serialize<S: Serializer>(t: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_i64(to_wire(t))
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
    let millis = i64::deserialize(deserializer)?;
    from_wire(millis).map_err(serde::de::Error::custom)
}

/// Same encoding for `Option<DateTime<Utc>>`; `None` is written as null.
///
/// Pair with `#[serde(default)]` so a missing key decodes to `None`.
pub mod option {
    use super::{from_wire, to_wire};
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        t: &Option<DateTime<Utc>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match t {
            Some(t) => serializer.serialize_some(&to_wire(t)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        Option::<i64>::deserialize(deserializer)?
            .map(|millis| from_wire(millis).map_err(serde::de::Error::custom))
            .transpose()
    }
}
