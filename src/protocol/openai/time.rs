use std::fmt;

use chrono::{DateTime, Utc};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Epoch-seconds timestamp.
///
/// Written as an integer number of seconds. Decoding also accepts floats
/// (fractional seconds are truncated), which some providers emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UnixTime(pub DateTime<Utc>);

impl UnixTime {
    /// `None` when `secs` is outside the representable range.
    #[must_use]
    pub fn from_secs(secs: i64) -> Option<Self> {
        DateTime::<Utc>::from_timestamp(secs, 0).map(Self)
    }

    #[must_use]
    pub fn secs(&self) -> i64 {
        self.0.timestamp()
    }
}

impl From<DateTime<Utc>> for UnixTime {
    fn from(value: DateTime<Utc>) -> Self {
        Self(value)
    }
}

impl Serialize for UnixTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.secs())
    }
}

struct UnixTimeVisitor;

impl UnixTimeVisitor {
    fn build<E: de::Error>(secs: i64) -> Result<UnixTime, E> {
        UnixTime::from_secs(secs)
            .ok_or_else(|| E::custom(format!("unix time {secs} out of range")))
    }
}

impl Visitor<'_> for UnixTimeVisitor {
    type Value = UnixTime;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a unix timestamp in seconds")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<UnixTime, E> {
        Self::build(v)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<UnixTime, E> {
        let secs = i64::try_from(v).map_err(|_| E::custom("unix time out of range"))?;
        Self::build(secs)
    }

    #[allow(clippy::cast_possible_truncation)]
    fn visit_f64<E: de::Error>(self, v: f64) -> Result<UnixTime, E> {
        if !v.is_finite() {
            return Err(E::custom("unix time must be finite"));
        }
        Self::build(v.trunc() as i64)
    }
}

impl<'de> Deserialize<'de> for UnixTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(UnixTimeVisitor)
    }
}
