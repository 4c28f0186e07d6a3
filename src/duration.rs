//! Clock durations in the `HH:MM:SS[.mmm]` form used by `<Duration>` and
//! duration-style `timeOffset` values.

use crate::error::{Result, VmapError};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Represents an elapsed time such as a creative's play length
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Duration(pub std::time::Duration);

impl Duration {
    pub const ZERO: Duration = Duration(std::time::Duration::ZERO);

    pub fn from_secs(secs: u64) -> Self {
        Duration(std::time::Duration::from_secs(secs))
    }

    pub fn from_millis(millis: u64) -> Self {
        Duration(std::time::Duration::from_millis(millis))
    }

    pub fn as_std(&self) -> std::time::Duration {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl From<std::time::Duration> for Duration {
    fn from(d: std::time::Duration) -> Self {
        Duration(d)
    }
}

/// Parse a `HH:MM:SS` or `HH:MM:SS.mmm` clock value.
///
/// Surrounding whitespace is ignored and an empty string is the zero duration.
/// The fractional part is always read as a millisecond count, so `01.5` is one
/// second and five milliseconds.
pub fn parse_duration(text: &str) -> Result<Duration> {
    let s = text.trim();
    if s.is_empty() {
        return Ok(Duration::ZERO);
    }

    let invalid = || VmapError::InvalidDuration(s.to_string());

    let mut parts = s.split(':');
    let (Some(hours), Some(minutes), Some(seconds), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(invalid());
    };

    let (seconds, millis) = match seconds.split_once('.') {
        Some((secs, frac)) => (secs, parse_group(frac).ok_or_else(invalid)?),
        None => (seconds, 0),
    };

    let hours = parse_group(hours).ok_or_else(invalid)?;
    let minutes = parse_group(minutes).ok_or_else(invalid)?;
    let seconds = parse_group(seconds).ok_or_else(invalid)?;

    let total_secs = hours
        .checked_mul(3600)
        .and_then(|h| minutes.checked_mul(60).and_then(|m| h.checked_add(m)))
        .and_then(|hm| hm.checked_add(seconds))
        .ok_or_else(invalid)?;

    std::time::Duration::from_secs(total_secs)
        .checked_add(std::time::Duration::from_millis(millis))
        .map(Duration)
        .ok_or_else(invalid)
}

fn parse_group(group: &str) -> Option<u64> {
    if group.is_empty() || !group.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    group.parse().ok()
}

impl FromStr for Duration {
    type Err = VmapError;

    fn from_str(s: &str) -> Result<Self> {
        parse_duration(s)
    }
}

/// Formats as zero-padded `HH:MM:SS`, with a `.mmm` suffix only when the
/// millisecond part is non-zero. The zero duration is `00:00:00`.
impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let secs = self.0.as_secs();
        let hours = secs / 3600;
        let minutes = (secs / 60) % 60;
        let seconds = secs % 60;
        let millis = self.0.subsec_millis();

        write!(f, "{:02}:{:02}:{:02}", hours, minutes, seconds)?;
        if millis > 0 {
            write!(f, ".{:03}", millis)?;
        }
        Ok(())
    }
}

impl Serialize for Duration {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Duration {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        parse_duration(&text).map_err(serde::de::Error::custom)
    }
}
