//! `timeOffset` values of a VMAP `<AdBreak>`.

use crate::duration::{Duration, parse_duration};
use crate::error::{Result, VmapError};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Where in the content timeline an ad break is placed
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TimeOffset {
    /// Before the content starts (`start`)
    Start,

    /// After the content ends (`end`)
    End,

    /// Position within the break sequence (`#3`)
    Position(u32),

    /// Fraction of the content duration; `50%` is stored as `0.5`
    Percent(f32),

    /// Absolute offset into the content (`00:05:00`)
    Duration(Duration),
}

impl TimeOffset {
    /// Parse a `timeOffset` attribute value.
    ///
    /// Forms are tried in order: `start`, `end`, a `%` suffix, a `#` prefix and
    /// finally a clock duration.
    pub fn parse(text: &str) -> Result<Self> {
        match text {
            "start" => return Ok(TimeOffset::Start),
            "end" => return Ok(TimeOffset::End),
            _ => {}
        }

        if let Some(percent) = text.strip_suffix('%') {
            let value = parse_offset_number(text, percent)?;
            return Ok(TimeOffset::Percent(value as f32 / 100.0));
        }

        if let Some(position) = text.strip_prefix('#') {
            return parse_offset_number(text, position).map(TimeOffset::Position);
        }

        parse_duration(text).map(TimeOffset::Duration)
    }

    pub fn as_duration(&self) -> Option<Duration> {
        match self {
            TimeOffset::Duration(d) => Some(*d),
            _ => None,
        }
    }
}

fn parse_offset_number(text: &str, digits: &str) -> Result<u32> {
    digits
        .parse::<u32>()
        .map_err(|source| VmapError::InvalidTimeOffset {
            value: text.to_string(),
            source,
        })
}

impl FromStr for TimeOffset {
    type Err = VmapError;

    fn from_str(s: &str) -> Result<Self> {
        TimeOffset::parse(s)
    }
}

/// Percentages are written as whole numbers, so `0.125` becomes `13%`.
/// Zero positions and percentages keep their marker (`#0`, `0%`).
impl fmt::Display for TimeOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeOffset::Start => f.write_str("start"),
            TimeOffset::End => f.write_str("end"),
            TimeOffset::Position(position) => write!(f, "#{}", position),
            TimeOffset::Percent(fraction) => write!(f, "{}%", (fraction * 100.0).round() as i64),
            TimeOffset::Duration(d) => fmt::Display::fmt(d, f),
        }
    }
}

impl Serialize for TimeOffset {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TimeOffset {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        TimeOffset::parse(&text).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_sentinels() {
        assert_eq!(TimeOffset::parse("start").unwrap(), TimeOffset::Start);
        assert_eq!(TimeOffset::parse("end").unwrap(), TimeOffset::End);
    }

    #[test]
    fn parses_percent_and_position() {
        assert_eq!(TimeOffset::parse("50%").unwrap(), TimeOffset::Percent(0.5));
        assert_eq!(TimeOffset::parse("0%").unwrap(), TimeOffset::Percent(0.0));
        assert_eq!(TimeOffset::parse("#3").unwrap(), TimeOffset::Position(3));
    }

    #[test]
    fn parses_durations() {
        let offset = TimeOffset::parse("00:05:00").unwrap();
        assert_eq!(offset, TimeOffset::Duration(Duration::from_secs(300)));
        assert_eq!(offset.as_duration(), Some(Duration::from_secs(300)));
        assert_eq!(TimeOffset::Start.as_duration(), None);
    }

    #[test]
    fn malformed_numbers_name_the_text() {
        match TimeOffset::parse("abc%") {
            Err(VmapError::InvalidTimeOffset { value, .. }) => assert_eq!(value, "abc%"),
            other => panic!("unexpected result: {:?}", other),
        }
        assert!(matches!(
            TimeOffset::parse("#x"),
            Err(VmapError::InvalidTimeOffset { .. })
        ));
        assert!(matches!(
            TimeOffset::parse("#-1"),
            Err(VmapError::InvalidTimeOffset { .. })
        ));
    }

    #[test]
    fn other_text_is_a_duration_error() {
        assert!(matches!(
            TimeOffset::parse("Start"),
            Err(VmapError::InvalidDuration(_))
        ));
        assert!(matches!(
            TimeOffset::parse("05:00"),
            Err(VmapError::InvalidDuration(_))
        ));
    }

    #[test]
    fn formats_each_form() {
        assert_eq!(TimeOffset::Start.to_string(), "start");
        assert_eq!(TimeOffset::End.to_string(), "end");
        assert_eq!(TimeOffset::Position(2).to_string(), "#2");
        assert_eq!(TimeOffset::Percent(0.25).to_string(), "25%");
        assert_eq!(
            TimeOffset::Duration(Duration::from_millis(420_500)).to_string(),
            "00:07:00.500"
        );
    }

    #[test]
    fn zero_position_and_percent_keep_their_form() {
        assert_eq!(TimeOffset::Position(0).to_string(), "#0");
        assert_eq!(TimeOffset::Percent(0.0).to_string(), "0%");
        assert_eq!(TimeOffset::parse("#0").unwrap(), TimeOffset::Position(0));
        assert_eq!(TimeOffset::parse("0%").unwrap(), TimeOffset::Percent(0.0));
    }

    #[test]
    fn text_round_trips() {
        for text in ["start", "end", "#1", "10%", "100%", "00:00:00", "01:30:15.250"] {
            assert_eq!(TimeOffset::parse(text).unwrap().to_string(), text);
        }
    }
}
