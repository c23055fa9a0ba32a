//! Timestamp display for log lines.
//!
//! Output is produced as [`TimestampParts`] so a renderer can style the date,
//! time, milliseconds and zone independently; [`format`] composes them.

use std::fmt;

use cc_logs_core::proto::UnixMillis;
use chrono::{DateTime, FixedOffset, Local, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Timezone {
    #[default]
    Local,
    #[serde(alias = "UTC")]
    Utc,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Pattern {
    #[default]
    Datetime,
    Time,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Precision {
    #[default]
    Milliseconds,
    Seconds,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimestampFormat {
    pub pattern: Pattern,
    pub precision: Precision,
    /// Forces UTC regardless of the requested timezone.
    pub utc: bool,
    pub show_zone_offset: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimestampDisplay {
    None,
    Format(TimestampFormat),
}

impl Default for TimestampDisplay {
    fn default() -> Self {
        TimestampDisplay::Format(TimestampFormat::default())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimestampParts {
    pub date: Option<String>,
    pub separator: Option<&'static str>,
    pub time: String,
    /// Includes the leading dot.
    pub millisecond: Option<String>,
    pub timezone: Option<String>,
}

impl fmt::Display for TimestampParts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(date) = &self.date {
            f.write_str(date)?;
        }
        if let Some(separator) = self.separator {
            f.write_str(separator)?;
        }
        f.write_str(&self.time)?;
        if let Some(ms) = &self.millisecond {
            f.write_str(ms)?;
        }
        if let Some(tz) = &self.timezone {
            f.write_str(tz)?;
        }
        Ok(())
    }
}

const DATE_TIME_SEPARATOR: &str = "T";

/// Structured form of [`format`]. `None` when nothing should be displayed or
/// the timestamp is outside the representable range.
pub fn format_parts(
    timestamp: UnixMillis,
    display: TimestampDisplay,
    timezone: Timezone,
) -> Option<TimestampParts> {
    let TimestampDisplay::Format(fmt) = display else {
        return None;
    };
    let utc = DateTime::<Utc>::from_timestamp_millis(timestamp)?;
    let use_utc = fmt.utc || timezone == Timezone::Utc;
    let at: DateTime<FixedOffset> = if use_utc {
        utc.fixed_offset()
    } else {
        utc.with_timezone(&Local).fixed_offset()
    };

    let (date, separator) = match fmt.pattern {
        Pattern::Datetime => (
            Some(at.format("%Y-%m-%d").to_string()),
            Some(DATE_TIME_SEPARATOR),
        ),
        Pattern::Time => (None, None),
    };
    let millisecond = match fmt.precision {
        Precision::Milliseconds => Some(at.format("%.3f").to_string()),
        Precision::Seconds => None,
    };
    let timezone = fmt.show_zone_offset.then(|| {
        if use_utc {
            "Z".to_string()
        } else {
            at.format("%:z").to_string()
        }
    });

    Some(TimestampParts {
        date,
        separator,
        time: at.format("%H:%M:%S").to_string(),
        millisecond,
        timezone,
    })
}

/// Formats `timestamp` (epoch ms). Returns an empty string for
/// [`TimestampDisplay::None`].
pub fn format(timestamp: UnixMillis, display: TimestampDisplay, timezone: Timezone) -> String {
    format_parts(timestamp, display, timezone)
        .map(|parts| parts.to_string())
        .unwrap_or_default()
}

#[derive(Debug, Error)]
#[error("unrecognized timestamp: {0}")]
pub struct TimestampParseError(pub String);

/// Parses the `datetime` output of [`format`] back into epoch ms. Strings
/// without a zone are read as UTC.
pub fn parse_timestamp(text: &str) -> Result<UnixMillis, TimestampParseError> {
    let text = text.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Ok(dt.timestamp_millis());
    }
    NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc().timestamp_millis())
        .map_err(|_| TimestampParseError(text.to_string()))
}

#[cfg(test)]
mod tests {
    use super::{
        Pattern, Precision, TimestampDisplay, TimestampFormat, Timezone, format, format_parts,
        parse_timestamp,
    };

    // 2024-03-01T10:04:05.678Z
    const TS: i64 = 1_709_287_445_678;

    fn display(pattern: Pattern, precision: Precision, show_zone_offset: bool) -> TimestampDisplay {
        TimestampDisplay::Format(TimestampFormat {
            pattern,
            precision,
            utc: true,
            show_zone_offset,
        })
    }

    #[test]
    fn none_display_is_empty() {
        assert_eq!(format(TS, TimestampDisplay::None, Timezone::Utc), "");
        assert_eq!(format_parts(TS, TimestampDisplay::None, Timezone::Utc), None);
    }

    #[test]
    fn datetime_with_milliseconds_and_zone() {
        let out = format(TS, display(Pattern::Datetime, Precision::Milliseconds, true), Timezone::Local);
        assert_eq!(out, "2024-03-01T10:04:05.678Z");
    }

    #[test]
    fn time_only_in_seconds() {
        let out = format(TS, display(Pattern::Time, Precision::Seconds, false), Timezone::Utc);
        assert_eq!(out, "10:04:05");
    }

    #[test]
    fn parts_are_split_for_styling() {
        let parts = format_parts(
            TS,
            display(Pattern::Datetime, Precision::Milliseconds, true),
            Timezone::Utc,
        )
        .expect("parts");
        assert_eq!(parts.date.as_deref(), Some("2024-03-01"));
        assert_eq!(parts.separator, Some("T"));
        assert_eq!(parts.time, "10:04:05");
        assert_eq!(parts.millisecond.as_deref(), Some(".678"));
        assert_eq!(parts.timezone.as_deref(), Some("Z"));
    }

    #[test]
    fn utc_timezone_argument_applies_without_utc_flag() {
        let d = TimestampDisplay::Format(TimestampFormat {
            pattern: Pattern::Datetime,
            precision: Precision::Seconds,
            utc: false,
            show_zone_offset: true,
        });
        assert_eq!(format(TS, d, Timezone::Utc), "2024-03-01T10:04:05Z");
    }

    #[test]
    fn local_zone_offset_is_numeric() {
        let d = TimestampDisplay::Format(TimestampFormat {
            pattern: Pattern::Time,
            precision: Precision::Seconds,
            utc: false,
            show_zone_offset: true,
        });
        let parts = format_parts(TS, d, Timezone::Local).expect("parts");
        let zone = parts.timezone.expect("zone");
        assert_eq!(zone.len(), 6);
        assert!(zone.starts_with('+') || zone.starts_with('-'));
    }

    #[test]
    fn seconds_datetime_round_trips_truncated() {
        for zone in [false, true] {
            let out = format(TS, display(Pattern::Datetime, Precision::Seconds, zone), Timezone::Utc);
            let parsed = parse_timestamp(&out).expect("parse formatted timestamp");
            assert_eq!(parsed / 1000, TS / 1000);
            assert_eq!(parsed % 1000, 0);
        }
    }

    #[test]
    fn millisecond_datetime_round_trips_exactly() {
        let out = format(TS, display(Pattern::Datetime, Precision::Milliseconds, false), Timezone::Utc);
        assert_eq!(parse_timestamp(&out).expect("parse"), TS);
    }

    #[test]
    fn rejects_unknown_strings() {
        assert!(parse_timestamp("10:04:05").is_err());
    }
}
