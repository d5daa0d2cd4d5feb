//! Time formats and conversion of raw time values to millisecond epochs.
use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Serialize;
use serde_json::Value;

const SECONDS: std::ops::Range<f64> = 1e9..1e10;
const MILLISECONDS: std::ops::Range<f64> = 1e12..1e13;

/// Tried in order; the first pattern that parses every sample wins.
const DATE_TIME_PATTERNS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S%.f",
    "%Y/%m/%d %H:%M",
    "%m/%d/%Y %H:%M:%S%.f",
    "%m/%d/%Y %H:%M",
];

const DATE_PATTERNS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

/// How the values of a time column are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(into = "String")]
pub enum TimeFormat {
    /// Seconds since the epoch (`X`).
    EpochSeconds,
    /// Milliseconds since the epoch (`x`).
    EpochMillis,
    Rfc3339,
    /// A `chrono` date-time pattern, interpreted as UTC.
    DateTime(&'static str),
    /// A `chrono` date pattern, at midnight UTC.
    Date(&'static str),
}

impl TimeFormat {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::EpochSeconds => "X",
            Self::EpochMillis => "x",
            Self::Rfc3339 => "rfc3339",
            Self::DateTime(pattern) | Self::Date(pattern) => pattern,
        }
    }

    /// Epoch format implied by the magnitude of `value`, if any.
    #[must_use]
    pub fn detect_epoch(value: f64) -> Option<Self> {
        let magnitude = value.abs();
        if SECONDS.contains(&magnitude) {
            Some(Self::EpochSeconds)
        } else if MILLISECONDS.contains(&magnitude) {
            Some(Self::EpochMillis)
        } else {
            None
        }
    }

    /// Every textual format `text` parses under, in preference order.
    #[must_use]
    pub fn candidates(text: &str) -> Vec<Self> {
        std::iter::once(Self::Rfc3339)
            .chain(DATE_TIME_PATTERNS.iter().copied().map(Self::DateTime))
            .chain(DATE_PATTERNS.iter().copied().map(Self::Date))
            .filter(|format| format.parse_text(text).is_some())
            .collect()
    }

    /// Milliseconds since the epoch for a textual value.
    #[must_use]
    pub fn parse_text(self, text: &str) -> Option<i64> {
        let text = text.trim();
        match self {
            Self::EpochSeconds | Self::EpochMillis => {
                text.parse::<f64>().ok().and_then(|value| self.number_to_millis(value))
            }
            Self::Rfc3339 => DateTime::parse_from_rfc3339(text)
                .ok()
                .map(|time| time.timestamp_millis()),
            Self::DateTime(pattern) => NaiveDateTime::parse_from_str(text, pattern)
                .ok()
                .map(|time| time.and_utc().timestamp_millis()),
            Self::Date(pattern) => NaiveDate::parse_from_str(text, pattern)
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
                .map(|time| time.and_utc().timestamp_millis()),
        }
    }

    /// Milliseconds since the epoch for a numeric value. Only epoch formats
    /// accept numbers.
    #[must_use]
    pub fn number_to_millis(self, value: f64) -> Option<i64> {
        match self {
            Self::EpochSeconds => round_millis(value * 1000.0),
            Self::EpochMillis => round_millis(value),
            _ => None,
        }
    }
}

impl fmt::Display for TimeFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<TimeFormat> for String {
    fn from(format: TimeFormat) -> Self {
        format.as_str().to_string()
    }
}

#[allow(clippy::cast_possible_truncation)]
fn round_millis(value: f64) -> Option<i64> {
    const LIMIT: f64 = 9.2e18;
    (value.is_finite() && value.abs() < LIMIT).then(|| value.round() as i64)
}

/// Converts a raw time value to milliseconds since the epoch.
///
/// Integer epochs are converted without going through `f64`.
#[must_use]
pub fn time_to_unix_milli(value: &Value, format: TimeFormat) -> Option<i64> {
    match value {
        Value::Number(number) => match (format, number.as_i64()) {
            (TimeFormat::EpochMillis, Some(millis)) => Some(millis),
            (TimeFormat::EpochSeconds, Some(seconds)) => seconds.checked_mul(1000),
            _ => number.as_f64().and_then(|value| format.number_to_millis(value)),
        },
        Value::String(text) => format.parse_text(text),
        _ => None,
    }
}

#[cfg(test)]
mod test {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_epoch_detection() {
        assert_eq!(
            TimeFormat::detect_epoch(1_564_184_363.0),
            Some(TimeFormat::EpochSeconds)
        );
        assert_eq!(
            TimeFormat::detect_epoch(1_564_184_363_000.0),
            Some(TimeFormat::EpochMillis)
        );
        assert_eq!(TimeFormat::detect_epoch(42.0), None);
    }

    #[test]
    fn test_numeric_conversion() {
        assert_eq!(
            time_to_unix_milli(&json!(1_564_184_363), TimeFormat::EpochSeconds),
            Some(1_564_184_363_000)
        );
        assert_eq!(
            time_to_unix_milli(&json!(1_564_184_363.5), TimeFormat::EpochSeconds),
            Some(1_564_184_363_500)
        );
        assert_eq!(
            time_to_unix_milli(&json!(1_564_184_363_000_i64), TimeFormat::EpochMillis),
            Some(1_564_184_363_000)
        );
        assert_eq!(
            time_to_unix_milli(&json!("1564184363"), TimeFormat::EpochSeconds),
            Some(1_564_184_363_000)
        );
        assert_eq!(time_to_unix_milli(&json!(5), TimeFormat::Rfc3339), None);
    }

    #[test]
    fn test_text_conversion() {
        let minutes = TimeFormat::DateTime("%Y-%m-%dT%H:%M");
        let start = time_to_unix_milli(&json!("2016-01-01T00:00"), minutes).unwrap();
        let end = time_to_unix_milli(&json!("2016-01-01T00:10"), minutes).unwrap();
        assert_eq!(start, 1_451_606_400_000);
        assert_eq!(end - start, 600_000);

        assert_eq!(
            time_to_unix_milli(&json!("2016-01-01T00:00:00+01:00"), TimeFormat::Rfc3339),
            Some(1_451_602_800_000)
        );
        assert_eq!(
            time_to_unix_milli(&json!("2016-01-02"), TimeFormat::Date("%Y-%m-%d")),
            Some(1_451_692_800_000)
        );
        assert_eq!(time_to_unix_milli(&json!(null), minutes), None);
        assert_eq!(time_to_unix_milli(&json!("not a time"), minutes), None);
    }

    #[test]
    fn test_candidates_prefer_rfc3339() {
        let formats = TimeFormat::candidates("2016-01-01T00:00:00Z");
        assert_eq!(formats.first(), Some(&TimeFormat::Rfc3339));

        let formats = TimeFormat::candidates("2016-01-01 08:30:00");
        assert_eq!(
            formats.first(),
            Some(&TimeFormat::DateTime("%Y-%m-%d %H:%M:%S%.f"))
        );

        assert!(TimeFormat::candidates("hello").is_empty());
    }

    #[test]
    fn test_serializes_format_string() {
        assert_eq!(
            serde_json::to_value(TimeFormat::EpochSeconds).unwrap(),
            json!("X")
        );
    }
}
