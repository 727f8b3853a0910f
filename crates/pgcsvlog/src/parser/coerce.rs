//! Coerce — string → typed conversion for timestamp and integer columns.
//!
//! Coercion never fails: values that cannot be read come back as an explicit
//! sentinel ([`Timestamp::Invalid`], [`LogNumber::NotANumber`]) so the record
//! is still emitted.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use serde::{Serialize, Serializer};

/// Layouts accepted for the date-time part of a csvlog timestamp.
const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

/// Zone abbreviations resolved to a fixed offset, in minutes east of UTC.
const ZONE_ABBREVIATIONS: [(&str, i32); 22] = [
    ("UTC", 0),
    ("GMT", 0),
    ("UT", 0),
    ("Z", 0),
    ("EST", -5 * 60),
    ("EDT", -4 * 60),
    ("CST", -6 * 60),
    ("CDT", -5 * 60),
    ("MST", -7 * 60),
    ("MDT", -6 * 60),
    ("PST", -8 * 60),
    ("PDT", -7 * 60),
    ("AKST", -9 * 60),
    ("AKDT", -8 * 60),
    ("HST", -10 * 60),
    ("WET", 0),
    ("CET", 60),
    ("CEST", 2 * 60),
    ("EET", 2 * 60),
    ("EEST", 3 * 60),
    ("MSK", 3 * 60),
    ("JST", 9 * 60),
];

/// A coerced `log_time` / `session_start_time` value.
#[derive(Debug, Clone, PartialEq)]
pub enum Timestamp {
    /// Zone resolved to a UTC offset.
    Zoned(DateTime<FixedOffset>),
    /// Wall-clock time in the server's local representation. `zone` holds an
    /// abbreviation we could not resolve, if the log carried one.
    Local {
        time: NaiveDateTime,
        zone: Option<String>,
    },
    /// Unparseable input, kept verbatim.
    Invalid(String),
}

impl Timestamp {
    pub fn is_valid(&self) -> bool {
        !matches!(self, Timestamp::Invalid(_))
    }

    /// The instant in UTC, if the zone was resolved.
    pub fn to_utc(&self) -> Option<DateTime<Utc>> {
        match self {
            Timestamp::Zoned(dt) => Some(dt.with_timezone(&Utc)),
            _ => None,
        }
    }

    /// The wall-clock time as written in the log.
    pub fn naive_local(&self) -> Option<NaiveDateTime> {
        match self {
            Timestamp::Zoned(dt) => Some(dt.naive_local()),
            Timestamp::Local { time, .. } => Some(*time),
            Timestamp::Invalid(_) => None,
        }
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Timestamp::Zoned(dt) => serializer.serialize_str(
                &dt.with_timezone(&Utc).to_rfc3339_opts(SecondsFormat::Millis, true),
            ),
            Timestamp::Local { time, .. } => {
                serializer.serialize_str(&time.format("%Y-%m-%dT%H:%M:%S%.3f").to_string())
            }
            Timestamp::Invalid(_) => serializer.serialize_none(),
        }
    }
}

/// A coerced `process_id` / `session_line_num` value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogNumber {
    Value(i64),
    NotANumber,
}

impl LogNumber {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            LogNumber::Value(v) => Some(*v),
            LogNumber::NotANumber => None,
        }
    }

    pub fn is_nan(&self) -> bool {
        matches!(self, LogNumber::NotANumber)
    }
}

impl Serialize for LogNumber {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            LogNumber::Value(v) => serializer.serialize_i64(*v),
            LogNumber::NotANumber => serializer.serialize_none(),
        }
    }
}

/// Parse a csvlog timestamp such as `2024-03-01 12:34:56.789 UTC`.
pub fn parse_timestamp(raw: &str) -> Timestamp {
    let text = raw.trim();
    if text.is_empty() {
        return Timestamp::Invalid(raw.to_string());
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Timestamp::Zoned(dt);
    }
    if let Ok(dt) = DateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f%#z") {
        return Timestamp::Zoned(dt);
    }

    let (body, zone) = split_zone(text);
    let Some(time) = parse_naive(body) else {
        return Timestamp::Invalid(raw.to_string());
    };

    match zone {
        None => Timestamp::Local { time, zone: None },
        Some(zone) => match zone_offset(zone) {
            Some(offset) => match offset.from_local_datetime(&time).single() {
                Some(dt) => Timestamp::Zoned(dt),
                None => Timestamp::Invalid(raw.to_string()),
            },
            None if is_abbreviation(zone) => Timestamp::Local {
                time,
                zone: Some(zone.to_string()),
            },
            None => Timestamp::Invalid(raw.to_string()),
        },
    }
}

/// Parse a base-10 integer column.
pub fn parse_integer(raw: &str) -> LogNumber {
    raw.trim()
        .parse::<i64>()
        .map(LogNumber::Value)
        .unwrap_or(LogNumber::NotANumber)
}

/// Split a trailing zone token (`UTC`, `+05:30`) off the date-time body.
fn split_zone(text: &str) -> (&str, Option<&str>) {
    match text.rsplit_once(' ') {
        Some((body, zone))
            if zone.starts_with(['+', '-']) || zone.chars().all(|c| c.is_ascii_alphabetic()) =>
        {
            (body.trim_end(), Some(zone))
        }
        _ => (text, None),
    }
}

fn parse_naive(body: &str) -> Option<NaiveDateTime> {
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(body, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(body, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

fn zone_offset(zone: &str) -> Option<FixedOffset> {
    let seconds = match numeric_offset(zone) {
        Some(seconds) => seconds,
        None => {
            let upper = zone.to_ascii_uppercase();
            let (_, minutes) = ZONE_ABBREVIATIONS.iter().find(|(name, _)| *name == upper)?;
            minutes * 60
        }
    };
    FixedOffset::east_opt(seconds)
}

/// `+05`, `-0330`, `+05:30` → seconds east of UTC.
fn numeric_offset(zone: &str) -> Option<i32> {
    let (sign, rest) = if let Some(rest) = zone.strip_prefix('+') {
        (1, rest)
    } else if let Some(rest) = zone.strip_prefix('-') {
        (-1, rest)
    } else {
        return None;
    };

    let (hours, minutes) = match rest.split_once(':') {
        Some((h, m)) => (h, m),
        None if rest.len() == 4 => (rest.get(..2)?, rest.get(2..)?),
        None => (rest, "00"),
    };
    if hours.len() != 2 || minutes.len() != 2 {
        return None;
    }
    if !hours.bytes().chain(minutes.bytes()).all(|b| b.is_ascii_digit()) {
        return None;
    }

    let hours: i32 = hours.parse().ok()?;
    let minutes: i32 = minutes.parse().ok()?;
    if minutes >= 60 {
        return None;
    }
    Some(sign * (hours * 3600 + minutes * 60))
}

fn is_abbreviation(zone: &str) -> bool {
    (2..=6).contains(&zone.len()) && zone.chars().all(|c| c.is_ascii_alphabetic())
}
