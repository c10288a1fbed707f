use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};

const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M%:z",
    "%Y-%m-%dT%H:%M%z",
];
const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// Parses a hire timestamp.
///
/// A space may stand in for the `T` separator and a trailing `Z` means UTC.
/// Offsets may be written `+02:00` or `+0200`, and minutes or seconds may be omitted.
/// Values without an offset are taken as UTC; a bare date is midnight UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let mut normalized = raw.trim().replacen(' ', "T", 1);
    if normalized.is_empty() {
        return None;
    }
    if normalized.ends_with(['Z', 'z']) {
        normalized.pop();
        normalized.push_str("+00:00");
    }

    for format in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(&normalized, format) {
            return Some(dt.with_timezone(&Utc));
        }
    }

    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(&normalized, format) {
            return Some(naive.and_utc());
        }
    }

    // `YYYY-MM-DDTHH`: chrono will not build a time from an hour alone.
    if let Some((date, hour)) = normalized.split_once('T') {
        if hour.len() == 2 && hour.bytes().all(|b| b.is_ascii_digit()) {
            let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()?;
            let hour = hour.parse::<u32>().ok()?;
            return date.and_hms_opt(hour, 0, 0).map(|naive| naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(&normalized, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Serde adapter so JSON batch items accept the same timestamp forms as CSV uploads.
pub fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid datetime: {}", raw)))
}
