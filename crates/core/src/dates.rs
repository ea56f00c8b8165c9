//! Lenient serde helpers for the date fields filled in by browser forms.
//!
//! `<input type="date">` sends `YYYY-MM-DD`, `<input type="datetime-local">`
//! sends `YYYY-MM-DDTHH:MM` (seconds only when the step allows them), and a
//! cleared input sends `""`. Blank strings read as `None`.
//!
//! The `patch_*` variants are for update DTOs, used together with
//! `#[serde(default)]`: an absent field stays `None` ("leave alone"), while an
//! explicit `null` or `""` becomes `Some(None)` ("clear").

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::de::{Deserialize, Deserializer, Error};

const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// Parse a form date-time. A bare date means midnight.
pub fn parse_datetime(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .map(|d| d.and_time(NaiveTime::MIN))
        })
}

/// Parse a form date. A full date-time keeps only its date.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| parse_datetime(raw).map(|dt| dt.date()))
}

fn blank_or<T, E: Error>(
    raw: Option<String>,
    parse: fn(&str) -> Option<T>,
    what: &str,
) -> Result<Option<T>, E> {
    match raw {
        None => Ok(None),
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => parse(&s)
            .map(Some)
            .ok_or_else(|| E::custom(format!("invalid {what}: {s:?}"))),
    }
}

pub fn opt_datetime<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<NaiveDateTime>, D::Error> {
    blank_or(Option::<String>::deserialize(deserializer)?, parse_datetime, "date-time")
}

pub fn opt_date<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<NaiveDate>, D::Error> {
    blank_or(Option::<String>::deserialize(deserializer)?, parse_date, "date")
}

pub fn patch_datetime<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<Option<NaiveDateTime>>, D::Error> {
    opt_datetime(deserializer).map(Some)
}

pub fn patch_date<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<Option<NaiveDate>>, D::Error> {
    opt_date(deserializer).map(Some)
}

/// Present-but-null becomes `Some(None)`.
pub fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
