//! The driver's native timestamp value.
//!
//! On the wire a timestamp travels as `{"@ts": "<RFC 3339>"}`. In-process the
//! driver hands out a [`NativeTime`] wrapping the parsed instant.

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, NaiveTime, SecondsFormat, Utc};
use std::borrow::Cow;

use crate::{Error, Result};

/// A timestamp as produced by the database driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NativeTime(DateTime<Utc>);

impl NativeTime {
    /// Creates a timestamp at the current time.
    #[must_use]
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Wraps an existing instant.
    #[must_use]
    pub const fn new(date: DateTime<Utc>) -> Self {
        Self(date)
    }

    /// Returns the embedded instant.
    #[must_use]
    pub const fn date(&self) -> DateTime<Utc> {
        self.0
    }

    /// Renders the instant the way it appears inside `{"@ts": ..}`.
    #[must_use]
    pub fn to_iso(&self) -> String {
        format_iso(&self.0)
    }

    /// Parses the string found inside `{"@ts": ..}`.
    pub fn parse(s: &str) -> Result<Self> {
        parse_iso(s).map(Self)
    }
}

impl From<DateTime<Utc>> for NativeTime {
    fn from(date: DateTime<Utc>) -> Self {
        Self(date)
    }
}

/// Formats an instant as RFC 3339 in UTC.
///
/// Sub-second digits are emitted only as far as needed (`.487`, `.487001`,
/// or none), so formatting then parsing always yields the same instant.
/// Years outside `0000..=9999` carry a sign, e.g. `+10000-01-01T00:00:00Z`.
#[must_use]
pub fn format_iso(date: &DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Parses an ISO-8601 string into a UTC instant.
///
/// Accepts RFC 3339 with any offset, a bare calendar date (midnight UTC),
/// and either of those with a signed extended year as written by
/// [`format_iso`].
pub fn parse_iso(s: &str) -> Result<DateTime<Utc>> {
    let (year, normalized) = match split_signed_year(s) {
        Some((year, rest)) => (Some(year), Cow::Owned(format!("{PLACEHOLDER_YEAR}{rest}"))),
        None => (None, Cow::Borrowed(s)),
    };
    let date = parse_four_digit_year(&normalized)
        .map_err(|e| Error::InvalidTimestamp(format!("{s:?}: {e}")))?;
    let date = match year {
        Some(year) => date.with_year(year).ok_or_else(|| {
            Error::InvalidTimestamp(format!("{s:?}: no such date in year {year}"))
        })?,
        None => date,
    };
    Ok(date.with_timezone(&Utc))
}

/// A leap year, so that February 29 survives until the real year is set.
const PLACEHOLDER_YEAR: &str = "2000";

/// Splits `+YYYYY-...` / `-YYYY-...` into the year and the text after it.
fn split_signed_year(s: &str) -> Option<(i32, &str)> {
    if !s.starts_with(['+', '-']) {
        return None;
    }
    let end = s[1..].find('-')? + 1;
    let digits = &s[1..end];
    if digits.len() < 4 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let year = s[..end].parse().ok()?;
    Some((year, &s[end..]))
}

fn parse_four_digit_year(s: &str) -> std::result::Result<DateTime<FixedOffset>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(s).or_else(|rfc3339_error| {
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(|date| date.and_time(NaiveTime::default()).and_utc().fixed_offset())
            .map_err(|_| rfc3339_error)
    })
}
