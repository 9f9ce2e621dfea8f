//! Publish-date parsing
//!
//! News pages are inconsistent about how they write timestamps, so parsing
//! tries a fixed list of formats in order and the first one that accepts the
//! string wins:
//!
//! 1. `2021-03-04T10:00:00.000Z` (fractional seconds, UTC)
//! 2. `2021-03-04T10:00:00+0100` (numeric offset)
//! 3. `2021-03-04T10:00:00Z` (UTC)
//! 4. RFC 822 / RFC 2822 (`Thu, 04 Mar 2021 10:00:00 GMT`)
//! 5. General ISO 8601, including timestamps without an offset

use crate::ScrapeError;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};

/// A fixed `strftime` pattern and how its offset is determined
enum FixedFormat {
    /// The pattern ends in a literal `Z`; the time is UTC
    Utc(&'static str),
    /// The pattern carries its own numeric offset
    Offset(&'static str),
}

const FIXED_FORMATS: &[FixedFormat] = &[
    FixedFormat::Utc("%Y-%m-%dT%H:%M:%S%.fZ"),
    FixedFormat::Offset("%Y-%m-%dT%H:%M:%S%z"),
    FixedFormat::Utc("%Y-%m-%dT%H:%M:%SZ"),
];

/// ISO 8601 forms without an offset; these are read as UTC
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parses a raw publish-date string
///
/// # Returns
///
/// * `Ok(DateTime<FixedOffset>)` - The instant, with the offset the page gave
///   (UTC when it gave none)
/// * `Err(ScrapeError::UnrecognizedFormat)` - No parser accepted the string
///
/// # Examples
///
/// ```
/// use rabbit_crawler::crawler::parse_date;
///
/// let a = parse_date("2021-03-04T10:00:00.000Z").unwrap();
/// let b = parse_date("Mon, 04 Mar 2021 10:00:00 GMT").unwrap();
/// assert_eq!(a, b);
/// assert!(parse_date("not-a-date").is_err());
/// ```
pub fn parse_date(raw: &str) -> Result<DateTime<FixedOffset>, ScrapeError> {
    let value = raw.trim();

    parse_fixed(value)
        .or_else(|| parse_rfc2822(value))
        .or_else(|| parse_iso8601(value))
        .ok_or_else(|| ScrapeError::UnrecognizedFormat(raw.to_string()))
}

fn parse_fixed(value: &str) -> Option<DateTime<FixedOffset>> {
    FIXED_FORMATS.iter().find_map(|format| match format {
        FixedFormat::Utc(pattern) => NaiveDateTime::parse_from_str(value, pattern)
            .ok()
            .map(|naive| naive.and_utc().into()),
        FixedFormat::Offset(pattern) => DateTime::parse_from_str(value, pattern).ok(),
    })
}

/// RFC 2822 parsing that ignores the day-of-week
///
/// Mail-style parsers never check the weekday against the date, and pages
/// regularly get it wrong, so it is dropped before parsing.
fn parse_rfc2822(value: &str) -> Option<DateTime<FixedOffset>> {
    let without_weekday = match value.split_once(',') {
        Some((day, rest)) if day.trim().chars().all(|c| c.is_ascii_alphabetic()) => {
            rest.trim_start()
        }
        _ => value,
    };

    DateTime::parse_from_rfc2822(without_weekday).ok()
}

fn parse_iso8601(value: &str) -> Option<DateTime<FixedOffset>> {
    if let Ok(datetime) = DateTime::parse_from_rfc3339(value) {
        return Some(datetime);
    }

    let naive = NAIVE_FORMATS
        .iter()
        .find_map(|pattern| NaiveDateTime::parse_from_str(value, pattern).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })?;

    tracing::debug!("Date {:?} has no offset, assuming UTC", value);
    Some(naive.and_utc().into())
}
