//! Flexible timestamp parsing
//!
//! Exports write dates in whatever locale the phone was set to:
//!
//! ```text
//! 6.09.25, 15:00:00          dotted, always day first
//! 06/09/2025 15:00:00        UK slash
//! 9/6/25, 3:00:00 PM         US slash
//! ```
//!
//! Parsing is an ordered chain of tiers; the first tier that yields an
//! instant wins:
//!
//! 1. A deterministic parser for the layouts above. Fields are taken as UTC
//!    wall-clock values with no shifting.
//! 2. A list of generic layouts interpreted in the local system timezone and
//!    converted to UTC.

use crate::error::{Error, Result};
use chrono::{DateTime, Duration, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};

/// `chrono` format of a canonical timestamp (`DD.MM.YY, HH:MM:SS`).
pub const CANONICAL_FORMAT: &str = "%d.%m.%y, %H:%M:%S";

/// Time-of-day layouts for the fast path, in priority order.
const TIME_LAYOUTS: &[&str] = &["%H:%M:%S", "%I:%M:%S%p", "%I:%M:%S %p"];

/// Generic layouts for the fallback tier, in priority order.
///
/// Two-digit year layouts come before their four-digit twins because `%Y`
/// would happily read `25` as the year 25.
const FALLBACK_LAYOUTS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%d.%m.%y %H:%M",
    "%d.%m.%Y %H:%M",
    "%m/%d/%y %I:%M %p",
    "%m/%d/%y %I:%M%p",
    "%m/%d/%Y %I:%M %p",
    "%m/%d/%Y %I:%M%p",
    "%m/%d/%y %H:%M",
    "%d/%m/%y %H:%M",
    "%d/%m/%Y %H:%M",
    "%m/%d/%Y %H:%M",
    "%d-%m-%y %H:%M:%S",
    "%d-%m-%Y %H:%M:%S",
    "%d-%m-%y %H:%M",
    "%d-%m-%Y %H:%M",
];

type Tier = fn(&str) -> Option<DateTime<Utc>>;

const TIERS: &[(&str, Tier)] = &[("fast", parse_fast), ("fallback", parse_fallback)];

/// Parse a date and time separated by one space into a UTC instant.
///
/// Commas are dropped and surrounding whitespace trimmed before any tier
/// runs. Fails with [`Error::UnrecognizedTimestamp`] carrying `input`
/// verbatim when no tier succeeds.
pub fn parse_flexible(input: &str) -> Result<DateTime<Utc>> {
    let cleaned = input.replace(',', "");
    let cleaned = cleaned.trim();

    for (tier, parse) in TIERS {
        if let Some(instant) = parse(cleaned) {
            tracing::trace!(input, tier, %instant, "Parsed timestamp");
            return Ok(instant);
        }
    }

    Err(Error::UnrecognizedTimestamp {
        input: input.to_string(),
    })
}

/// Render an instant in the canonical `DD.MM.YY, HH:MM:SS` form.
pub fn format_canonical(instant: DateTime<Utc>) -> String {
    instant.format(CANONICAL_FORMAT).to_string()
}

fn parse_fast(s: &str) -> Option<DateTime<Utc>> {
    let (date_part, time_part) = s.split_once(' ')?;
    let time = parse_time_part(time_part)?;
    let date = parse_date_part(date_part)?;
    Some(date.and_time(time).and_utc())
}

fn parse_time_part(time_part: &str) -> Option<NaiveTime> {
    TIME_LAYOUTS
        .iter()
        .find_map(|layout| NaiveTime::parse_from_str(time_part, layout).ok())
}

fn parse_date_part(date_part: &str) -> Option<NaiveDate> {
    let (day, month, year) = if date_part.contains('.') {
        let [d, m, y] = numeric_parts(date_part, '.')?;
        (d, m, y)
    } else if date_part.contains('/') {
        let [a, b, c] = numeric_parts(date_part, '/')?;
        let four_digit_year = date_part.rsplit('/').next().map_or(false, |y| y.len() == 4);
        // Only a 4-digit year or an impossible month tells UK from US
        if four_digit_year || a > 12 {
            (a, b, c)
        } else {
            (b, a, c)
        }
    } else {
        return None;
    };

    let year = if year < 100 { year + 2000 } else { year };
    NaiveDate::from_ymd_opt(i32::try_from(year).ok()?, month, day)
}

/// Split into exactly three all-digit parts.
fn numeric_parts(date_part: &str, separator: char) -> Option<[u32; 3]> {
    let mut parts = date_part.split(separator).map(|p| {
        if !p.is_empty() && p.bytes().all(|b| b.is_ascii_digit()) {
            p.parse::<u32>().ok()
        } else {
            None
        }
    });

    let a = parts.next()??;
    let b = parts.next()??;
    let c = parts.next()??;
    if parts.next().is_some() {
        return None;
    }
    Some([a, b, c])
}

fn parse_fallback(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    FALLBACK_LAYOUTS.iter().find_map(|layout| {
        let naive = NaiveDateTime::parse_from_str(s, layout).ok()?;
        resolve_local(&Local, naive)
    })
}

/// Pin a wall-clock time to an instant in `tz`.
///
/// Ambiguous times take the earlier instant. A time skipped by a
/// spring-forward transition is moved forward by the usual one-hour shift.
fn resolve_local<Tz: TimeZone>(tz: &Tz, naive: NaiveDateTime) -> Option<DateTime<Utc>> {
    tz.from_local_datetime(&naive)
        .earliest()
        .or_else(|| tz.from_local_datetime(&(naive + Duration::hours(1))).earliest())
        .map(|local| local.with_timezone(&Utc))
}
