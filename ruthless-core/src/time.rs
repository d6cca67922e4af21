//! Time utilities: timezone-aware deadline parsing and display.

use anyhow::Result;
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;

const LOCAL_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S"];

/// Parse a deadline given either as RFC 3339 (`2026-02-20T23:59:00Z`) or as
/// local wall-clock time (`2026-02-20 23:59`, or the `datetime-local` form
/// `2026-02-20T23:59`) in the IANA zone `tz`. Returns UTC.
pub fn parse_deadline(input: &str, tz: &str) -> Result<DateTime<Utc>> {
    let input = input.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(dt.with_timezone(&Utc));
    }

    let tz = parse_tz(tz)?;
    let ndt = LOCAL_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(input, fmt).ok())
        .ok_or_else(|| anyhow::anyhow!("invalid deadline '{input}': expected RFC 3339 or YYYY-MM-DD HH:MM"))?;

    let local_dt = tz
        .from_local_datetime(&ndt)
        .single()
        .ok_or_else(|| anyhow::anyhow!("ambiguous or invalid local time (DST?): {input} {tz}"))?;

    Ok(local_dt.with_timezone(&Utc))
}

pub fn parse_tz(tz: &str) -> Result<Tz> {
    tz.parse()
        .map_err(|_| anyhow::anyhow!("invalid timezone: {tz}"))
}

/// Render a UTC instant as local `YYYY-MM-DD HH:MM` in `tz`.
pub fn format_local(dt: DateTime<Utc>, tz: Tz) -> String {
    dt.with_timezone(&tz).format("%Y-%m-%d %H:%M").to_string()
}
