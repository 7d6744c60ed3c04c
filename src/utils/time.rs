// src/utils/time.rs

//! Local time rendering for openings.
//!
//! All renderers degrade to [`TBD`] instead of failing.

use std::fmt::Display;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::models::TBD;

/// `"March 5 7PM"`: full month, unpadded day and 12-hour clock.
const PRETTY_FORMAT: &str = "%B %-d %-I%p";

/// Resolve an IANA timezone name, falling back to UTC.
pub fn resolve_timezone(name: &str) -> Tz {
    name.trim().parse::<Tz>().unwrap_or_else(|_| {
        log::warn!("Unknown timezone {:?}, falling back to UTC", name);
        Tz::UTC
    })
}

/// Render a zoned datetime as `"Month Day H(AM/PM)"`.
pub fn format_pretty<T>(dt: &DateTime<T>) -> String
where
    T: TimeZone,
    T::Offset: Display,
{
    dt.format(PRETTY_FORMAT).to_string()
}

/// Render a drop-in game's ISO-8601 start instant in `tz`.
pub fn format_game_start(start: Option<&str>, tz: &Tz) -> String {
    start
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(parse_instant)
        .map(|dt| format_pretty(&dt.with_timezone(tz)))
        .unwrap_or_else(|| TBD.to_string())
}

/// Render a pickup session from its date and estimated `HH:MM` start in `tz`.
///
/// The time-of-day is a wall-clock time at the venue, so it is interpreted in
/// `tz` rather than converted from UTC.
pub fn format_estimated(event_date: Option<&str>, hhmm: Option<&str>, tz: &Tz) -> String {
    let (Some(date), Some(time)) = (event_date, hhmm) else {
        return TBD.to_string();
    };
    if date.trim().is_empty() || time.trim().is_empty() {
        return TBD.to_string();
    }

    let Some(naive) = parse_date(date).zip(parse_hhmm(time)) else {
        return TBD.to_string();
    };
    let naive = NaiveDateTime::new(naive.0, naive.1);

    match tz.from_local_datetime(&naive).earliest() {
        Some(local) => format_pretty(&local),
        // Wall-clock time skipped by a DST transition
        None => naive.format(PRETTY_FORMAT).to_string(),
    }
}

fn parse_instant(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    let day = s.get(..10).unwrap_or(s);
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

/// Parse `HH:MM`, tolerating a trailing `:SS` component.
fn parse_hhmm(s: &str) -> Option<NaiveTime> {
    let parts: Vec<&str> = s.trim().split(':').collect();
    if !(2..=3).contains(&parts.len()) {
        return None;
    }
    let hour: u32 = parts[0].trim().parse().ok()?;
    let minute: u32 = parts[1].trim().parse().ok()?;
    if let Some(seconds) = parts.get(2) {
        seconds.trim().parse::<f64>().ok()?;
    }
    NaiveTime::from_hms_opt(hour, minute, 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DENVER: Tz = Tz::America__Denver;

    #[test]
    fn test_resolve_timezone() {
        assert_eq!(resolve_timezone("America/Denver"), DENVER);
        assert_eq!(resolve_timezone("Mars/Olympus_Mons"), Tz::UTC);
    }

    #[test]
    fn test_game_start_in_mountain_time() {
        assert_eq!(
            format_game_start(Some("2024-03-05T19:00:00Z"), &DENVER),
            "March 5 12PM"
        );
        assert_eq!(
            format_game_start(Some("2024-03-05T19:00:00+00:00"), &DENVER),
            "March 5 12PM"
        );
    }

    #[test]
    fn test_game_start_crosses_midnight_and_dst() {
        // MDT is UTC-6
        assert_eq!(
            format_game_start(Some("2024-07-04T02:30:00Z"), &DENVER),
            "July 3 8PM"
        );
    }

    #[test]
    fn test_game_start_utc_fallback() {
        let utc = resolve_timezone("not-a-zone");
        assert_eq!(
            format_game_start(Some("2024-03-05T19:00:00Z"), &utc),
            "March 5 7PM"
        );
    }

    #[test]
    fn test_game_start_without_offset_is_utc() {
        assert_eq!(
            format_game_start(Some("2024-03-05T19:00:00"), &Tz::UTC),
            "March 5 7PM"
        );
    }

    #[test]
    fn test_game_start_tbd() {
        assert_eq!(format_game_start(None, &DENVER), TBD);
        assert_eq!(format_game_start(Some(""), &DENVER), TBD);
        assert_eq!(format_game_start(Some("next tuesday"), &DENVER), TBD);
    }

    #[test]
    fn test_estimated() {
        assert_eq!(
            format_estimated(Some("2024-03-05"), Some("19:00"), &DENVER),
            "March 5 7PM"
        );
        assert_eq!(
            format_estimated(Some("2024-03-05T00:00:00+00:00"), Some("7:30"), &DENVER),
            "March 5 7AM"
        );
        assert_eq!(
            format_estimated(Some("2024-03-05"), Some("19:00:00"), &DENVER),
            "March 5 7PM"
        );
        assert_eq!(
            format_estimated(Some("2024-03-05"), Some("00:15"), &DENVER),
            "March 5 12AM"
        );
    }

    #[test]
    fn test_estimated_tbd() {
        assert_eq!(format_estimated(None, Some("19:00"), &DENVER), TBD);
        assert_eq!(format_estimated(Some("2024-03-05"), None, &DENVER), TBD);
        assert_eq!(format_estimated(Some("tomorrow"), Some("19:00"), &DENVER), TBD);
        assert_eq!(format_estimated(Some("2024-03-05"), Some("25:00"), &DENVER), TBD);
        assert_eq!(format_estimated(Some("2024-03-05"), Some("19"), &DENVER), TBD);
        assert_eq!(format_estimated(Some("2024-03-05"), Some("7pm"), &DENVER), TBD);
    }

    #[test]
    fn test_estimated_in_dst_gap() {
        // 2:30 AM does not exist in Denver on 2024-03-10
        assert_eq!(
            format_estimated(Some("2024-03-10"), Some("02:30"), &DENVER),
            "March 10 2AM"
        );
    }
}
