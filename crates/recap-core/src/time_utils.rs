use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use tracing::warn;

use crate::error::{RecapError, Result};

// ── System timezone detection ─────────────────────────────────────────────────

/// Detect the IANA timezone name of the running system.
///
/// Uses the `iana-time-zone` crate directly – no subprocess calls.
/// Falls back to `"UTC"` if detection fails.
pub fn get_system_timezone() -> String {
    iana_time_zone::get_timezone().unwrap_or_else(|_| "UTC".to_string())
}

/// Resolve a configured zone name into a [`Tz`].
///
/// `"auto"` resolves the system zone and degrades to UTC with a warning if
/// the system reports a name chrono-tz does not know. Any other unknown
/// name is a configuration error.
pub fn resolve_timezone(name: &str) -> Result<Tz> {
    if name.eq_ignore_ascii_case("auto") {
        let system = get_system_timezone();
        return Ok(system.parse::<Tz>().unwrap_or_else(|_| {
            warn!(
                "system timezone \"{}\" is not recognised, falling back to UTC",
                system
            );
            Tz::UTC
        }));
    }
    name.trim()
        .parse::<Tz>()
        .map_err(|_| RecapError::InvalidConfiguration(format!("unknown timezone \"{}\"", name)))
}

// ── LocalCalendar ─────────────────────────────────────────────────────────────

/// Projects UTC instants onto the calendar of one configured zone.
#[derive(Debug, Clone, Copy)]
pub struct LocalCalendar {
    tz: Tz,
}

impl LocalCalendar {
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }

    /// The instant as wall-clock time in the configured zone.
    pub fn local(&self, dt: DateTime<Utc>) -> DateTime<Tz> {
        dt.with_timezone(&self.tz)
    }

    /// The local calendar year of `dt`.
    pub fn year(&self, dt: DateTime<Utc>) -> i32 {
        self.local(dt).year()
    }
}

impl Default for LocalCalendar {
    fn default() -> Self {
        Self::new(Tz::UTC)
    }
}

/// The Monday starting the ISO week that contains `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    let offset = i64::from(date.weekday().num_days_from_monday());
    date - chrono::Duration::days(offset)
}

/// Add `months` calendar months to a `(year, month)` pair.
pub fn add_months(year: i32, month: u32, months: u32) -> (i32, u32) {
    let zero_based = year * 12 + (month as i32 - 1) + months as i32;
    (zero_based.div_euclid(12), zero_based.rem_euclid(12) as u32 + 1)
}

// ── TimestampProcessor ────────────────────────────────────────────────────────

/// Parses timestamps from the variety of encodings found in chat exports.
pub struct TimestampProcessor;

impl TimestampProcessor {
    /// Convert fractional Unix seconds into a UTC instant.
    pub fn from_unix_seconds(value: f64) -> Option<DateTime<Utc>> {
        if !value.is_finite() {
            return None;
        }
        let secs = value.trunc() as i64;
        let nanos = (value.fract() * 1_000_000_000.0).round() as i64;
        // Negative fractions borrow from the whole-second part.
        let (secs, nanos) = if nanos < 0 {
            (secs - 1, nanos + 1_000_000_000)
        } else {
            (secs, nanos)
        };
        DateTime::from_timestamp(secs, nanos.min(999_999_999) as u32)
    }

    /// Parse a textual timestamp: RFC 3339 (including a `Z` suffix) or a
    /// common naive date-time pattern, read as UTC.
    pub fn parse_str(s: &str) -> Option<DateTime<Utc>> {
        let s = s.trim();
        if s.is_empty() {
            return None;
        }

        // Replace trailing 'Z' with '+00:00' for RFC 3339 compatibility.
        let normalised = if let Some(stripped) = s.strip_suffix('Z') {
            format!("{}+00:00", stripped)
        } else {
            s.to_string()
        };

        if let Ok(dt) = DateTime::parse_from_rfc3339(&normalised) {
            return Some(dt.with_timezone(&Utc));
        }

        const FORMATS: &[&str] = &[
            "%Y-%m-%dT%H:%M:%S%.f",
            "%Y-%m-%dT%H:%M:%S",
            "%Y-%m-%d %H:%M:%S%.f",
            "%Y-%m-%d %H:%M:%S",
        ];

        for fmt in FORMATS {
            if let Ok(naive) = chrono::NaiveDateTime::parse_from_str(s, fmt) {
                return Some(Utc.from_utc_datetime(&naive));
            }
        }

        if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
            let naive = date.and_hms_opt(0, 0, 0)?;
            return Some(Utc.from_utc_datetime(&naive));
        }

        warn!(
            "TimestampProcessor: could not parse timestamp string \"{}\"",
            s
        );
        None
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    // ── resolve_timezone ─────────────────────────────────────────────────────

    #[test]
    fn test_resolve_timezone_named() {
        assert_eq!(
            resolve_timezone("America/New_York").unwrap(),
            Tz::America__New_York
        );
        assert_eq!(resolve_timezone("UTC").unwrap(), Tz::UTC);
    }

    #[test]
    fn test_resolve_timezone_invalid_is_configuration_error() {
        let err = resolve_timezone("Mars/Olympus").unwrap_err();
        assert!(matches!(err, RecapError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_resolve_timezone_auto_never_fails() {
        assert!(resolve_timezone("auto").is_ok());
        assert!(resolve_timezone("AUTO").is_ok());
    }

    // ── LocalCalendar ────────────────────────────────────────────────────────

    #[test]
    fn test_local_date_crosses_midnight_in_negative_offset() {
        let calendar = LocalCalendar::new(Tz::America__New_York);
        // 03:00 UTC on Jan 1st is still Dec 31st in New York (UTC-5).
        let dt = Utc.with_ymd_and_hms(2024, 1, 1, 3, 0, 0).unwrap();
        assert_eq!(
            calendar.local(dt).date_naive(),
            NaiveDate::from_ymd_opt(2023, 12, 31).unwrap()
        );
        assert_eq!(calendar.year(dt), 2023);
        assert_eq!(calendar.local(dt).hour(), 22);
    }

    #[test]
    fn test_local_calendar_default_is_utc() {
        let calendar = LocalCalendar::default();
        let dt = Utc.with_ymd_and_hms(2024, 1, 1, 3, 0, 0).unwrap();
        assert_eq!(calendar.year(dt), 2024);
    }

    #[test]
    fn test_week_start_is_monday() {
        // 2025-03-01 is a Saturday.
        let sat = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        assert_eq!(week_start(sat), NaiveDate::from_ymd_opt(2025, 2, 24).unwrap());
        let mon = NaiveDate::from_ymd_opt(2025, 2, 24).unwrap();
        assert_eq!(week_start(mon), mon);
    }

    #[test]
    fn test_add_months_wraps_year() {
        assert_eq!(add_months(2024, 11, 1), (2024, 12));
        assert_eq!(add_months(2024, 12, 1), (2025, 1));
        assert_eq!(add_months(2024, 1, 25), (2026, 2));
    }

    // ── TimestampProcessor ───────────────────────────────────────────────────

    #[test]
    fn test_parse_unix_float_seconds() {
        let dt = TimestampProcessor::from_unix_seconds(1_709_251_200.5).unwrap();
        assert_eq!(dt.timestamp(), 1_709_251_200);
        assert_eq!(dt.timestamp_subsec_millis(), 500);
    }

    #[test]
    fn test_parse_unix_integer_seconds() {
        let dt = TimestampProcessor::from_unix_seconds(0.0).unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(1970, 1, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_rfc3339_string() {
        let dt = TimestampProcessor::parse_str("2024-06-01T12:30:00.123456Z").unwrap();
        assert_eq!(dt.hour(), 12);
        assert_eq!(dt.minute(), 30);
    }

    #[test]
    fn test_parse_offset_string_converts_to_utc() {
        let dt = TimestampProcessor::parse_str("2024-01-15T12:00:00+02:00").unwrap();
        assert_eq!(dt.hour(), 10);
    }

    #[test]
    fn test_parse_str_naive_and_garbage() {
        assert!(TimestampProcessor::parse_str("2024-06-01 08:15:00").is_some());
        assert!(TimestampProcessor::parse_str("").is_none());
        assert!(TimestampProcessor::parse_str("yesterday").is_none());
    }

    #[test]
    fn test_from_unix_seconds_rejects_non_finite() {
        assert!(TimestampProcessor::from_unix_seconds(f64::NAN).is_none());
        assert!(TimestampProcessor::from_unix_seconds(f64::INFINITY).is_none());
    }
}
