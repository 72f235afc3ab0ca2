// SPDX-FileCopyrightText: 2026 LtcScope Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Lenient timestamp parsing for export columns.
//!
//! The export mixes RFC 3339, space-separated and date-only timestamps. Values
//! with an offset are converted to UTC; naive values are taken as UTC.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

const OFFSET_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f%#z", "%Y-%m-%d %H:%M:%S%.f %#z"];

/// Parse a timestamp in any of the accepted layouts, normalized to UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(t) = DateTime::parse_from_rfc3339(raw) {
        return Some(t.with_timezone(&Utc));
    }
    for format in OFFSET_FORMATS {
        if let Ok(t) = DateTime::parse_from_str(raw, format) {
            return Some(t.with_timezone(&Utc));
        }
    }
    // A trailing "UTC" or "Z" on an otherwise naive value.
    let naive = raw
        .strip_suffix(" UTC")
        .or_else(|| raw.strip_suffix('Z'))
        .unwrap_or(raw);
    for format in NAIVE_FORMATS {
        if let Ok(t) = NaiveDateTime::parse_from_str(naive, format) {
            return Some(t.and_utc());
        }
    }
    NaiveDate::parse_from_str(naive, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|t| t.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
    }

    #[test]
    fn accepts_common_layouts() {
        let expected = utc(2019, 1, 15, 10, 30, 0);
        for raw in [
            "2019-01-15T10:30:00Z",
            "2019-01-15T10:30:00+00:00",
            "2019-01-15 10:30:00",
            "2019-01-15 10:30:00.000",
            "2019-01-15T10:30:00",
            "2019-01-15 10:30:00 UTC",
            "2019-01-15 10:30:00+00:00",
            "2019-01-15 10:30",
        ] {
            assert_eq!(parse_timestamp(raw), Some(expected), "{raw}");
        }
    }

    #[test]
    fn offsets_are_normalized() {
        assert_eq!(
            parse_timestamp("2019-01-15T12:30:00+02:00"),
            Some(utc(2019, 1, 15, 10, 30, 0))
        );
        assert_eq!(
            parse_timestamp("2019-01-15 05:30:00-0500"),
            Some(utc(2019, 1, 15, 10, 30, 0))
        );
    }

    #[test]
    fn date_only_is_midnight() {
        assert_eq!(parse_timestamp("2019-01-15"), Some(utc(2019, 1, 15, 0, 0, 0)));
    }

    #[test]
    fn garbage_is_rejected() {
        assert_eq!(parse_timestamp(""), None);
        assert_eq!(parse_timestamp("N/A"), None);
        assert_eq!(parse_timestamp("2019-13-40"), None);
    }
}
