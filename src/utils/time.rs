// src/utils/time.rs

//! Release timestamp rendering.

use chrono::{DateTime, FixedOffset};

/// Display offset for release times (UTC+8).
const DISPLAY_OFFSET_SECS: i32 = 8 * 3600;

/// Render a store release timestamp for notification text.
///
/// Parses RFC 3339 (a trailing `Z` is an explicit zero offset), converts to
/// UTC+8 and renders as `YYYY-MM-DD HH:MM`. Anything unparseable is passed
/// through truncated to 16 characters, so sentinel values like "unknown"
/// survive as-is.
pub fn format_release_time(raw: &str) -> String {
    match DateTime::parse_from_rfc3339(raw) {
        Ok(dt) => {
            let offset = FixedOffset::east_opt(DISPLAY_OFFSET_SECS).expect("valid UTC offset");
            dt.with_timezone(&offset).format("%Y-%m-%d %H:%M").to_string()
        }
        Err(_) => raw.chars().take(16).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_utc_to_plus_eight() {
        assert_eq!(
            format_release_time("2026-03-10T22:30:00Z"),
            "2026-03-11 06:30"
        );
    }

    #[test]
    fn respects_explicit_offsets() {
        assert_eq!(
            format_release_time("2026-03-10T22:30:00+08:00"),
            "2026-03-10 22:30"
        );
    }

    #[test]
    fn falls_back_to_truncated_raw() {
        assert_eq!(format_release_time("unknown"), "unknown");
        assert_eq!(
            format_release_time("2026-03-10 22:30:00 and trailing junk"),
            "2026-03-10 22:30"
        );
    }

    #[test]
    fn fallback_is_char_safe() {
        let raw = "не дата не дата не дата";
        assert_eq!(format_release_time(raw), raw.chars().take(16).collect::<String>());
    }
}
