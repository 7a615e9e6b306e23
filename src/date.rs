/// Date validation and formatting utilities
///
/// Pure helpers for the canonical YYYY-MM-DD date strings the APOD
/// endpoint speaks: strict validation, range checks against the fixed
/// archive start date, and locale-aware display formatting.

use chrono::{Local, NaiveDate};

pub use chrono::Locale;

/// Canonical wire format for dates (e.g. "2023-06-15")
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// The earliest date the archive serves: June 16, 1995
fn service_start() -> NaiveDate {
    NaiveDate::from_ymd_opt(1995, 6, 16).expect("constant date is valid")
}

/// Strict parse of a canonical date string. Rejects malformed input and
/// out-of-range components (month 13, February 30) with no leniency.
fn parse(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, DATE_FORMAT).ok()
}

/// Check whether a string is a syntactically valid calendar date
pub fn is_valid_date(s: &str) -> bool {
    parse(s).is_some()
}

/// Check whether a date lies strictly after today (local time).
/// Unparseable input is not a future date.
pub fn is_future_date(s: &str) -> bool {
    match parse(s) {
        Some(date) => date > Local::now().date_naive(),
        None => false,
    }
}

/// Check whether a date precedes the archive start (June 16, 1995).
/// Unparseable input is not before the start.
pub fn is_before_service_start(s: &str) -> bool {
    match parse(s) {
        Some(date) => date < service_start(),
        None => false,
    }
}

/// Today's date (local time) in canonical form
pub fn today() -> String {
    Local::now().format(DATE_FORMAT).to_string()
}

/// Format a canonical date for display in long form, e.g. "June 16, 1995".
/// On parse failure the input is returned unchanged so callers always get
/// something to show.
pub fn format_for_display(s: &str, locale: Locale) -> String {
    match parse(s) {
        Some(date) => date.format_localized("%B %-d, %Y", locale).to_string(),
        None => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_date_accepted() {
        assert!(is_valid_date("2023-06-15"));
        assert!(is_valid_date("1995-06-16"));
        // Leap day exists in 2024
        assert!(is_valid_date("2024-02-29"));
    }

    #[test]
    fn test_invalid_dates_rejected() {
        assert!(!is_valid_date("2023-13-01"));
        assert!(!is_valid_date("2023-02-30"));
        assert!(!is_valid_date("2023-02-29"));
        assert!(!is_valid_date("not-a-date"));
        assert!(!is_valid_date(""));
        assert!(!is_valid_date("2023-06-15 "));
    }

    #[test]
    fn test_service_start_boundary() {
        assert!(is_before_service_start("1995-06-15"));
        assert!(!is_before_service_start("1995-06-16"));
        assert!(!is_before_service_start("2020-01-01"));
        assert!(!is_before_service_start("garbage"));
    }

    #[test]
    fn test_future_date() {
        let tomorrow = Local::now()
            .date_naive()
            .succ_opt()
            .unwrap()
            .format(DATE_FORMAT)
            .to_string();
        assert!(is_future_date(&tomorrow));
        assert!(!is_future_date(&today()));
        assert!(!is_future_date("1995-06-16"));
        assert!(!is_future_date("garbage"));
    }

    #[test]
    fn test_today_is_valid() {
        assert!(is_valid_date(&today()));
        assert!(!is_future_date(&today()));
    }

    #[test]
    fn test_format_for_display() {
        assert_eq!(
            format_for_display("1995-06-16", Locale::en_US),
            "June 16, 1995"
        );
        // Day is not zero-padded
        assert_eq!(
            format_for_display("2020-01-05", Locale::en_US),
            "January 5, 2020"
        );
    }

    #[test]
    fn test_format_passes_through_bad_input() {
        assert_eq!(format_for_display("not-a-date", Locale::en_US), "not-a-date");
        assert_eq!(format_for_display("", Locale::en_US), "");
    }
}
