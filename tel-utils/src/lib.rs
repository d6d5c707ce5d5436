//! Shared utility functions for thermal event library crates.

/// Date utility functions
pub mod dates {
    use chrono::NaiveDate;

    /// Date format used by every input and output table: "YYYY-MM-DD"
    pub const DATE_FORMAT: &str = "%Y-%m-%d";

    /// Format a NaiveDate as "YYYY-MM-DD"
    pub fn format_date(date: &NaiveDate) -> String {
        date.format(DATE_FORMAT).to_string()
    }

    /// Parse a date string in "YYYY-MM-DD" format
    pub fn parse_date(s: &str) -> anyhow::Result<NaiveDate> {
        Ok(NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)?)
    }

    /// Gregorian leap year rule.
    pub fn is_leap_year(year: i32) -> bool {
        NaiveDate::from_ymd_opt(year, 2, 29).is_some()
    }

    /// Number of days in a calendar year (365 or 366).
    pub fn days_in_year(year: i32) -> u32 {
        if is_leap_year(year) {
            366
        } else {
            365
        }
    }

    /// The date for an ordinal day within a year, if that day exists.
    ///
    /// Days are ordinal (Jan 1 = day 1), so March 1 is day 60 in common
    /// years and day 61 in leap years; only leap years reach day 366.
    pub fn date_from_day_of_year(year: i32, day: u32) -> Option<NaiveDate> {
        NaiveDate::from_yo_opt(year, day)
    }

}
