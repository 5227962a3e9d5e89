use chrono::{Datelike, Local, NaiveDate};

pub fn is_leap(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        2 if is_leap(year) => 29,
        2 => 28,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

/// Column of the first day of the month in a Sunday-first week (0 = Sunday).
pub fn first_weekday_offset(year: i32, month: u32) -> u32 {
    NaiveDate::from_ymd_opt(year, month, 1)
        .map(|d| d.weekday().num_days_from_sunday())
        .unwrap_or(0)
}

/// Monotonic day number used for ordering and range checks.
///
/// The day is added to the first of the month rather than validated, so
/// `ordinal(y, m, days_in_month(y, m) + 1)` equals the first of the next month.
pub fn ordinal(year: i32, month: u32, day: u32) -> i64 {
    NaiveDate::from_ymd_opt(year, month, 1)
        .map(|first| i64::from(first.num_days_from_ce()) + i64::from(day) - 1)
        .unwrap_or_default()
}

pub fn date_ordinal(date: NaiveDate) -> i64 {
    ordinal(date.year(), date.month(), date.day())
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub fn month_name(month: u32) -> &'static str {
    const NAMES: [&str; 12] = [
        "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
    ];
    month
        .checked_sub(1)
        .and_then(|idx| NAMES.get(idx as usize))
        .copied()
        .unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leap_years_follow_gregorian_rules() {
        assert!(is_leap(2024));
        assert!(is_leap(2000));
        assert!(!is_leap(1900));
        assert!(!is_leap(2023));
    }

    #[test]
    fn february_length_depends_on_leap_year() {
        assert_eq!(days_in_month(2024, 2), 29);
        assert_eq!(days_in_month(2023, 2), 28);
        assert_eq!(days_in_month(2024, 6), 30);
        assert_eq!(days_in_month(2024, 12), 31);
    }

    #[test]
    fn first_weekday_is_sunday_based() {
        // 2024-06-01 was a Saturday, 2024-09-01 a Sunday.
        assert_eq!(first_weekday_offset(2024, 6), 6);
        assert_eq!(first_weekday_offset(2024, 9), 0);
    }

    #[test]
    fn ordinal_is_contiguous_across_month_and_year_boundaries() {
        assert_eq!(ordinal(2024, 1, 31) + 1, ordinal(2024, 2, 1));
        assert_eq!(ordinal(2023, 12, 31) + 1, ordinal(2024, 1, 1));
        assert_eq!(ordinal(2024, 2, 29) + 1, ordinal(2024, 3, 1));
        let date = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        assert_eq!(date_ordinal(date), ordinal(2024, 6, 15));
    }

    #[test]
    fn month_names_are_abbreviated() {
        assert_eq!(month_name(1), "Jan");
        assert_eq!(month_name(12), "Dec");
        assert_eq!(month_name(0), "");
        assert_eq!(month_name(13), "");
    }
}
