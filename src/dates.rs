//! Calendar window boundaries for day, ISO-week and month queries.
//!
//! Every repository computes its query windows here so the whole layer
//! shares one interpretation of "the day containing t": the calendar is
//! read in the zone of the input value, and all windows are half-open
//! `[start, end)` with `end` being the first instant of the next period.

use chrono::{DateTime, Datelike, Duration, LocalResult, NaiveDate, TimeZone, Weekday};

/// Midnight of `t`'s calendar day.
pub fn day_start<Tz: TimeZone>(t: &DateTime<Tz>) -> DateTime<Tz> {
    at_midnight(&t.timezone(), t.date_naive())
}

/// Midnight of the day after `t`'s calendar day, the exclusive upper
/// bound of the day window.
pub fn day_end<Tz: TimeZone>(t: &DateTime<Tz>) -> DateTime<Tz> {
    at_midnight(&t.timezone(), next_day(t.date_naive()))
}

/// Midnight of the Monday of `t`'s ISO week.
pub fn iso_week_start<Tz: TimeZone>(t: &DateTime<Tz>) -> DateTime<Tz> {
    let week = t.date_naive().week(Weekday::Mon);
    at_midnight(&t.timezone(), week.first_day())
}

/// Midnight of the Monday after `t`'s ISO week, the exclusive upper
/// bound of the week window.
pub fn iso_week_end<Tz: TimeZone>(t: &DateTime<Tz>) -> DateTime<Tz> {
    let week = t.date_naive().week(Weekday::Mon);
    at_midnight(&t.timezone(), next_day(week.last_day()))
}

/// Midnight of the first day of `t`'s month.
pub fn month_start<Tz: TimeZone>(t: &DateTime<Tz>) -> DateTime<Tz> {
    let first = t
        .date_naive()
        .with_day(1)
        .expect("day 1 exists in every month");
    at_midnight(&t.timezone(), first)
}

/// Midnight of the first day of the month after `t`'s, the exclusive
/// upper bound of the month window.
pub fn month_end<Tz: TimeZone>(t: &DateTime<Tz>) -> DateTime<Tz> {
    let date = t.date_naive();
    let first_of_next = if date.month() == 12 {
        NaiveDate::from_ymd_opt(date.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(date.year(), date.month() + 1, 1)
    }
    .expect("first of month is always a valid date");
    at_midnight(&t.timezone(), first_of_next)
}

fn next_day(date: NaiveDate) -> NaiveDate {
    date.succ_opt().expect("calendar day out of range")
}

/// Resolves local midnight of `date` in `tz`. An ambiguous midnight (clock
/// rolled back across it) resolves to the earlier instant; a midnight that
/// does not exist (clock rolled forward across it) resolves to the first
/// valid wall time after it.
fn at_midnight<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> DateTime<Tz> {
    let mut naive = date.and_hms_opt(0, 0, 0).expect("midnight is a valid time");
    // Real transitions shift by at most an hour, in steps no finer than
    // fifteen minutes.
    for _ in 0..8 {
        match tz.from_local_datetime(&naive) {
            LocalResult::Single(dt) => return dt,
            LocalResult::Ambiguous(earlier, _) => return earlier,
            LocalResult::None => naive += Duration::minutes(15),
        }
    }
    tz.from_utc_datetime(&naive)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Timelike, Utc};

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
    }

    #[test]
    fn test_day_window_contains_input() {
        let t = utc(2024, 3, 5, 14, 30, 12);
        assert!(day_start(&t) <= t);
        assert!(t < day_end(&t));
    }

    #[test]
    fn test_day_window_is_one_day_wide() {
        let t = utc(2024, 2, 29, 8, 0, 0);
        assert_eq!(day_end(&t) - day_start(&t), Duration::days(1));
    }

    #[test]
    fn test_day_start_truncates_to_midnight() {
        let t = utc(2024, 3, 5, 23, 59, 59);
        assert_eq!(day_start(&t), utc(2024, 3, 5, 0, 0, 0));
        assert_eq!(day_end(&t), utc(2024, 3, 6, 0, 0, 0));
    }

    #[test]
    fn test_day_start_is_idempotent() {
        let t = utc(2024, 3, 5, 10, 0, 0);
        assert_eq!(day_start(&day_start(&t)), day_start(&t));
    }

    #[test]
    fn test_day_start_respects_the_input_zone() {
        // 2024-03-05T01:30+05:30 is still 2024-03-04 in UTC.
        let tz = FixedOffset::east_opt(5 * 3600 + 1800).unwrap();
        let t = tz.with_ymd_and_hms(2024, 3, 5, 1, 30, 0).unwrap();

        let start = day_start(&t);
        assert_eq!(start.hour(), 0);
        assert_eq!(start.date_naive(), NaiveDate::from_ymd_opt(2024, 3, 5).unwrap());
        // The same instant viewed from UTC belongs to the previous day.
        assert_eq!(
            day_start(&t.with_timezone(&Utc)).date_naive(),
            NaiveDate::from_ymd_opt(2024, 3, 4).unwrap()
        );
    }

    #[test]
    fn test_iso_week_runs_monday_to_monday() {
        // 2024-03-05 is a Tuesday; its ISO week is Mon 03-04 .. Sun 03-10.
        let t = utc(2024, 3, 5, 12, 0, 0);
        assert_eq!(iso_week_start(&t), utc(2024, 3, 4, 0, 0, 0));
        assert_eq!(iso_week_end(&t), utc(2024, 3, 11, 0, 0, 0));
    }

    #[test]
    fn test_iso_week_crosses_year_boundary() {
        // 2025-01-01 belongs to the ISO week starting Mon 2024-12-30.
        let t = utc(2025, 1, 1, 9, 0, 0);
        assert_eq!(iso_week_start(&t), utc(2024, 12, 30, 0, 0, 0));
        assert_eq!(iso_week_end(&t), utc(2025, 1, 6, 0, 0, 0));
    }

    #[test]
    fn test_monday_is_its_own_week_start() {
        let t = utc(2024, 3, 4, 0, 0, 0);
        assert_eq!(iso_week_start(&t), t);
    }

    #[test]
    fn test_month_window_leap_february() {
        let t = utc(2024, 2, 15, 18, 45, 0);
        assert_eq!(month_start(&t), utc(2024, 2, 1, 0, 0, 0));
        assert_eq!(month_end(&t), utc(2024, 3, 1, 0, 0, 0));
    }

    #[test]
    fn test_month_window_december_rolls_the_year() {
        let t = utc(2024, 12, 31, 23, 0, 0);
        assert_eq!(month_start(&t), utc(2024, 12, 1, 0, 0, 0));
        assert_eq!(month_end(&t), utc(2025, 1, 1, 0, 0, 0));
    }
}
