// 📅 Period Parser - "01/02/2025 - 28/02/2025" → 2025-02-28
// Only the END date of a reporting period is used downstream.

use chrono::{Days, NaiveDate};

/// Separator between the start and end date of a period label
pub const PERIOD_SEPARATOR: &str = " - ";

/// Extract the end date of a `"DD/MM/YYYY - DD/MM/YYYY"` period label.
///
/// Dates are day-first Gregorian. Returns `None` when the label has no second
/// part or the end date is not exactly three `/`-separated integers.
/// Out-of-range days and months roll over: 31/02/2024 is 2024-03-02,
/// 00/03/2024 is 2024-02-29.
pub fn parse_period_end(label: &str) -> Option<NaiveDate> {
    let end = label.split(PERIOD_SEPARATOR).nth(1)?;
    parse_day_first_date(end)
}

fn parse_day_first_date(text: &str) -> Option<NaiveDate> {
    let mut tokens = text.trim().split('/');

    let day: i64 = tokens.next()?.trim().parse().ok()?;
    let month: i64 = tokens.next()?.trim().parse().ok()?;
    let year: i32 = tokens.next()?.trim().parse().ok()?;

    if tokens.next().is_some() {
        return None;
    }

    rolled_date(year, month, day)
}

/// Day 1 of (year, month) normalised, then shifted by `day - 1` days
fn rolled_date(year: i32, month: i64, day: i64) -> Option<NaiveDate> {
    let months = i64::from(year) * 12 + (month - 1);
    let year = i32::try_from(months.div_euclid(12)).ok()?;
    let month = u32::try_from(months.rem_euclid(12) + 1).ok()?;
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;

    let offset = day - 1;
    if offset >= 0 {
        first.checked_add_days(Days::new(offset.unsigned_abs()))
    } else {
        first.checked_sub_days(Days::new(offset.unsigned_abs()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_period_end() {
        assert_eq!(
            parse_period_end("01/02/2025 - 28/02/2025"),
            Some(date(2025, 2, 28))
        );
        assert_eq!(
            parse_period_end("01/01/2024 - 31/01/2024"),
            Some(date(2024, 1, 31))
        );
    }

    #[test]
    fn test_day_first_not_month_first() {
        // 05/03 is March 5th, not May 3rd
        assert_eq!(
            parse_period_end("01/03/2024 - 05/03/2024"),
            Some(date(2024, 3, 5))
        );
    }

    #[test]
    fn test_start_date_is_ignored() {
        assert_eq!(
            parse_period_end("garbage - 15/06/2023"),
            Some(date(2023, 6, 15))
        );
    }

    #[test]
    fn test_missing_end_part() {
        assert_eq!(parse_period_end("01/02/2025"), None);
        assert_eq!(parse_period_end("01/02/2025 -"), None);
        assert_eq!(parse_period_end(""), None);
    }

    #[test]
    fn test_malformed_end_date() {
        assert_eq!(parse_period_end("01/02/2025 - 28-02-2025"), None);
        assert_eq!(parse_period_end("01/02/2025 - 28/02"), None);
        assert_eq!(parse_period_end("01/02/2025 - aa/02/2025"), None);
        assert_eq!(parse_period_end("01/02/2025 - 28/02/2025/1"), None);
        assert_eq!(parse_period_end("01/02/2025 - "), None);
    }

    #[test]
    fn test_out_of_range_dates_roll_over() {
        assert_eq!(parse_period_end("01/02/2024 - 31/02/2024"), Some(date(2024, 3, 2)));
        assert_eq!(parse_period_end("01/02/2025 - 31/02/2025"), Some(date(2025, 3, 3)));
        assert_eq!(parse_period_end("01/03/2024 - 00/03/2024"), Some(date(2024, 2, 29)));
        assert_eq!(parse_period_end("01/12/2025 - 01/13/2025"), Some(date(2026, 1, 1)));
        assert_eq!(parse_period_end("01/01/2024 - 01/00/2024"), Some(date(2023, 12, 1)));
    }
}
