use chrono::{Datelike, Days, NaiveDate};

pub fn last_day_of_month(year: i32, month: u32) -> NaiveDate {
    let next_month = if month == 12 { 1 } else { month + 1 };
    let next_year = if month == 12 { year + 1 } else { year };

    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .unwrap()
        .checked_sub_days(Days::new(1))
        .unwrap()
}

pub fn first_day_of_month(year: i32, month: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, 1).unwrap()
}

/// Whole calendar month containing `date`.
pub fn month_bounds(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    (
        first_day_of_month(date.year(), date.month()),
        last_day_of_month(date.year(), date.month()),
    )
}

/// First day of every calendar month touched by the inclusive range,
/// chronological order.
pub fn month_starts_in_range(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    let mut months = Vec::new();
    let mut current = first_day_of_month(start.year(), start.month());
    let last = first_day_of_month(end.year(), end.month());

    while current <= last {
        months.push(current);
        current = next_month_start(current);
    }

    months
}

pub fn next_month_start(date: NaiveDate) -> NaiveDate {
    if date.month() == 12 {
        first_day_of_month(date.year() + 1, 1)
    } else {
        first_day_of_month(date.year(), date.month() + 1)
    }
}

/// Chart-friendly label, e.g. "Mar 2023".
pub fn month_label(date: NaiveDate) -> String {
    date.format("%b %Y").to_string()
}

pub const MONTH_NAMES: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

/// Case-insensitive month lookup accepting unambiguous name prefixes
/// ("Mar" matches March; "Ju" is ambiguous and rejected). Single-letter
/// prefixes are always ambiguous except where only one month qualifies.
pub fn month_from_name(name: &str) -> Option<u32> {
    let needle = name.trim().to_lowercase();
    if needle.is_empty() {
        return None;
    }

    let mut matched = None;
    for (idx, full) in MONTH_NAMES.iter().enumerate() {
        if full.starts_with(&needle) {
            if matched.is_some() {
                return None;
            }
            matched = Some(idx as u32 + 1);
        }
    }
    matched
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_day_of_month() {
        assert_eq!(
            last_day_of_month(2023, 2),
            NaiveDate::from_ymd_opt(2023, 2, 28).unwrap()
        );
        assert_eq!(
            last_day_of_month(2024, 2),
            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
        );
        assert_eq!(
            last_day_of_month(2023, 4),
            NaiveDate::from_ymd_opt(2023, 4, 30).unwrap()
        );
        assert_eq!(
            last_day_of_month(2023, 12),
            NaiveDate::from_ymd_opt(2023, 12, 31).unwrap()
        );
    }

    #[test]
    fn test_month_starts_in_range() {
        let start = NaiveDate::from_ymd_opt(2023, 1, 15).unwrap();
        let end = NaiveDate::from_ymd_opt(2023, 3, 2).unwrap();
        let months = month_starts_in_range(start, end);
        assert_eq!(
            months,
            vec![
                NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(2023, 2, 1).unwrap(),
                NaiveDate::from_ymd_opt(2023, 3, 1).unwrap(),
            ]
        );
    }

    #[test]
    fn test_month_starts_across_year_boundary() {
        let start = NaiveDate::from_ymd_opt(2022, 11, 30).unwrap();
        let end = NaiveDate::from_ymd_opt(2023, 2, 1).unwrap();
        let months = month_starts_in_range(start, end);
        assert_eq!(months.len(), 4);
        assert_eq!(months[0], NaiveDate::from_ymd_opt(2022, 11, 1).unwrap());
        assert_eq!(months[3], NaiveDate::from_ymd_opt(2023, 2, 1).unwrap());
    }

    #[test]
    fn test_month_label() {
        let date = NaiveDate::from_ymd_opt(2023, 3, 1).unwrap();
        assert_eq!(month_label(date), "Mar 2023");
    }

    #[test]
    fn test_month_from_name_full_and_prefix() {
        assert_eq!(month_from_name("March"), Some(3));
        assert_eq!(month_from_name("mar"), Some(3));
        assert_eq!(month_from_name("SEPT"), Some(9));
        assert_eq!(month_from_name("d"), Some(12));
    }

    #[test]
    fn test_month_from_name_ambiguous_or_unknown() {
        assert_eq!(month_from_name("Ju"), None);
        assert_eq!(month_from_name("ma"), None);
        assert_eq!(month_from_name("j"), None);
        assert_eq!(month_from_name("Frimaire"), None);
        assert_eq!(month_from_name(""), None);
    }
}
