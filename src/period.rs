//! Decoding of navigation period tokens into canonical date ranges.
//!
//! Tokens arrive in several incompatible shapes (`2023-03-07`,
//! `Mar 1 - Mar 7, 2023`, `03/01 - 03/07`, `March 2023`, `Q1 2023`, `2023`),
//! optionally behind an entity prefix (`expense-`, `monthly-expense-`,
//! `financial-`). Resolution is total: a token that matches no shape degrades
//! to the current calendar month instead of failing.

use chrono::{Datelike, NaiveDate};

use crate::error::{ReportError, Result};
use crate::model::DateRange;
use crate::util::{last_day_of_month, month_bounds, month_from_name};

/// What entity a period token is about, decoded once at the boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PeriodSubject {
    /// `expense-<category name>`: a single expense category.
    Category(String),
    /// `monthly-expense-<period>`: a whole-month expense report.
    Month(String),
    /// `financial-<period>`: a financial statement period.
    FinancialPeriod(String),
    /// Bare token with no entity prefix.
    Period(String),
}

const PREFIXES: [(&str, fn(String) -> PeriodSubject); 3] = [
    ("monthly-expense-", PeriodSubject::Month),
    ("expense-", PeriodSubject::Category),
    ("financial-", PeriodSubject::FinancialPeriod),
];

impl PeriodSubject {
    /// Strips a known entity prefix if one is present. Total.
    pub fn decode(token: &str) -> Self {
        for (prefix, build) in PREFIXES {
            let matches = token
                .get(..prefix.len())
                .is_some_and(|head| head.eq_ignore_ascii_case(prefix));
            if matches {
                return build(token[prefix.len()..].trim().to_string());
            }
        }
        PeriodSubject::Period(token.trim().to_string())
    }

    /// As [`decode`](Self::decode), but an un-prefixed token is an error.
    /// This is the one failure the engine surfaces to callers that need to
    /// know which entity a detail page is about.
    pub fn decode_known(token: &str) -> Result<Self> {
        match Self::decode(token) {
            PeriodSubject::Period(_) => Err(ReportError::UnknownSubject(token.to_string())),
            subject => Ok(subject),
        }
    }

    /// The period/category text carried after the prefix.
    pub fn label(&self) -> &str {
        match self {
            PeriodSubject::Category(s)
            | PeriodSubject::Month(s)
            | PeriodSubject::FinancialPeriod(s)
            | PeriodSubject::Period(s) => s,
        }
    }

    /// Category filter implied by the subject, if any.
    pub fn category(&self) -> Option<&str> {
        match self {
            PeriodSubject::Category(name) => Some(name),
            _ => None,
        }
    }
}

/// A fully decoded token: its subject plus the canonical range.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedPeriod {
    pub subject: PeriodSubject,
    pub range: DateRange,
}

/// Decodes a token end to end. Never fails; unrecognized period text
/// resolves to the calendar month containing `today`.
pub fn resolve_token(token: &str, today: NaiveDate) -> ResolvedPeriod {
    let subject = PeriodSubject::decode(token);
    let range = resolve_range(subject.label(), today);
    ResolvedPeriod { subject, range }
}

/// Maps free-form period text to a canonical range, trying each known shape
/// in turn and falling back to the current calendar month.
pub fn resolve_range(text: &str, today: NaiveDate) -> DateRange {
    let text = text.trim();

    if let Ok(day) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return DateRange::single_day(day);
    }
    if let Some(range) = parse_explicit_range(text, today) {
        return range;
    }
    if let Some(range) = parse_month_year(text) {
        return range;
    }
    if let Some(range) = parse_quarter(text) {
        return range;
    }
    if let Some(range) = parse_year(text) {
        return range;
    }

    let (start, end) = month_bounds(today);
    DateRange::new(start, end)
}

/// A date with possibly missing pieces, as written in one half of a textual
/// range. Missing pieces inherit from the other endpoint or the context.
#[derive(Debug, Default, Clone, Copy)]
struct PartialDate {
    year: Option<i32>,
    month: Option<u32>,
    day: Option<u32>,
}

fn parse_explicit_range(text: &str, today: NaiveDate) -> Option<DateRange> {
    let (left, right) = text.split_once('-')?;
    let left = parse_endpoint(left)?;
    let right = parse_endpoint(right)?;

    // The first endpoint anchors the range: it must carry month and day.
    // A year written on either side covers both; otherwise the context year
    // applies.
    let start_year = left.year.or(right.year).unwrap_or(today.year());
    let start = NaiveDate::from_ymd_opt(start_year, left.month?, left.day?)?;

    // The second endpoint inherits year and month from the first.
    let end = NaiveDate::from_ymd_opt(
        right.year.unwrap_or(start_year),
        right.month.unwrap_or(start.month()),
        right.day?,
    )?;

    Some(DateRange::new(start, end))
}

/// Parses one half of a textual range: `Mar 7, 2023`, `Mar 7`, `7`, or the
/// slashed form `03/07`.
fn parse_endpoint(text: &str) -> Option<PartialDate> {
    let cleaned = text.replace(',', " ");
    let tokens: Vec<&str> = cleaned.split_whitespace().collect();
    if tokens.is_empty() || tokens.len() > 3 {
        return None;
    }

    if tokens.len() == 1 {
        if let Some((month, day)) = parse_slashed(tokens[0]) {
            return Some(PartialDate {
                year: None,
                month: Some(month),
                day: Some(day),
            });
        }
    }

    let mut partial = PartialDate::default();
    for token in tokens {
        if let Some(month) = month_from_name(token) {
            if partial.month.is_some() {
                return None;
            }
            partial.month = Some(month);
        } else if let Ok(number) = token.parse::<u32>() {
            match token.len() {
                4 => {
                    if partial.year.is_some() {
                        return None;
                    }
                    partial.year = Some(number as i32);
                }
                1 | 2 if (1..=31).contains(&number) => {
                    if partial.day.is_some() {
                        return None;
                    }
                    partial.day = Some(number);
                }
                _ => return None,
            }
        } else {
            return None;
        }
    }

    if partial.day.is_none() && partial.month.is_none() {
        return None;
    }
    Some(partial)
}

/// `MM/DD` pair, month validated to 1..=12.
fn parse_slashed(token: &str) -> Option<(u32, u32)> {
    let (month, day) = token.split_once('/')?;
    let month: u32 = month.parse().ok()?;
    let day: u32 = day.parse().ok()?;
    if (1..=12).contains(&month) && (1..=31).contains(&day) {
        Some((month, day))
    } else {
        None
    }
}

fn parse_month_year(text: &str) -> Option<DateRange> {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    if tokens.len() != 2 {
        return None;
    }
    let month = month_from_name(tokens[0])?;
    let year: i32 = tokens[1].parse().ok().filter(|y| (1000..=9999).contains(y))?;

    Some(DateRange::new(
        NaiveDate::from_ymd_opt(year, month, 1)?,
        last_day_of_month(year, month),
    ))
}

fn parse_quarter(text: &str) -> Option<DateRange> {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    if tokens.len() != 2 {
        return None;
    }
    let quarter = tokens[0]
        .strip_prefix(['Q', 'q'])?
        .parse::<u32>()
        .ok()
        .filter(|q| (1..=4).contains(q))?;
    let year: i32 = tokens[1].parse().ok().filter(|y| (1000..=9999).contains(y))?;

    let first_month = (quarter - 1) * 3 + 1;
    Some(DateRange::new(
        NaiveDate::from_ymd_opt(year, first_month, 1)?,
        last_day_of_month(year, first_month + 2),
    ))
}

fn parse_year(text: &str) -> Option<DateRange> {
    if text.len() != 4 {
        return None;
    }
    let year: i32 = text.parse().ok()?;
    Some(DateRange::new(
        NaiveDate::from_ymd_opt(year, 1, 1)?,
        NaiveDate::from_ymd_opt(year, 12, 31)?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 6, 15).unwrap()
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_iso_single_day() {
        let range = resolve_range("2023-03-07", today());
        assert_eq!(range, DateRange::single_day(ymd(2023, 3, 7)));
    }

    #[test]
    fn test_explicit_range_with_year() {
        let range = resolve_range("Mar 1 - Mar 7, 2023", today());
        assert_eq!(range.start, ymd(2023, 3, 1));
        assert_eq!(range.end, ymd(2023, 3, 7));
    }

    #[test]
    fn test_trailing_year_covers_both_endpoints() {
        let range = resolve_range("Mar 1 - Mar 7, 2021", today());
        assert_eq!(range.start, ymd(2021, 3, 1));
        assert_eq!(range.end, ymd(2021, 3, 7));
    }

    #[test]
    fn test_second_endpoint_inherits_year() {
        let range = resolve_range("Mar 1, 2022 - Mar 7", today());
        assert_eq!(range.start, ymd(2022, 3, 1));
        assert_eq!(range.end.year(), range.start.year());
    }

    #[test]
    fn test_second_endpoint_inherits_month_and_year() {
        let range = resolve_range("Mar 1 - 7", today());
        assert_eq!(range.start, ymd(2023, 3, 1));
        assert_eq!(range.end, ymd(2023, 3, 7));
    }

    #[test]
    fn test_slashed_range_uses_context_year() {
        let range = resolve_range("03/01 - 03/07", today());
        assert_eq!(range.start, ymd(2023, 3, 1));
        assert_eq!(range.end, ymd(2023, 3, 7));
    }

    #[test]
    fn test_month_year() {
        let range = resolve_range("March 2023", today());
        assert_eq!(range.start, ymd(2023, 3, 1));
        assert_eq!(range.end, ymd(2023, 3, 31));
    }

    #[test]
    fn test_month_year_leap_february() {
        let range = resolve_range("February 2024", today());
        assert_eq!(range.end, ymd(2024, 2, 29));
    }

    #[test]
    fn test_month_prefix_case_insensitive() {
        let range = resolve_range("mar 2023", today());
        assert_eq!(range.start, ymd(2023, 3, 1));
        assert_eq!(range.end, ymd(2023, 3, 31));
    }

    #[test]
    fn test_quarters() {
        let q1 = resolve_range("Q1 2023", today());
        assert_eq!(q1.start, ymd(2023, 1, 1));
        assert_eq!(q1.end, ymd(2023, 3, 31));

        let q4 = resolve_range("q4 2023", today());
        assert_eq!(q4.start, ymd(2023, 10, 1));
        assert_eq!(q4.end, ymd(2023, 12, 31));
    }

    #[test]
    fn test_bare_year() {
        let range = resolve_range("2023", today());
        assert_eq!(range.start, ymd(2023, 1, 1));
        assert_eq!(range.end, ymd(2023, 12, 31));
    }

    #[test]
    fn test_unrecognized_token_falls_back_to_current_month() {
        for garbage in ["Rent", "???", "", "13/45 - 99/99", "Q7 2023"] {
            let range = resolve_range(garbage, today());
            assert_eq!(range.start, ymd(2023, 6, 1), "token: {garbage}");
            assert_eq!(range.end, ymd(2023, 6, 30), "token: {garbage}");
        }
    }

    #[test]
    fn test_every_shape_is_well_formed() {
        let tokens = [
            "2023-03-07",
            "Mar 1 - Mar 7, 2023",
            "Mar 1 - 7",
            "03/01 - 03/07",
            "March 2023",
            "Q2 2023",
            "2023",
            "nonsense",
        ];
        for token in tokens {
            let range = resolve_range(token, today());
            assert!(range.start <= range.end, "token: {token}");
        }
    }

    #[test]
    fn test_subject_decoding() {
        assert_eq!(
            PeriodSubject::decode("expense-Rent"),
            PeriodSubject::Category("Rent".to_string())
        );
        assert_eq!(
            PeriodSubject::decode("monthly-expense-March 2023"),
            PeriodSubject::Month("March 2023".to_string())
        );
        assert_eq!(
            PeriodSubject::decode("financial-Q1 2023"),
            PeriodSubject::FinancialPeriod("Q1 2023".to_string())
        );
        assert_eq!(
            PeriodSubject::decode("2023-03-07"),
            PeriodSubject::Period("2023-03-07".to_string())
        );
    }

    #[test]
    fn test_decode_known_rejects_unprefixed() {
        assert!(PeriodSubject::decode_known("expense-Rent").is_ok());
        let err = PeriodSubject::decode_known("March 2023").unwrap_err();
        assert!(matches!(err, ReportError::UnknownSubject(_)));
    }

    #[test]
    fn test_resolve_token_category_uses_fallback_range() {
        let resolved = resolve_token("expense-Rent", today());
        assert_eq!(resolved.subject.category(), Some("Rent"));
        assert_eq!(resolved.range.start, ymd(2023, 6, 1));
        assert_eq!(resolved.range.end, ymd(2023, 6, 30));
    }

    #[test]
    fn test_resolve_token_monthly_period() {
        let resolved = resolve_token("monthly-expense-March 2023", today());
        assert_eq!(
            resolved.subject,
            PeriodSubject::Month("March 2023".to_string())
        );
        assert_eq!(resolved.range.start, ymd(2023, 3, 1));
        assert_eq!(resolved.range.end, ymd(2023, 3, 31));
    }
}
