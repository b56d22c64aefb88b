//! Calendar period resolution
//!
//! Report periods are a whole calendar year, one of its quarters, or a single
//! month, addressed by the tokens the collaborator's period selector emits:
//! `"year"`, `"q1".."q4"`, `"1".."12"`.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;

use crate::error::EngineError;

/// Closed date interval, inclusive on both ends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, EngineError> {
        if start > end {
            return Err(EngineError::MalformedInterval { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Reporting period within a calendar year
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Year,
    /// Calendar quarter, 1-4
    Quarter(u32),
    /// Calendar month, 1-12
    Month(u32),
}

impl FromStr for Period {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim();
        if token.eq_ignore_ascii_case("year") {
            return Ok(Period::Year);
        }
        if let Some(rest) = token.strip_prefix('q').or_else(|| token.strip_prefix('Q')) {
            return match rest.parse::<u32>() {
                Ok(q @ 1..=4) => Ok(Period::Quarter(q)),
                _ => Err(EngineError::InvalidPeriodToken(token.to_string())),
            };
        }
        match token.parse::<u32>() {
            Ok(m @ 1..=12) => Ok(Period::Month(m)),
            _ => Err(EngineError::InvalidPeriodToken(token.to_string())),
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Period::Year => f.write_str("year"),
            Period::Quarter(q) => write!(f, "q{q}"),
            Period::Month(m) => write!(f, "{m}"),
        }
    }
}

impl Period {
    /// Resolve the period into its closed date interval within `year`.
    ///
    /// Out-of-range quarter/month values (possible when the enum is built
    /// directly rather than parsed) are rejected rather than wrapped.
    pub fn resolve(&self, year: i32) -> Result<DateRange, EngineError> {
        match *self {
            Period::Year => month_span(year, 1, 12),
            Period::Quarter(q @ 1..=4) => {
                let first = (q - 1) * 3 + 1;
                month_span(year, first, first + 2)
            }
            Period::Month(m @ 1..=12) => month_span(year, m, m),
            other => Err(EngineError::InvalidPeriodToken(other.to_string())),
        }
    }

    /// Quarters a bonus sweep covers: all four for `year`, the single quarter
    /// for `qN`, none for a month (monthly reports are commission-only).
    pub fn bonus_quarters(&self) -> Vec<u32> {
        match *self {
            Period::Year => vec![1, 2, 3, 4],
            Period::Quarter(q) => vec![q],
            Period::Month(_) => Vec::new(),
        }
    }

    pub fn is_yearly(&self) -> bool {
        matches!(self, Period::Year)
    }
}

/// Interval spanning whole months `first..=last` of `year`
fn month_span(year: i32, first: u32, last: u32) -> Result<DateRange, EngineError> {
    let start = date(year, first, 1)?;
    let end = last_day_of_month(year, last)?;
    DateRange::new(start, end)
}

fn date(year: i32, month: u32, day: u32) -> Result<NaiveDate, EngineError> {
    NaiveDate::from_ymd_opt(year, month, day).ok_or(EngineError::YearOutOfRange(year))
}

fn last_day_of_month(year: i32, month: u32) -> Result<NaiveDate, EngineError> {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    date(next_year, next_month, 1)?
        .pred_opt()
        .ok_or(EngineError::YearOutOfRange(year))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn test_token_parsing() {
        assert_eq!("year".parse::<Period>().unwrap(), Period::Year);
        assert_eq!("YEAR".parse::<Period>().unwrap(), Period::Year);
        assert_eq!("q1".parse::<Period>().unwrap(), Period::Quarter(1));
        assert_eq!("Q4".parse::<Period>().unwrap(), Period::Quarter(4));
        assert_eq!("1".parse::<Period>().unwrap(), Period::Month(1));
        assert_eq!("12".parse::<Period>().unwrap(), Period::Month(12));

        for bad in ["q0", "q5", "0", "13", "annual", "", "q", "1.5"] {
            assert!(
                matches!(
                    bad.parse::<Period>(),
                    Err(EngineError::InvalidPeriodToken(_))
                ),
                "token {bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_year_resolution() {
        let range = Period::Year.resolve(2024).unwrap();
        assert_eq!(range.start, ymd(2024, 1, 1));
        assert_eq!(range.end, ymd(2024, 12, 31));
    }

    #[test]
    fn test_quarter_resolution() {
        let q1 = Period::Quarter(1).resolve(2024).unwrap();
        assert_eq!(q1.start, ymd(2024, 1, 1));
        assert_eq!(q1.end, ymd(2024, 3, 31));

        let q2 = Period::Quarter(2).resolve(2024).unwrap();
        assert_eq!(q2.start, ymd(2024, 4, 1));
        assert_eq!(q2.end, ymd(2024, 6, 30));

        let q4 = Period::Quarter(4).resolve(2024).unwrap();
        assert_eq!(q4.start, ymd(2024, 10, 1));
        assert_eq!(q4.end, ymd(2024, 12, 31));
    }

    #[test]
    fn test_month_resolution() {
        // leap February
        let feb = Period::Month(2).resolve(2024).unwrap();
        assert_eq!(feb.start, ymd(2024, 2, 1));
        assert_eq!(feb.end, ymd(2024, 2, 29));

        let feb = Period::Month(2).resolve(2023).unwrap();
        assert_eq!(feb.end, ymd(2023, 2, 28));

        let dec = Period::Month(12).resolve(2023).unwrap();
        assert_eq!(dec.end, ymd(2023, 12, 31));
    }

    #[test]
    fn test_out_of_range_variants_rejected() {
        assert!(Period::Quarter(5).resolve(2024).is_err());
        assert!(Period::Month(0).resolve(2024).is_err());
    }

    #[test]
    fn test_range_contains_is_inclusive() {
        let range = Period::Quarter(1).resolve(2024).unwrap();
        assert!(range.contains(ymd(2024, 1, 1)));
        assert!(range.contains(ymd(2024, 3, 31)));
        assert!(!range.contains(ymd(2024, 4, 1)));
        assert!(!range.contains(ymd(2023, 12, 31)));
    }

    #[test]
    fn test_malformed_interval_rejected() {
        let result = DateRange::new(ymd(2024, 5, 1), ymd(2024, 4, 1));
        assert!(matches!(
            result,
            Err(EngineError::MalformedInterval { .. })
        ));
    }

    #[test]
    fn test_bonus_quarters() {
        assert_eq!(Period::Year.bonus_quarters(), vec![1, 2, 3, 4]);
        assert_eq!(Period::Quarter(3).bonus_quarters(), vec![3]);
        assert!(Period::Month(6).bonus_quarters().is_empty());
    }
}
