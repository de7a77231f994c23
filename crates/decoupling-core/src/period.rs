//! Monthly period keys (`YYYY-MM`).

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PeriodKeyError {
    #[error("period key '{0}' is not of the form YYYY-MM")]
    Malformed(String),
    #[error("period key '{key}' has month {month} outside 01-12")]
    MonthOutOfRange { key: String, month: u32 },
}

/// A single monthly observation key. Ordering is chronological.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PeriodKey {
    year: i32,
    month: u32,
}

impl PeriodKey {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        if !(0..=9999).contains(&year) || !(1..=12).contains(&month) {
            return None;
        }
        Some(Self { year, month })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn quarter(&self) -> u32 {
        (self.month - 1) / 3 + 1
    }

    /// First calendar day of the period.
    pub fn first_day(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }
}

impl FromStr for PeriodKey {
    type Err = PeriodKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || PeriodKeyError::Malformed(s.to_string());

        let bytes = s.as_bytes();
        if bytes.len() != 7 || bytes[4] != b'-' {
            return Err(malformed());
        }
        let (year_part, month_part) = (&s[..4], &s[5..]);
        if !year_part.bytes().all(|b| b.is_ascii_digit())
            || !month_part.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(malformed());
        }

        let year: i32 = year_part.parse().map_err(|_| malformed())?;
        let month: u32 = month_part.parse().map_err(|_| malformed())?;

        Self::new(year, month).ok_or(PeriodKeyError::MonthOutOfRange {
            key: s.to_string(),
            month,
        })
    }
}

impl fmt::Display for PeriodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_keys_round_trip() {
        for raw in ["2000-01", "1978-12", "2025-06", "0999-09"] {
            let key: PeriodKey = raw.parse().unwrap();
            assert_eq!(key.to_string(), raw);
            let again: PeriodKey = key.to_string().parse().unwrap();
            assert_eq!(again, key);
        }
    }

    #[test]
    fn rejects_non_canonical_forms() {
        for raw in ["2000-1", "2000/01", "2000-01-01", "200a-01", "", "20000-1", " 2000-01"] {
            assert!(raw.parse::<PeriodKey>().is_err(), "{raw} should be rejected");
        }
    }

    #[test]
    fn rejects_month_out_of_range() {
        assert_eq!(
            "2000-13".parse::<PeriodKey>(),
            Err(PeriodKeyError::MonthOutOfRange {
                key: "2000-13".to_string(),
                month: 13
            })
        );
        assert!("2000-00".parse::<PeriodKey>().is_err());
    }

    #[test]
    fn calendar_parts() {
        let key: PeriodKey = "2011-08".parse().unwrap();
        assert_eq!(key.year(), 2011);
        assert_eq!(key.month(), 8);
        assert_eq!(key.quarter(), 3);
        assert_eq!(key.first_day(), NaiveDate::from_ymd_opt(2011, 8, 1));
    }
}
