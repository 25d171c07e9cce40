//! Month/day keys and the two date-of-birth wire formats

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use thiserror::Error;

/// Year used to validate a month/day pair. A leap year, so Feb 29 is valid.
const VALIDATION_YEAR: i32 = 2000;

/// A calendar day with the year stripped
///
/// Ordering is calendar order: by month, then by day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthDay {
    month: u32,
    day: u32,
}

/// Rejected month/day text or numbers
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid month/day: {0:?}")]
pub struct InvalidMonthDay(pub String);

impl MonthDay {
    /// Create a month/day, rejecting days that never exist (2/30, 4/31, ...)
    pub fn new(month: u32, day: u32) -> Result<Self, InvalidMonthDay> {
        NaiveDate::from_ymd_opt(VALIDATION_YEAR, month, day)
            .map(|_| Self { month, day })
            .ok_or_else(|| InvalidMonthDay(format!("{month}/{day}")))
    }

    /// Drop the year from a full date
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            month: date.month(),
            day: date.day(),
        }
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn day(&self) -> u32 {
        self.day
    }
}

impl fmt::Display for MonthDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.month, self.day)
    }
}

impl FromStr for MonthDay {
    type Err = InvalidMonthDay;

    /// Parses `M/D` with or without zero padding
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || InvalidMonthDay(s.to_string());
        let (month, day) = s.trim().split_once('/').ok_or_else(invalid)?;
        let month = month.parse::<u32>().map_err(|_| invalid())?;
        let day = day.parse::<u32>().map_err(|_| invalid())?;
        Self::new(month, day).map_err(|_| invalid())
    }
}

/// Date-of-birth encodings used by the Clever API
///
/// The profile and roster endpoints are different upstream schemas and
/// do not agree on a format, so callers pick the one matching the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DobFormat {
    /// `2005-03-10T00:00:00.000Z`, returned by `/me`
    Timestamp,
    /// `6/18/1998`, returned by the roster endpoint
    SlashDate,
}

impl DobFormat {
    /// Parse a raw date of birth, keeping only month and day
    pub fn parse(&self, raw: &str) -> Option<MonthDay> {
        let raw = raw.trim();
        let date = match self {
            DobFormat::Timestamp => NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.fZ")
                .ok()?
                .date(),
            DobFormat::SlashDate => NaiveDate::parse_from_str(raw, "%m/%d/%Y").ok()?,
        };
        Some(MonthDay::from_date(date))
    }

    fn pattern(&self) -> &'static str {
        match self {
            DobFormat::Timestamp => "YYYY-MM-DDTHH:MM:SS.fffZ",
            DobFormat::SlashDate => "M/D/YYYY",
        }
    }
}

impl fmt::Display for DobFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.pattern())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_day_orders_by_calendar() {
        let mut dates = vec![
            MonthDay::new(12, 1).unwrap(),
            MonthDay::new(2, 29).unwrap(),
            MonthDay::new(10, 3).unwrap(),
            MonthDay::new(2, 28).unwrap(),
            MonthDay::new(3, 1).unwrap(),
        ];
        dates.sort();

        let rendered: Vec<String> = dates.iter().map(ToString::to_string).collect();
        assert_eq!(rendered, ["2/28", "2/29", "3/1", "10/3", "12/1"]);
    }

    #[test]
    fn month_day_rejects_impossible_days() {
        assert!(MonthDay::new(2, 30).is_err());
        assert!(MonthDay::new(4, 31).is_err());
        assert!(MonthDay::new(0, 1).is_err());
        assert!(MonthDay::new(13, 1).is_err());
    }

    #[test]
    fn month_day_parses_padded_and_unpadded() {
        assert_eq!("06/02".parse::<MonthDay>(), MonthDay::new(6, 2));
        assert_eq!("6/2".parse::<MonthDay>(), MonthDay::new(6, 2));
        assert!("6-2".parse::<MonthDay>().is_err());
        assert!("june/2".parse::<MonthDay>().is_err());
    }

    #[test]
    fn timestamp_format_drops_year_and_time() {
        assert_eq!(
            DobFormat::Timestamp.parse("2005-03-10T00:00:00.000Z"),
            Some(MonthDay::new(3, 10).unwrap())
        );
        assert_eq!(
            DobFormat::Timestamp.parse("1999-12-31T23:59:59.999Z"),
            Some(MonthDay::new(12, 31).unwrap())
        );
    }

    #[test]
    fn slash_format_accepts_unpadded_month_and_day() {
        assert_eq!(
            DobFormat::SlashDate.parse("6/18/1998"),
            Some(MonthDay::new(6, 18).unwrap())
        );
        assert_eq!(
            DobFormat::SlashDate.parse("02/29/2008"),
            Some(MonthDay::new(2, 29).unwrap())
        );
    }

    #[test]
    fn formats_are_not_interchangeable() {
        assert_eq!(DobFormat::SlashDate.parse("2005-03-10T00:00:00.000Z"), None);
        assert_eq!(DobFormat::Timestamp.parse("6/18/1998"), None);
        assert_eq!(DobFormat::SlashDate.parse(""), None);
    }
}
