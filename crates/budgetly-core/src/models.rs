//! Domain models for Budgetly

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A spending category owned by a user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    /// Owning user identifier (None for legacy rows created without an owner)
    pub owner_id: Option<String>,
    pub name: String,
    /// Optional color for UI display (e.g., "#10b981"), compared case-insensitively
    pub color: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A calendar month used as a budget key, rendered as `YYYY-MM`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Month {
    year: i32,
    month: u32,
}

impl Month {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(|_| Self { year, month })
    }

    /// The month containing the given date
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for Month {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        NaiveDate::parse_from_str(&format!("{}-01", s), "%Y-%m-%d")
            .map(Self::of)
            .map_err(|_| format!("Invalid month '{}' (expected YYYY-MM)", s))
    }
}

impl TryFrom<String> for Month {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Month> for String {
    fn from(m: Month) -> Self {
        m.to_string()
    }
}

/// A monthly budget allocation for a category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    pub id: i64,
    pub category_id: i64,
    pub month: Month,
    /// Allocated amount, never negative
    pub amount: Decimal,
}

/// A spending or income transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub category_id: Option<i64>,
    pub date: NaiveDate,
    pub description: String,
    /// Signed amount (negative = expense)
    pub amount: Decimal,
}

/// Row counts shown by `budgetly status`
#[derive(Debug, Clone, Default, Serialize)]
pub struct StoreStats {
    pub total_categories: i64,
    pub total_budgets: i64,
    pub total_transactions: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_month_parse_and_display() {
        let m: Month = "2024-01".parse().unwrap();
        assert_eq!(m.year(), 2024);
        assert_eq!(m.month(), 1);
        assert_eq!(m.to_string(), "2024-01");

        let padded: Month = " 2024-11 ".parse().unwrap();
        assert_eq!(padded.to_string(), "2024-11");
    }

    #[test]
    fn test_month_rejects_garbage() {
        assert!("2024-13".parse::<Month>().is_err());
        assert!("January".parse::<Month>().is_err());
        assert!("".parse::<Month>().is_err());
        assert!(Month::new(2024, 0).is_none());
    }

    #[test]
    fn test_month_ordering() {
        let dec = Month::new(2023, 12).unwrap();
        let jan = Month::new(2024, 1).unwrap();
        assert!(dec < jan);
        assert_eq!(Month::of(NaiveDate::from_ymd_opt(2024, 1, 31).unwrap()), jan);
    }

    #[test]
    fn test_month_serde_as_string() {
        let m = Month::new(2024, 2).unwrap();
        assert_eq!(serde_json::to_string(&m).unwrap(), "\"2024-02\"");
        let back: Month = serde_json::from_str("\"2024-02\"").unwrap();
        assert_eq!(back, m);
    }
}
