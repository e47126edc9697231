//! Month sequencing: calendar month windows for a payroll run.
//!
//! A run covers `months` consecutive calendar months starting at the
//! configured start month, or the month before "today" when none is given.
//! "Today" is always passed in so the default stays testable.

use crate::error::{SynthError, SynthResult};
use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A calendar month, always valid by construction (year 1..=9999, month 1..=12).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    /// Panics on an out-of-range month or year; use `parse` or `try_new`
    /// for untrusted input.
    pub fn new(year: i32, month: u32) -> Self {
        assert!((1..=12).contains(&month), "month {month} out of range");
        assert!((1..=9999).contains(&year), "year {year} out of range");
        Self { year, month }
    }

    pub fn try_new(year: i32, month: u32) -> Option<Self> {
        ((1..=12).contains(&month) && (1..=9999).contains(&year)).then_some(Self { year, month })
    }

    /// The month a date falls in.
    pub fn containing(date: NaiveDate) -> Self {
        Self::new(date.year(), date.month())
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).expect("YearMonth holds a valid month")
    }

    /// Last calendar day: (first day + 1 month) - 1 day.
    pub fn last_day(&self) -> NaiveDate {
        let first = self.first_day();
        first
            .checked_add_months(Months::new(1))
            .and_then(|next| next.pred_opt())
            .unwrap_or_else(|| first.with_day(31).unwrap_or(first))
    }

    /// The following month, or `None` past 9999-12.
    pub fn succ(&self) -> Option<Self> {
        self.plus_months(1)
    }

    /// The preceding month, or `None` before 0001-01.
    pub fn pred(&self) -> Option<Self> {
        if self.month == 1 {
            Self::try_new(self.year - 1, 12)
        } else {
            Self::try_new(self.year, self.month - 1)
        }
    }

    /// The month `n` months later, or `None` past 9999-12.
    pub fn plus_months(&self, n: u32) -> Option<Self> {
        let index = i64::from(self.year) * 12 + i64::from(self.month - 1) + i64::from(n);
        let year = i32::try_from(index / 12).ok()?;
        Self::try_new(year, (index % 12) as u32 + 1)
    }
}

impl FromStr for YearMonth {
    type Err = SynthError;

    /// Accepts `YYYY-MM` (a single-digit month is tolerated).
    fn from_str(s: &str) -> SynthResult<Self> {
        let invalid = || SynthError::InvalidStartMonth { value: s.to_string() };
        let (y, m) = s.trim().split_once('-').ok_or_else(invalid)?;
        if y.len() != 4 || m.is_empty() || m.len() > 2 {
            return Err(invalid());
        }
        let year: i32 = y.parse().map_err(|_| invalid())?;
        let month: u32 = m.parse().map_err(|_| invalid())?;
        if !(1..=12).contains(&month) || !(1..=9999).contains(&year) {
            return Err(invalid());
        }
        Ok(Self { year, month })
    }
}

impl TryFrom<String> for YearMonth {
    type Error = SynthError;

    fn try_from(value: String) -> SynthResult<Self> {
        value.parse()
    }
}

impl From<YearMonth> for String {
    fn from(ym: YearMonth) -> Self {
        ym.to_string()
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// One payroll period. Payroll date and period start are both the first
/// day of the month; period end is its last day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthWindow {
    pub payroll_date: NaiveDate,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
}

impl MonthWindow {
    pub fn for_month(month: YearMonth) -> Self {
        let first = month.first_day();
        Self {
            payroll_date: first,
            period_start: first,
            period_end: month.last_day(),
        }
    }

    pub fn month(&self) -> YearMonth {
        YearMonth::containing(self.payroll_date)
    }
}

/// `count` consecutive month windows starting at `start`, or at the month
/// before `today` when `start` is `None`. A count of 0 yields no windows.
///
/// Fails when the range would leave the supported calendar (0001-01 to 9999-12).
pub fn month_range(
    start: Option<YearMonth>,
    count: u32,
    today: NaiveDate,
) -> SynthResult<Vec<MonthWindow>> {
    let start = match start {
        Some(month) => month,
        None => YearMonth::try_new(today.year(), today.month())
            .and_then(|m| m.pred())
            .ok_or_else(|| SynthError::InvalidStartMonth { value: today.to_string() })?,
    };
    if count > 0 && start.plus_months(count - 1).is_none() {
        return Err(SynthError::InvalidConfig {
            field: "months",
            reason: format!("{count} months from {start} runs past 9999-12"),
        });
    }
    let windows = (0..count)
        .filter_map(|offset| start.plus_months(offset))
        .map(MonthWindow::for_month)
        .collect();
    Ok(windows)
}
