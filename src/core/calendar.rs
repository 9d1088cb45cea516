//! Exchange trading calendar

use chrono::{Datelike, NaiveDate, Weekday};
use std::collections::BTreeSet;

/// US equity market full-day closures for 2026, plus the early-close sessions
/// on which the monitor does not collect data.
const US_MARKET_HOLIDAYS_2026: [(i32, u32, u32); 11] = [
    (2026, 1, 1),
    (2026, 1, 19),
    (2026, 2, 16),
    (2026, 4, 3),
    (2026, 5, 25),
    (2026, 7, 3),
    (2026, 9, 7),
    (2026, 11, 26),
    (2026, 11, 27),
    (2026, 12, 24),
    (2026, 12, 25),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradingCalendar {
    holidays: BTreeSet<NaiveDate>,
}

impl Default for TradingCalendar {
    fn default() -> Self {
        Self::new(
            US_MARKET_HOLIDAYS_2026
                .iter()
                .filter_map(|&(y, m, d)| NaiveDate::from_ymd_opt(y, m, d)),
        )
    }
}

impl TradingCalendar {
    pub fn new(holidays: impl IntoIterator<Item = NaiveDate>) -> Self {
        Self {
            holidays: holidays.into_iter().collect(),
        }
    }

    /// Parse a comma separated list of `YYYY-MM-DD` dates.
    pub fn parse_holidays(raw: &str) -> Result<Self, chrono::ParseError> {
        let holidays = raw
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d"))
            .collect::<Result<BTreeSet<_>, _>>()?;
        Ok(Self { holidays })
    }

    pub fn is_trading_day(&self, date: NaiveDate) -> bool {
        !matches!(date.weekday(), Weekday::Sat | Weekday::Sun) && !self.holidays.contains(&date)
    }
}
