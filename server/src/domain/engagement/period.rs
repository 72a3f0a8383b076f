//! Current vs prior window aggregation

use std::collections::HashMap;

use chrono::NaiveDate;

use super::EngagementError;
use crate::core::constants::MAX_REPORT_DAYS;
use super::date::{days_after, days_before, inclusive_day_count, to_day_key};

/// Inclusive date range `[start, end]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    start: NaiveDate,
    end: NaiveDate,
}

impl Window {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, EngagementError> {
        if end < start {
            return Err(EngagementError::InvalidWindow { start, end });
        }
        let days = inclusive_day_count(start, end);
        if days > MAX_REPORT_DAYS {
            return Err(EngagementError::WindowTooLong {
                days,
                max: MAX_REPORT_DAYS,
            });
        }
        Ok(Self { start, end })
    }

    /// The `days`-long window ending at `end`
    pub fn ending_at(end: NaiveDate, days: u32) -> Self {
        Self {
            start: days_before(end, days.saturating_sub(1)),
            end,
        }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn len_days(&self) -> u32 {
        inclusive_day_count(self.start, self.end)
    }

    /// Equal-length window ending the day before `start`
    pub fn prior(&self) -> Self {
        Self::ending_at(days_before(self.start, 1), self.len_days())
    }

    pub fn start_key(&self) -> u32 {
        to_day_key(self.start)
    }

    pub fn end_key(&self) -> u32 {
        to_day_key(self.end)
    }

    /// Every date of the window in chronological order
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        (0..self.len_days()).map(|i| days_after(self.start, i))
    }
}

/// A count and its change against a reference value
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Delta {
    pub count: i64,
    pub variation: i64,
}

/// Period report for one metric
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodSummary {
    /// One entry per day of the current window, missing days as 0
    pub days: Vec<(NaiveDate, i64)>,
    pub period: Delta,
    pub yesterday: Delta,
}

/// Aggregate `values` (day key → count) over `window` and its prior window.
///
/// `values` may hold any days; only those inside the two windows are read.
/// `yesterday` compares the window's last day against the day before it.
pub fn summarize(window: &Window, values: &HashMap<u32, i64>) -> PeriodSummary {
    let value_at = |date: NaiveDate| values.get(&to_day_key(date)).copied().unwrap_or(0);

    let days: Vec<(NaiveDate, i64)> = window.dates().map(|d| (d, value_at(d))).collect();
    let current: i64 = days.iter().map(|(_, v)| v).sum();
    let prior: i64 = window.prior().dates().map(value_at).sum();

    let last = value_at(window.end);
    let before_last = value_at(days_before(window.end, 1));

    PeriodSummary {
        days,
        period: Delta {
            count: current,
            variation: current - prior,
        },
        yesterday: Delta {
            count: before_last,
            variation: last - before_last,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn week() -> Window {
        Window::new(date(2024, 3, 8), date(2024, 3, 14)).unwrap()
    }

    #[test]
    fn test_window_prior_has_equal_length() {
        let prior = week().prior();
        assert_eq!(prior.start(), date(2024, 3, 1));
        assert_eq!(prior.end(), date(2024, 3, 7));
        assert_eq!(prior.len_days(), 7);
    }

    #[test]
    fn test_window_rejects_reversed_range() {
        assert!(Window::new(date(2024, 3, 2), date(2024, 3, 1)).is_err());
        assert_eq!(Window::ending_at(date(2024, 3, 1), 1).len_days(), 1);
    }

    #[test]
    fn test_window_rejects_overlong_range() {
        let start = date(2000, 1, 1);
        let longest = days_after(start, MAX_REPORT_DAYS - 1);
        assert_eq!(Window::new(start, longest).unwrap().len_days(), MAX_REPORT_DAYS);
        assert!(matches!(
            Window::new(start, days_after(longest, 1)),
            Err(EngagementError::WindowTooLong { .. })
        ));
    }

    #[test]
    fn test_period_variation() {
        let mut values = HashMap::new();
        // current window sums to 100, prior window to 80
        values.insert(20240308, 60);
        values.insert(20240314, 40);
        values.insert(20240301, 30);
        values.insert(20240307, 50);
        // outside both windows
        values.insert(20240229, 1_000);

        let summary = summarize(&week(), &values);
        assert_eq!(summary.period.count, 100);
        assert_eq!(summary.period.variation, 20);
    }

    #[test]
    fn test_yesterday_delta() {
        let mut values = HashMap::new();
        values.insert(20240314, 5);
        values.insert(20240313, 3);

        let summary = summarize(&week(), &values);
        assert_eq!(summary.yesterday.count, 3);
        assert_eq!(summary.yesterday.variation, 2);
    }

    #[test]
    fn test_missing_days_contribute_zero() {
        let mut values = HashMap::new();
        values.insert(20240310, 4);

        let summary = summarize(&week(), &values);
        assert_eq!(summary.days.len(), 7);
        assert_eq!(summary.days[0], (date(2024, 3, 8), 0));
        assert_eq!(summary.days[2], (date(2024, 3, 10), 4));
        assert_eq!(summary.period, Delta { count: 4, variation: 4 });
        assert_eq!(summary.yesterday, Delta::default());
    }

    #[test]
    fn test_empty_series() {
        let summary = summarize(&week(), &HashMap::new());
        assert!(summary.days.iter().all(|(_, v)| *v == 0));
        assert_eq!(summary.period, Delta::default());
    }
}
