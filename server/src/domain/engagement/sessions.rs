//! Session activity reports

use chrono::{DateTime, NaiveDate, Utc};

use super::breakdown::zero_fill;
use super::date::{DestructuredDate, to_day_key};
use super::period::Window;
use super::{EngagementError, EngagementService};
use crate::core::constants::{BUSIEST_DAYS_SPAN, BUSIEST_HOURS_GROUP_SIZE, BUSIEST_HOURS_SPAN_SECS};
use crate::data::types::{DayHourUsers, DayUsers, HourUsers};

impl EngagementService {
    /// Sessions started in the 24 hours before `until`, in 2-hour buckets of
    /// the UTC login hour from the latest hour down. Every bucket is present.
    pub async fn busiest_hours(
        &self,
        until: DateTime<Utc>,
    ) -> Result<Vec<HourUsers>, EngagementError> {
        let until_ts = until.timestamp();
        let from_ts = until_ts - BUSIEST_HOURS_SPAN_SECS;
        let hours = self
            .database
            .analytics()
            .sessions_by_hour(from_ts, until_ts)
            .await?;

        let observed: Vec<(u32, i64)> = hours
            .iter()
            .map(|h| (h.hour - h.hour % BUSIEST_HOURS_GROUP_SIZE, h.users))
            .collect();
        let buckets: Vec<u32> = (0..24)
            .step_by(BUSIEST_HOURS_GROUP_SIZE as usize)
            .rev()
            .collect();

        Ok(zero_fill(&buckets, &observed)
            .into_iter()
            .map(|(hour, users)| HourUsers { hour, users })
            .collect())
    }

    /// Sessions per day for the week ending at `end`, one entry per day
    pub async fn busiest_days(&self, end: NaiveDate) -> Result<Vec<DayUsers>, EngagementError> {
        let window = Window::ending_at(end, BUSIEST_DAYS_SPAN);
        let days = self
            .database
            .analytics()
            .sessions_by_day(window.start_key(), window.end_key())
            .await?;

        let observed: Vec<(u32, i64)> = days
            .iter()
            .map(|d| {
                let date = DestructuredDate {
                    year: d.year,
                    month: d.month,
                    day: d.day,
                };
                (date.day_key(), d.users)
            })
            .collect();
        let dates: Vec<NaiveDate> = window.dates().collect();
        let keys: Vec<u32> = dates.iter().copied().map(to_day_key).collect();

        Ok(dates
            .into_iter()
            .zip(zero_fill(&keys, &observed))
            .map(|(date, (_, users))| {
                let parts = DestructuredDate::from(date);
                DayUsers {
                    year: parts.year,
                    month: parts.month,
                    day: parts.day,
                    users,
                }
            })
            .collect())
    }

    /// Sessions per (day, hour of login) over `window`
    pub async fn users_by_time_of_day(
        &self,
        window: Window,
    ) -> Result<Vec<DayHourUsers>, EngagementError> {
        let grid = self
            .database
            .analytics()
            .sessions_by_day_and_hour(window.start_key(), window.end_key())
            .await?;
        Ok(grid)
    }
}
