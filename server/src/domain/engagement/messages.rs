//! Message reports

use super::breakdown::zero_fill;
use super::period::{PeriodSummary, Window};
use super::{EngagementError, EngagementService};
use crate::data::types::{MetricType, RoomMessageCount, RoomType};

impl EngagementService {
    /// Messages per day in `window` against the prior window
    pub async fn messages_sent(&self, window: Window) -> Result<PeriodSummary, EngagementError> {
        self.period_report(MetricType::Messages, window).await
    }

    /// Messages per dashboard room type, every type present
    pub async fn messages_origin(
        &self,
        window: Window,
    ) -> Result<Vec<(RoomType, i64)>, EngagementError> {
        self.ensure_backfilled(MetricType::Messages, window.end())
            .await?;
        let observed = self
            .database
            .analytics()
            .origin_counts(window.start_key(), window.end_key())
            .await?;
        Ok(zero_fill(&RoomType::DASHBOARD, &observed))
    }

    /// The `limit` busiest rooms, ties broken by name then id
    pub async fn top_channels(
        &self,
        window: Window,
        limit: u32,
    ) -> Result<Vec<RoomMessageCount>, EngagementError> {
        self.ensure_backfilled(MetricType::Messages, window.end())
            .await?;
        let rooms = self
            .database
            .analytics()
            .top_rooms(window.start_key(), window.end_key(), limit)
            .await?;
        Ok(rooms)
    }
}
