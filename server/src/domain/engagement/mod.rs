//! Engagement dashboard analytics
//!
//! Message and user counts are served from the `analytics` table, a per-day
//! cache over the raw `messages` and `users` tables. The cache is filled two
//! ways:
//! - lazily, by [`backfill`] on the first report for a metric
//! - incrementally, by the event hooks on this service
//!
//! Session reports read the `sessions` table directly. Sessions are written
//! by [`EngagementService::handle_session_activity`], one row per access
//! token and UTC day.

pub mod backfill;
pub mod breakdown;
pub mod date;
pub mod period;

mod messages;
mod sessions;
mod users;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use moka::future::Cache;
use thiserror::Error;
use tokio::sync::{Mutex, MutexGuard};

use crate::core::config::EngagementConfig;
use crate::core::constants::{
    CACHE_TTL_SESSION_SECS, ROLE_ANONYMOUS, SESSION_CACHE_CAPACITY, SESSION_DEVICE_TYPE,
};
use crate::data::types::{MessageRow, MetricType, RoomRow, SessionRow, UserRow};
use crate::data::{DataError, TransactionalService};

pub use breakdown::zero_fill;
pub use date::{DestructuredDate, from_day_key, inclusive_day_count, to_day_key};
pub use period::{Delta, PeriodSummary, Window};

#[derive(Error, Debug)]
pub enum EngagementError {
    #[error("end date {end} is before start date {start}")]
    InvalidWindow { start: NaiveDate, end: NaiveDate },
    #[error("date range spans {days} days, at most {max} are allowed")]
    WindowTooLong { days: u32, max: u32 },
    #[error(transparent)]
    Data(#[from] DataError),
}

/// Engagement reports and the hooks that keep the analytics cache current
pub struct EngagementService {
    database: Arc<TransactionalService>,
    backfill_days: u32,
    messages_backfill: Mutex<()>,
    users_backfill: Mutex<()>,
    /// Session ids already written
    sessions_seen: Cache<String, ()>,
}

impl EngagementService {
    pub fn new(database: Arc<TransactionalService>, config: EngagementConfig) -> Self {
        Self {
            database,
            backfill_days: config.backfill_days,
            messages_backfill: Mutex::new(()),
            users_backfill: Mutex::new(()),
            sessions_seen: Cache::builder()
                .max_capacity(SESSION_CACHE_CAPACITY)
                .time_to_live(Duration::from_secs(CACHE_TTL_SESSION_SECS))
                .build(),
        }
    }

    /// Backfill `metric` for the days up to `as_of` unless already done.
    ///
    /// Concurrent callers for the same metric wait on one another, so only the
    /// first does the work. Inserts skip existing (type, date, room) rows, which
    /// keeps a second process or a rerun after a crash from double counting.
    pub async fn ensure_backfilled(
        &self,
        metric: MetricType,
        as_of: NaiveDate,
    ) -> Result<u64, EngagementError> {
        let _guard = self.lock_metric(metric).await;
        let repo = self.database.analytics();
        backfill::backfill(repo.as_ref(), metric, as_of, self.backfill_days).await
    }

    /// Exclusive access to `metric` against its backfill.
    ///
    /// Hold the guard from writing a raw event until its hook has run, so a
    /// backfill never counts an event whose hook is still pending.
    pub async fn lock_metric(&self, metric: MetricType) -> MutexGuard<'_, ()> {
        match metric {
            MetricType::Messages => self.messages_backfill.lock().await,
            MetricType::Users => self.users_backfill.lock().await,
        }
    }

    /// Current vs prior window summary for a cached metric
    async fn period_report(
        &self,
        metric: MetricType,
        window: Window,
    ) -> Result<PeriodSummary, EngagementError> {
        self.ensure_backfilled(metric, window.end()).await?;

        let prior = window.prior();
        let totals = self
            .database
            .analytics()
            .daily_totals(metric, prior.start_key(), window.end_key())
            .await?;
        let values: HashMap<u32, i64> = totals.into_iter().map(|t| (t.date, t.count)).collect();

        Ok(period::summarize(&window, &values))
    }

    // ==================== Event Hooks ====================

    /// Count a new message on its day. Rooms outside the dashboard types are ignored.
    pub async fn handle_message_sent(
        &self,
        message: &MessageRow,
        room: &RoomRow,
    ) -> Result<(), EngagementError> {
        self.record_message(message, room, 1).await
    }

    /// Undo [`handle_message_sent`](Self::handle_message_sent) for a deleted message
    pub async fn handle_message_deleted(
        &self,
        message: &MessageRow,
        room: &RoomRow,
    ) -> Result<(), EngagementError> {
        self.record_message(message, room, -1).await
    }

    async fn record_message(
        &self,
        message: &MessageRow,
        room: &RoomRow,
        delta: i64,
    ) -> Result<(), EngagementError> {
        if !room.room_type.is_dashboard_type() {
            return Ok(());
        }
        let Some(date) = date::day_key_of_ts(message.ts) else {
            tracing::warn!(message_id = %message.id, ts = message.ts, "Message timestamp out of range");
            return Ok(());
        };

        self.database
            .analytics()
            .increment_analytics(
                MetricType::Messages,
                date,
                Some((room.id.as_str(), room.name.as_str(), room.room_type)),
                delta,
            )
            .await?;
        Ok(())
    }

    /// Count a newly registered user on their registration day
    pub async fn handle_user_created(&self, user: &UserRow) -> Result<(), EngagementError> {
        if user.has_role(ROLE_ANONYMOUS) {
            return Ok(());
        }
        let Some(date) = date::day_key_of_ts(user.created_at) else {
            tracing::warn!(user_id = %user.id, "User creation time out of range");
            return Ok(());
        };

        self.database
            .analytics()
            .increment_analytics(MetricType::Users, date, None, 1)
            .await?;
        Ok(())
    }

    /// Record that `user_id` made an authenticated request at `at` with the
    /// credential identified by `credential`.
    ///
    /// The first request per credential and UTC day opens a session; later ones
    /// are no-ops.
    pub async fn handle_session_activity(
        &self,
        user_id: &str,
        credential: &str,
        at: DateTime<Utc>,
    ) -> Result<(), EngagementError> {
        let day = DestructuredDate::from(at.date_naive());
        let session_id = format!("{}-{}", credential, day.day_key());
        let seen_key = format!("{}:{}", user_id, session_id);
        if self.sessions_seen.contains_key(&seen_key) {
            return Ok(());
        }

        self.database
            .analytics()
            .open_session(&SessionRow {
                user_id: user_id.to_string(),
                session_id,
                year: day.year,
                month: day.month,
                day: day.day,
                login_at: at.timestamp(),
                closed_at: None,
                device_type: SESSION_DEVICE_TYPE.to_string(),
            })
            .await?;
        self.sessions_seen.insert(seen_key, ()).await;
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use chrono::NaiveDate;

    use crate::core::config::EngagementConfig;
    use crate::data::TransactionalService;
    use crate::data::types::{RoomRow, RoomType};

    use super::EngagementService;
    use super::date::day_start_ts;

    pub const HOUR: i64 = 3_600;

    pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    /// Unix seconds at `hour`:00 UTC on the given day
    pub fn at(y: i32, m: u32, d: u32, hour: i64) -> i64 {
        day_start_ts(date(y, m, d)) + hour * HOUR
    }

    pub async fn setup() -> (Arc<TransactionalService>, EngagementService) {
        let database = Arc::new(TransactionalService::in_memory().await.unwrap());
        let service = EngagementService::new(Arc::clone(&database), EngagementConfig::default());
        (database, service)
    }

    pub async fn room(database: &TransactionalService, name: &str, t: RoomType) -> RoomRow {
        database
            .repository()
            .create_room(name, t, false)
            .await
            .unwrap()
    }
}
