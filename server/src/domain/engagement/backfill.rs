//! Lazy materialisation of historical analytics rows

use chrono::NaiveDate;

use super::EngagementError;
use super::date::{day_start_ts, days_after, days_before, to_day_key};
use crate::data::AnalyticsRepository;
use crate::data::types::{AnalyticsRow, MetricType, RoomType};

/// Fill the analytics cache for `metric` from raw events.
///
/// Does nothing when any row of `metric` is dated before `as_of`. Otherwise
/// counts raw events per day over `[as_of - days, as_of]` and inserts them in
/// one transaction, skipping (type, date, room) rows that already exist.
/// Returns the number of rows inserted.
pub async fn backfill(
    repo: &dyn AnalyticsRepository,
    metric: MetricType,
    as_of: NaiveDate,
    days: u32,
) -> Result<u64, EngagementError> {
    if repo.has_analytics_before(metric, to_day_key(as_of)).await? {
        return Ok(0);
    }

    let from_ts = day_start_ts(days_before(as_of, days));
    let until_ts = day_start_ts(days_after(as_of, 1));

    let rows: Vec<AnalyticsRow> = match metric {
        MetricType::Messages => repo
            .count_messages_by_day_and_room(from_ts, until_ts, &RoomType::DASHBOARD)
            .await?
            .iter()
            .map(|r| AnalyticsRow::messages(r.date, &r.room))
            .collect(),
        MetricType::Users => repo
            .count_registered_users_by_day(from_ts, until_ts)
            .await?
            .into_iter()
            .map(|t| AnalyticsRow::users(t.date, t.count))
            .collect(),
    };

    if rows.is_empty() {
        tracing::debug!(%metric, %as_of, "No raw events to backfill");
        return Ok(0);
    }

    let inserted = repo.insert_missing_analytics(&rows).await?;
    tracing::info!(%metric, %as_of, days, inserted, "Backfilled analytics");
    Ok(inserted)
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;

    async fn analytics_rows(database: &crate::data::TransactionalService) -> i64 {
        let crate::data::TransactionalService::Sqlite(s) = database;
        let (n,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM analytics")
            .fetch_one(s.pool())
            .await
            .unwrap();
        n
    }

    #[tokio::test]
    async fn test_backfill_is_idempotent() {
        let (database, service) = setup().await;
        let general = room(&database, "general", RoomType::Channel).await;
        let secret = room(&database, "secret", RoomType::Private).await;
        let repo = database.repository();
        for (room_id, ts) in [
            (&general.id, at(2024, 3, 10, 9)),
            (&general.id, at(2024, 3, 10, 11)),
            (&secret.id, at(2024, 3, 10, 12)),
            (&general.id, at(2024, 3, 12, 8)),
        ] {
            repo.insert_message(room_id, "u1", "x", ts).await.unwrap();
        }

        let as_of = date(2024, 3, 14);
        let first = service
            .ensure_backfilled(MetricType::Messages, as_of)
            .await
            .unwrap();
        assert_eq!(first, 3);
        let after_first = analytics_rows(&database).await;

        let second = service
            .ensure_backfilled(MetricType::Messages, as_of)
            .await
            .unwrap();
        assert_eq!(second, 0);
        assert_eq!(analytics_rows(&database).await, after_first);
    }

    #[tokio::test]
    async fn test_concurrent_backfills_insert_once() {
        let (database, service) = setup().await;
        let general = room(&database, "general", RoomType::Channel).await;
        database
            .repository()
            .insert_message(&general.id, "u1", "x", at(2024, 3, 1, 9))
            .await
            .unwrap();

        let as_of = date(2024, 3, 14);
        let (a, b) = tokio::join!(
            service.ensure_backfilled(MetricType::Messages, as_of),
            service.ensure_backfilled(MetricType::Messages, as_of),
        );
        assert_eq!(a.unwrap() + b.unwrap(), 1);
        assert_eq!(analytics_rows(&database).await, 1);
    }

    #[tokio::test]
    async fn test_backfill_ignores_events_outside_window() {
        let (database, service) = setup().await;
        let general = room(&database, "general", RoomType::Channel).await;
        let repo = database.repository();
        // 91 days before as_of: outside the 90-day window
        repo.insert_message(&general.id, "u1", "old", at(2023, 12, 14, 9))
            .await
            .unwrap();
        // after as_of
        repo.insert_message(&general.id, "u1", "new", at(2024, 3, 15, 9))
            .await
            .unwrap();

        let inserted = service
            .ensure_backfilled(MetricType::Messages, date(2024, 3, 14))
            .await
            .unwrap();
        assert_eq!(inserted, 0);
    }

    #[tokio::test]
    async fn test_existing_history_skips_backfill() {
        let (database, service) = setup().await;
        let analytics = database.analytics();
        analytics
            .insert_missing_analytics(&[AnalyticsRow::users(20240101, 2)])
            .await
            .unwrap();
        database
            .repository()
            .create_user("alice", None, &[])
            .await
            .unwrap();

        let inserted = service
            .ensure_backfilled(MetricType::Users, date(2024, 3, 14))
            .await
            .unwrap();
        assert_eq!(inserted, 0);
    }
}
