//! Engagement analytics repository for SQLite operations
//!
//! The unique index on (type, date, room_id) is what keeps concurrent
//! backfills and repeated event hooks from producing duplicate rows.

use sqlx::SqlitePool;

use super::decode_room_type;
use crate::data::sqlite::SqliteError;
use crate::data::types::{AnalyticsRow, DailyTotal, MetricType, RoomMessageCount, RoomType};

/// Whether any row of `metric` exists strictly before `date`
pub async fn has_rows_before(
    pool: &SqlitePool,
    metric: MetricType,
    date: u32,
) -> Result<bool, SqliteError> {
    let exists: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM analytics WHERE type = ? AND date < ?)")
            .bind(metric.as_str())
            .bind(date)
            .fetch_one(pool)
            .await?;
    Ok(exists)
}

/// Insert rows in one transaction, skipping any (type, date, room) that
/// already exists. Returns the number of rows written.
pub async fn insert_missing(pool: &SqlitePool, rows: &[AnalyticsRow]) -> Result<u64, SqliteError> {
    if rows.is_empty() {
        return Ok(0);
    }

    let mut tx = pool.begin().await?;
    let mut inserted = 0;

    for row in rows {
        let result = sqlx::query(
            r#"
            INSERT INTO analytics (type, date, room_id, room_name, room_type, count)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT(type, date, room_id) DO NOTHING
            "#,
        )
        .bind(row.metric.as_str())
        .bind(row.date)
        .bind(&row.room_id)
        .bind(row.room_name.as_deref())
        .bind(row.room_type.map(|t| t.as_str()))
        .bind(row.count)
        .execute(&mut *tx)
        .await?;
        inserted += result.rows_affected();
    }

    tx.commit().await?;
    Ok(inserted)
}

/// Add `delta` to a row's count, creating the row when missing. Counts never go below zero.
pub async fn increment(
    pool: &SqlitePool,
    metric: MetricType,
    date: u32,
    room: Option<(&str, &str, RoomType)>,
    delta: i64,
) -> Result<(), SqliteError> {
    let (room_id, room_name, room_type) = match room {
        Some((id, name, t)) => (id, Some(name), Some(t.as_str())),
        None => ("", None, None),
    };

    sqlx::query(
        r#"
        INSERT INTO analytics (type, date, room_id, room_name, room_type, count)
        VALUES (?, ?, ?, ?, ?, MAX(?, 0))
        ON CONFLICT(type, date, room_id) DO UPDATE SET
            count = MAX(analytics.count + ?, 0),
            room_name = COALESCE(excluded.room_name, analytics.room_name)
        "#,
    )
    .bind(metric.as_str())
    .bind(date)
    .bind(room_id)
    .bind(room_name)
    .bind(room_type)
    .bind(delta)
    .bind(delta)
    .execute(pool)
    .await?;

    Ok(())
}

/// Per-day totals of `metric` (summed over rooms) within `[start, end]`
pub async fn daily_totals(
    pool: &SqlitePool,
    metric: MetricType,
    start: u32,
    end: u32,
) -> Result<Vec<DailyTotal>, SqliteError> {
    let rows = sqlx::query_as::<_, (i64, i64)>(
        r#"
        SELECT date, SUM(count)
        FROM analytics
        WHERE type = ? AND date >= ? AND date <= ?
        GROUP BY date
        ORDER BY date
        "#,
    )
    .bind(metric.as_str())
    .bind(start)
    .bind(end)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(date, count)| DailyTotal {
            date: date as u32,
            count,
        })
        .collect())
}

/// Message counts per room type within `[start, end]`
pub async fn origin_counts(
    pool: &SqlitePool,
    start: u32,
    end: u32,
) -> Result<Vec<(RoomType, i64)>, SqliteError> {
    let rows = sqlx::query_as::<_, (String, i64)>(
        r#"
        SELECT room_type, SUM(count)
        FROM analytics
        WHERE type = 'messages' AND date >= ? AND date <= ? AND room_type IS NOT NULL
        GROUP BY room_type
        "#,
    )
    .bind(start)
    .bind(end)
    .fetch_all(pool)
    .await?;

    rows.into_iter()
        .map(|(t, count)| Ok((decode_room_type(&t)?, count)))
        .collect()
}

/// Rooms with the most messages within `[start, end]`.
/// Ties are broken by room name, then room id.
pub async fn top_rooms(
    pool: &SqlitePool,
    start: u32,
    end: u32,
    limit: u32,
) -> Result<Vec<RoomMessageCount>, SqliteError> {
    let rows = sqlx::query_as::<_, (String, String, String, i64)>(
        r#"
        SELECT room_id, MAX(COALESCE(room_name, '')) AS name, MAX(room_type), SUM(count) AS total
        FROM analytics
        WHERE type = 'messages' AND date >= ? AND date <= ? AND room_type IS NOT NULL
        GROUP BY room_id
        ORDER BY total DESC, name ASC, room_id ASC
        LIMIT ?
        "#,
    )
    .bind(start)
    .bind(end)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    rows.into_iter()
        .map(|(room_id, room_name, room_type, count)| {
            Ok(RoomMessageCount {
                room_id,
                room_name,
                room_type: decode_room_type(&room_type)?,
                count,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::sqlite::repositories::setup_test_pool;

    fn msg_row(date: u32, room_id: &str, name: &str, t: RoomType, count: i64) -> AnalyticsRow {
        AnalyticsRow::messages(
            date,
            &RoomMessageCount {
                room_id: room_id.to_string(),
                room_name: name.to_string(),
                room_type: t,
                count,
            },
        )
    }

    #[tokio::test]
    async fn test_insert_missing_is_idempotent() {
        let pool = setup_test_pool().await;
        let rows = vec![
            AnalyticsRow::users(20240301, 3),
            AnalyticsRow::users(20240302, 1),
        ];

        assert_eq!(insert_missing(&pool, &rows).await.unwrap(), 2);
        assert_eq!(insert_missing(&pool, &rows).await.unwrap(), 0);

        let totals = daily_totals(&pool, MetricType::Users, 20240301, 20240331)
            .await
            .unwrap();
        assert_eq!(totals.len(), 2);
        assert_eq!(totals[0].count, 3);
    }

    #[tokio::test]
    async fn test_has_rows_before() {
        let pool = setup_test_pool().await;
        insert_missing(&pool, &[AnalyticsRow::users(20240301, 1)])
            .await
            .unwrap();

        assert!(!has_rows_before(&pool, MetricType::Users, 20240301).await.unwrap());
        assert!(has_rows_before(&pool, MetricType::Users, 20240302).await.unwrap());
        assert!(!has_rows_before(&pool, MetricType::Messages, 20240302).await.unwrap());
    }

    #[tokio::test]
    async fn test_increment_creates_and_clamps() {
        let pool = setup_test_pool().await;

        increment(&pool, MetricType::Users, 20240301, None, 1).await.unwrap();
        increment(&pool, MetricType::Users, 20240301, None, 1).await.unwrap();
        let totals = daily_totals(&pool, MetricType::Users, 20240301, 20240301)
            .await
            .unwrap();
        assert_eq!(totals[0].count, 2);

        let room = Some(("r1", "general", RoomType::Channel));
        increment(&pool, MetricType::Messages, 20240301, room, -1).await.unwrap();
        let totals = daily_totals(&pool, MetricType::Messages, 20240301, 20240301)
            .await
            .unwrap();
        assert_eq!(totals[0].count, 0);
    }

    #[tokio::test]
    async fn test_origin_counts_and_top_rooms() {
        let pool = setup_test_pool().await;
        insert_missing(
            &pool,
            &[
                msg_row(20240301, "r1", "general", RoomType::Channel, 4),
                msg_row(20240302, "r1", "general", RoomType::Channel, 1),
                msg_row(20240301, "r2", "random", RoomType::Channel, 5),
                msg_row(20240301, "r3", "dm", RoomType::Direct, 2),
                msg_row(20240301, "r4", "alpha", RoomType::Private, 5),
            ],
        )
        .await
        .unwrap();

        let mut origins = origin_counts(&pool, 20240301, 20240302).await.unwrap();
        origins.sort_by_key(|(t, _)| t.as_str());
        assert_eq!(
            origins,
            vec![
                (RoomType::Channel, 10),
                (RoomType::Direct, 2),
                (RoomType::Private, 5)
            ]
        );

        let top = top_rooms(&pool, 20240301, 20240302, 3).await.unwrap();
        let names: Vec<&str> = top.iter().map(|r| r.room_name.as_str()).collect();
        // 5, 5, 5: equal counts fall back to name order
        assert_eq!(names, vec!["alpha", "general", "random"]);
    }
}
