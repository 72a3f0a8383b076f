//! Login session repository for SQLite operations
//!
//! Sessions are bucketed by their stored (year, month, day); the day range
//! filters below compare `year * 10000 + month * 100 + day` against day keys.

use sqlx::SqlitePool;

use crate::data::sqlite::SqliteError;
use crate::data::types::{DayHourUsers, DayUsers, HourUsers, SessionRow};

const SESSION_DAY_KEY: &str = "(year * 10000 + month * 100 + day)";

/// Insert a session; an existing (user, session id) row is kept as is
pub async fn open_session(pool: &SqlitePool, session: &SessionRow) -> Result<(), SqliteError> {
    sqlx::query(
        r#"
        INSERT INTO sessions (user_id, session_id, year, month, day, login_at, closed_at, device_type)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(user_id, session_id) DO NOTHING
        "#,
    )
    .bind(&session.user_id)
    .bind(&session.session_id)
    .bind(session.year)
    .bind(session.month)
    .bind(session.day)
    .bind(session.login_at)
    .bind(session.closed_at)
    .bind(&session.device_type)
    .execute(pool)
    .await?;
    Ok(())
}

/// Distinct users with a session on each day within `[start, end]`
pub async fn active_users_by_day(
    pool: &SqlitePool,
    start: u32,
    end: u32,
) -> Result<Vec<DayUsers>, SqliteError> {
    let sql = format!(
        r#"
        SELECT year, month, day, COUNT(DISTINCT user_id)
        FROM sessions
        WHERE {key} >= ? AND {key} <= ?
        GROUP BY year, month, day
        ORDER BY year, month, day
        "#,
        key = SESSION_DAY_KEY
    );
    fetch_day_users(pool, &sql, start, end).await
}

/// Number of sessions on each day within `[start, end]`
pub async fn sessions_by_day(
    pool: &SqlitePool,
    start: u32,
    end: u32,
) -> Result<Vec<DayUsers>, SqliteError> {
    let sql = format!(
        r#"
        SELECT year, month, day, COUNT(*)
        FROM sessions
        WHERE {key} >= ? AND {key} <= ?
        GROUP BY year, month, day
        ORDER BY year, month, day
        "#,
        key = SESSION_DAY_KEY
    );
    fetch_day_users(pool, &sql, start, end).await
}

async fn fetch_day_users(
    pool: &SqlitePool,
    sql: &str,
    start: u32,
    end: u32,
) -> Result<Vec<DayUsers>, SqliteError> {
    let rows = sqlx::query_as::<_, (i32, u32, u32, i64)>(sql)
        .bind(start)
        .bind(end)
        .fetch_all(pool)
        .await?;

    Ok(rows
        .into_iter()
        .map(|(year, month, day, users)| DayUsers {
            year,
            month,
            day,
            users,
        })
        .collect())
}

/// Sessions started in `[from_ts, until_ts)` grouped by UTC hour of login
pub async fn sessions_by_hour(
    pool: &SqlitePool,
    from_ts: i64,
    until_ts: i64,
) -> Result<Vec<HourUsers>, SqliteError> {
    let rows = sqlx::query_as::<_, (i64, i64)>(
        r#"
        SELECT CAST(strftime('%H', login_at, 'unixepoch') AS INTEGER) AS hour, COUNT(*)
        FROM sessions
        WHERE login_at >= ? AND login_at < ?
        GROUP BY hour
        ORDER BY hour
        "#,
    )
    .bind(from_ts)
    .bind(until_ts)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(hour, users)| HourUsers {
            hour: hour as u32,
            users,
        })
        .collect())
}

/// Sessions on each (day, UTC hour of login) within the day range `[start, end]`
pub async fn sessions_by_day_and_hour(
    pool: &SqlitePool,
    start: u32,
    end: u32,
) -> Result<Vec<DayHourUsers>, SqliteError> {
    let sql = format!(
        r#"
        SELECT year, month, day,
               CAST(strftime('%H', login_at, 'unixepoch') AS INTEGER) AS hour,
               COUNT(*)
        FROM sessions
        WHERE {key} >= ? AND {key} <= ?
        GROUP BY year, month, day, hour
        ORDER BY year, month, day, hour
        "#,
        key = SESSION_DAY_KEY
    );
    let rows = sqlx::query_as::<_, (i32, u32, u32, i64, i64)>(&sql)
        .bind(start)
        .bind(end)
        .fetch_all(pool)
        .await?;

    Ok(rows
        .into_iter()
        .map(|(year, month, day, hour, users)| DayHourUsers {
            year,
            month,
            day,
            hour: hour as u32,
            users,
        })
        .collect())
}
