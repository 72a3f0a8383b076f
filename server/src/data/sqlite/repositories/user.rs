//! User repository for SQLite operations

use sqlx::SqlitePool;

use super::{day_key_sql, decode_list, encode_list, placeholders};
use crate::core::constants::ROLE_ANONYMOUS;
use crate::data::sqlite::SqliteError;
use crate::data::types::{DailyTotal, UserRow};

type UserTuple = (String, String, Option<String>, String, String, i64);

const USER_COLUMNS: &str = "id, username, name, roles, status, created_at";

fn user_from_tuple(
    (id, username, name, roles, status, created_at): UserTuple,
) -> Result<UserRow, SqliteError> {
    Ok(UserRow {
        id,
        username,
        name,
        roles: decode_list("users.roles", &roles)?,
        status,
        created_at,
    })
}

/// Create a user. Returns `None` when the username is already taken.
pub async fn create_user(
    pool: &SqlitePool,
    username: &str,
    name: Option<&str>,
    roles: &[String],
) -> Result<Option<UserRow>, SqliteError> {
    let id = cuid2::create_id();
    let now = chrono::Utc::now().timestamp();

    let result = sqlx::query(
        r#"
        INSERT INTO users (id, username, name, roles, status, created_at)
        VALUES (?, ?, ?, ?, 'offline', ?)
        ON CONFLICT(username) DO NOTHING
        "#,
    )
    .bind(&id)
    .bind(username)
    .bind(name)
    .bind(encode_list(roles))
    .bind(now)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }

    Ok(Some(UserRow {
        id,
        username: username.to_string(),
        name: name.map(String::from),
        roles: roles.to_vec(),
        status: "offline".to_string(),
        created_at: now,
    }))
}

pub async fn get_user(pool: &SqlitePool, id: &str) -> Result<Option<UserRow>, SqliteError> {
    let sql = format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS);
    let row = sqlx::query_as::<_, UserTuple>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    row.map(user_from_tuple).transpose()
}

pub async fn get_user_by_username(
    pool: &SqlitePool,
    username: &str,
) -> Result<Option<UserRow>, SqliteError> {
    let sql = format!("SELECT {} FROM users WHERE username = ?", USER_COLUMNS);
    let row = sqlx::query_as::<_, UserTuple>(&sql)
        .bind(username)
        .fetch_optional(pool)
        .await?;
    row.map(user_from_tuple).transpose()
}

/// Fetch the users among `ids` that exist (in no particular order)
pub async fn get_users_by_ids(
    pool: &SqlitePool,
    ids: &[String],
) -> Result<Vec<UserRow>, SqliteError> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let sql = format!(
        "SELECT {} FROM users WHERE id IN ({})",
        USER_COLUMNS,
        placeholders(ids.len())
    );
    let mut query = sqlx::query_as::<_, UserTuple>(&sql);
    for id in ids {
        query = query.bind(id);
    }
    query
        .fetch_all(pool)
        .await?
        .into_iter()
        .map(user_from_tuple)
        .collect()
}

pub async fn count_users(pool: &SqlitePool) -> Result<i64, SqliteError> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// Registered users per UTC day within `[from_ts, until_ts)`, anonymous users excluded
pub async fn count_registered_by_day(
    pool: &SqlitePool,
    from_ts: i64,
    until_ts: i64,
) -> Result<Vec<DailyTotal>, SqliteError> {
    let sql = format!(
        r#"
        SELECT {day} AS day, COUNT(*)
        FROM users
        WHERE created_at >= ? AND created_at < ?
          AND NOT EXISTS (SELECT 1 FROM json_each(users.roles) WHERE json_each.value = ?)
        GROUP BY day
        ORDER BY day
        "#,
        day = day_key_sql("created_at")
    );

    let rows = sqlx::query_as::<_, (i64, i64)>(&sql)
        .bind(from_ts)
        .bind(until_ts)
        .bind(ROLE_ANONYMOUS)
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
