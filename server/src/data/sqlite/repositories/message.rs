//! Message repository for SQLite operations

use sqlx::SqlitePool;

use super::{day_key_sql, decode_room_type, placeholders};
use crate::data::sqlite::SqliteError;
use crate::data::types::{DailyRoomMessages, MessageRow, RoomMessageCount, RoomType};

pub async fn insert_message(
    pool: &SqlitePool,
    room_id: &str,
    user_id: &str,
    text: &str,
    ts: i64,
) -> Result<MessageRow, SqliteError> {
    let id = cuid2::create_id();

    sqlx::query("INSERT INTO messages (id, room_id, user_id, text, ts) VALUES (?, ?, ?, ?, ?)")
        .bind(&id)
        .bind(room_id)
        .bind(user_id)
        .bind(text)
        .bind(ts)
        .execute(pool)
        .await?;

    Ok(MessageRow {
        id,
        room_id: room_id.to_string(),
        user_id: user_id.to_string(),
        text: text.to_string(),
        ts,
    })
}

pub async fn get_message(pool: &SqlitePool, id: &str) -> Result<Option<MessageRow>, SqliteError> {
    let row = sqlx::query_as::<_, (String, String, String, String, i64)>(
        "SELECT id, room_id, user_id, text, ts FROM messages WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|(id, room_id, user_id, text, ts)| MessageRow {
        id,
        room_id,
        user_id,
        text,
        ts,
    }))
}

pub async fn delete_message(pool: &SqlitePool, id: &str) -> Result<bool, SqliteError> {
    let result = sqlx::query("DELETE FROM messages WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Messages per UTC day and room within `[from_ts, until_ts)`, limited to `room_types`
pub async fn count_by_day_and_room(
    pool: &SqlitePool,
    from_ts: i64,
    until_ts: i64,
    room_types: &[RoomType],
) -> Result<Vec<DailyRoomMessages>, SqliteError> {
    if room_types.is_empty() {
        return Ok(Vec::new());
    }

    let sql = format!(
        r#"
        SELECT {day} AS day, r.id, r.name, r.type, COUNT(*)
        FROM messages m
        JOIN rooms r ON r.id = m.room_id
        WHERE m.ts >= ? AND m.ts < ? AND r.type IN ({types})
        GROUP BY day, r.id
        ORDER BY day, r.id
        "#,
        day = day_key_sql("m.ts"),
        types = placeholders(room_types.len())
    );

    let mut query = sqlx::query_as::<_, (i64, String, String, String, i64)>(&sql)
        .bind(from_ts)
        .bind(until_ts);
    for t in room_types {
        query = query.bind(t.as_str());
    }

    query
        .fetch_all(pool)
        .await?
        .into_iter()
        .map(|(date, room_id, room_name, room_type, count)| {
            Ok(DailyRoomMessages {
                date: date as u32,
                room: RoomMessageCount {
                    room_id,
                    room_name,
                    room_type: decode_room_type(&room_type)?,
                    count,
                },
            })
        })
        .collect()
}
