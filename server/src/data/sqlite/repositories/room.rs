//! Room repository for SQLite operations

use sqlx::SqlitePool;

use super::decode_room_type;
use crate::data::sqlite::SqliteError;
use crate::data::types::{RoomRow, RoomType};

pub(crate) type RoomTuple = (String, String, String, Option<String>, bool, bool, i64);

pub(crate) const ROOM_COLUMNS: &str = "id, name, type, team_id, team_main, read_only, created_at";

pub(crate) fn room_from_tuple(
    (id, name, room_type, team_id, team_main, read_only, created_at): RoomTuple,
) -> Result<RoomRow, SqliteError> {
    Ok(RoomRow {
        id,
        name,
        room_type: decode_room_type(&room_type)?,
        team_id,
        team_main,
        read_only,
        created_at,
    })
}

/// Create a standalone room (not attached to a team)
pub async fn create_room(
    pool: &SqlitePool,
    name: &str,
    room_type: RoomType,
    read_only: bool,
) -> Result<RoomRow, SqliteError> {
    let id = cuid2::create_id();
    let now = chrono::Utc::now().timestamp();

    sqlx::query(
        "INSERT INTO rooms (id, name, type, team_id, team_main, read_only, created_at) VALUES (?, ?, ?, NULL, 0, ?, ?)",
    )
    .bind(&id)
    .bind(name)
    .bind(room_type.as_str())
    .bind(read_only)
    .bind(now)
    .execute(pool)
    .await?;

    Ok(RoomRow {
        id,
        name: name.to_string(),
        room_type,
        team_id: None,
        team_main: false,
        read_only,
        created_at: now,
    })
}

pub async fn get_room(pool: &SqlitePool, id: &str) -> Result<Option<RoomRow>, SqliteError> {
    let sql = format!("SELECT {} FROM rooms WHERE id = ?", ROOM_COLUMNS);
    let row = sqlx::query_as::<_, RoomTuple>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    row.map(room_from_tuple).transpose()
}
