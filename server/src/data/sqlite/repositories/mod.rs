//! SQLite repositories
//!
//! Row types (UserRow, TeamRow, etc.) should be imported from `crate::data::types`.

pub mod analytics;
pub mod emoji;
pub mod message;
pub mod permission;
pub mod room;
pub mod session;
pub mod team;
pub mod token;
pub mod user;

use crate::data::sqlite::SqliteError;
use crate::data::types::{RoomType, TeamType};

/// Decode a JSON array column (roles, aliases)
pub(crate) fn decode_list(column: &'static str, raw: &str) -> Result<Vec<String>, SqliteError> {
    serde_json::from_str(raw).map_err(|e| SqliteError::Decode {
        column,
        reason: e.to_string(),
    })
}

/// Encode a string list for a JSON array column
pub(crate) fn encode_list(values: &[String]) -> String {
    serde_json::Value::from(values.to_vec()).to_string()
}

pub(crate) fn decode_room_type(raw: &str) -> Result<RoomType, SqliteError> {
    RoomType::parse(raw).ok_or_else(|| SqliteError::Decode {
        column: "rooms.type",
        reason: format!("unknown room type '{}'", raw),
    })
}

pub(crate) fn decode_team_type(raw: i64) -> Result<TeamType, SqliteError> {
    TeamType::from_i64(raw).ok_or_else(|| SqliteError::Decode {
        column: "teams.type",
        reason: format!("unknown team type {}", raw),
    })
}

/// `?, ?, ?` placeholder list for an `IN (...)` clause
pub(crate) fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}

/// SQL expression turning a unix-seconds column into a `YYYYMMDD` integer (UTC)
pub(crate) fn day_key_sql(column: &str) -> String {
    format!("CAST(strftime('%Y%m%d', {}, 'unixepoch') AS INTEGER)", column)
}

#[cfg(test)]
pub(crate) async fn setup_test_pool() -> sqlx::SqlitePool {
    crate::data::SqliteService::in_memory()
        .await
        .unwrap()
        .pool()
        .clone()
}
