//! Personal access token repository for SQLite operations
//!
//! Only SHA-256 hashes are stored; callers hash before calling in.

use sqlx::SqlitePool;

use crate::data::sqlite::SqliteError;

pub async fn create_token(
    pool: &SqlitePool,
    user_id: &str,
    token_hash: &str,
) -> Result<(), SqliteError> {
    let now = chrono::Utc::now().timestamp();

    sqlx::query("INSERT INTO auth_tokens (user_id, token_hash, created_at) VALUES (?, ?, ?)")
        .bind(user_id)
        .bind(token_hash)
        .bind(now)
        .execute(pool)
        .await?;

    Ok(())
}

/// All token hashes issued to a user
pub async fn list_token_hashes(
    pool: &SqlitePool,
    user_id: &str,
) -> Result<Vec<String>, SqliteError> {
    let rows = sqlx::query_as::<_, (String,)>(
        "SELECT token_hash FROM auth_tokens WHERE user_id = ? ORDER BY created_at",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(|(hash,)| hash).collect())
}
