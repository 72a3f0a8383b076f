//! Custom emoji repository for SQLite operations

use sqlx::SqlitePool;

use super::{decode_list, encode_list};
use crate::data::sqlite::SqliteError;
use crate::data::types::EmojiRow;

type EmojiTuple = (String, String, String, String, i64);

fn emoji_from_tuple(
    (id, name, aliases, extension, updated_at): EmojiTuple,
) -> Result<EmojiRow, SqliteError> {
    Ok(EmojiRow {
        id,
        name,
        aliases: decode_list("custom_emojis.aliases", &aliases)?,
        extension,
        updated_at,
    })
}

/// Register an emoji. Returns `None` when the name or one of the aliases is
/// already used as a name or alias, or when an alias repeats the name.
pub async fn create_emoji(
    pool: &SqlitePool,
    name: &str,
    aliases: &[String],
    extension: &str,
) -> Result<Option<EmojiRow>, SqliteError> {
    if aliases.iter().any(|a| a == name) {
        return Ok(None);
    }

    let mut identifiers = Vec::with_capacity(aliases.len() + 1);
    identifiers.push(name.to_string());
    identifiers.extend(aliases.iter().cloned());
    let identifiers = encode_list(&identifiers);

    let mut tx = pool.begin().await?;

    let (taken,): (i64,) = sqlx::query_as(
        r#"
        SELECT COUNT(*)
        FROM custom_emojis e
        WHERE e.name IN (SELECT value FROM json_each(?))
           OR EXISTS (
               SELECT 1 FROM json_each(e.aliases) a
               WHERE a.value IN (SELECT value FROM json_each(?))
           )
        "#,
    )
    .bind(&identifiers)
    .bind(&identifiers)
    .fetch_one(&mut *tx)
    .await?;
    if taken > 0 {
        return Ok(None);
    }

    let id = cuid2::create_id();
    let now = chrono::Utc::now().timestamp();

    let result = sqlx::query(
        r#"
        INSERT INTO custom_emojis (id, name, aliases, extension, updated_at)
        VALUES (?, ?, ?, ?, ?)
        ON CONFLICT(name) DO NOTHING
        "#,
    )
    .bind(&id)
    .bind(name)
    .bind(encode_list(aliases))
    .bind(extension)
    .bind(now)
    .execute(&mut *tx)
    .await?;
    tx.commit().await?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }

    Ok(Some(EmojiRow {
        id,
        name: name.to_string(),
        aliases: aliases.to_vec(),
        extension: extension.to_string(),
        updated_at: now,
    }))
}

/// List emoji by name, optionally filtered by a name substring and a
/// minimum update time (unix seconds)
pub async fn list_emojis(
    pool: &SqlitePool,
    name_filter: Option<&str>,
    updated_since: Option<i64>,
) -> Result<Vec<EmojiRow>, SqliteError> {
    let rows = sqlx::query_as::<_, EmojiTuple>(
        r#"
        SELECT id, name, aliases, extension, updated_at
        FROM custom_emojis
        WHERE (? IS NULL OR instr(name, ?) > 0)
          AND (? IS NULL OR updated_at >= ?)
        ORDER BY name
        "#,
    )
    .bind(name_filter)
    .bind(name_filter)
    .bind(updated_since)
    .bind(updated_since)
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(emoji_from_tuple).collect()
}

pub async fn delete_emoji(pool: &SqlitePool, id: &str) -> Result<bool, SqliteError> {
    let result = sqlx::query("DELETE FROM custom_emojis WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
