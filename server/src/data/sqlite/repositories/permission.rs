//! Permission repository for SQLite operations

use sqlx::SqlitePool;

use super::decode_list;
use crate::data::sqlite::SqliteError;

/// Roles granted a permission, or `None` for an unknown permission id
pub async fn get_permission_roles(
    pool: &SqlitePool,
    permission_id: &str,
) -> Result<Option<Vec<String>>, SqliteError> {
    let row = sqlx::query_as::<_, (String,)>("SELECT roles FROM permissions WHERE id = ?")
        .bind(permission_id)
        .fetch_optional(pool)
        .await?;

    row.map(|(roles,)| decode_list("permissions.roles", &roles))
        .transpose()
}
