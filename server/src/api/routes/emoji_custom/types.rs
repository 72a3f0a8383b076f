//! Request and response types for custom emoji endpoints

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::data::types::EmojiRow;

#[derive(Debug, Deserialize, Validate, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListEmojiQuery {
    /// Name substring filter
    #[validate(length(max = 64, message = "query must be at most 64 characters"))]
    pub query: Option<String>,
    /// Only emoji changed at or after this RFC 3339 timestamp
    pub updated_since: Option<String>,
}

fn valid_emoji_name(name: &str) -> Result<(), validator::ValidationError> {
    if name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        Ok(())
    } else {
        Err(validator::ValidationError::new("emoji_name")
            .with_message("name may only contain letters, digits, '_' and '-'".into()))
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateEmojiRequest {
    #[validate(
        length(min = 1, max = 64, message = "name must be 1-64 characters"),
        custom(function = "valid_emoji_name")
    )]
    pub name: String,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[validate(length(min = 1, max = 8, message = "extension must be 1-8 characters"))]
    pub extension: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeleteEmojiRequest {
    #[validate(length(min = 1, message = "emojiId must not be empty"))]
    pub emoji_id: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct EmojiDto {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub aliases: Vec<String>,
    pub extension: String,
    #[serde(rename = "_updatedAt")]
    pub updated_at: i64,
}

impl From<EmojiRow> for EmojiDto {
    fn from(row: EmojiRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            aliases: row.aliases,
            extension: row.extension,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct EmojiUpdates {
    pub update: Vec<EmojiDto>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ListEmojiResponse {
    pub emojis: EmojiUpdates,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct EmojiResponse {
    pub emoji: EmojiDto,
}
