//! Custom emoji API endpoints

pub mod types;

use std::sync::Arc;

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};

use types::{
    CreateEmojiRequest, DeleteEmojiRequest, EmojiDto, EmojiResponse, EmojiUpdates,
    ListEmojiQuery, ListEmojiResponse,
};

use crate::api::auth::{Auth, ManageEmoji};
use crate::api::extractors::{ValidatedJson, ValidatedQuery};
use crate::api::types::{ApiError, Empty, Success, parse_timestamp_param, success};
use crate::data::TransactionalService;

const INVALID_EMOJI: &str = "Custom_Emoji_Error_Invalid_Emoji";
const NAME_IN_USE: &str = "Custom_Emoji_Error_Name_Or_Alias_Already_In_Use";

/// Shared state for custom emoji endpoints
#[derive(Clone)]
pub struct EmojiApiState {
    pub database: Arc<TransactionalService>,
}

/// Build custom emoji routes
pub fn routes(database: Arc<TransactionalService>) -> Router<()> {
    let state = EmojiApiState { database };

    Router::new()
        .route("/emoji-custom.list", get(list_emoji))
        .route("/emoji-custom.create", post(create_emoji))
        .route("/emoji-custom.delete", post(delete_emoji))
        .with_state(state)
}

/// List custom emoji
#[utoipa::path(
    get,
    path = "/api/v1/emoji-custom.list",
    tag = "emoji-custom",
    params(ListEmojiQuery),
    responses(
        (status = 200, description = "Matching emoji", body = ListEmojiResponse),
        (status = 400, description = "Invalid updatedSince")
    )
)]
pub async fn list_emoji(
    State(state): State<EmojiApiState>,
    _auth: Auth,
    ValidatedQuery(query): ValidatedQuery<ListEmojiQuery>,
) -> Result<Json<Success<ListEmojiResponse>>, ApiError> {
    let updated_since = parse_timestamp_param(&query.updated_since)?.map(|ts| ts.timestamp());
    let name_filter = query.query.as_deref().map(str::trim).filter(|q| !q.is_empty());

    let emojis = state
        .database
        .repository()
        .list_emojis(name_filter, updated_since)
        .await
        .map_err(ApiError::from_data)?;

    Ok(success(ListEmojiResponse {
        emojis: EmojiUpdates {
            update: emojis.into_iter().map(EmojiDto::from).collect(),
        },
    }))
}

/// Register a custom emoji
#[utoipa::path(
    post,
    path = "/api/v1/emoji-custom.create",
    tag = "emoji-custom",
    request_body = CreateEmojiRequest,
    responses(
        (status = 200, description = "Emoji created", body = EmojiResponse),
        (status = 400, description = "Invalid name, or name or alias in use"),
        (status = 403, description = "Missing manage-emoji")
    )
)]
pub async fn create_emoji(
    State(state): State<EmojiApiState>,
    _auth: ManageEmoji,
    ValidatedJson(req): ValidatedJson<CreateEmojiRequest>,
) -> Result<Json<Success<EmojiResponse>>, ApiError> {
    let emoji = state
        .database
        .repository()
        .create_emoji(&req.name, &req.aliases, &req.extension)
        .await
        .map_err(ApiError::from_data)?
        .ok_or_else(|| ApiError::bad_request(NAME_IN_USE, "Custom emoji name or alias already in use"))?;

    tracing::debug!(emoji_id = %emoji.id, name = %emoji.name, "Custom emoji created");
    Ok(success(EmojiResponse {
        emoji: EmojiDto::from(emoji),
    }))
}

/// Delete a custom emoji
#[utoipa::path(
    post,
    path = "/api/v1/emoji-custom.delete",
    tag = "emoji-custom",
    request_body = DeleteEmojiRequest,
    responses(
        (status = 200, description = "Emoji deleted", body = Empty),
        (status = 400, description = "Unknown emoji"),
        (status = 403, description = "Missing manage-emoji")
    )
)]
pub async fn delete_emoji(
    State(state): State<EmojiApiState>,
    _auth: ManageEmoji,
    ValidatedJson(req): ValidatedJson<DeleteEmojiRequest>,
) -> Result<Json<Success<Empty>>, ApiError> {
    let deleted = state
        .database
        .repository()
        .delete_emoji(&req.emoji_id)
        .await
        .map_err(ApiError::from_data)?;

    if !deleted {
        return Err(ApiError::bad_request(INVALID_EMOJI, "Invalid emoji"));
    }
    tracing::debug!(emoji_id = %req.emoji_id, "Custom emoji deleted");
    Ok(success(Empty {}))
}
