//! Message posting and deletion
//!
//! Both endpoints feed the engagement dashboard's analytics cache.

pub mod types;

use std::sync::Arc;

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};

use crate::api::auth::Auth;
use crate::api::extractors::ValidatedJson;
use crate::api::types::{ApiError, Success, success};
use crate::core::constants::{PERM_DELETE_MESSAGE, ROLE_ADMIN};
use crate::data::TransactionalService;
use crate::data::types::MetricType;
use crate::domain::EngagementService;

use types::{DeleteMessageRequest, DeletedMessageResponse, MessageDto, MessageResponse, SendMessageRequest};

#[derive(Clone)]
pub struct ChatApiState {
    pub database: Arc<TransactionalService>,
    pub engagement: Arc<EngagementService>,
}

pub fn routes(
    database: Arc<TransactionalService>,
    engagement: Arc<EngagementService>,
) -> Router<()> {
    let state = ChatApiState {
        database,
        engagement,
    };

    Router::new()
        .route("/chat.sendMessage", post(send_message))
        .route("/chat.delete", post(delete_message))
        .with_state(state)
}

/// Post a message to a room
#[utoipa::path(
    post,
    path = "/api/v1/chat.sendMessage",
    tag = "chat",
    request_body = SendMessageRequest,
    responses(
        (status = 200, description = "Message stored", body = MessageResponse),
        (status = 400, description = "Unknown or read-only room")
    )
)]
pub async fn send_message(
    State(state): State<ChatApiState>,
    auth: Auth,
    ValidatedJson(req): ValidatedJson<SendMessageRequest>,
) -> Result<Json<Success<MessageResponse>>, ApiError> {
    let repo = state.database.repository();
    let room = repo
        .get_room(&req.message.rid)
        .await
        .map_err(ApiError::from_data)?
        .ok_or_else(|| ApiError::bad_request("error-invalid-room", "Invalid room"))?;

    if room.read_only && !auth.ctx.roles.iter().any(|r| r == ROLE_ADMIN) {
        return Err(ApiError::bad_request(
            "error-action-not-allowed",
            "Room is read-only",
        ));
    }

    let _counting = state.engagement.lock_metric(MetricType::Messages).await;
    let ts = chrono::Utc::now().timestamp();
    let message = repo
        .insert_message(&room.id, auth.user_id(), &req.message.msg, ts)
        .await
        .map_err(ApiError::from_data)?;

    if let Err(e) = state.engagement.handle_message_sent(&message, &room).await {
        tracing::warn!(message_id = %message.id, error = %e, "Failed to count message");
    }

    Ok(success(MessageResponse {
        message: MessageDto::from(message),
    }))
}

/// Delete a message; the author or a holder of `delete-message` may
#[utoipa::path(
    post,
    path = "/api/v1/chat.delete",
    tag = "chat",
    request_body = DeleteMessageRequest,
    responses(
        (status = 200, description = "Message deleted", body = DeletedMessageResponse),
        (status = 400, description = "Unknown message"),
        (status = 403, description = "Not the author and missing delete-message")
    )
)]
pub async fn delete_message(
    State(state): State<ChatApiState>,
    auth: Auth,
    ValidatedJson(req): ValidatedJson<DeleteMessageRequest>,
) -> Result<Json<Success<DeletedMessageResponse>>, ApiError> {
    let repo = state.database.repository();
    let message = repo
        .get_message(&req.msg_id)
        .await
        .map_err(ApiError::from_data)?
        .filter(|m| m.room_id == req.room_id)
        .ok_or_else(|| ApiError::bad_request("error-invalid-message", "Invalid message"))?;

    if message.user_id != auth.user_id() {
        auth.service
            .require_permission(&auth.ctx, PERM_DELETE_MESSAGE)
            .await?;
    }

    let _counting = state.engagement.lock_metric(MetricType::Messages).await;
    if !repo
        .delete_message(&message.id)
        .await
        .map_err(ApiError::from_data)?
    {
        return Err(ApiError::bad_request("error-invalid-message", "Invalid message"));
    }

    let room = repo
        .get_room(&message.room_id)
        .await
        .map_err(ApiError::from_data)?;
    if let Some(room) = room
        && let Err(e) = state.engagement.handle_message_deleted(&message, &room).await
    {
        tracing::warn!(message_id = %message.id, error = %e, "Failed to uncount message");
    }

    Ok(success(DeletedMessageResponse {
        id: message.id,
        ts: chrono::Utc::now().timestamp(),
    }))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use chrono::Utc;
    use serde_json::json;

    use crate::api::server::test_support::TestApp;
    use crate::core::constants::ROLE_USER;
    use crate::data::types::RoomType;

    #[tokio::test]
    async fn test_send_and_delete_update_dashboard() {
        let app = TestApp::new().await;
        let room = app
            .database
            .repository()
            .create_room("general", RoomType::Channel, false)
            .await
            .unwrap();

        let mut ids = Vec::new();
        for text in ["one", "two"] {
            let (status, body) = app
                .post(
                    "/api/v1/chat.sendMessage",
                    app.admin(),
                    json!({ "message": { "rid": room.id, "msg": text } }),
                )
                .await;
            assert_eq!(status, StatusCode::OK, "{}", body);
            ids.push(body["message"]["_id"].as_str().unwrap().to_string());
        }

        let (status, _) = app
            .post(
                "/api/v1/chat.delete",
                app.admin(),
                json!({ "roomId": room.id, "msgId": ids[0] }),
            )
            .await;
        assert_eq!(status, StatusCode::OK);

        let today = Utc::now().date_naive().format("%Y-%m-%d").to_string();
        let (status, body) = app
            .get(
                &format!(
                    "/api/v1/engagement-dashboard/messages/origin?start={}&end={}",
                    today, today
                ),
                app.admin(),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["origins"][0], json!({ "t": "c", "messages": 1 }));
    }

    #[tokio::test]
    async fn test_only_author_or_moderator_deletes() {
        let app = TestApp::new().await;
        let room = app
            .database
            .repository()
            .create_room("general", RoomType::Channel, false)
            .await
            .unwrap();
        let lee = app.user("lee", &[ROLE_USER]).await;
        let max = app.user("max", &[ROLE_USER]).await;

        let (_, body) = app
            .post(
                "/api/v1/chat.sendMessage",
                lee.creds(),
                json!({ "message": { "rid": room.id, "msg": "mine" } }),
            )
            .await;
        let msg_id = body["message"]["_id"].as_str().unwrap().to_string();

        let (status, _) = app
            .post(
                "/api/v1/chat.delete",
                max.creds(),
                json!({ "roomId": room.id, "msgId": msg_id }),
            )
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = app
            .post(
                "/api/v1/chat.delete",
                app.admin(),
                json!({ "roomId": room.id, "msgId": msg_id }),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_send_to_unknown_or_read_only_room() {
        let app = TestApp::new().await;
        let (status, body) = app
            .post(
                "/api/v1/chat.sendMessage",
                app.admin(),
                json!({ "message": { "rid": "nope", "msg": "hi" } }),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["errorType"], "error-invalid-room");

        let announcements = app
            .database
            .repository()
            .create_room("announcements", RoomType::Channel, true)
            .await
            .unwrap();
        let ned = app.user("ned", &[ROLE_USER]).await;
        let (status, body) = app
            .post(
                "/api/v1/chat.sendMessage",
                ned.creds(),
                json!({ "message": { "rid": announcements.id, "msg": "hi" } }),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["errorType"], "error-action-not-allowed");
    }
}
