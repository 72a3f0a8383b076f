//! Channel and private group creation

pub mod types;

use std::sync::Arc;

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};

use crate::api::auth::{CreateChannel, CreateGroup};
use crate::api::extractors::ValidatedJson;
use crate::api::types::{ApiError, Success, success};
use crate::data::TransactionalService;
use crate::data::types::{RoomRow, RoomType};

use types::{ChannelResponse, CreateRoomRequest, GroupResponse, RoomDto};

#[derive(Clone)]
pub struct RoomsApiState {
    pub database: Arc<TransactionalService>,
}

pub fn routes(database: Arc<TransactionalService>) -> Router<()> {
    let state = RoomsApiState { database };

    Router::new()
        .route("/channels.create", post(create_channel))
        .route("/groups.create", post(create_group))
        .with_state(state)
}

async fn create_room(
    state: &RoomsApiState,
    req: &CreateRoomRequest,
    room_type: RoomType,
    created_by: &str,
) -> Result<RoomRow, ApiError> {
    let room = state
        .database
        .repository()
        .create_room(req.name.trim(), room_type, req.read_only)
        .await
        .map_err(ApiError::from_data)?;
    tracing::debug!(room_id = %room.id, t = room_type.as_str(), created_by, "Room created");
    Ok(room)
}

/// Create a public channel
#[utoipa::path(
    post,
    path = "/api/v1/channels.create",
    tag = "rooms",
    request_body = CreateRoomRequest,
    responses(
        (status = 200, description = "Channel created", body = ChannelResponse),
        (status = 403, description = "Missing create-c")
    )
)]
pub async fn create_channel(
    State(state): State<RoomsApiState>,
    auth: CreateChannel,
    ValidatedJson(req): ValidatedJson<CreateRoomRequest>,
) -> Result<Json<Success<ChannelResponse>>, ApiError> {
    let room = create_room(&state, &req, RoomType::Channel, auth.user_id()).await?;
    Ok(success(ChannelResponse {
        channel: RoomDto::from(room),
    }))
}

/// Create a private group
#[utoipa::path(
    post,
    path = "/api/v1/groups.create",
    tag = "rooms",
    request_body = CreateRoomRequest,
    responses(
        (status = 200, description = "Group created", body = GroupResponse),
        (status = 403, description = "Missing create-p")
    )
)]
pub async fn create_group(
    State(state): State<RoomsApiState>,
    auth: CreateGroup,
    ValidatedJson(req): ValidatedJson<CreateRoomRequest>,
) -> Result<Json<Success<GroupResponse>>, ApiError> {
    let room = create_room(&state, &req, RoomType::Private, auth.user_id()).await?;
    Ok(success(GroupResponse {
        group: RoomDto::from(room),
    }))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::api::server::test_support::TestApp;

    #[tokio::test]
    async fn test_create_channel_and_group() {
        let app = TestApp::new().await;
        let kim = app.user("kim", &["user"]).await;

        let (status, body) = app
            .post(
                "/api/v1/channels.create",
                kim.creds(),
                json!({ "name": "general" }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{}", body);
        assert_eq!(body["channel"]["t"], "c");
        assert_eq!(body["channel"]["ro"], false);

        let (status, body) = app
            .post(
                "/api/v1/groups.create",
                kim.creds(),
                json!({ "name": "secret", "readOnly": true }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{}", body);
        assert_eq!(body["group"]["t"], "p");
        assert_eq!(body["group"]["ro"], true);
    }

    #[tokio::test]
    async fn test_create_channel_rejects_empty_name() {
        let app = TestApp::new().await;
        let (status, body) = app
            .post("/api/v1/channels.create", app.admin(), json!({ "name": "" }))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn test_guest_cannot_create_rooms() {
        let app = TestApp::new().await;
        let guest = app.user("guest", &["anonymous"]).await;
        let (status, _) = app
            .post(
                "/api/v1/channels.create",
                guest.creds(),
                json!({ "name": "general" }),
            )
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }
}
