//! OpenAPI document and Swagger UI

use axum::http::header;
use axum::response::{Html, IntoResponse, Json};
use utoipa::OpenApi;

use crate::api::routes::{chat, emoji_custom, engagement, health, rooms, teams, users};
use crate::api::types::{Empty, PageMeta};
use crate::data::types::{DayHourUsers, DayUsers, HourUsers, RoomType};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Huddle API",
        version = env!("CARGO_PKG_VERSION"),
        description = "Team chat server with engagement analytics"
    ),
    tags(
        (name = "health", description = "Health check endpoint"),
        (name = "teams", description = "Teams and team membership"),
        (name = "emoji-custom", description = "Custom emoji"),
        (name = "engagement-dashboard", description = "Message, user and session analytics"),
        (name = "users", description = "User registration and access tokens"),
        (name = "rooms", description = "Channels and private groups"),
        (name = "chat", description = "Messages")
    ),
    paths(
        // Health
        health::health,
        // Teams
        teams::list_teams,
        teams::list_all_teams,
        teams::create_team,
        teams::list_members,
        teams::add_members,
        teams::update_member,
        teams::remove_members,
        teams::leave_team,
        // Custom emoji
        emoji_custom::list_emoji,
        emoji_custom::create_emoji,
        emoji_custom::delete_emoji,
        // Engagement dashboard
        engagement::messages_sent,
        engagement::messages_origin,
        engagement::top_five_popular_channels,
        engagement::new_users,
        engagement::active_users,
        engagement::busiest_hours,
        engagement::busiest_days,
        engagement::users_by_time_of_day,
        // Users
        users::create_user,
        users::create_token,
        // Rooms
        rooms::create_channel,
        rooms::create_group,
        // Chat
        chat::send_message,
        chat::delete_message,
    ),
    components(schemas(
        // API types
        Empty,
        PageMeta,
        RoomType,
        // Health
        health::HealthResponse,
        // Teams
        teams::types::TeamRoomOptions,
        teams::types::CreateTeamRequest,
        teams::types::MemberRolesRequest,
        teams::types::AddMembersRequest,
        teams::types::UpdateMemberRequest,
        teams::types::MemberRef,
        teams::types::RemoveMembersRequest,
        teams::types::LeaveTeamRequest,
        teams::types::TeamDto,
        teams::types::MemberUserDto,
        teams::types::TeamMemberDto,
        teams::types::TeamListResponse,
        teams::types::TeamMembersResponse,
        teams::types::TeamResponse,
        // Custom emoji
        emoji_custom::types::CreateEmojiRequest,
        emoji_custom::types::DeleteEmojiRequest,
        emoji_custom::types::EmojiDto,
        emoji_custom::types::EmojiUpdates,
        emoji_custom::types::ListEmojiResponse,
        emoji_custom::types::EmojiResponse,
        // Engagement dashboard
        engagement::types::DeltaDto,
        engagement::types::DayMessages,
        engagement::types::DayNewUsers,
        engagement::types::MessagesSentResponse,
        engagement::types::NewUsersResponse,
        engagement::types::OriginDto,
        engagement::types::OriginResponse,
        engagement::types::ChannelDto,
        engagement::types::TopChannelsResponse,
        engagement::types::MonthResponse,
        engagement::types::HoursResponse,
        engagement::types::WeekResponse,
        DayUsers,
        HourUsers,
        DayHourUsers,
        // Users
        users::types::CreateUserRequest,
        users::types::CreateTokenRequest,
        users::types::UserDto,
        users::types::UserResponse,
        users::types::TokenDto,
        users::types::TokenResponse,
        // Rooms
        rooms::types::CreateRoomRequest,
        rooms::types::RoomDto,
        rooms::types::ChannelResponse,
        rooms::types::GroupResponse,
        // Chat
        chat::types::OutgoingMessage,
        chat::types::SendMessageRequest,
        chat::types::DeleteMessageRequest,
        chat::types::MessageDto,
        chat::types::MessageResponse,
        chat::types::DeletedMessageResponse,
    ))
)]
pub struct ApiDoc;

/// Serve the OpenAPI JSON document
pub async fn openapi_json() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/json")],
        Json(ApiDoc::openapi()),
    )
}

/// Serve Swagger UI from CDN
pub async fn swagger_ui_html() -> Html<&'static str> {
    Html(SWAGGER_UI_HTML)
}

const SWAGGER_UI_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Huddle API Documentation</title>
    <link rel="stylesheet" type="text/css" href="https://unpkg.com/swagger-ui-dist@5/swagger-ui.css">
    <style>
        html { box-sizing: border-box; overflow-y: scroll; }
        *, *:before, *:after { box-sizing: inherit; }
        body { margin: 0; background: #fafafa; }
    </style>
</head>
<body>
    <div id="swagger-ui"></div>
    <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-bundle.js"></script>
    <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-standalone-preset.js"></script>
    <script>
        window.onload = () => {
            window.ui = SwaggerUIBundle({
                url: "/api/openapi.json",
                dom_id: '#swagger-ui',
                presets: [
                    SwaggerUIBundle.presets.apis,
                    SwaggerUIStandalonePreset
                ],
                layout: "StandaloneLayout",
                deepLinking: true,
                showExtensions: true,
                showCommonExtensions: true
            });
        };
    </script>
</body>
</html>"#;
