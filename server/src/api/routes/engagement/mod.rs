//! Engagement dashboard API endpoints
//!
//! Every route requires `view-engagement-dashboard`.

pub mod types;

use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};

use types::{
    ChannelDto, DayQuery, HoursResponse, MessagesSentResponse, MonthResponse, NewUsersResponse,
    OriginDto, OriginResponse, RangeQuery, TopChannelsResponse, WeekResponse,
};

use crate::api::auth::ViewEngagement;
use crate::api::extractors::ValidatedQuery;
use crate::api::types::{ApiError, Success, success};
use crate::core::constants::TOP_CHANNELS_LIMIT;
use crate::domain::EngagementService;

/// Shared state for engagement dashboard endpoints
#[derive(Clone)]
pub struct EngagementApiState {
    pub engagement: Arc<EngagementService>,
}

/// Build engagement dashboard routes
pub fn routes(engagement: Arc<EngagementService>) -> Router<()> {
    let state = EngagementApiState { engagement };

    Router::new()
        .route("/messages/messages-sent", get(messages_sent))
        .route("/messages/origin", get(messages_origin))
        .route(
            "/messages/top-five-popular-channels",
            get(top_five_popular_channels),
        )
        .route("/users/new-users", get(new_users))
        .route("/users/active-users", get(active_users))
        .route("/users/chat-busier/hourly-data", get(busiest_hours))
        .route("/users/chat-busier/weekly-data", get(busiest_days))
        .route(
            "/users/users-by-time-of-the-day-in-a-week",
            get(users_by_time_of_day),
        )
        .with_state(state)
}

/// Messages per day against the prior period
#[utoipa::path(
    get,
    path = "/api/v1/engagement-dashboard/messages/messages-sent",
    tag = "engagement-dashboard",
    params(RangeQuery),
    responses(
        (status = 200, description = "Messages per day", body = MessagesSentResponse),
        (status = 400, description = "Missing or invalid dates"),
        (status = 403, description = "Missing view-engagement-dashboard")
    )
)]
pub async fn messages_sent(
    State(state): State<EngagementApiState>,
    _auth: ViewEngagement,
    ValidatedQuery(query): ValidatedQuery<RangeQuery>,
) -> Result<Json<Success<MessagesSentResponse>>, ApiError> {
    let summary = state.engagement.messages_sent(query.window()?).await?;
    Ok(success(summary.into()))
}

/// Messages per room type
#[utoipa::path(
    get,
    path = "/api/v1/engagement-dashboard/messages/origin",
    tag = "engagement-dashboard",
    params(RangeQuery),
    responses(
        (status = 200, description = "Messages per room type", body = OriginResponse),
        (status = 403, description = "Missing view-engagement-dashboard")
    )
)]
pub async fn messages_origin(
    State(state): State<EngagementApiState>,
    _auth: ViewEngagement,
    ValidatedQuery(query): ValidatedQuery<RangeQuery>,
) -> Result<Json<Success<OriginResponse>>, ApiError> {
    let origins = state.engagement.messages_origin(query.window()?).await?;
    Ok(success(OriginResponse {
        origins: origins
            .into_iter()
            .map(|(t, messages)| OriginDto { t, messages })
            .collect(),
    }))
}

/// Busiest rooms
#[utoipa::path(
    get,
    path = "/api/v1/engagement-dashboard/messages/top-five-popular-channels",
    tag = "engagement-dashboard",
    params(RangeQuery),
    responses(
        (status = 200, description = "Top rooms by messages", body = TopChannelsResponse),
        (status = 403, description = "Missing view-engagement-dashboard")
    )
)]
pub async fn top_five_popular_channels(
    State(state): State<EngagementApiState>,
    _auth: ViewEngagement,
    ValidatedQuery(query): ValidatedQuery<RangeQuery>,
) -> Result<Json<Success<TopChannelsResponse>>, ApiError> {
    let rooms = state
        .engagement
        .top_channels(query.window()?, TOP_CHANNELS_LIMIT)
        .await?;
    Ok(success(TopChannelsResponse {
        channels: rooms.into_iter().map(ChannelDto::from).collect(),
    }))
}

/// Registrations per day against the prior period
#[utoipa::path(
    get,
    path = "/api/v1/engagement-dashboard/users/new-users",
    tag = "engagement-dashboard",
    params(RangeQuery),
    responses(
        (status = 200, description = "New users per day", body = NewUsersResponse),
        (status = 403, description = "Missing view-engagement-dashboard")
    )
)]
pub async fn new_users(
    State(state): State<EngagementApiState>,
    _auth: ViewEngagement,
    ValidatedQuery(query): ValidatedQuery<RangeQuery>,
) -> Result<Json<Success<NewUsersResponse>>, ApiError> {
    let summary = state.engagement.new_users(query.window()?).await?;
    Ok(success(summary.into()))
}

/// Distinct active users per day
#[utoipa::path(
    get,
    path = "/api/v1/engagement-dashboard/users/active-users",
    tag = "engagement-dashboard",
    params(RangeQuery),
    responses(
        (status = 200, description = "Active users per day", body = MonthResponse),
        (status = 403, description = "Missing view-engagement-dashboard")
    )
)]
pub async fn active_users(
    State(state): State<EngagementApiState>,
    _auth: ViewEngagement,
    ValidatedQuery(query): ValidatedQuery<RangeQuery>,
) -> Result<Json<Success<MonthResponse>>, ApiError> {
    let month = state.engagement.active_users(query.window()?).await?;
    Ok(success(MonthResponse { month }))
}

/// Sessions by 2-hour bucket in the 24 hours before `start`
#[utoipa::path(
    get,
    path = "/api/v1/engagement-dashboard/users/chat-busier/hourly-data",
    tag = "engagement-dashboard",
    params(DayQuery),
    responses(
        (status = 200, description = "Sessions per hour bucket", body = HoursResponse),
        (status = 403, description = "Missing view-engagement-dashboard")
    )
)]
pub async fn busiest_hours(
    State(state): State<EngagementApiState>,
    _auth: ViewEngagement,
    ValidatedQuery(query): ValidatedQuery<DayQuery>,
) -> Result<Json<Success<HoursResponse>>, ApiError> {
    let hours = state.engagement.busiest_hours(query.until()?).await?;
    Ok(success(HoursResponse { hours }))
}

/// Sessions per day in the week ending on `start`
#[utoipa::path(
    get,
    path = "/api/v1/engagement-dashboard/users/chat-busier/weekly-data",
    tag = "engagement-dashboard",
    params(DayQuery),
    responses(
        (status = 200, description = "Sessions per day", body = MonthResponse),
        (status = 403, description = "Missing view-engagement-dashboard")
    )
)]
pub async fn busiest_days(
    State(state): State<EngagementApiState>,
    _auth: ViewEngagement,
    ValidatedQuery(query): ValidatedQuery<DayQuery>,
) -> Result<Json<Success<MonthResponse>>, ApiError> {
    let month = state.engagement.busiest_days(query.day()?).await?;
    Ok(success(MonthResponse { month }))
}

/// Sessions per (day, hour)
#[utoipa::path(
    get,
    path = "/api/v1/engagement-dashboard/users/users-by-time-of-the-day-in-a-week",
    tag = "engagement-dashboard",
    params(RangeQuery),
    responses(
        (status = 200, description = "Sessions per day and hour", body = WeekResponse),
        (status = 403, description = "Missing view-engagement-dashboard")
    )
)]
pub async fn users_by_time_of_day(
    State(state): State<EngagementApiState>,
    _auth: ViewEngagement,
    ValidatedQuery(query): ValidatedQuery<RangeQuery>,
) -> Result<Json<Success<WeekResponse>>, ApiError> {
    let week = state
        .engagement
        .users_by_time_of_day(query.window()?)
        .await?;
    Ok(success(WeekResponse { week }))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use chrono::{NaiveDate, NaiveTime, Utc};
    use serde_json::json;

    use crate::api::server::test_support::TestApp;
    use crate::core::constants::ROLE_USER;
    use crate::data::types::{RoomType, SessionRow};

    fn ts(y: i32, m: u32, d: u32, hour: u32) -> i64 {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_time(NaiveTime::from_hms_opt(hour, 0, 0).unwrap())
            .and_utc()
            .timestamp()
    }

    async fn seed_messages(app: &TestApp) {
        let repo = app.database.repository();
        let general = repo
            .create_room("general", RoomType::Channel, false)
            .await
            .unwrap();
        let secret = repo
            .create_room("secret", RoomType::Private, false)
            .await
            .unwrap();
        let support = repo
            .create_room("support", RoomType::Livechat, false)
            .await
            .unwrap();
        let user = &app.admin.user_id;

        for (room, day, n) in [(&general, 13, 2), (&general, 14, 3), (&secret, 14, 1), (&support, 14, 5)] {
            for i in 0..n {
                repo.insert_message(&room.id, user, "hi", ts(2024, 3, day, 9 + i))
                    .await
                    .unwrap();
            }
        }
    }

    #[tokio::test]
    async fn test_messages_sent_report() {
        let app = TestApp::new().await;
        seed_messages(&app).await;

        let (status, body) = app
            .get(
                "/api/v1/engagement-dashboard/messages/messages-sent?start=2024-03-08&end=2024-03-14",
                app.admin(),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{}", body);
        assert_eq!(body["success"], true);
        assert_eq!(body["days"].as_array().unwrap().len(), 7);
        assert_eq!(body["days"][6], json!({ "day": "2024-03-14", "messages": 4 }));
        assert_eq!(body["period"], json!({ "count": 6, "variation": 6 }));
        assert_eq!(body["yesterday"], json!({ "count": 2, "variation": 2 }));
    }

    #[tokio::test]
    async fn test_origin_and_top_channels() {
        let app = TestApp::new().await;
        seed_messages(&app).await;
        let range = "start=2024-03-08&end=2024-03-14";

        let (_, body) = app
            .get(
                &format!("/api/v1/engagement-dashboard/messages/origin?{}", range),
                app.admin(),
            )
            .await;
        assert_eq!(
            body["origins"],
            json!([
                { "t": "c", "messages": 5 },
                { "t": "p", "messages": 1 },
                { "t": "d", "messages": 0 }
            ])
        );

        let (_, body) = app
            .get(
                &format!(
                    "/api/v1/engagement-dashboard/messages/top-five-popular-channels?{}",
                    range
                ),
                app.admin(),
            )
            .await;
        let channels = body["channels"].as_array().unwrap();
        assert_eq!(channels.len(), 2);
        assert_eq!(channels[0]["name"], "general");
        assert_eq!(channels[0]["messages"], 5);
    }

    #[tokio::test]
    async fn test_session_reports() {
        let app = TestApp::new().await;
        let analytics = app.database.analytics();
        for (id, day, hour) in [("s1", 12, 8), ("s2", 12, 9), ("s3", 13, 15)] {
            analytics
                .open_session(&SessionRow {
                    user_id: app.admin.user_id.clone(),
                    session_id: id.to_string(),
                    year: 2024,
                    month: 3,
                    day,
                    login_at: ts(2024, 3, day, hour),
                    closed_at: None,
                    device_type: "browser".to_string(),
                })
                .await
                .unwrap();
        }

        let (_, body) = app
            .get(
                "/api/v1/engagement-dashboard/users/chat-busier/hourly-data?start=2024-03-12",
                app.admin(),
            )
            .await;
        let hours = body["hours"].as_array().unwrap();
        assert_eq!(hours.len(), 12);
        assert!(hours.contains(&json!({ "hour": 8, "users": 2 })));

        let (_, body) = app
            .get(
                "/api/v1/engagement-dashboard/users/chat-busier/hourly-data?start=2024-03-13T09:00:00Z",
                app.admin(),
            )
            .await;
        let hours = body["hours"].as_array().unwrap();
        assert!(hours.contains(&json!({ "hour": 8, "users": 1 })));
        assert!(hours.contains(&json!({ "hour": 14, "users": 0 })));

        let (_, body) = app
            .get(
                "/api/v1/engagement-dashboard/users/chat-busier/weekly-data?start=2024-03-14",
                app.admin(),
            )
            .await;
        assert_eq!(body["month"].as_array().unwrap().len(), 7);

        let (_, body) = app
            .get(
                "/api/v1/engagement-dashboard/users/active-users?start=2024-03-12&end=2024-03-13",
                app.admin(),
            )
            .await;
        assert_eq!(
            body["month"],
            json!([
                { "year": 2024, "month": 3, "day": 12, "users": 1 },
                { "year": 2024, "month": 3, "day": 13, "users": 1 }
            ])
        );

        let (_, body) = app
            .get(
                "/api/v1/engagement-dashboard/users/users-by-time-of-the-day-in-a-week?start=2024-03-12&end=2024-03-13",
                app.admin(),
            )
            .await;
        assert_eq!(body["week"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_authenticated_requests_count_as_active_users() {
        let app = TestApp::new().await;
        let lee = app.user("lee", &[ROLE_USER]).await;

        let (status, _) = app.get("/api/v1/teams.list", lee.creds()).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = app.get("/api/v1/teams.list", lee.creds()).await;
        assert_eq!(status, StatusCode::OK);

        let today = Utc::now().date_naive().format("%Y-%m-%d").to_string();
        let (status, body) = app
            .get(
                &format!(
                    "/api/v1/engagement-dashboard/users/active-users?start={}&end={}",
                    today, today
                ),
                app.admin(),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        let month = body["month"].as_array().unwrap();
        assert_eq!(month.len(), 1);
        // lee plus the admin making this request
        assert_eq!(month[0]["users"], 2);

        let (_, body) = app
            .get(
                &format!(
                    "/api/v1/engagement-dashboard/users/chat-busier/weekly-data?start={}",
                    today
                ),
                app.admin(),
            )
            .await;
        assert_eq!(body["month"][6]["users"], 2);
    }

    #[tokio::test]
    async fn test_requires_dashboard_permission_and_dates() {
        let app = TestApp::new().await;
        let hank = app.user("hank", &[ROLE_USER]).await;

        let (status, _) = app
            .get(
                "/api/v1/engagement-dashboard/users/new-users?start=2024-03-08&end=2024-03-14",
                hank.creds(),
            )
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, body) = app
            .get(
                "/api/v1/engagement-dashboard/users/new-users?start=2024-03-08",
                app.admin(),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "The \"end\" query parameter is required");

        let (status, _) = app
            .get(
                "/api/v1/engagement-dashboard/users/new-users?start=2024-03-14&end=2024-03-08",
                app.admin(),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_rejects_out_of_range_dates() {
        let app = TestApp::new().await;

        let (status, body) = app
            .get(
                "/api/v1/engagement-dashboard/messages/messages-sent?start=0001-01-01&end=0002-12-31",
                app.admin(),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["errorType"], "error-invalid-date");

        let (status, _) = app
            .get(
                "/api/v1/engagement-dashboard/users/chat-busier/hourly-data?start=0001-01-01",
                app.admin(),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = app
            .get(
                "/api/v1/engagement-dashboard/messages/messages-sent?start=1970-01-01&end=9999-12-31",
                app.admin(),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
    }
}
