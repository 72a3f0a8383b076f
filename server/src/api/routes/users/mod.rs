//! User API endpoints

pub mod types;

use std::sync::Arc;

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};

use crate::api::auth::{CreateUser, GenerateToken};
use crate::api::extractors::ValidatedJson;
use crate::api::types::{ApiError, Success, success};
use crate::core::constants::{AUTH_TOKEN_BYTES, ROLE_USER};
use crate::data::TransactionalService;
use crate::data::types::MetricType;
use crate::domain::EngagementService;
use crate::utils::crypto;

use types::{CreateTokenRequest, CreateUserRequest, TokenDto, TokenResponse, UserDto, UserResponse};

/// Shared state for Users API endpoints
#[derive(Clone)]
pub struct UsersApiState {
    pub database: Arc<TransactionalService>,
    pub engagement: Arc<EngagementService>,
}

/// Build Users API routes
pub fn routes(
    database: Arc<TransactionalService>,
    engagement: Arc<EngagementService>,
) -> Router<()> {
    let state = UsersApiState {
        database,
        engagement,
    };

    Router::new()
        .route("/users.create", post(create_user))
        .route("/users.createToken", post(create_token))
        .with_state(state)
}

/// Register a user
#[utoipa::path(
    post,
    path = "/api/v1/users.create",
    tag = "users",
    request_body = CreateUserRequest,
    responses(
        (status = 200, description = "User created", body = UserResponse),
        (status = 400, description = "Invalid or taken username"),
        (status = 403, description = "Missing create-user")
    )
)]
pub async fn create_user(
    State(state): State<UsersApiState>,
    _auth: CreateUser,
    ValidatedJson(req): ValidatedJson<CreateUserRequest>,
) -> Result<Json<Success<UserResponse>>, ApiError> {
    let username = req.username.trim();
    let roles = if req.roles.is_empty() {
        vec![ROLE_USER.to_string()]
    } else {
        req.roles
    };

    let _counting = state.engagement.lock_metric(MetricType::Users).await;
    let user = state
        .database
        .repository()
        .create_user(username, req.name.as_deref(), &roles)
        .await
        .map_err(ApiError::from_data)?
        .ok_or_else(|| {
            ApiError::bad_request(
                "error-field-unavailable",
                format!("{} is already in use :(", username),
            )
        })?;

    if let Err(e) = state.engagement.handle_user_created(&user).await {
        tracing::warn!(user_id = %user.id, error = %e, "Failed to count new user");
    }

    tracing::debug!(user_id = %user.id, username = %user.username, "User created");
    Ok(success(UserResponse {
        user: UserDto::from(user),
    }))
}

/// Issue a personal access token
#[utoipa::path(
    post,
    path = "/api/v1/users.createToken",
    tag = "users",
    request_body = CreateTokenRequest,
    responses(
        (status = 200, description = "Token issued", body = TokenResponse),
        (status = 400, description = "Unknown user"),
        (status = 403, description = "Missing user-generate-access-token")
    )
)]
pub async fn create_token(
    State(state): State<UsersApiState>,
    auth: GenerateToken,
    ValidatedJson(req): ValidatedJson<CreateTokenRequest>,
) -> Result<Json<Success<TokenResponse>>, ApiError> {
    let user_id = req.user_id.unwrap_or_else(|| auth.user_id().to_string());
    let repo = state.database.repository();

    let user = repo
        .get_user(&user_id)
        .await
        .map_err(ApiError::from_data)?
        .ok_or_else(|| ApiError::bad_request("invalid-user", "Invalid user"))?;

    let token = crypto::generate_token(AUTH_TOKEN_BYTES);
    repo.create_token(&user.id, &crypto::hash_token(&token))
        .await
        .map_err(ApiError::from_data)?;

    tracing::debug!(user_id = %user.id, issued_by = %auth.user_id(), "Access token issued");
    Ok(success(TokenResponse {
        data: TokenDto {
            user_id: user.id,
            auth_token: token,
        },
    }))
}
