//! Authentication middleware

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;
use chrono::Utc;

use super::context::{AuthContext, AuthService};
use super::manager::AuthManager;
use crate::api::types::ApiError;
use crate::core::constants::{
    HEADER_AUTH_TOKEN, HEADER_USER_ID, LOCAL_SESSION_CREDENTIAL, SESSION_CREDENTIAL_LEN,
};
use crate::domain::EngagementService;
use crate::utils::crypto;

/// Shared auth state for middleware
#[derive(Clone)]
pub struct AuthState {
    pub auth_manager: Arc<AuthManager>,
    pub auth_service: Arc<AuthService>,
    pub engagement: Arc<EngagementService>,
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

/// Authentication middleware
///
/// Reads `X-User-Id` and `X-Auth-Token`. With authentication disabled every
/// request runs as the local administrator. Each accepted request counts as
/// session activity for the engagement dashboard.
///
/// Injects into request extensions:
/// - `AuthContext` - the authenticated caller
/// - `Arc<AuthService>` - cached permission checks
pub async fn require_auth(
    State(state): State<AuthState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let service = state.auth_service.clone();

    let (user, credential) = if state.auth_manager.is_enabled() {
        let headers = request.headers();
        let (Some(user_id), Some(token)) = (
            header(headers, HEADER_USER_ID),
            header(headers, HEADER_AUTH_TOKEN),
        ) else {
            return Err(ApiError::unauthenticated());
        };

        let user = service.authenticate(user_id, token).await?.ok_or_else(|| {
            tracing::debug!(user_id, "Rejected invalid credentials");
            ApiError::unauthenticated()
        })?;
        let mut credential = crypto::hash_token(token);
        credential.truncate(SESSION_CREDENTIAL_LEN);
        (user, credential)
    } else {
        let Some(local_id) = state.auth_manager.local_user_id() else {
            return Err(ApiError::unauthenticated());
        };
        let user = state
            .auth_service
            .local_user(local_id)
            .await?
            .ok_or_else(ApiError::unauthenticated)?;
        (user, LOCAL_SESSION_CREDENTIAL.to_string())
    };

    if let Err(e) = state
        .engagement
        .handle_session_activity(&user.id, &credential, Utc::now())
        .await
    {
        tracing::warn!(user_id = %user.id, error = %e, "Failed to record session");
    }

    request.extensions_mut().insert(AuthContext::from_user(&user));
    request.extensions_mut().insert(service);

    Ok(next.run(request).await)
}
