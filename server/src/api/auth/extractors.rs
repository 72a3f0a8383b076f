//! Authorization extractors for Axum handlers
//!
//! These extractors combine authentication (from middleware) with a global
//! permission check, so a handler never runs for a caller lacking it.
//!
//! # Usage
//!
//! ```no_run
//! # use huddle_server::api::auth::ViewAllTeams;
//! # use huddle_server::api::types::ApiError;
//! pub async fn list_all(auth: ViewAllTeams) -> Result<(), ApiError> {
//!     // auth.ctx - the caller, already checked for `view-all-teams`
//!     Ok(())
//! }
//! ```

use std::marker::PhantomData;
use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::response::{IntoResponse, Response};

use super::context::{AuthContext, AuthService};
use crate::api::types::ApiError;
use crate::core::constants::{
    PERM_CREATE_CHANNEL, PERM_CREATE_GROUP, PERM_CREATE_TEAM, PERM_CREATE_USER,
    PERM_GENERATE_ACCESS_TOKEN, PERM_MANAGE_EMOJI, PERM_VIEW_ALL_TEAMS,
    PERM_VIEW_ENGAGEMENT_DASHBOARD,
};

// ============================================================================
// Permission Markers
// ============================================================================

/// Marker trait for permission requirements
pub trait PermissionLevel: Send + Sync + 'static {
    const PERMISSION: &'static str;
}

macro_rules! permission_marker {
    ($(#[$doc:meta])* $name:ident => $permission:expr) => {
        $(#[$doc])*
        pub struct $name;
        impl PermissionLevel for $name {
            const PERMISSION: &'static str = $permission;
        }
    };
}

permission_marker!(
    /// `view-all-teams`
    ViewAllTeamsPermission => PERM_VIEW_ALL_TEAMS
);
permission_marker!(
    /// `create-team`
    CreateTeamPermission => PERM_CREATE_TEAM
);
permission_marker!(
    /// `manage-emoji`
    ManageEmojiPermission => PERM_MANAGE_EMOJI
);
permission_marker!(
    /// `view-engagement-dashboard`
    EngagementPermission => PERM_VIEW_ENGAGEMENT_DASHBOARD
);
permission_marker!(
    /// `create-user`
    CreateUserPermission => PERM_CREATE_USER
);
permission_marker!(
    /// `user-generate-access-token`
    GenerateTokenPermission => PERM_GENERATE_ACCESS_TOKEN
);
permission_marker!(
    /// `create-c`
    CreateChannelPermission => PERM_CREATE_CHANNEL
);
permission_marker!(
    /// `create-p`
    CreateGroupPermission => PERM_CREATE_GROUP
);

// ============================================================================
// Auth Rejection
// ============================================================================

/// Rejection type for auth extractors
pub enum AuthRejection {
    /// Authorization failed
    Auth(ApiError),
    /// Auth context not available (middleware not applied)
    MissingContext,
}

impl From<ApiError> for AuthRejection {
    fn from(e: ApiError) -> Self {
        Self::Auth(e)
    }
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::Auth(e) => e.into_response(),
            Self::MissingContext => {
                ApiError::internal("Auth context not available").into_response()
            }
        }
    }
}

/// Extract auth context and service from request extensions.
fn extract_auth(parts: &Parts) -> Result<(AuthContext, Arc<AuthService>), AuthRejection> {
    let ctx = parts
        .extensions
        .get::<AuthContext>()
        .cloned()
        .ok_or(AuthRejection::MissingContext)?;

    let service = parts
        .extensions
        .get::<Arc<AuthService>>()
        .cloned()
        .ok_or(AuthRejection::MissingContext)?;

    Ok((ctx, service))
}

// ============================================================================
// Simple Auth Extractor
// ============================================================================

/// Authenticated caller, no permission required
pub struct Auth {
    pub ctx: AuthContext,
    pub service: Arc<AuthService>,
}

impl Auth {
    pub fn user_id(&self) -> &str {
        self.ctx.user_id()
    }
}

impl<S> FromRequestParts<S> for Auth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let (ctx, service) = extract_auth(parts)?;
        Ok(Self { ctx, service })
    }
}

// ============================================================================
// Permission Extractor
// ============================================================================

/// Authenticated caller holding `P::PERMISSION`.
///
/// Rejects with `403 {success: false, error: "unauthorized"}` otherwise.
pub struct Permitted<P: PermissionLevel> {
    pub ctx: AuthContext,
    pub service: Arc<AuthService>,
    _permission: PhantomData<P>,
}

impl<P: PermissionLevel> Permitted<P> {
    pub fn user_id(&self) -> &str {
        self.ctx.user_id()
    }
}

pub type ViewAllTeams = Permitted<ViewAllTeamsPermission>;
pub type CreateTeam = Permitted<CreateTeamPermission>;
pub type ManageEmoji = Permitted<ManageEmojiPermission>;
pub type ViewEngagement = Permitted<EngagementPermission>;
pub type CreateUser = Permitted<CreateUserPermission>;
pub type GenerateToken = Permitted<GenerateTokenPermission>;
pub type CreateChannel = Permitted<CreateChannelPermission>;
pub type CreateGroup = Permitted<CreateGroupPermission>;

impl<S, P> FromRequestParts<S> for Permitted<P>
where
    S: Send + Sync,
    P: PermissionLevel,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let (ctx, service) = extract_auth(parts)?;
        service.require_permission(&ctx, P::PERMISSION).await?;

        Ok(Self {
            ctx,
            service,
            _permission: PhantomData,
        })
    }
}
