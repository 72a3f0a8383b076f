//! Teams API endpoints

pub mod types;

use std::sync::Arc;

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};

use types::{
    AddMembersRequest, CreateTeamRequest, LeaveTeamRequest, MembersQuery, NamesTeam, PageQuery,
    RemoveMembersRequest, TeamDto, TeamListResponse, TeamMemberDto, TeamMembersResponse,
    TeamResponse, UpdateMemberRequest,
};

use crate::api::auth::{self, Auth};
use crate::api::extractors::{ValidatedJson, ValidatedQuery};
use crate::api::types::{
    ApiError, Empty, PageMeta, Success, page_request, require_body_param, success,
};
use crate::core::config::PaginationConfig;
use crate::core::constants::{PERM_ADD_TEAM_MEMBER, PERM_EDIT_TEAM_MEMBER};
use crate::domain::{CreateTeam, TeamRef, TeamService};

/// Shared state for Teams API endpoints
#[derive(Clone)]
pub struct TeamsApiState {
    pub teams: Arc<TeamService>,
    pub pagination: PaginationConfig,
}

/// Build Teams API routes
pub fn routes(teams: Arc<TeamService>, pagination: PaginationConfig) -> Router<()> {
    let state = TeamsApiState { teams, pagination };

    Router::new()
        .route("/teams.list", get(list_teams))
        .route("/teams.listAll", get(list_all_teams))
        .route("/teams.create", post(create_team))
        .route("/teams.members", get(list_members))
        .route("/teams.addMembers", post(add_members))
        .route("/teams.updateMember", post(update_member))
        .route("/teams.removeMembers", post(remove_members))
        .route("/teams.leave", post(leave_team))
        .with_state(state)
}

/// Team named by a request; `source` is "Body" or "Query"
fn required_team(req: &impl NamesTeam, source: &str) -> Result<TeamRef, ApiError> {
    req.team_ref().ok_or_else(|| {
        ApiError::failure(format!(
            "{} param \"teamId\" or \"teamName\" is required",
            source
        ))
    })
}

/// List teams the caller belongs to
#[utoipa::path(
    get,
    path = "/api/v1/teams.list",
    tag = "teams",
    params(PageQuery),
    responses(
        (status = 200, description = "Caller's teams", body = TeamListResponse),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_teams(
    State(state): State<TeamsApiState>,
    auth: Auth,
    ValidatedQuery(query): ValidatedQuery<PageQuery>,
) -> Result<Json<Success<TeamListResponse>>, ApiError> {
    let page = page_request(&state.pagination, query.offset, query.count);
    let result = state.teams.list(auth.user_id(), page).await?;

    Ok(success(TeamListResponse {
        page: PageMeta::new(page, result.items.len(), result.total),
        teams: result.items.into_iter().map(TeamDto::from).collect(),
    }))
}

/// List every team
#[utoipa::path(
    get,
    path = "/api/v1/teams.listAll",
    tag = "teams",
    params(PageQuery),
    responses(
        (status = 200, description = "All teams", body = TeamListResponse),
        (status = 403, description = "Missing view-all-teams")
    )
)]
pub async fn list_all_teams(
    State(state): State<TeamsApiState>,
    _auth: auth::ViewAllTeams,
    ValidatedQuery(query): ValidatedQuery<PageQuery>,
) -> Result<Json<Success<TeamListResponse>>, ApiError> {
    let page = page_request(&state.pagination, query.offset, query.count);
    let result = state.teams.list_all(page).await?;

    Ok(success(TeamListResponse {
        page: PageMeta::new(page, result.items.len(), result.total),
        teams: result.items.into_iter().map(TeamDto::from).collect(),
    }))
}

/// Create a team with its main room
#[utoipa::path(
    post,
    path = "/api/v1/teams.create",
    tag = "teams",
    request_body = CreateTeamRequest,
    responses(
        (status = 200, description = "Team created", body = TeamResponse),
        (status = 400, description = "Missing name, name taken or unknown members"),
        (status = 403, description = "Missing create-team")
    )
)]
pub async fn create_team(
    State(state): State<TeamsApiState>,
    auth: auth::CreateTeam,
    ValidatedJson(req): ValidatedJson<CreateTeamRequest>,
) -> Result<Json<Success<TeamResponse>>, ApiError> {
    let name = require_body_param(req.name, "name")?;

    let team = state
        .teams
        .create(
            auth.user_id(),
            CreateTeam {
                name,
                team_type: req.team_type,
                members: req.members,
                owner: req.owner,
                read_only: req.room.read_only,
            },
        )
        .await?;

    Ok(success(TeamResponse {
        team: TeamDto::from(team),
    }))
}

/// List a team's members
#[utoipa::path(
    get,
    path = "/api/v1/teams.members",
    tag = "teams",
    params(MembersQuery),
    responses(
        (status = 200, description = "Team members", body = TeamMembersResponse),
        (status = 400, description = "Team not found")
    )
)]
pub async fn list_members(
    State(state): State<TeamsApiState>,
    _auth: Auth,
    ValidatedQuery(query): ValidatedQuery<MembersQuery>,
) -> Result<Json<Success<TeamMembersResponse>>, ApiError> {
    let team = required_team(&query, "Query")?;
    let page = page_request(&state.pagination, query.offset, query.count);
    let result = state.teams.members(&team, page).await?;

    Ok(success(TeamMembersResponse {
        page: PageMeta::new(page, result.items.len(), result.total),
        members: result.items.into_iter().map(TeamMemberDto::from).collect(),
    }))
}

/// Add members to a team
#[utoipa::path(
    post,
    path = "/api/v1/teams.addMembers",
    tag = "teams",
    request_body = AddMembersRequest,
    responses(
        (status = 200, description = "Members added", body = Empty),
        (status = 400, description = "Team not found or unknown users"),
        (status = 403, description = "Missing add-team-member")
    )
)]
pub async fn add_members(
    State(state): State<TeamsApiState>,
    auth: Auth,
    ValidatedJson(req): ValidatedJson<AddMembersRequest>,
) -> Result<Json<Success<Empty>>, ApiError> {
    let team = state.teams.resolve(&required_team(&req, "Body")?).await?;
    auth.service
        .require_team_permission(&auth.ctx, PERM_ADD_TEAM_MEMBER, &team.id)
        .await?;

    let members = req.members.into_iter().map(Into::into).collect();
    state
        .teams
        .add_members(auth.user_id(), &TeamRef::Id(team.id), members)
        .await?;
    Ok(success(Empty {}))
}

/// Replace a member's roles
#[utoipa::path(
    post,
    path = "/api/v1/teams.updateMember",
    tag = "teams",
    request_body = UpdateMemberRequest,
    responses(
        (status = 200, description = "Member updated", body = Empty),
        (status = 400, description = "Team or member not found, or last owner demoted"),
        (status = 403, description = "Missing edit-team-member")
    )
)]
pub async fn update_member(
    State(state): State<TeamsApiState>,
    auth: Auth,
    ValidatedJson(req): ValidatedJson<UpdateMemberRequest>,
) -> Result<Json<Success<Empty>>, ApiError> {
    let team = state.teams.resolve(&required_team(&req, "Body")?).await?;
    auth.service
        .require_team_permission(&auth.ctx, PERM_EDIT_TEAM_MEMBER, &team.id)
        .await?;

    state
        .teams
        .update_member(&TeamRef::Id(team.id), req.member.into())
        .await?;
    Ok(success(Empty {}))
}

/// Remove members from a team
#[utoipa::path(
    post,
    path = "/api/v1/teams.removeMembers",
    tag = "teams",
    request_body = RemoveMembersRequest,
    responses(
        (status = 200, description = "Members removed", body = Empty),
        (status = 400, description = "Team or member not found, or last owner removed"),
        (status = 403, description = "Missing edit-team-member")
    )
)]
pub async fn remove_members(
    State(state): State<TeamsApiState>,
    auth: Auth,
    ValidatedJson(req): ValidatedJson<RemoveMembersRequest>,
) -> Result<Json<Success<Empty>>, ApiError> {
    let team = state.teams.resolve(&required_team(&req, "Body")?).await?;
    auth.service
        .require_team_permission(&auth.ctx, PERM_EDIT_TEAM_MEMBER, &team.id)
        .await?;

    let user_ids: Vec<String> = req.members.into_iter().map(|m| m.user_id).collect();
    state
        .teams
        .remove_members(&TeamRef::Id(team.id), &user_ids)
        .await?;
    Ok(success(Empty {}))
}

/// Leave a team
#[utoipa::path(
    post,
    path = "/api/v1/teams.leave",
    tag = "teams",
    request_body = LeaveTeamRequest,
    responses(
        (status = 200, description = "Left the team", body = Empty),
        (status = 400, description = "Team not found, not a member, or last owner")
    )
)]
pub async fn leave_team(
    State(state): State<TeamsApiState>,
    auth: Auth,
    ValidatedJson(req): ValidatedJson<LeaveTeamRequest>,
) -> Result<Json<Success<Empty>>, ApiError> {
    let team = required_team(&req, "Body")?;
    state.teams.leave(auth.user_id(), &team).await?;
    Ok(success(Empty {}))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::api::server::test_support::TestApp;
    use crate::core::constants::{ROLE_USER, TEAM_ROLE_OWNER};

    #[tokio::test]
    async fn test_create_without_name_creates_nothing() {
        let app = TestApp::new().await;

        let (status, body) = app
            .post("/api/v1/teams.create", app.admin(), json!({ "type": 0 }))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Body param \"name\" is required");

        let (_, list) = app.get("/api/v1/teams.listAll", app.admin()).await;
        assert_eq!(list["total"], 0);
        assert_eq!(list["teams"], json!([]));
    }

    #[tokio::test]
    async fn test_create_and_list() {
        let app = TestApp::new().await;
        let bob = app.user("bob", &[ROLE_USER]).await.row;

        let (status, body) = app
            .post(
                "/api/v1/teams.create",
                app.admin(),
                json!({ "name": "eng", "type": 1, "members": [bob.id] }),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["team"]["name"], "eng");
        assert_eq!(body["team"]["type"], 1);

        let (status, body) = app.get("/api/v1/teams.list?count=10", app.admin()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 1);
        assert_eq!(body["count"], 1);
        assert_eq!(body["offset"], 0);
        assert_eq!(body["teams"][0]["name"], "eng");

        let (status, body) = app
            .post(
                "/api/v1/teams.create",
                app.admin(),
                json!({ "name": "eng" }),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["errorType"], "team-name-already-exists");
    }

    #[tokio::test]
    async fn test_list_all_requires_permission() {
        let app = TestApp::new().await;
        let carol = app.user("carol", &[ROLE_USER]).await;

        let (status, body) = app.get("/api/v1/teams.listAll", carol.creds()).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body, json!({ "success": false, "error": "unauthorized" }));
    }

    #[tokio::test]
    async fn test_requires_login() {
        let app = TestApp::new().await;
        let (status, body) = app.get("/api/v1/teams.list", None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["status"], "error");
        assert_eq!(body["message"], "You must be logged in to do this.");

        let bad = Some((app.admin.user_id.clone(), "not-the-token".to_string()));
        let (status, _) = app.get("/api/v1/teams.list", bad).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_membership_flow() {
        let app = TestApp::new().await;
        let dave_user = app.user("dave", &[ROLE_USER]).await;
        let erin = app.user("erin", &[ROLE_USER]).await.row;
        let dave = &dave_user.row;
        let dave_creds = dave_user.creds();

        let (status, _) = app
            .post(
                "/api/v1/teams.create",
                dave_creds.clone(),
                json!({ "name": "ops" }),
            )
            .await;
        assert_eq!(status, StatusCode::OK);

        // Team owner holds add-team-member through the team role
        let (status, body) = app
            .post(
                "/api/v1/teams.addMembers",
                dave_creds.clone(),
                json!({ "teamName": "ops", "members": [{ "userId": erin.id }] }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{}", body);

        let (_, body) = app
            .get("/api/v1/teams.members?teamName=ops", dave_creds.clone())
            .await;
        assert_eq!(body["total"], 2);
        assert_eq!(body["members"][0]["user"]["_id"], dave.id);
        assert_eq!(body["members"][0]["roles"], json!([TEAM_ROLE_OWNER]));
        assert_eq!(body["members"][1]["roles"], json!(["member"]));

        let (status, body) = app
            .post(
                "/api/v1/teams.removeMembers",
                dave_creds.clone(),
                json!({ "teamName": "ops", "members": [{ "userId": dave.id }] }),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["errorType"], "last-owner-can-not-be-removed");

        let (status, _) = app
            .post(
                "/api/v1/teams.updateMember",
                dave_creds.clone(),
                json!({ "teamName": "ops", "member": { "userId": erin.id, "roles": ["owner"] } }),
            )
            .await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = app
            .post(
                "/api/v1/teams.leave",
                dave_creds,
                json!({ "teamName": "ops" }),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_add_members_denied_for_non_owner() {
        let app = TestApp::new().await;
        let frank = app.user("frank", &[ROLE_USER]).await;
        app.post(
            "/api/v1/teams.create",
            app.admin(),
            json!({ "name": "sales" }),
        )
        .await;

        let (status, _) = app
            .post(
                "/api/v1/teams.addMembers",
                frank.creds(),
                json!({ "teamName": "sales", "members": [{ "userId": frank.row.id }] }),
            )
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_unknown_team_and_missing_reference() {
        let app = TestApp::new().await;

        let (status, body) = app
            .post("/api/v1/teams.leave", app.admin(), json!({ "teamId": "nope" }))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["errorType"], "team-does-not-exist");

        let (status, body) = app.post("/api/v1/teams.leave", app.admin(), json!({})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["error"],
            "Body param \"teamId\" or \"teamName\" is required"
        );
    }
}
