//! Request and response types for team endpoints

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::api::types::PageMeta;
use crate::data::types::{TeamMemberWithUser, TeamRow, TeamType};
use crate::domain::{MemberRoles, TeamRef};

// ============================================================================
// Requests
// ============================================================================

#[derive(Debug, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    pub offset: Option<u32>,
    #[validate(range(min = 1, message = "count must be at least 1"))]
    pub count: Option<u32>,
}

#[derive(Debug, Deserialize, Validate, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct MembersQuery {
    pub team_id: Option<String>,
    pub team_name: Option<String>,
    pub offset: Option<u32>,
    #[validate(range(min = 1, message = "count must be at least 1"))]
    pub count: Option<u32>,
}

/// Main room options for a new team
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TeamRoomOptions {
    #[serde(default)]
    pub read_only: bool,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateTeamRequest {
    pub name: Option<String>,
    /// 0 public, 1 private
    #[serde(rename = "type", default)]
    #[schema(value_type = i64)]
    pub team_type: TeamType,
    #[serde(default)]
    pub members: Vec<String>,
    #[serde(default)]
    pub room: TeamRoomOptions,
    pub owner: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MemberRolesRequest {
    #[validate(length(min = 1, message = "userId must not be empty"))]
    pub user_id: String,
    #[serde(default)]
    pub roles: Vec<String>,
}

impl From<MemberRolesRequest> for MemberRoles {
    fn from(m: MemberRolesRequest) -> Self {
        Self {
            user_id: m.user_id,
            roles: m.roles,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddMembersRequest {
    pub team_id: Option<String>,
    pub team_name: Option<String>,
    #[validate(length(min = 1, message = "members must not be empty"), nested)]
    pub members: Vec<MemberRolesRequest>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMemberRequest {
    pub team_id: Option<String>,
    pub team_name: Option<String>,
    #[validate(nested)]
    pub member: MemberRolesRequest,
}

#[derive(Debug, Deserialize, Serialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MemberRef {
    #[validate(length(min = 1, message = "userId must not be empty"))]
    pub user_id: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RemoveMembersRequest {
    pub team_id: Option<String>,
    pub team_name: Option<String>,
    #[validate(length(min = 1, message = "members must not be empty"), nested)]
    pub members: Vec<MemberRef>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeaveTeamRequest {
    pub team_id: Option<String>,
    pub team_name: Option<String>,
}

/// Requests that name a team by id or name
pub trait NamesTeam {
    fn team_params(&self) -> (Option<String>, Option<String>);

    fn team_ref(&self) -> Option<TeamRef> {
        let (id, name) = self.team_params();
        TeamRef::from_params(id, name)
    }
}

macro_rules! names_team {
    ($($ty:ty),*) => {
        $(impl NamesTeam for $ty {
            fn team_params(&self) -> (Option<String>, Option<String>) {
                (self.team_id.clone(), self.team_name.clone())
            }
        })*
    };
}

names_team!(
    MembersQuery,
    AddMembersRequest,
    UpdateMemberRequest,
    RemoveMembersRequest,
    LeaveTeamRequest
);

// ============================================================================
// Responses
// ============================================================================

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TeamDto {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub team_type: i64,
    pub room_id: String,
    pub created_by: String,
    pub created_at: i64,
    #[serde(rename = "_updatedAt")]
    pub updated_at: i64,
}

impl From<TeamRow> for TeamDto {
    fn from(row: TeamRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            team_type: row.team_type.as_i64(),
            room_id: row.room_id,
            created_by: row.created_by,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MemberUserDto {
    #[serde(rename = "_id")]
    pub id: String,
    pub username: String,
    pub name: Option<String>,
    pub status: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TeamMemberDto {
    pub user: MemberUserDto,
    pub roles: Vec<String>,
    pub created_by: String,
    pub created_at: i64,
}

impl From<TeamMemberWithUser> for TeamMemberDto {
    fn from(m: TeamMemberWithUser) -> Self {
        Self {
            user: MemberUserDto {
                id: m.user_id,
                username: m.username,
                name: m.name,
                status: m.status,
            },
            roles: m.roles,
            created_by: m.created_by,
            created_at: m.created_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TeamListResponse {
    pub teams: Vec<TeamDto>,
    #[serde(flatten)]
    pub page: PageMeta,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TeamMembersResponse {
    pub members: Vec<TeamMemberDto>,
    #[serde(flatten)]
    pub page: PageMeta,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TeamResponse {
    pub team: TeamDto,
}
