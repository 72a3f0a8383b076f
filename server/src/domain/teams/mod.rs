//! Teams: a named set of members around a main room
//!
//! Teams are addressed by id or by unique name. Every team keeps at least one
//! member with the `owner` role; removals and demotions that would break that
//! are rejected.

use std::sync::Arc;

use thiserror::Error;

use crate::core::constants::TEAM_ROLE_MEMBER;
use crate::data::types::{
    CreateTeamResult, LastOwnerResult, NewTeam, PageRequest, Paged, TeamMemberWithUser, TeamRow,
    TeamType,
};
use crate::data::{DataError, TransactionalService};

#[derive(Error, Debug)]
pub enum TeamError {
    #[error("Team name already exists")]
    NameTaken,
    #[error("Invalid user: {}", .0.join(", "))]
    InvalidUser(Vec<String>),
    #[error("Team does not exist")]
    NotFound,
    #[error("The last owner can not be removed from the team")]
    LastOwner,
    #[error(transparent)]
    Data(#[from] DataError),
}

impl TeamError {
    /// Stable code reported to clients as `errorType`
    pub fn error_type(&self) -> Option<&'static str> {
        match self {
            Self::NameTaken => Some("team-name-already-exists"),
            Self::InvalidUser(_) => Some("invalid-user"),
            Self::NotFound => Some("team-does-not-exist"),
            Self::LastOwner => Some("last-owner-can-not-be-removed"),
            Self::Data(_) => None,
        }
    }
}

/// How a request names a team
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TeamRef {
    Id(String),
    Name(String),
}

impl TeamRef {
    /// Prefer a non-empty id, then a non-empty name
    pub fn from_params(id: Option<String>, name: Option<String>) -> Option<Self> {
        let non_empty = |s: Option<String>| s.filter(|v| !v.trim().is_empty());
        non_empty(id)
            .map(Self::Id)
            .or_else(|| non_empty(name).map(Self::Name))
    }
}

/// Input for [`TeamService::create`]
#[derive(Debug, Clone, Default)]
pub struct CreateTeam {
    pub name: String,
    pub team_type: TeamType,
    /// Initial members besides the owner
    pub members: Vec<String>,
    /// Defaults to the creator
    pub owner: Option<String>,
    /// Main room is read-only
    pub read_only: bool,
}

/// A member and the roles they should hold
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberRoles {
    pub user_id: String,
    pub roles: Vec<String>,
}

pub struct TeamService {
    database: Arc<TransactionalService>,
}

impl TeamService {
    pub fn new(database: Arc<TransactionalService>) -> Self {
        Self { database }
    }

    /// Teams `user_id` belongs to, by name
    pub async fn list(&self, user_id: &str, page: PageRequest) -> Result<Paged<TeamRow>, TeamError> {
        Ok(self
            .database
            .repository()
            .list_teams_for_user(user_id, page)
            .await?)
    }

    pub async fn list_all(&self, page: PageRequest) -> Result<Paged<TeamRow>, TeamError> {
        Ok(self.database.repository().list_all_teams(page).await?)
    }

    /// Create a team with its main room, owner and members
    pub async fn create(&self, creator: &str, input: CreateTeam) -> Result<TeamRow, TeamError> {
        let owner = input.owner.as_deref().unwrap_or(creator);
        let team = NewTeam {
            name: input.name.trim(),
            team_type: input.team_type,
            owner_id: owner,
            member_ids: &input.members,
            created_by: creator,
            read_only: input.read_only,
        };

        match self.database.repository().create_team(&team).await? {
            CreateTeamResult::Created(row) => {
                tracing::debug!(team_id = %row.id, name = %row.name, "Team created");
                Ok(row)
            }
            CreateTeamResult::NameTaken => Err(TeamError::NameTaken),
            CreateTeamResult::UnknownUsers(ids) => Err(TeamError::InvalidUser(ids)),
        }
    }

    pub async fn resolve(&self, team: &TeamRef) -> Result<TeamRow, TeamError> {
        let repo = self.database.repository();
        let row = match team {
            TeamRef::Id(id) => repo.get_team(id).await?,
            TeamRef::Name(name) => repo.get_team_by_name(name).await?,
        };
        row.ok_or(TeamError::NotFound)
    }

    /// Members of a team with their user info, in join order
    pub async fn members(
        &self,
        team: &TeamRef,
        page: PageRequest,
    ) -> Result<Paged<TeamMemberWithUser>, TeamError> {
        let team = self.resolve(team).await?;
        Ok(self
            .database
            .repository()
            .list_team_members(&team.id, page)
            .await?)
    }

    /// Add members; empty role lists default to `member`. Users already in the
    /// team keep their roles. Returns the number of new memberships.
    pub async fn add_members(
        &self,
        caller: &str,
        team: &TeamRef,
        members: Vec<MemberRoles>,
    ) -> Result<u64, TeamError> {
        let team = self.resolve(team).await?;
        let repo = self.database.repository();

        let ids: Vec<String> = members.iter().map(|m| m.user_id.clone()).collect();
        let found = repo.get_users_by_ids(&ids).await?;
        let unknown: Vec<String> = ids
            .into_iter()
            .filter(|id| !found.iter().any(|u| &u.id == id))
            .collect();
        if !unknown.is_empty() {
            return Err(TeamError::InvalidUser(unknown));
        }

        let rows: Vec<(String, Vec<String>)> = members
            .into_iter()
            .map(|m| {
                let roles = if m.roles.is_empty() {
                    vec![TEAM_ROLE_MEMBER.to_string()]
                } else {
                    m.roles
                };
                (m.user_id, roles)
            })
            .collect();

        let added = repo.add_team_members(&team.id, &rows, caller).await?;
        tracing::debug!(team_id = %team.id, added, "Team members added");
        Ok(added)
    }

    /// Replace a member's roles
    pub async fn update_member(&self, team: &TeamRef, member: MemberRoles) -> Result<(), TeamError> {
        let team = self.resolve(team).await?;
        let result = self
            .database
            .repository()
            .update_team_member_roles(&team.id, &member.user_id, &member.roles)
            .await?;
        last_owner_result(result, &member.user_id)
    }

    /// Remove members in order, stopping at the first failure
    pub async fn remove_members(&self, team: &TeamRef, user_ids: &[String]) -> Result<(), TeamError> {
        let team = self.resolve(team).await?;
        let repo = self.database.repository();
        for user_id in user_ids {
            let result = repo.remove_team_member(&team.id, user_id).await?;
            last_owner_result(result, user_id)?;
        }
        Ok(())
    }

    pub async fn leave(&self, user_id: &str, team: &TeamRef) -> Result<(), TeamError> {
        self.remove_members(team, &[user_id.to_string()]).await
    }
}

fn last_owner_result(result: LastOwnerResult<()>, user_id: &str) -> Result<(), TeamError> {
    match result {
        LastOwnerResult::Success(()) => Ok(()),
        LastOwnerResult::LastOwner => Err(TeamError::LastOwner),
        LastOwnerResult::NotFound => Err(TeamError::InvalidUser(vec![user_id.to_string()])),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::types::UserRow;

    async fn setup() -> (Arc<TransactionalService>, TeamService) {
        let database = Arc::new(TransactionalService::in_memory().await.unwrap());
        (Arc::clone(&database), TeamService::new(database))
    }

    async fn user(database: &TransactionalService, name: &str) -> UserRow {
        database
            .repository()
            .create_user(name, None, &["user".to_string()])
            .await
            .unwrap()
            .unwrap()
    }

    fn page() -> PageRequest {
        PageRequest {
            offset: 0,
            count: 50,
        }
    }

    fn create(name: &str, members: Vec<String>) -> CreateTeam {
        CreateTeam {
            name: name.to_string(),
            members,
            ..Default::default()
        }
    }

    #[test]
    fn test_team_ref_prefers_id() {
        assert_eq!(
            TeamRef::from_params(Some("t1".into()), Some("core".into())),
            Some(TeamRef::Id("t1".into()))
        );
        assert_eq!(
            TeamRef::from_params(Some(" ".into()), Some("core".into())),
            Some(TeamRef::Name("core".into()))
        );
        assert_eq!(TeamRef::from_params(None, Some(String::new())), None);
    }

    #[tokio::test]
    async fn test_create_assigns_owner_and_members() {
        let (database, service) = setup().await;
        let alice = user(&database, "alice").await;
        let bob = user(&database, "bob").await;

        let team = service
            .create(&alice.id, create("core", vec![bob.id.clone()]))
            .await
            .unwrap();

        let members = service
            .members(&TeamRef::Name("core".into()), page())
            .await
            .unwrap();
        assert_eq!(members.total, 2);
        let alice_roles = database
            .repository()
            .get_team_member_roles(&team.id, &alice.id)
            .await
            .unwrap();
        assert_eq!(alice_roles, Some(vec!["owner".to_string()]));

        let listed = service.list(&bob.id, page()).await.unwrap();
        assert_eq!(listed.items[0].id, team.id);
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate_name_and_unknown_users() {
        let (database, service) = setup().await;
        let alice = user(&database, "alice").await;

        service
            .create(&alice.id, create("core", vec![]))
            .await
            .unwrap();
        let dup = service.create(&alice.id, create("core", vec![])).await;
        assert!(matches!(dup, Err(TeamError::NameTaken)));

        let ghost = service
            .create(&alice.id, create("infra", vec!["ghost".to_string()]))
            .await;
        match ghost {
            Err(e @ TeamError::InvalidUser(_)) => assert_eq!(e.error_type(), Some("invalid-user")),
            other => panic!("expected invalid-user, got {:?}", other.map(|t| t.id)),
        }
        assert_eq!(service.list_all(page()).await.unwrap().total, 1);
    }

    #[tokio::test]
    async fn test_unknown_team() {
        let (_database, service) = setup().await;
        let err = service
            .members(&TeamRef::Id("missing".into()), page())
            .await
            .unwrap_err();
        assert_eq!(err.error_type(), Some("team-does-not-exist"));
    }

    #[tokio::test]
    async fn test_add_members_defaults_roles_and_checks_users() {
        let (database, service) = setup().await;
        let alice = user(&database, "alice").await;
        let bob = user(&database, "bob").await;
        let team = service
            .create(&alice.id, create("core", vec![]))
            .await
            .unwrap();
        let team_ref = TeamRef::Id(team.id.clone());

        let added = service
            .add_members(
                &alice.id,
                &team_ref,
                vec![
                    MemberRoles {
                        user_id: bob.id.clone(),
                        roles: vec![],
                    },
                    MemberRoles {
                        user_id: alice.id.clone(),
                        roles: vec![],
                    },
                ],
            )
            .await
            .unwrap();
        assert_eq!(added, 1);

        let bob_roles = database
            .repository()
            .get_team_member_roles(&team.id, &bob.id)
            .await
            .unwrap();
        assert_eq!(bob_roles, Some(vec!["member".to_string()]));

        let err = service
            .add_members(
                &alice.id,
                &team_ref,
                vec![MemberRoles {
                    user_id: "ghost".to_string(),
                    roles: vec![],
                }],
            )
            .await
            .unwrap_err();
        assert!(matches!(err, TeamError::InvalidUser(ids) if ids == vec!["ghost".to_string()]));
    }

    #[tokio::test]
    async fn test_last_owner_protection() {
        let (database, service) = setup().await;
        let alice = user(&database, "alice").await;
        let bob = user(&database, "bob").await;
        let team = service
            .create(&alice.id, create("core", vec![bob.id.clone()]))
            .await
            .unwrap();
        let team_ref = TeamRef::Id(team.id.clone());

        let demote = service
            .update_member(
                &team_ref,
                MemberRoles {
                    user_id: alice.id.clone(),
                    roles: vec!["member".to_string()],
                },
            )
            .await;
        assert!(matches!(demote, Err(TeamError::LastOwner)));

        let leave = service.leave(&alice.id, &team_ref).await;
        assert!(matches!(leave, Err(TeamError::LastOwner)));

        service
            .update_member(
                &team_ref,
                MemberRoles {
                    user_id: bob.id.clone(),
                    roles: vec!["owner".to_string()],
                },
            )
            .await
            .unwrap();
        service.leave(&alice.id, &team_ref).await.unwrap();

        let members = service.members(&team_ref, page()).await.unwrap();
        assert_eq!(members.total, 1);
        assert_eq!(members.items[0].user_id, bob.id);
    }

    #[tokio::test]
    async fn test_remove_non_member_is_invalid_user() {
        let (database, service) = setup().await;
        let alice = user(&database, "alice").await;
        let bob = user(&database, "bob").await;
        service
            .create(&alice.id, create("core", vec![]))
            .await
            .unwrap();

        let err = service
            .remove_members(&TeamRef::Name("core".into()), &[bob.id.clone()])
            .await
            .unwrap_err();
        assert_eq!(err.error_type(), Some("invalid-user"));
    }
}
