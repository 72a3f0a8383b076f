//! Authenticated caller and permission checks
//!
//! Permissions map to the roles that grant them. A caller holds a permission
//! when one of their global roles (or, for team-scoped checks, their roles in
//! that team) is in the permission's role list.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;

use crate::api::types::ApiError;
use crate::core::constants::{CACHE_TTL_PERMISSION_SECS, PERMISSION_CACHE_CAPACITY};
use crate::data::TransactionalService;
use crate::data::types::UserRow;
use crate::utils::crypto;

// ============================================================================
// AuthContext
// ============================================================================

/// The authenticated caller of a request
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user_id: String,
    pub roles: Vec<String>,
}

impl AuthContext {
    pub fn from_user(user: &UserRow) -> Self {
        Self {
            user_id: user.id.clone(),
            roles: user.roles.clone(),
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    fn holds_any(&self, granted: &[String]) -> bool {
        self.roles.iter().any(|r| granted.contains(r))
    }
}

// ============================================================================
// AuthService
// ============================================================================

/// Credential checks and cached permission lookups
#[derive(Clone)]
pub struct AuthService {
    database: Arc<TransactionalService>,
    permissions: Cache<String, Arc<Vec<String>>>,
}

impl AuthService {
    pub fn new(database: Arc<TransactionalService>) -> Self {
        let permissions = Cache::builder()
            .max_capacity(PERMISSION_CACHE_CAPACITY)
            .time_to_live(Duration::from_secs(CACHE_TTL_PERMISSION_SECS))
            .build();
        Self {
            database,
            permissions,
        }
    }

    /// Resolve a user id and plain token to the user they belong to
    pub async fn authenticate(
        &self,
        user_id: &str,
        token: &str,
    ) -> Result<Option<UserRow>, ApiError> {
        let repo = self.database.repository();
        let Some(user) = repo.get_user(user_id).await.map_err(ApiError::from_data)? else {
            return Ok(None);
        };

        let presented = crypto::hash_token(token);
        let hashes = repo
            .list_token_hashes(user_id)
            .await
            .map_err(ApiError::from_data)?;
        let valid = hashes
            .iter()
            .any(|stored| crypto::constant_time_eq(stored, &presented));

        Ok(valid.then_some(user))
    }

    /// Load the user that unauthenticated requests run as
    pub async fn local_user(&self, user_id: &str) -> Result<Option<UserRow>, ApiError> {
        self.database
            .repository()
            .get_user(user_id)
            .await
            .map_err(ApiError::from_data)
    }

    /// Roles granting `permission` (cached). Unknown permissions grant nothing.
    async fn permission_roles(&self, permission: &str) -> Result<Arc<Vec<String>>, ApiError> {
        if let Some(roles) = self.permissions.get(permission).await {
            return Ok(roles);
        }

        let roles = self
            .database
            .repository()
            .get_permission_roles(permission)
            .await
            .map_err(ApiError::from_data)?;
        if roles.is_none() {
            tracing::warn!(permission, "Unknown permission checked");
        }
        let roles = Arc::new(roles.unwrap_or_default());

        self.permissions
            .insert(permission.to_string(), roles.clone())
            .await;
        Ok(roles)
    }

    pub async fn has_permission(
        &self,
        auth: &AuthContext,
        permission: &str,
    ) -> Result<bool, ApiError> {
        let granted = self.permission_roles(permission).await?;
        Ok(auth.holds_any(&granted))
    }

    /// Like [`has_permission`](Self::has_permission), also counting the
    /// caller's roles inside `team_id`
    pub async fn has_team_permission(
        &self,
        auth: &AuthContext,
        permission: &str,
        team_id: &str,
    ) -> Result<bool, ApiError> {
        let granted = self.permission_roles(permission).await?;
        if auth.holds_any(&granted) {
            return Ok(true);
        }

        let team_roles = self
            .database
            .repository()
            .get_team_member_roles(team_id, auth.user_id())
            .await
            .map_err(ApiError::from_data)?
            .unwrap_or_default();
        Ok(team_roles.iter().any(|r| granted.contains(r)))
    }

    /// Fail with 403 unless the caller holds `permission`
    pub async fn require_permission(
        &self,
        auth: &AuthContext,
        permission: &str,
    ) -> Result<(), ApiError> {
        if self.has_permission(auth, permission).await? {
            Ok(())
        } else {
            tracing::debug!(user_id = %auth.user_id, permission, "Permission denied");
            Err(ApiError::unauthorized())
        }
    }

    /// Fail with 403 unless the caller holds `permission` globally or in the team
    pub async fn require_team_permission(
        &self,
        auth: &AuthContext,
        permission: &str,
        team_id: &str,
    ) -> Result<(), ApiError> {
        if self.has_team_permission(auth, permission, team_id).await? {
            Ok(())
        } else {
            tracing::debug!(user_id = %auth.user_id, permission, team_id, "Team permission denied");
            Err(ApiError::unauthorized())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::constants::{
        PERM_EDIT_TEAM_MEMBER, PERM_VIEW_ALL_TEAMS, ROLE_ADMIN, ROLE_USER,
    };
    use crate::data::types::{NewTeam, TeamType};

    async fn setup() -> (Arc<TransactionalService>, AuthService) {
        let database = Arc::new(TransactionalService::in_memory().await.unwrap());
        let service = AuthService::new(database.clone());
        (database, service)
    }

    async fn user(database: &TransactionalService, name: &str, roles: &[&str]) -> UserRow {
        let roles: Vec<String> = roles.iter().map(|r| r.to_string()).collect();
        database
            .repository()
            .create_user(name, None, &roles)
            .await
            .unwrap()
            .unwrap()
    }

    #[tokio::test]
    async fn test_authenticate_checks_token_hash() {
        let (database, service) = setup().await;
        let alice = user(&database, "alice", &[ROLE_USER]).await;
        database
            .repository()
            .create_token(&alice.id, &crypto::hash_token("secret"))
            .await
            .unwrap();

        let found = service.authenticate(&alice.id, "secret").await.unwrap();
        assert_eq!(found.unwrap().id, alice.id);
        assert!(service.authenticate(&alice.id, "wrong").await.unwrap().is_none());
        assert!(service.authenticate("ghost", "secret").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_has_permission_by_role() {
        let (database, service) = setup().await;
        let admin = AuthContext::from_user(&user(&database, "root", &[ROLE_ADMIN]).await);
        let plain = AuthContext::from_user(&user(&database, "bob", &[ROLE_USER]).await);

        assert!(service.has_permission(&admin, PERM_VIEW_ALL_TEAMS).await.unwrap());
        assert!(!service.has_permission(&plain, PERM_VIEW_ALL_TEAMS).await.unwrap());
        assert!(!service.has_permission(&admin, "no-such-permission").await.unwrap());
        assert!(matches!(
            service.require_permission(&plain, PERM_VIEW_ALL_TEAMS).await,
            Err(ApiError::Unauthorized)
        ));
    }

    #[tokio::test]
    async fn test_team_owner_gets_team_scoped_permission() {
        let (database, service) = setup().await;
        let owner = user(&database, "olivia", &[ROLE_USER]).await;
        let other = user(&database, "oscar", &[ROLE_USER]).await;
        let members: Vec<String> = vec![];
        let created = database
            .repository()
            .create_team(&NewTeam {
                name: "eng",
                team_type: TeamType::Public,
                owner_id: &owner.id,
                member_ids: &members,
                created_by: &owner.id,
                read_only: false,
            })
            .await
            .unwrap();
        let crate::data::types::CreateTeamResult::Created(team) = created else {
            panic!("team not created");
        };

        let owner_ctx = AuthContext::from_user(&owner);
        let other_ctx = AuthContext::from_user(&other);
        assert!(!service.has_permission(&owner_ctx, PERM_EDIT_TEAM_MEMBER).await.unwrap());
        assert!(
            service
                .has_team_permission(&owner_ctx, PERM_EDIT_TEAM_MEMBER, &team.id)
                .await
                .unwrap()
        );
        assert!(
            !service
                .has_team_permission(&other_ctx, PERM_EDIT_TEAM_MEMBER, &team.id)
                .await
                .unwrap()
        );
    }
}
