//! Authentication manager

use anyhow::{Context, Result};

use crate::core::constants::{AUTH_TOKEN_BYTES, BOOTSTRAP_USERNAME, ROLE_ADMIN, ROLE_USER};
use crate::data::TransactionalService;
use crate::utils::crypto;

/// Administrator created on first start; the token is only known here
#[derive(Debug, Clone)]
pub struct Bootstrap {
    pub user_id: String,
    pub token: String,
}

/// Main authentication manager
#[derive(Debug)]
pub struct AuthManager {
    enabled: bool,
    /// User that requests run as when authentication is disabled
    local_user_id: Option<String>,
    bootstrap: Option<Bootstrap>,
}

impl AuthManager {
    /// Initialize the authentication manager, creating the bootstrap
    /// administrator when the user table is empty
    pub async fn init(database: &TransactionalService, enabled: bool) -> Result<Self> {
        let repo = database.repository();

        let bootstrap = if repo.count_users().await? == 0 {
            let roles = vec![ROLE_ADMIN.to_string(), ROLE_USER.to_string()];
            let admin = repo
                .create_user(BOOTSTRAP_USERNAME, Some("Administrator"), &roles)
                .await?
                .context("bootstrap username already taken")?;
            let token = crypto::generate_token(AUTH_TOKEN_BYTES);
            repo.create_token(&admin.id, &crypto::hash_token(&token))
                .await?;
            tracing::info!(user_id = %admin.id, "Bootstrap administrator created");
            Some(Bootstrap {
                user_id: admin.id,
                token,
            })
        } else {
            None
        };

        let local_user_id = repo
            .get_user_by_username(BOOTSTRAP_USERNAME)
            .await?
            .map(|u| u.id);

        if enabled {
            tracing::debug!("Authentication enabled");
        } else {
            tracing::warn!("Authentication DISABLED");
            if local_user_id.is_none() {
                tracing::warn!(
                    username = BOOTSTRAP_USERNAME,
                    "No local user found; unauthenticated requests will be rejected"
                );
            }
        }

        Ok(Self {
            enabled,
            local_user_id,
            bootstrap,
        })
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn local_user_id(&self) -> Option<&str> {
        self.local_user_id.as_deref()
    }

    /// Credentials created by this start, if any
    pub fn bootstrap(&self) -> Option<&Bootstrap> {
        self.bootstrap.as_ref()
    }
}
