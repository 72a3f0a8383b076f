//! Authentication module

mod context;
mod extractors;
mod manager;
pub mod middleware;

pub use context::{AuthContext, AuthService};
pub use extractors::{
    Auth, AuthRejection, CreateChannel, CreateGroup, CreateTeam, CreateUser, GenerateToken,
    ManageEmoji, PermissionLevel, Permitted, ViewAllTeams, ViewEngagement,
};
pub use manager::{AuthManager, Bootstrap};
pub use middleware::{AuthState, require_auth};
