//! Domain logic for the team-chat server
//!
//! - `engagement` - Engagement dashboard analytics and its cache hooks
//! - `teams` - Team creation and membership management
//! - `category_dropdown` - Selection state for the grouped category filter

pub mod category_dropdown;
pub mod engagement;
pub mod teams;

pub use category_dropdown::{CategoryDropdown, CategoryGroup, CategoryItem};
pub use engagement::{EngagementError, EngagementService, PeriodSummary, Window};
pub use teams::{CreateTeam, MemberRoles, TeamError, TeamRef, TeamService};
