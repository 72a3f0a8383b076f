//! Row types for users, rooms, teams, messages and emoji

use serde::{Deserialize, Serialize};

use super::enums::{RoomType, TeamType};

// ============================================================================
// Pagination
// ============================================================================

/// Offset/count window for list queries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub offset: u32,
    pub count: u32,
}

/// One page of rows plus the unpaged total
#[derive(Debug, Clone)]
pub struct Paged<T> {
    pub items: Vec<T>,
    pub total: u64,
}

// ============================================================================
// User types
// ============================================================================

/// User row from database
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRow {
    pub id: String,
    pub username: String,
    pub name: Option<String>,
    pub roles: Vec<String>,
    pub status: String,
    pub created_at: i64,
}

impl UserRow {
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}

// ============================================================================
// Room types
// ============================================================================

/// Room row from database
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomRow {
    pub id: String,
    pub name: String,
    pub room_type: RoomType,
    pub team_id: Option<String>,
    pub team_main: bool,
    pub read_only: bool,
    pub created_at: i64,
}

// ============================================================================
// Team types
// ============================================================================

/// Team row from database
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamRow {
    pub id: String,
    pub name: String,
    pub team_type: TeamType,
    pub room_id: String,
    pub created_by: String,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Team member joined with the user it points at
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamMemberWithUser {
    pub team_id: String,
    pub user_id: String,
    pub username: String,
    pub name: Option<String>,
    pub status: String,
    pub roles: Vec<String>,
    pub created_by: String,
    pub created_at: i64,
}

/// Input for creating a team together with its main room
#[derive(Debug, Clone)]
pub struct NewTeam<'a> {
    pub name: &'a str,
    pub team_type: TeamType,
    pub owner_id: &'a str,
    pub member_ids: &'a [String],
    pub created_by: &'a str,
    pub read_only: bool,
}

/// Outcome of a team creation attempt
#[derive(Debug, Clone)]
pub enum CreateTeamResult {
    Created(TeamRow),
    NameTaken,
    UnknownUsers(Vec<String>),
}

/// Result type for operations that may be blocked by last-owner protection
#[derive(Debug, Clone)]
pub enum LastOwnerResult<T> {
    Success(T),
    LastOwner,
    NotFound,
}

// ============================================================================
// Message types
// ============================================================================

/// Message row from database (`ts` in unix seconds)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageRow {
    pub id: String,
    pub room_id: String,
    pub user_id: String,
    pub text: String,
    pub ts: i64,
}

// ============================================================================
// Custom emoji types
// ============================================================================

/// Custom emoji row from database
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmojiRow {
    pub id: String,
    pub name: String,
    pub aliases: Vec<String>,
    pub extension: String,
    pub updated_at: i64,
}
