//! Repository traits for the data layer
//!
//! Services talk to storage through these traits; the SQLite backend
//! implements both for `Arc<SqliteService>`.

use async_trait::async_trait;

use crate::data::error::DataError;
use crate::data::types::{
    AnalyticsRow, CreateTeamResult, DailyRoomMessages, DailyTotal, DayHourUsers, DayUsers,
    EmojiRow, HourUsers, LastOwnerResult, MessageRow, MetricType, NewTeam, PageRequest, Paged,
    RoomMessageCount, RoomRow, RoomType, SessionRow, TeamMemberWithUser, TeamRow, UserRow,
};

// ============================================================================
// Transactional Repository Trait
// ============================================================================

/// Repository trait for users, rooms, teams, messages and emoji
#[async_trait]
pub trait TransactionalRepository: Send + Sync {
    // ==================== User Operations ====================

    /// Create a user; `None` when the username is taken
    async fn create_user(
        &self,
        username: &str,
        name: Option<&str>,
        roles: &[String],
    ) -> Result<Option<UserRow>, DataError>;

    async fn get_user(&self, id: &str) -> Result<Option<UserRow>, DataError>;

    async fn get_user_by_username(&self, username: &str) -> Result<Option<UserRow>, DataError>;

    /// Users among `ids` that exist
    async fn get_users_by_ids(&self, ids: &[String]) -> Result<Vec<UserRow>, DataError>;

    async fn count_users(&self) -> Result<i64, DataError>;

    // ==================== Token & Permission Operations ====================

    async fn create_token(&self, user_id: &str, token_hash: &str) -> Result<(), DataError>;

    async fn list_token_hashes(&self, user_id: &str) -> Result<Vec<String>, DataError>;

    /// Roles granted a permission; `None` for an unknown permission
    async fn get_permission_roles(
        &self,
        permission_id: &str,
    ) -> Result<Option<Vec<String>>, DataError>;

    // ==================== Room & Message Operations ====================

    async fn create_room(
        &self,
        name: &str,
        room_type: RoomType,
        read_only: bool,
    ) -> Result<RoomRow, DataError>;

    async fn get_room(&self, id: &str) -> Result<Option<RoomRow>, DataError>;

    async fn insert_message(
        &self,
        room_id: &str,
        user_id: &str,
        text: &str,
        ts: i64,
    ) -> Result<MessageRow, DataError>;

    async fn get_message(&self, id: &str) -> Result<Option<MessageRow>, DataError>;

    async fn delete_message(&self, id: &str) -> Result<bool, DataError>;

    // ==================== Team Operations ====================

    async fn create_team(&self, input: &NewTeam<'_>) -> Result<CreateTeamResult, DataError>;

    async fn get_team(&self, id: &str) -> Result<Option<TeamRow>, DataError>;

    async fn get_team_by_name(&self, name: &str) -> Result<Option<TeamRow>, DataError>;

    async fn list_teams_for_user(
        &self,
        user_id: &str,
        page: PageRequest,
    ) -> Result<Paged<TeamRow>, DataError>;

    async fn list_all_teams(&self, page: PageRequest) -> Result<Paged<TeamRow>, DataError>;

    async fn list_team_members(
        &self,
        team_id: &str,
        page: PageRequest,
    ) -> Result<Paged<TeamMemberWithUser>, DataError>;

    async fn get_team_member_roles(
        &self,
        team_id: &str,
        user_id: &str,
    ) -> Result<Option<Vec<String>>, DataError>;

    /// Add members, skipping users already in the team
    async fn add_team_members(
        &self,
        team_id: &str,
        members: &[(String, Vec<String>)],
        created_by: &str,
    ) -> Result<u64, DataError>;

    async fn update_team_member_roles(
        &self,
        team_id: &str,
        user_id: &str,
        roles: &[String],
    ) -> Result<LastOwnerResult<()>, DataError>;

    async fn remove_team_member(
        &self,
        team_id: &str,
        user_id: &str,
    ) -> Result<LastOwnerResult<()>, DataError>;

    // ==================== Custom Emoji Operations ====================

    async fn create_emoji(
        &self,
        name: &str,
        aliases: &[String],
        extension: &str,
    ) -> Result<Option<EmojiRow>, DataError>;

    async fn list_emojis(
        &self,
        name_filter: Option<&str>,
        updated_since: Option<i64>,
    ) -> Result<Vec<EmojiRow>, DataError>;

    async fn delete_emoji(&self, id: &str) -> Result<bool, DataError>;
}

// ============================================================================
// Analytics Repository Trait
// ============================================================================

/// Repository trait for the engagement dashboard: the analytics cache,
/// the raw event totals it is backfilled from, and login sessions
#[async_trait]
pub trait AnalyticsRepository: Send + Sync {
    // ==================== Analytics Cache ====================

    async fn has_analytics_before(&self, metric: MetricType, date: u32)
    -> Result<bool, DataError>;

    /// Insert rows in one transaction, skipping existing (type, date, room)
    async fn insert_missing_analytics(&self, rows: &[AnalyticsRow]) -> Result<u64, DataError>;

    async fn increment_analytics(
        &self,
        metric: MetricType,
        date: u32,
        room: Option<(&str, &str, RoomType)>,
        delta: i64,
    ) -> Result<(), DataError>;

    async fn daily_totals(
        &self,
        metric: MetricType,
        start: u32,
        end: u32,
    ) -> Result<Vec<DailyTotal>, DataError>;

    async fn origin_counts(&self, start: u32, end: u32)
    -> Result<Vec<(RoomType, i64)>, DataError>;

    async fn top_rooms(
        &self,
        start: u32,
        end: u32,
        limit: u32,
    ) -> Result<Vec<RoomMessageCount>, DataError>;

    // ==================== Raw Event Totals ====================

    async fn count_messages_by_day_and_room(
        &self,
        from_ts: i64,
        until_ts: i64,
        room_types: &[RoomType],
    ) -> Result<Vec<DailyRoomMessages>, DataError>;

    async fn count_registered_users_by_day(
        &self,
        from_ts: i64,
        until_ts: i64,
    ) -> Result<Vec<DailyTotal>, DataError>;

    // ==================== Sessions ====================

    async fn open_session(&self, session: &SessionRow) -> Result<(), DataError>;

    async fn active_users_by_day(&self, start: u32, end: u32) -> Result<Vec<DayUsers>, DataError>;

    async fn sessions_by_day(&self, start: u32, end: u32) -> Result<Vec<DayUsers>, DataError>;

    async fn sessions_by_hour(
        &self,
        from_ts: i64,
        until_ts: i64,
    ) -> Result<Vec<HourUsers>, DataError>;

    async fn sessions_by_day_and_hour(
        &self,
        start: u32,
        end: u32,
    ) -> Result<Vec<DayHourUsers>, DataError>;
}
