//! Repository trait implementations for SQLite
//!
//! Implements `TransactionalRepository` and `AnalyticsRepository` for
//! `Arc<SqliteService>` by delegating to the repository functions.

use std::sync::Arc;

use async_trait::async_trait;

use crate::data::error::DataError;
use crate::data::traits::{AnalyticsRepository, TransactionalRepository};
use crate::data::types::{
    AnalyticsRow, CreateTeamResult, DailyRoomMessages, DailyTotal, DayHourUsers, DayUsers,
    EmojiRow, HourUsers, LastOwnerResult, MessageRow, MetricType, NewTeam, PageRequest, Paged,
    RoomMessageCount, RoomRow, RoomType, SessionRow, TeamMemberWithUser, TeamRow, UserRow,
};

use super::SqliteService;
use super::repositories::{
    analytics, emoji, message, permission, room, session, team, token, user,
};

#[async_trait]
impl TransactionalRepository for Arc<SqliteService> {
    // ==================== User Operations ====================

    async fn create_user(
        &self,
        username: &str,
        name: Option<&str>,
        roles: &[String],
    ) -> Result<Option<UserRow>, DataError> {
        user::create_user(self.pool(), username, name, roles)
            .await
            .map_err(Into::into)
    }

    async fn get_user(&self, id: &str) -> Result<Option<UserRow>, DataError> {
        user::get_user(self.pool(), id).await.map_err(Into::into)
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<UserRow>, DataError> {
        user::get_user_by_username(self.pool(), username)
            .await
            .map_err(Into::into)
    }

    async fn get_users_by_ids(&self, ids: &[String]) -> Result<Vec<UserRow>, DataError> {
        user::get_users_by_ids(self.pool(), ids)
            .await
            .map_err(Into::into)
    }

    async fn count_users(&self) -> Result<i64, DataError> {
        user::count_users(self.pool()).await.map_err(Into::into)
    }

    // ==================== Token & Permission Operations ====================

    async fn create_token(&self, user_id: &str, token_hash: &str) -> Result<(), DataError> {
        token::create_token(self.pool(), user_id, token_hash)
            .await
            .map_err(Into::into)
    }

    async fn list_token_hashes(&self, user_id: &str) -> Result<Vec<String>, DataError> {
        token::list_token_hashes(self.pool(), user_id)
            .await
            .map_err(Into::into)
    }

    async fn get_permission_roles(
        &self,
        permission_id: &str,
    ) -> Result<Option<Vec<String>>, DataError> {
        permission::get_permission_roles(self.pool(), permission_id)
            .await
            .map_err(Into::into)
    }

    // ==================== Room & Message Operations ====================

    async fn create_room(
        &self,
        name: &str,
        room_type: RoomType,
        read_only: bool,
    ) -> Result<RoomRow, DataError> {
        room::create_room(self.pool(), name, room_type, read_only)
            .await
            .map_err(Into::into)
    }

    async fn get_room(&self, id: &str) -> Result<Option<RoomRow>, DataError> {
        room::get_room(self.pool(), id).await.map_err(Into::into)
    }

    async fn insert_message(
        &self,
        room_id: &str,
        user_id: &str,
        text: &str,
        ts: i64,
    ) -> Result<MessageRow, DataError> {
        message::insert_message(self.pool(), room_id, user_id, text, ts)
            .await
            .map_err(Into::into)
    }

    async fn get_message(&self, id: &str) -> Result<Option<MessageRow>, DataError> {
        message::get_message(self.pool(), id)
            .await
            .map_err(Into::into)
    }

    async fn delete_message(&self, id: &str) -> Result<bool, DataError> {
        message::delete_message(self.pool(), id)
            .await
            .map_err(Into::into)
    }

    // ==================== Team Operations ====================

    async fn create_team(&self, input: &NewTeam<'_>) -> Result<CreateTeamResult, DataError> {
        team::create_team(self.pool(), input)
            .await
            .map_err(Into::into)
    }

    async fn get_team(&self, id: &str) -> Result<Option<TeamRow>, DataError> {
        team::get_team(self.pool(), id).await.map_err(Into::into)
    }

    async fn get_team_by_name(&self, name: &str) -> Result<Option<TeamRow>, DataError> {
        team::get_team_by_name(self.pool(), name)
            .await
            .map_err(Into::into)
    }

    async fn list_teams_for_user(
        &self,
        user_id: &str,
        page: PageRequest,
    ) -> Result<Paged<TeamRow>, DataError> {
        team::list_for_user(self.pool(), user_id, page)
            .await
            .map_err(Into::into)
    }

    async fn list_all_teams(&self, page: PageRequest) -> Result<Paged<TeamRow>, DataError> {
        team::list_all(self.pool(), page).await.map_err(Into::into)
    }

    async fn list_team_members(
        &self,
        team_id: &str,
        page: PageRequest,
    ) -> Result<Paged<TeamMemberWithUser>, DataError> {
        team::list_members(self.pool(), team_id, page)
            .await
            .map_err(Into::into)
    }

    async fn get_team_member_roles(
        &self,
        team_id: &str,
        user_id: &str,
    ) -> Result<Option<Vec<String>>, DataError> {
        team::get_member_roles(self.pool(), team_id, user_id)
            .await
            .map_err(Into::into)
    }

    async fn add_team_members(
        &self,
        team_id: &str,
        members: &[(String, Vec<String>)],
        created_by: &str,
    ) -> Result<u64, DataError> {
        team::add_members(self.pool(), team_id, members, created_by)
            .await
            .map_err(Into::into)
    }

    async fn update_team_member_roles(
        &self,
        team_id: &str,
        user_id: &str,
        roles: &[String],
    ) -> Result<LastOwnerResult<()>, DataError> {
        team::update_member_roles(self.pool(), team_id, user_id, roles)
            .await
            .map_err(Into::into)
    }

    async fn remove_team_member(
        &self,
        team_id: &str,
        user_id: &str,
    ) -> Result<LastOwnerResult<()>, DataError> {
        team::remove_member(self.pool(), team_id, user_id)
            .await
            .map_err(Into::into)
    }

    // ==================== Custom Emoji Operations ====================

    async fn create_emoji(
        &self,
        name: &str,
        aliases: &[String],
        extension: &str,
    ) -> Result<Option<EmojiRow>, DataError> {
        emoji::create_emoji(self.pool(), name, aliases, extension)
            .await
            .map_err(Into::into)
    }

    async fn list_emojis(
        &self,
        name_filter: Option<&str>,
        updated_since: Option<i64>,
    ) -> Result<Vec<EmojiRow>, DataError> {
        emoji::list_emojis(self.pool(), name_filter, updated_since)
            .await
            .map_err(Into::into)
    }

    async fn delete_emoji(&self, id: &str) -> Result<bool, DataError> {
        emoji::delete_emoji(self.pool(), id)
            .await
            .map_err(Into::into)
    }
}

#[async_trait]
impl AnalyticsRepository for Arc<SqliteService> {
    // ==================== Analytics Cache ====================

    async fn has_analytics_before(
        &self,
        metric: MetricType,
        date: u32,
    ) -> Result<bool, DataError> {
        analytics::has_rows_before(self.pool(), metric, date)
            .await
            .map_err(Into::into)
    }

    async fn insert_missing_analytics(&self, rows: &[AnalyticsRow]) -> Result<u64, DataError> {
        analytics::insert_missing(self.pool(), rows)
            .await
            .map_err(Into::into)
    }

    async fn increment_analytics(
        &self,
        metric: MetricType,
        date: u32,
        room: Option<(&str, &str, RoomType)>,
        delta: i64,
    ) -> Result<(), DataError> {
        analytics::increment(self.pool(), metric, date, room, delta)
            .await
            .map_err(Into::into)
    }

    async fn daily_totals(
        &self,
        metric: MetricType,
        start: u32,
        end: u32,
    ) -> Result<Vec<DailyTotal>, DataError> {
        analytics::daily_totals(self.pool(), metric, start, end)
            .await
            .map_err(Into::into)
    }

    async fn origin_counts(
        &self,
        start: u32,
        end: u32,
    ) -> Result<Vec<(RoomType, i64)>, DataError> {
        analytics::origin_counts(self.pool(), start, end)
            .await
            .map_err(Into::into)
    }

    async fn top_rooms(
        &self,
        start: u32,
        end: u32,
        limit: u32,
    ) -> Result<Vec<RoomMessageCount>, DataError> {
        analytics::top_rooms(self.pool(), start, end, limit)
            .await
            .map_err(Into::into)
    }

    // ==================== Raw Event Totals ====================

    async fn count_messages_by_day_and_room(
        &self,
        from_ts: i64,
        until_ts: i64,
        room_types: &[RoomType],
    ) -> Result<Vec<DailyRoomMessages>, DataError> {
        message::count_by_day_and_room(self.pool(), from_ts, until_ts, room_types)
            .await
            .map_err(Into::into)
    }

    async fn count_registered_users_by_day(
        &self,
        from_ts: i64,
        until_ts: i64,
    ) -> Result<Vec<DailyTotal>, DataError> {
        user::count_registered_by_day(self.pool(), from_ts, until_ts)
            .await
            .map_err(Into::into)
    }

    // ==================== Sessions ====================

    async fn open_session(&self, row: &SessionRow) -> Result<(), DataError> {
        session::open_session(self.pool(), row)
            .await
            .map_err(Into::into)
    }

    async fn active_users_by_day(&self, start: u32, end: u32) -> Result<Vec<DayUsers>, DataError> {
        session::active_users_by_day(self.pool(), start, end)
            .await
            .map_err(Into::into)
    }

    async fn sessions_by_day(&self, start: u32, end: u32) -> Result<Vec<DayUsers>, DataError> {
        session::sessions_by_day(self.pool(), start, end)
            .await
            .map_err(Into::into)
    }

    async fn sessions_by_hour(
        &self,
        from_ts: i64,
        until_ts: i64,
    ) -> Result<Vec<HourUsers>, DataError> {
        session::sessions_by_hour(self.pool(), from_ts, until_ts)
            .await
            .map_err(Into::into)
    }

    async fn sessions_by_day_and_hour(
        &self,
        start: u32,
        end: u32,
    ) -> Result<Vec<DayHourUsers>, DataError> {
        session::sessions_by_day_and_hour(self.pool(), start, end)
            .await
            .map_err(Into::into)
    }
}
