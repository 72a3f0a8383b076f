//! Request and response types for room endpoints

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::data::types::{RoomRow, RoomType};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoomRequest {
    #[validate(length(min = 1, max = 64, message = "name must be 1-64 characters"))]
    pub name: String,
    #[serde(default)]
    pub read_only: bool,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoomDto {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub t: RoomType,
    #[serde(rename = "ro")]
    pub read_only: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team_id: Option<String>,
    pub team_main: bool,
    #[serde(rename = "ts")]
    pub created_at: i64,
}

impl From<RoomRow> for RoomDto {
    fn from(row: RoomRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            t: row.room_type,
            read_only: row.read_only,
            team_id: row.team_id,
            team_main: row.team_main,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ChannelResponse {
    pub channel: RoomDto,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct GroupResponse {
    pub group: RoomDto,
}
