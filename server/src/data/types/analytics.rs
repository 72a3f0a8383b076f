//! Engagement analytics and session aggregate types

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::enums::{MetricType, RoomType};

/// One analytics row: a metric's count for a day (and room, for messages)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyticsRow {
    pub metric: MetricType,
    /// Day key, `YYYYMMDD`
    pub date: u32,
    /// Empty for metrics that are not per room
    pub room_id: String,
    pub room_name: Option<String>,
    pub room_type: Option<RoomType>,
    pub count: i64,
}

impl AnalyticsRow {
    pub fn users(date: u32, count: i64) -> Self {
        Self {
            metric: MetricType::Users,
            date,
            room_id: String::new(),
            room_name: None,
            room_type: None,
            count,
        }
    }

    pub fn messages(date: u32, room: &RoomMessageCount) -> Self {
        Self {
            metric: MetricType::Messages,
            date,
            room_id: room.room_id.clone(),
            room_name: Some(room.room_name.clone()),
            room_type: Some(room.room_type),
            count: room.count,
        }
    }
}

/// Sum of a metric for one day
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailyTotal {
    pub date: u32,
    pub count: i64,
}

/// Message count for one room
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomMessageCount {
    pub room_id: String,
    pub room_name: String,
    pub room_type: RoomType,
    pub count: i64,
}

/// Per-day, per-room message count read from the raw message table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyRoomMessages {
    pub date: u32,
    pub room: RoomMessageCount,
}

/// Login session row from database
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRow {
    pub user_id: String,
    pub session_id: String,
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub login_at: i64,
    pub closed_at: Option<i64>,
    pub device_type: String,
}

/// Distinct users or session count for one calendar day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct DayUsers {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub users: i64,
}

/// Session count for one hour of the day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct HourUsers {
    pub hour: u32,
    pub users: i64,
}

/// Session count for one hour of one calendar day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct DayHourUsers {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub users: i64,
}
