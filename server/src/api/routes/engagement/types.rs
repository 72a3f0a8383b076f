//! Request and response types for engagement dashboard endpoints

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::api::types::{ApiError, parse_date_param, parse_instant_param};
use crate::data::types::{DayHourUsers, DayUsers, HourUsers, RoomMessageCount, RoomType};
use crate::domain::engagement::{Delta, PeriodSummary};
use crate::domain::Window;

// ============================================================================
// Requests
// ============================================================================

/// Inclusive day range; each bound is `YYYY-MM-DD` or RFC 3339
#[derive(Debug, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RangeQuery {
    pub start: Option<String>,
    pub end: Option<String>,
}

impl RangeQuery {
    pub fn window(&self) -> Result<Window, ApiError> {
        let start = parse_date_param(self.start.as_deref(), "start")?;
        let end = parse_date_param(self.end.as_deref(), "end")?;
        Ok(Window::new(start, end)?)
    }
}

/// Single reference day or instant
#[derive(Debug, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DayQuery {
    pub start: Option<String>,
}

impl DayQuery {
    pub fn day(&self) -> Result<NaiveDate, ApiError> {
        parse_date_param(self.start.as_deref(), "start")
    }

    /// `start` as an instant; a bare date means the end of that day
    pub fn until(&self) -> Result<DateTime<Utc>, ApiError> {
        parse_instant_param(self.start.as_deref(), "start")
    }
}

// ============================================================================
// Responses
// ============================================================================

#[derive(Debug, Serialize, ToSchema)]
pub struct DeltaDto {
    pub count: i64,
    pub variation: i64,
}

impl From<Delta> for DeltaDto {
    fn from(d: Delta) -> Self {
        Self {
            count: d.count,
            variation: d.variation,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DayMessages {
    pub day: NaiveDate,
    pub messages: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DayNewUsers {
    pub day: NaiveDate,
    pub users: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MessagesSentResponse {
    pub days: Vec<DayMessages>,
    pub period: DeltaDto,
    pub yesterday: DeltaDto,
}

impl From<PeriodSummary> for MessagesSentResponse {
    fn from(s: PeriodSummary) -> Self {
        Self {
            days: s
                .days
                .into_iter()
                .map(|(day, messages)| DayMessages { day, messages })
                .collect(),
            period: s.period.into(),
            yesterday: s.yesterday.into(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct NewUsersResponse {
    pub days: Vec<DayNewUsers>,
    pub period: DeltaDto,
    pub yesterday: DeltaDto,
}

impl From<PeriodSummary> for NewUsersResponse {
    fn from(s: PeriodSummary) -> Self {
        Self {
            days: s
                .days
                .into_iter()
                .map(|(day, users)| DayNewUsers { day, users })
                .collect(),
            period: s.period.into(),
            yesterday: s.yesterday.into(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OriginDto {
    pub t: RoomType,
    pub messages: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OriginResponse {
    pub origins: Vec<OriginDto>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ChannelDto {
    #[serde(rename = "_id")]
    pub id: String,
    pub t: RoomType,
    pub messages: i64,
    pub name: String,
}

impl From<RoomMessageCount> for ChannelDto {
    fn from(r: RoomMessageCount) -> Self {
        Self {
            id: r.room_id,
            t: r.room_type,
            messages: r.count,
            name: r.room_name,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TopChannelsResponse {
    pub channels: Vec<ChannelDto>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MonthResponse {
    pub month: Vec<DayUsers>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HoursResponse {
    pub hours: Vec<HourUsers>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct WeekResponse {
    pub week: Vec<DayHourUsers>,
}
