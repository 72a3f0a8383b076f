//! Shared data types for repositories and domain services

mod analytics;
mod enums;
mod transactional;

pub use enums::{MetricType, RoomType, TeamType};

pub use analytics::{
    AnalyticsRow, DailyRoomMessages, DailyTotal, DayHourUsers, DayUsers, HourUsers,
    RoomMessageCount, SessionRow,
};

pub use transactional::{
    CreateTeamResult, EmojiRow, LastOwnerResult, MessageRow, NewTeam, PageRequest, Paged,
    RoomRow, TeamMemberWithUser, TeamRow, UserRow,
};
