//! Classification enums shared by repositories and services

use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

// ============================================================================
// ROOM TYPES
// ============================================================================

/// Room kinds, stored and serialized by their one-letter code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum RoomType {
    /// Public channel
    #[serde(rename = "c")]
    Channel,
    /// Private group
    #[serde(rename = "p")]
    Private,
    /// Direct message
    #[serde(rename = "d")]
    Direct,
    /// Livechat (omnichannel) room
    #[serde(rename = "l")]
    Livechat,
}

impl RoomType {
    /// Room types that contribute to the engagement dashboard, in display order
    pub const DASHBOARD: [RoomType; 3] = [RoomType::Channel, RoomType::Private, RoomType::Direct];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Channel => "c",
            Self::Private => "p",
            Self::Direct => "d",
            Self::Livechat => "l",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "c" => Some(Self::Channel),
            "p" => Some(Self::Private),
            "d" => Some(Self::Direct),
            "l" => Some(Self::Livechat),
            _ => None,
        }
    }

    pub fn is_dashboard_type(&self) -> bool {
        Self::DASHBOARD.contains(self)
    }
}

impl fmt::Display for RoomType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// TEAM TYPES
// ============================================================================

/// Team visibility; stored as 0 (public) or 1 (private)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TeamType {
    #[default]
    Public,
    Private,
}

impl TeamType {
    pub fn as_i64(&self) -> i64 {
        match self {
            Self::Public => 0,
            Self::Private => 1,
        }
    }

    pub fn from_i64(value: i64) -> Option<Self> {
        match value {
            0 => Some(Self::Public),
            1 => Some(Self::Private),
            _ => None,
        }
    }

    /// Type of the room created alongside the team
    pub fn main_room_type(&self) -> RoomType {
        match self {
            Self::Public => RoomType::Channel,
            Self::Private => RoomType::Private,
        }
    }
}

impl Serialize for TeamType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.as_i64())
    }
}

impl<'de> Deserialize<'de> for TeamType {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = i64::deserialize(deserializer)?;
        Self::from_i64(value).ok_or_else(|| {
            serde::de::Error::custom(format!("team type must be 0 or 1, got {}", value))
        })
    }
}

// ============================================================================
// ANALYTICS METRICS
// ============================================================================

/// Metric families stored in the analytics table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricType {
    Messages,
    Users,
}

impl MetricType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Messages => "messages",
            Self::Users => "users",
        }
    }
}

impl fmt::Display for MetricType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
