//! Shared API types
//!
//! Responses follow the REST conventions of the chat clients this server
//! talks to: successful bodies carry `success: true` next to their fields,
//! failures are `{success: false, error}` with an optional `errorType`.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, Datelike, Days, NaiveDate, NaiveTime, Utc};
use serde::Serialize;
use serde_json::json;
use utoipa::ToSchema;

use crate::core::config::PaginationConfig;
use crate::core::constants::{MAX_REPORT_YEAR, MIN_REPORT_YEAR};
use crate::data::types::PageRequest;
use crate::domain::{EngagementError, TeamError};

/// Message returned to callers without valid credentials
pub const UNAUTHENTICATED_MESSAGE: &str = "You must be logged in to do this.";

/// Standard API error response
#[derive(Debug)]
pub enum ApiError {
    /// 400 with the failure envelope
    Failure {
        message: String,
        error_type: Option<String>,
    },
    /// 403: authenticated but lacking a permission
    Unauthorized,
    /// 401: missing or invalid credentials
    Unauthenticated,
    NotFound { message: String },
    Internal { message: String },
}

impl ApiError {
    pub fn failure(message: impl Into<String>) -> Self {
        Self::Failure {
            message: message.into(),
            error_type: None,
        }
    }

    pub fn bad_request(error_type: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Failure {
            message: message.into(),
            error_type: Some(error_type.into()),
        }
    }

    pub fn unauthorized() -> Self {
        Self::Unauthorized
    }

    pub fn unauthenticated() -> Self {
        Self::Unauthenticated
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    pub fn from_data(e: crate::data::DataError) -> Self {
        tracing::error!(error = %e, "Data error");
        Self::Internal {
            message: "Database operation failed".to_string(),
        }
    }
}

impl From<TeamError> for ApiError {
    fn from(e: TeamError) -> Self {
        match e {
            TeamError::Data(e) => Self::from_data(e),
            other => Self::Failure {
                message: other.to_string(),
                error_type: other.error_type().map(str::to_string),
            },
        }
    }
}

impl From<EngagementError> for ApiError {
    fn from(e: EngagementError) -> Self {
        match e {
            EngagementError::Data(e) => Self::from_data(e),
            other => Self::failure(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            Self::Failure {
                message,
                error_type,
            } => {
                let mut body = json!({ "success": false, "error": message });
                if let Some(error_type) = error_type {
                    body["errorType"] = json!(error_type);
                }
                (StatusCode::BAD_REQUEST, body)
            }
            Self::Unauthorized => (
                StatusCode::FORBIDDEN,
                json!({ "success": false, "error": "unauthorized" }),
            ),
            Self::Unauthenticated => (
                StatusCode::UNAUTHORIZED,
                json!({ "status": "error", "message": UNAUTHENTICATED_MESSAGE }),
            ),
            Self::NotFound { message } => (
                StatusCode::NOT_FOUND,
                json!({ "success": false, "error": message }),
            ),
            Self::Internal { message } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "success": false, "error": message }),
            ),
        };
        (status, Json(body)).into_response()
    }
}

// ============================================================================
// Success envelope
// ============================================================================

/// Response body with `success: true` merged into its fields
#[derive(Debug, Serialize)]
pub struct Success<T> {
    #[serde(flatten)]
    pub body: T,
    pub success: bool,
}

/// Wrap `body` in the success envelope
pub fn success<T: Serialize>(body: T) -> Json<Success<T>> {
    Json(Success {
        body,
        success: true,
    })
}

/// Body of endpoints that only report success
#[derive(Debug, Default, Serialize, ToSchema)]
pub struct Empty {}

// ============================================================================
// Pagination
// ============================================================================

/// Resolve `offset`/`count` query values against the configured limits.
/// `count` above the maximum is clamped.
pub fn page_request(config: &PaginationConfig, offset: Option<u32>, count: Option<u32>) -> PageRequest {
    PageRequest {
        offset: offset.unwrap_or(0),
        count: count
            .unwrap_or(config.default_count)
            .clamp(1, config.max_count),
    }
}

/// Paging fields shared by list responses
#[derive(Debug, Serialize, ToSchema)]
pub struct PageMeta {
    pub total: u64,
    /// Number of items in this page
    pub count: usize,
    pub offset: u32,
}

impl PageMeta {
    pub fn new(page: PageRequest, items: usize, total: u64) -> Self {
        Self {
            total,
            count: items,
            offset: page.offset,
        }
    }
}

// ============================================================================
// Parameter parsing
// ============================================================================

/// Require a non-empty body parameter
pub fn require_body_param(value: Option<String>, name: &str) -> Result<String, ApiError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::failure(format!("Body param \"{}\" is required", name)))
}

/// Parse an optional timestamp string parameter (RFC 3339 / ISO 8601 format)
pub fn parse_timestamp_param(s: &Option<String>) -> Result<Option<DateTime<Utc>>, ApiError> {
    match s {
        Some(ts) => DateTime::parse_from_rfc3339(ts)
            .map(|dt| Some(dt.with_timezone(&Utc)))
            .map_err(|_| {
                ApiError::bad_request(
                    "error-invalid-date",
                    format!("Invalid timestamp format: {}. Use ISO 8601 format.", ts),
                )
            }),
        None => Ok(None),
    }
}

/// A date parameter as sent: a full timestamp or a bare calendar day
enum DateParam {
    Instant(DateTime<Utc>),
    Day(NaiveDate),
}

impl DateParam {
    fn parse(value: Option<&str>, name: &str) -> Result<Self, ApiError> {
        let value = value
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| {
                ApiError::failure(format!("The \"{}\" query parameter is required", name))
            })?;

        let parsed = match DateTime::parse_from_rfc3339(value) {
            Ok(ts) => Self::Instant(ts.with_timezone(&Utc)),
            Err(_) => NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .map(Self::Day)
                .map_err(|_| invalid_date(name))?,
        };
        if !(MIN_REPORT_YEAR..=MAX_REPORT_YEAR).contains(&parsed.date().year()) {
            return Err(invalid_date(name));
        }
        Ok(parsed)
    }

    fn date(&self) -> NaiveDate {
        match self {
            Self::Instant(ts) => ts.date_naive(),
            Self::Day(day) => *day,
        }
    }
}

fn invalid_date(name: &str) -> ApiError {
    ApiError::bad_request(
        "error-invalid-date",
        format!("The \"{}\" query parameter must be a valid date.", name),
    )
}

/// Parse a required date query parameter.
///
/// Accepts a full RFC 3339 timestamp (reduced to its UTC day) or a plain
/// `YYYY-MM-DD` date. Years outside 1970..=9999 are rejected.
pub fn parse_date_param(value: Option<&str>, name: &str) -> Result<NaiveDate, ApiError> {
    DateParam::parse(value, name).map(|p| p.date())
}

/// Parse a required date query parameter as a point in time.
///
/// An RFC 3339 timestamp is taken as is; a plain date means the end of that
/// UTC day.
pub fn parse_instant_param(value: Option<&str>, name: &str) -> Result<DateTime<Utc>, ApiError> {
    match DateParam::parse(value, name)? {
        DateParam::Instant(ts) => Ok(ts),
        DateParam::Day(day) => day
            .checked_add_days(Days::new(1))
            .map(|next| next.and_time(NaiveTime::MIN).and_utc())
            .ok_or_else(|| invalid_date(name)),
    }
}
