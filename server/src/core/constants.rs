// =============================================================================
// Application Identity
// =============================================================================

/// Application name in title case (for display and platform directories)
pub const APP_NAME: &str = "Huddle";

/// Application name in lowercase (for paths and identifiers)
pub const APP_NAME_LOWER: &str = "huddle";

/// Unix-style dotfile folder name
pub const APP_DOT_FOLDER: &str = ".huddle";

// =============================================================================
// Configuration Files
// =============================================================================

/// Config file name
pub const CONFIG_FILE_NAME: &str = "huddle.json";

/// Environment variable for config file path
pub const ENV_CONFIG: &str = "HUDDLE_CONFIG";

// =============================================================================
// Environment Variables - Server
// =============================================================================

/// Environment variable for server host
pub const ENV_HOST: &str = "HUDDLE_HOST";

/// Environment variable for server port
pub const ENV_PORT: &str = "HUDDLE_PORT";

/// Environment variable for log level/filter
pub const ENV_LOG: &str = "HUDDLE_LOG";

/// Environment variable to override data directory
pub const ENV_DATA_DIR: &str = "HUDDLE_DATA_DIR";

/// Environment variable for the default page size
pub const ENV_PAGINATION_DEFAULT_COUNT: &str = "HUDDLE_PAGINATION_DEFAULT_COUNT";

/// Environment variable for the page size ceiling
pub const ENV_PAGINATION_MAX_COUNT: &str = "HUDDLE_PAGINATION_MAX_COUNT";

/// Environment variable for the engagement backfill window
pub const ENV_ENGAGEMENT_BACKFILL_DAYS: &str = "HUDDLE_ENGAGEMENT_BACKFILL_DAYS";

// =============================================================================
// Server Defaults
// =============================================================================

/// Default server host
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default server port
pub const DEFAULT_PORT: u16 = 3100;

/// Default request body limit (1 MB)
pub const DEFAULT_BODY_LIMIT: usize = 1024 * 1024;

/// Shutdown timeout for background tasks
pub const SHUTDOWN_TIMEOUT_SECS: u64 = 10;

// =============================================================================
// Pagination
// =============================================================================

/// Page size used when `count` is omitted
pub const DEFAULT_PAGE_COUNT: u32 = 50;

/// Upper bound for `count`
pub const MAX_PAGE_COUNT: u32 = 100;

// =============================================================================
// SQLite
// =============================================================================

pub const SQLITE_DB_FILENAME: &str = "huddle.db";
pub const SQLITE_MAX_CONNECTIONS: u32 = 8;
pub const SQLITE_BUSY_TIMEOUT_SECS: u64 = 5;
pub const SQLITE_CACHE_SIZE: &str = "-16000";
pub const SQLITE_WAL_AUTOCHECKPOINT: &str = "1000";
pub const SQLITE_CHECKPOINT_INTERVAL_SECS: u64 = 300;

// =============================================================================
// Authentication
// =============================================================================

/// Header carrying the caller's user id
pub const HEADER_USER_ID: &str = "x-user-id";

/// Header carrying the caller's personal access token
pub const HEADER_AUTH_TOKEN: &str = "x-auth-token";

/// Username of the bootstrap administrator
pub const BOOTSTRAP_USERNAME: &str = "admin";

/// Length of generated access tokens (bytes before hex encoding)
pub const AUTH_TOKEN_BYTES: usize = 32;

/// TTL for cached permission -> roles lookups
pub const CACHE_TTL_PERMISSION_SECS: u64 = 60;

/// Max cached permission entries
pub const PERMISSION_CACHE_CAPACITY: u64 = 1_000;

/// TTL for remembered (user, session) pairs
pub const CACHE_TTL_SESSION_SECS: u64 = 3_600;

/// Max remembered (user, session) pairs
pub const SESSION_CACHE_CAPACITY: u64 = 10_000;

/// Device type stored on sessions opened by REST requests
pub const SESSION_DEVICE_TYPE: &str = "api";

/// Credential id of sessions opened while authentication is disabled
pub const LOCAL_SESSION_CREDENTIAL: &str = "local";

/// Hex characters of the token hash used as a session's credential id
pub const SESSION_CREDENTIAL_LEN: usize = 16;

// =============================================================================
// Roles & Permissions
// =============================================================================

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_USER: &str = "user";
pub const ROLE_ANONYMOUS: &str = "anonymous";

pub const TEAM_ROLE_OWNER: &str = "owner";
pub const TEAM_ROLE_MEMBER: &str = "member";

pub const PERM_VIEW_ALL_TEAMS: &str = "view-all-teams";
pub const PERM_CREATE_TEAM: &str = "create-team";
pub const PERM_MANAGE_EMOJI: &str = "manage-emoji";
pub const PERM_VIEW_ENGAGEMENT_DASHBOARD: &str = "view-engagement-dashboard";
pub const PERM_EDIT_TEAM_MEMBER: &str = "edit-team-member";
pub const PERM_ADD_TEAM_MEMBER: &str = "add-team-member";
pub const PERM_CREATE_USER: &str = "create-user";
pub const PERM_GENERATE_ACCESS_TOKEN: &str = "user-generate-access-token";
pub const PERM_CREATE_CHANNEL: &str = "create-c";
pub const PERM_CREATE_GROUP: &str = "create-p";
pub const PERM_DELETE_MESSAGE: &str = "delete-message";

// =============================================================================
// Engagement Dashboard
// =============================================================================

/// Days of history computed on the first dashboard query for a metric
pub const DEFAULT_BACKFILL_DAYS: u32 = 90;

/// Number of channels returned by the popular channels report
pub const TOP_CHANNELS_LIMIT: u32 = 5;

/// Hour bucket width for the busiest-hours report
pub const BUSIEST_HOURS_GROUP_SIZE: u32 = 2;

/// Days covered by the busiest-days report
pub const BUSIEST_DAYS_SPAN: u32 = 7;

/// Earliest year accepted in dashboard date parameters
pub const MIN_REPORT_YEAR: i32 = 1970;

/// Latest year accepted in dashboard date parameters
pub const MAX_REPORT_YEAR: i32 = 9999;

/// Longest date range a dashboard report may span
pub const MAX_REPORT_DAYS: u32 = 3_660;

/// Trailing span covered by the busiest-hours report
pub const BUSIEST_HOURS_SPAN_SECS: i64 = 24 * 3_600;
