//! SQLite schema definitions
//!
//! Fresh databases get `SCHEMA` at `SCHEMA_VERSION`; older ones are brought
//! forward by the versioned migrations in `migrations.rs`.

/// Current schema version
pub const SCHEMA_VERSION: i32 = 2;

/// Complete schema SQL
pub const SCHEMA: &str = r#"
-- =============================================================================
-- Infrastructure: Schema version tracking
-- =============================================================================
CREATE TABLE IF NOT EXISTS schema_version (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    version INTEGER NOT NULL,
    applied_at INTEGER NOT NULL,
    description TEXT
);

CREATE TABLE IF NOT EXISTS schema_migrations (
    version INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    applied_at INTEGER NOT NULL,
    checksum TEXT NOT NULL,
    execution_time_ms INTEGER,
    success INTEGER NOT NULL DEFAULT 1
);

-- =============================================================================
-- 1. Users
-- =============================================================================
CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY,
    username TEXT NOT NULL UNIQUE CHECK(length(username) >= 1 AND length(username) <= 100),
    name TEXT CHECK(name IS NULL OR length(name) <= 100),
    roles TEXT NOT NULL DEFAULT '[]',
    status TEXT NOT NULL DEFAULT 'offline',
    created_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_users_created_at ON users(created_at);

-- =============================================================================
-- 2. Personal access tokens (SHA-256 of the token, never the token itself)
-- =============================================================================
CREATE TABLE IF NOT EXISTS auth_tokens (
    user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    token_hash TEXT NOT NULL UNIQUE,
    created_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_auth_tokens_user ON auth_tokens(user_id);

-- =============================================================================
-- 3. Permissions (permission id -> roles allowed)
-- =============================================================================
CREATE TABLE IF NOT EXISTS permissions (
    id TEXT PRIMARY KEY,
    roles TEXT NOT NULL DEFAULT '[]'
);

INSERT OR IGNORE INTO permissions (id, roles) VALUES
    ('view-all-teams', '["admin"]'),
    ('create-team', '["admin","user"]'),
    ('manage-emoji', '["admin"]'),
    ('view-engagement-dashboard', '["admin"]'),
    ('edit-team-member', '["admin","owner"]'),
    ('add-team-member', '["admin","owner"]'),
    ('create-user', '["admin"]'),
    ('user-generate-access-token', '["admin"]'),
    ('create-c', '["admin","user"]'),
    ('create-p', '["admin","user"]'),
    ('delete-message', '["admin","owner"]');

-- =============================================================================
-- 4. Rooms (c = channel, p = private group, d = direct, l = livechat)
-- =============================================================================
CREATE TABLE IF NOT EXISTS rooms (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL CHECK(length(name) >= 1),
    type TEXT NOT NULL CHECK(type IN ('c', 'p', 'd', 'l')),
    team_id TEXT,
    team_main INTEGER NOT NULL DEFAULT 0,
    read_only INTEGER NOT NULL DEFAULT 0,
    created_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_rooms_team ON rooms(team_id);

-- =============================================================================
-- 5. Teams (type 0 = public, 1 = private) and their members
-- =============================================================================
CREATE TABLE IF NOT EXISTS teams (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL UNIQUE CHECK(length(name) >= 1),
    type INTEGER NOT NULL CHECK(type IN (0, 1)),
    room_id TEXT NOT NULL REFERENCES rooms(id),
    created_by TEXT NOT NULL,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS team_members (
    team_id TEXT NOT NULL REFERENCES teams(id) ON DELETE CASCADE,
    user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    roles TEXT NOT NULL DEFAULT '[]',
    created_by TEXT NOT NULL,
    created_at INTEGER NOT NULL,
    PRIMARY KEY (team_id, user_id)
);

CREATE INDEX IF NOT EXISTS idx_team_members_user ON team_members(user_id);

-- =============================================================================
-- 6. Messages
-- =============================================================================
CREATE TABLE IF NOT EXISTS messages (
    id TEXT PRIMARY KEY,
    room_id TEXT NOT NULL REFERENCES rooms(id) ON DELETE CASCADE,
    user_id TEXT NOT NULL,
    text TEXT NOT NULL,
    ts INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_messages_ts ON messages(ts);

-- =============================================================================
-- 7. Login sessions
-- =============================================================================
CREATE TABLE IF NOT EXISTS sessions (
    user_id TEXT NOT NULL,
    session_id TEXT NOT NULL,
    year INTEGER NOT NULL,
    month INTEGER NOT NULL,
    day INTEGER NOT NULL,
    login_at INTEGER NOT NULL,
    closed_at INTEGER,
    device_type TEXT NOT NULL DEFAULT 'browser',
    PRIMARY KEY (user_id, session_id)
);

CREATE INDEX IF NOT EXISTS idx_sessions_date ON sessions(year, month, day);
CREATE INDEX IF NOT EXISTS idx_sessions_login_at ON sessions(login_at);

-- =============================================================================
-- 8. Engagement analytics (one row per metric, day and room)
-- =============================================================================
CREATE TABLE IF NOT EXISTS analytics (
    type TEXT NOT NULL CHECK(type IN ('messages', 'users')),
    date INTEGER NOT NULL,
    room_id TEXT NOT NULL DEFAULT '',
    room_name TEXT,
    room_type TEXT,
    count INTEGER NOT NULL DEFAULT 0
);

CREATE UNIQUE INDEX IF NOT EXISTS idx_analytics_type_date_room ON analytics(type, date, room_id);

-- =============================================================================
-- 9. Custom emoji
-- =============================================================================
CREATE TABLE IF NOT EXISTS custom_emojis (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL UNIQUE CHECK(length(name) >= 1),
    aliases TEXT NOT NULL DEFAULT '[]',
    extension TEXT NOT NULL,
    updated_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_custom_emojis_updated_at ON custom_emojis(updated_at);
"#;
