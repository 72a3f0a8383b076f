use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::BaseDirs;
use serde::Deserialize;

use super::cli::CliConfig;
use super::constants::{
    APP_DOT_FOLDER, CONFIG_FILE_NAME, DEFAULT_BACKFILL_DAYS, DEFAULT_HOST, DEFAULT_PAGE_COUNT,
    DEFAULT_PORT, MAX_PAGE_COUNT,
};

// =============================================================================
// Runtime Config
// =============================================================================

/// HTTP server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Authentication configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// When false, every request runs as the bootstrap administrator
    pub enabled: bool,
}

/// List endpoint paging limits
#[derive(Debug, Clone, Copy)]
pub struct PaginationConfig {
    pub default_count: u32,
    pub max_count: u32,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_count: DEFAULT_PAGE_COUNT,
            max_count: MAX_PAGE_COUNT,
        }
    }
}

/// Engagement dashboard configuration
#[derive(Debug, Clone, Copy)]
pub struct EngagementConfig {
    pub backfill_days: u32,
}

impl Default for EngagementConfig {
    fn default() -> Self {
        Self {
            backfill_days: DEFAULT_BACKFILL_DAYS,
        }
    }
}

// =============================================================================
// File Config
// =============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct ServerFileConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AuthFileConfig {
    pub enabled: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PaginationFileConfig {
    pub default_count: Option<u32>,
    pub max_count: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct EngagementFileConfig {
    pub backfill_days: Option<u32>,
}

/// File-based configuration (JSON)
#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    pub server: Option<ServerFileConfig>,
    pub auth: Option<AuthFileConfig>,
    pub pagination: Option<PaginationFileConfig>,
    pub engagement: Option<EngagementFileConfig>,
    #[serde(flatten)]
    pub extra: serde_json::Value,
}

impl FileConfig {
    /// Load configuration from a JSON file
    fn load_from_file(path: &Path) -> Result<Self> {
        tracing::debug!(path = %path.display(), "Loading config file");
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        tracing::trace!(config = ?config, "Parsed config file");
        Ok(config)
    }

    /// Warn about unknown fields in the config
    fn warn_unknown_fields(&self) {
        if let serde_json::Value::Object(map) = &self.extra
            && !map.is_empty()
        {
            let keys_str: String = map
                .keys()
                .map(|k| k.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            tracing::warn!(
                fields = %keys_str,
                "Unknown fields in config file (possible typos)"
            );
        }
    }

    /// Merge another FileConfig into this one (other takes precedence)
    fn merge(&mut self, other: FileConfig) {
        if let Some(server) = other.server {
            let current = self.server.get_or_insert_with(ServerFileConfig::default);
            if server.host.is_some() {
                tracing::trace!(host = ?server.host, "Merging server.host");
                current.host = server.host;
            }
            if server.port.is_some() {
                tracing::trace!(port = ?server.port, "Merging server.port");
                current.port = server.port;
            }
        }

        if let Some(auth) = other.auth {
            let current = self.auth.get_or_insert_with(AuthFileConfig::default);
            if auth.enabled.is_some() {
                tracing::trace!(enabled = ?auth.enabled, "Merging auth.enabled");
                current.enabled = auth.enabled;
            }
        }

        if let Some(pagination) = other.pagination {
            let current = self
                .pagination
                .get_or_insert_with(PaginationFileConfig::default);
            if pagination.default_count.is_some() {
                current.default_count = pagination.default_count;
            }
            if pagination.max_count.is_some() {
                current.max_count = pagination.max_count;
            }
        }

        if let Some(engagement) = other.engagement {
            let current = self
                .engagement
                .get_or_insert_with(EngagementFileConfig::default);
            if engagement.backfill_days.is_some() {
                current.backfill_days = engagement.backfill_days;
            }
        }
    }
}

// =============================================================================
// App Config
// =============================================================================

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub pagination: PaginationConfig,
    pub engagement: EngagementConfig,
}

impl AppConfig {
    /// Load configuration from all sources
    ///
    /// Priority (lowest to highest):
    /// 1. Defaults
    /// 2. Profile directory config (~/.huddle/huddle.json)
    /// 3. Local directory config OR CLI-specified config path
    /// 4. CLI arguments (which include env var fallbacks via clap)
    pub fn load(cli: &CliConfig) -> Result<Self> {
        tracing::debug!("Loading application configuration");
        tracing::trace!(cli = ?cli, "CLI config");

        let mut file_config = FileConfig::default();
        let mut found_configs: Vec<String> = Vec::new();

        if let Some(profile_path) = get_profile_config_path()
            && profile_path.exists()
        {
            let profile_config = FileConfig::load_from_file(&profile_path)?;
            profile_config.warn_unknown_fields();
            file_config.merge(profile_config);
            found_configs.push(profile_path.display().to_string());
        }

        let overlay_path = if let Some(ref path) = cli.config {
            if !path.exists() {
                anyhow::bail!("Config file not found: {}", path.display());
            }
            Some(path.clone())
        } else {
            let local = PathBuf::from(CONFIG_FILE_NAME);
            if local.exists() { Some(local) } else { None }
        };

        if let Some(path) = overlay_path {
            let overlay_config = FileConfig::load_from_file(&path)?;
            overlay_config.warn_unknown_fields();
            file_config.merge(overlay_config);
            found_configs.push(path.display().to_string());
        }

        tracing::debug!(configs = ?found_configs, "Config files loaded");

        Self::layer(cli, file_config)
    }

    /// Layer defaults, file config and CLI/env overrides
    fn layer(cli: &CliConfig, file_config: FileConfig) -> Result<Self> {
        let file_server = file_config.server.unwrap_or_default();
        let file_auth = file_config.auth.unwrap_or_default();
        let file_pagination = file_config.pagination.unwrap_or_default();
        let file_engagement = file_config.engagement.unwrap_or_default();

        let host = cli
            .host
            .clone()
            .or(file_server.host)
            .unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = cli.port.or(file_server.port).unwrap_or(DEFAULT_PORT);

        let auth_enabled = if cli.no_auth {
            false
        } else {
            file_auth.enabled.unwrap_or(true)
        };

        let default_count = cli
            .default_count
            .or(file_pagination.default_count)
            .unwrap_or(DEFAULT_PAGE_COUNT);
        let max_count = cli
            .max_count
            .or(file_pagination.max_count)
            .unwrap_or(MAX_PAGE_COUNT);
        if default_count == 0 || default_count > max_count {
            anyhow::bail!(
                "Invalid pagination config: default_count ({}) must be between 1 and max_count ({})",
                default_count,
                max_count
            );
        }

        let backfill_days = cli
            .backfill_days
            .or(file_engagement.backfill_days)
            .unwrap_or(DEFAULT_BACKFILL_DAYS);
        if backfill_days == 0 {
            anyhow::bail!("Invalid engagement config: backfill_days must be at least 1");
        }

        let config = Self {
            server: ServerConfig { host, port },
            auth: AuthConfig {
                enabled: auth_enabled,
            },
            pagination: PaginationConfig {
                default_count,
                max_count,
            },
            engagement: EngagementConfig { backfill_days },
        };

        tracing::debug!(
            host = %config.server.host,
            port = config.server.port,
            auth = config.auth.enabled,
            "Configuration resolved"
        );

        Ok(config)
    }
}

fn get_profile_config_path() -> Option<PathBuf> {
    BaseDirs::new().map(|d| d.home_dir().join(APP_DOT_FOLDER).join(CONFIG_FILE_NAME))
}

/// Check if host binds to all network interfaces
pub fn is_all_interfaces(host: &str) -> bool {
    matches!(host, "0.0.0.0" | "::" | "[::]")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_file_config_parse_full() {
        let json = r#"{
            "server": { "host": "0.0.0.0", "port": 8080 },
            "auth": { "enabled": false },
            "pagination": { "default_count": 25, "max_count": 200 },
            "engagement": { "backfill_days": 30 }
        }"#;
        let config: FileConfig = serde_json::from_str(json).unwrap();

        assert_eq!(
            config.server.as_ref().unwrap().host,
            Some("0.0.0.0".to_string())
        );
        assert_eq!(config.server.as_ref().unwrap().port, Some(8080));
        assert_eq!(config.auth.as_ref().unwrap().enabled, Some(false));
        assert_eq!(config.pagination.as_ref().unwrap().default_count, Some(25));
        assert_eq!(config.engagement.as_ref().unwrap().backfill_days, Some(30));
    }

    #[test]
    fn test_unknown_fields_are_collected() {
        let json = r#"{ "server": { "port": 9000 }, "sever": {} }"#;
        let config: FileConfig = serde_json::from_str(json).unwrap();
        let extra = config.extra.as_object().unwrap();
        assert!(extra.contains_key("sever"));
    }

    #[test]
    fn test_merge_overlay_wins() {
        let mut base: FileConfig =
            serde_json::from_str(r#"{ "server": { "host": "0.0.0.0", "port": 1 } }"#).unwrap();
        let overlay: FileConfig = serde_json::from_str(r#"{ "server": { "port": 2 } }"#).unwrap();
        base.merge(overlay);

        let server = base.server.unwrap();
        assert_eq!(server.host.as_deref(), Some("0.0.0.0"));
        assert_eq!(server.port, Some(2));
    }

    #[test]
    fn test_layer_defaults() {
        let config = AppConfig::layer(&CliConfig::default(), FileConfig::default()).unwrap();
        assert_eq!(config.server.host, DEFAULT_HOST);
        assert_eq!(config.server.port, DEFAULT_PORT);
        assert!(config.auth.enabled);
        assert_eq!(config.pagination.default_count, DEFAULT_PAGE_COUNT);
        assert_eq!(config.pagination.max_count, MAX_PAGE_COUNT);
        assert_eq!(config.engagement.backfill_days, DEFAULT_BACKFILL_DAYS);
    }

    #[test]
    fn test_layer_cli_overrides_file() {
        let file: FileConfig =
            serde_json::from_str(r#"{ "server": { "port": 8080 }, "auth": { "enabled": true } }"#)
                .unwrap();
        let cli = CliConfig {
            port: Some(9090),
            no_auth: true,
            ..Default::default()
        };
        let config = AppConfig::layer(&cli, file).unwrap();
        assert_eq!(config.server.port, 9090);
        assert!(!config.auth.enabled);
    }

    #[test]
    fn test_layer_rejects_default_above_max() {
        let cli = CliConfig {
            default_count: Some(500),
            max_count: Some(100),
            ..Default::default()
        };
        assert!(AppConfig::layer(&cli, FileConfig::default()).is_err());
    }

    #[test]
    fn test_load_from_explicit_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "server": {{ "port": 7777 }} }}"#).unwrap();

        let cli = CliConfig {
            config: Some(file.path().to_path_buf()),
            ..Default::default()
        };
        let config = AppConfig::load(&cli).unwrap();
        assert_eq!(config.server.port, 7777);
    }

    #[test]
    fn test_load_missing_path_fails() {
        let cli = CliConfig {
            config: Some(PathBuf::from("/definitely/not/here/huddle.json")),
            ..Default::default()
        };
        assert!(AppConfig::load(&cli).is_err());
    }

    #[test]
    fn test_is_all_interfaces() {
        assert!(is_all_interfaces("0.0.0.0"));
        assert!(is_all_interfaces("::"));
        assert!(!is_all_interfaces("127.0.0.1"));
    }
}
