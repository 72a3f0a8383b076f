use clap::{Parser, Subcommand};

use std::path::PathBuf;

use super::constants::{
    ENV_CONFIG, ENV_ENGAGEMENT_BACKFILL_DAYS, ENV_HOST, ENV_PAGINATION_DEFAULT_COUNT,
    ENV_PAGINATION_MAX_COUNT, ENV_PORT,
};

#[derive(Parser)]
#[command(name = "huddle")]
#[command(version, about = "Team chat server with engagement analytics", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Server host address
    #[arg(long, short = 'H', global = true, env = ENV_HOST)]
    pub host: Option<String>,

    /// Server port
    #[arg(long, short = 'p', global = true, env = ENV_PORT)]
    pub port: Option<u16>,

    /// Disable authentication (for development)
    #[arg(long, global = true)]
    pub no_auth: bool,

    /// Path to config file
    #[arg(long, short = 'c', global = true, env = ENV_CONFIG)]
    pub config: Option<PathBuf>,

    /// Page size used when a list request omits `count`
    #[arg(long, global = true, env = ENV_PAGINATION_DEFAULT_COUNT)]
    pub default_count: Option<u32>,

    /// Largest accepted `count` for list requests
    #[arg(long, global = true, env = ENV_PAGINATION_MAX_COUNT)]
    pub max_count: Option<u32>,

    /// Days of history computed when the engagement dashboard is first queried
    #[arg(long, global = true, env = ENV_ENGAGEMENT_BACKFILL_DAYS)]
    pub backfill_days: Option<u32>,
}

#[derive(Subcommand, Clone, Debug)]
pub enum Commands {
    /// Start the server (default command)
    Start,
    /// System maintenance commands
    System {
        #[command(subcommand)]
        command: SystemCommands,
    },
}

#[derive(Subcommand, Clone, Debug)]
pub enum SystemCommands {
    /// Delete local data directory (database and caches). Requires confirmation.
    Prune {
        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

/// Configuration derived from CLI arguments
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub no_auth: bool,
    pub config: Option<PathBuf>,
    pub default_count: Option<u32>,
    pub max_count: Option<u32>,
    pub backfill_days: Option<u32>,
}

/// Parse CLI arguments and return config with command
pub fn parse() -> (CliConfig, Option<Commands>) {
    let cli = Cli::parse();
    let config = CliConfig {
        host: cli.host,
        port: cli.port,
        no_auth: cli.no_auth,
        config: cli.config,
        default_count: cli.default_count,
        max_count: cli.max_count,
        backfill_days: cli.backfill_days,
    };
    (config, cli.command)
}
