// Configuration: command line arguments plus environment, resolved once at
// startup into a `Config` that the client and the runner borrow.

use crate::error::{Error, Result};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_API_BASE: &str = "https://discord.com/api/v10";
pub const DEFAULT_CDN_BASE: &str = "https://cdn.discordapp.com";
pub const TOKEN_ENV: &str = "DISCORD_BOT_TOKEN";

/// Usage line printed when the arguments can't be parsed.
pub const USAGE: &str = "Usage: discord-avatar-dl <USERS_FILE>";

const FETCH_TIMEOUT: Duration = Duration::from_secs(10);
const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(15);

/// Download the avatars of the Discord users listed in a file.
#[derive(Parser, Debug, Clone)]
#[command(name = "discord-avatar-dl", version)]
pub struct Cli {
    /// Text file with one user id per line
    pub users_file: PathBuf,

    /// Directory the avatars are written to
    #[arg(long, env = "AVATAR_OUTPUT_DIR", default_value = "avatars")]
    pub output_dir: PathBuf,

    /// Seconds to wait after each user that reached the download step
    #[arg(long, env = "AVATAR_DELAY_SECS", default_value_t = 2.0)]
    pub delay: f64,

    #[arg(long, env = "DISCORD_API_BASE", default_value = DEFAULT_API_BASE)]
    pub api_base: String,

    #[arg(long, env = "DISCORD_CDN_BASE", default_value = DEFAULT_CDN_BASE)]
    pub cdn_base: String,
}

/// Everything the pipeline needs, read-only after startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub token: String,
    pub api_base: String,
    pub cdn_base: String,
    pub output_dir: PathBuf,
    pub delay: Duration,
    pub fetch_timeout: Duration,
    pub download_timeout: Duration,
}

impl Config {
    /// Defaults for everything except the bot token.
    pub fn new(token: impl Into<String>) -> Self {
        Config {
            token: token.into(),
            api_base: DEFAULT_API_BASE.into(),
            cdn_base: DEFAULT_CDN_BASE.into(),
            output_dir: PathBuf::from("avatars"),
            delay: Duration::from_secs(2),
            fetch_timeout: FETCH_TIMEOUT,
            download_timeout: DOWNLOAD_TIMEOUT,
        }
    }

    /// Build the config from parsed arguments and `DISCORD_BOT_TOKEN`.
    /// Call after `.env` has been loaded.
    pub fn from_env(cli: &Cli) -> Result<Self> {
        Self::from_cli(cli, std::env::var(TOKEN_ENV).ok())
    }

    pub fn from_cli(cli: &Cli, token: Option<String>) -> Result<Self> {
        let token = token
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or(Error::MissingToken)?;

        let delay =
            Duration::try_from_secs_f64(cli.delay).map_err(|_| Error::InvalidDelay(cli.delay))?;

        Ok(Config {
            api_base: cli.api_base.trim_end_matches('/').to_string(),
            cdn_base: cli.cdn_base.trim_end_matches('/').to_string(),
            output_dir: cli.output_dir.clone(),
            delay,
            ..Config::new(token)
        })
    }
}
