use poise::serenity_prelude as serenity;
use std::collections::HashSet;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Prefix used when a guild has not configured its own
pub const DEFAULT_PREFIX: &str = ";";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Expected a Discord bot token in the environment variable DISCORD_TOKEN")]
    MissingToken,
    #[error("Invalid owner id `{0}` in OWNER_IDS")]
    InvalidOwnerId(String),
    #[error("Invalid HELP_PICKER_TIMEOUT_SECS value `{0}`")]
    InvalidTimeout(String),
}

/// Runtime configuration, read from the environment (and `.env`)
#[derive(Debug, Clone)]
pub struct Config {
    pub token: String,
    pub default_prefix: String,
    pub owners: HashSet<serenity::UserId>,
    pub data_dir: PathBuf,
    /// `None` keeps help pickers alive until the process exits
    pub picker_timeout: Option<Duration>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let token = env::var("DISCORD_TOKEN").map_err(|_| ConfigError::MissingToken)?;

        let default_prefix = env::var("BOT_PREFIX")
            .ok()
            .filter(|p| !p.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_PREFIX.to_string());

        let owners = match env::var("OWNER_IDS") {
            Ok(raw) => parse_owner_ids(&raw)?,
            Err(_) => HashSet::new(),
        };

        let data_dir = env::var("DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("data"));

        let picker_timeout = match env::var("HELP_PICKER_TIMEOUT_SECS") {
            Ok(raw) => parse_timeout(&raw)?,
            Err(_) => None,
        };

        Ok(Self {
            token,
            default_prefix,
            owners,
            data_dir,
            picker_timeout,
        })
    }
}

/// Parses a whitespace- or comma-separated list of user ids
pub fn parse_owner_ids(raw: &str) -> Result<HashSet<serenity::UserId>, ConfigError> {
    raw.split(|c: char| c.is_whitespace() || c == ',')
        .filter(|part| !part.is_empty())
        .map(|part| match part.parse::<u64>() {
            Ok(id) if id != 0 => Ok(serenity::UserId::new(id)),
            _ => Err(ConfigError::InvalidOwnerId(part.to_string())),
        })
        .collect()
}

fn parse_timeout(raw: &str) -> Result<Option<Duration>, ConfigError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }

    match raw.parse::<u64>() {
        Ok(0) => Ok(None),
        Ok(secs) => Ok(Some(Duration::from_secs(secs))),
        Err(_) => Err(ConfigError::InvalidTimeout(raw.to_string())),
    }
}
