use crate::db::StoreError;
use parking_lot::RwLock;
use poise::serenity_prelude as serenity;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::PathBuf;

/// Guild id -> command prefix, persisted as a flat JSON object.
pub struct PrefixStore {
    path: PathBuf,
    default_prefix: String,
    prefixes: RwLock<HashMap<String, String>>,
}

impl PrefixStore {
    pub fn open(path: impl Into<PathBuf>, default_prefix: &str) -> Result<Self, StoreError> {
        let path = path.into();
        let prefixes = match fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).map_err(|source| StoreError::Parse {
                path: path.clone(),
                source,
            })?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => HashMap::new(),
            Err(source) => return Err(StoreError::Io { path, source }),
        };

        Ok(Self {
            path,
            default_prefix: default_prefix.to_string(),
            prefixes: RwLock::new(prefixes),
        })
    }

    pub fn default_prefix(&self) -> &str {
        &self.default_prefix
    }

    /// Prefix in effect for `guild_id`. DMs always use the default.
    pub fn get(&self, guild_id: Option<serenity::GuildId>) -> String {
        guild_id
            .and_then(|id| self.prefixes.read().get(&id.to_string()).cloned())
            .unwrap_or_else(|| self.default_prefix.clone())
    }

    pub fn set(&self, guild_id: serenity::GuildId, prefix: &str) -> Result<(), StoreError> {
        let mut prefixes = self.prefixes.write();
        prefixes.insert(guild_id.to_string(), prefix.to_string());

        let json = serde_json::to_string_pretty(&*prefixes).map_err(|source| StoreError::Parse {
            path: self.path.clone(),
            source,
        })?;
        fs::write(&self.path, json).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })
    }
}

/// Checks a user-supplied prefix, returning the rejection message if it's unusable
pub fn validate_prefix(prefix: &str) -> Result<(), &'static str> {
    if prefix == "/" {
        return Err("Prefix cannot be `/`");
    }
    if prefix.trim().is_empty() {
        return Err("Prefix cannot be empty");
    }
    Ok(())
}
