use serde::Deserialize;
use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};
use teloxide::types::{ChatId, Recipient, UserId};
use thiserror::Error;
use tracing::warn;

pub const TOKEN_VAR: &str = "BOT_TOKEN";
pub const CHANNEL_VAR: &str = "CHANNEL_ID";
pub const ADMINS_VAR: &str = "ADMIN_USER_IDS";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("BOT_TOKEN environment variable is not set")]
    MissingToken,
    #[error("CHANNEL_ID environment variable is not set")]
    MissingChannel,
    #[error("Failed to read config file: {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config file: {}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// User ids allowed to run privileged commands. An empty list means everyone is allowed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdminList(BTreeSet<u64>);

impl AdminList {
    /// Parse a comma-separated id list. Blank items are skipped, malformed ones are
    /// skipped with a warning, so a bad value degrades to fewer (or no) restrictions.
    pub fn parse(raw: &str) -> Self {
        let ids = raw
            .split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .filter_map(|item| match item.parse::<u64>() {
                Ok(id) => Some(id),
                Err(e) => {
                    warn!("Ignoring malformed admin id '{}': {}", item, e);
                    None
                }
            })
            .collect();
        Self(ids)
    }

    pub fn contains(&self, user: UserId) -> bool {
        self.0.contains(&user.0)
    }

    /// Authorization gate for privileged commands.
    pub fn permits(&self, user: UserId) -> bool {
        self.0.is_empty() || self.contains(user)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl FromIterator<u64> for AdminList {
    fn from_iter<I: IntoIterator<Item = u64>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[derive(Clone)]
pub struct TelegramConfig {
    pub bot_token: String,
    /// Channel target as configured: a numeric chat id or an `@username`.
    pub channel_id: String,
    pub admin_user_ids: AdminList,
}

impl fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("bot_token", &"<redacted>")
            .field("channel_id", &self.channel_id)
            .field("admin_user_ids", &self.admin_user_ids)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub telegram: TelegramConfig,
}

#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    #[serde(default)]
    telegram: FileTelegram,
}

#[derive(Debug, Default, Deserialize)]
struct FileTelegram {
    bot_token: Option<String>,
    channel_id: Option<String>,
    #[serde(default)]
    admin_user_ids: Vec<u64>,
}

impl Config {
    /// Load from an optional TOML file, then let the process environment override it.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::from_sources(path, |key| std::env::var(key).ok())
    }

    pub fn from_sources<F>(path: Option<&Path>, env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let file = match path {
            Some(path) => read_file(path)?,
            None => FileConfig::default(),
        };
        let bot_token = non_empty(env(TOKEN_VAR))
            .or(non_empty(file.telegram.bot_token))
            .ok_or(ConfigError::MissingToken)?;
        let channel_id = non_empty(env(CHANNEL_VAR))
            .or(non_empty(file.telegram.channel_id))
            .ok_or(ConfigError::MissingChannel)?;
        let admin_user_ids = match non_empty(env(ADMINS_VAR)) {
            Some(raw) => AdminList::parse(&raw),
            None => file.telegram.admin_user_ids.into_iter().collect(),
        };

        Ok(Self {
            telegram: TelegramConfig {
                bot_token,
                channel_id,
                admin_user_ids,
            },
        })
    }

    /// Destination for channel posts.
    pub fn channel(&self) -> Recipient {
        match self.telegram.channel_id.parse::<i64>() {
            Ok(id) => Recipient::Id(ChatId(id)),
            Err(_) => Recipient::ChannelUsername(self.telegram.channel_id.clone()),
        }
    }

    pub fn admins(&self) -> &AdminList {
        &self.telegram.admin_user_ids
    }
}

fn read_file(path: &Path) -> Result<FileConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
pub(crate) fn test_config(channel: &str, admins: &[u64]) -> Config {
    Config {
        telegram: TelegramConfig {
            bot_token: "123:test".to_string(),
            channel_id: channel.to_string(),
            admin_user_ids: admins.iter().copied().collect(),
        },
    }
}
