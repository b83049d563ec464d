//! Configuration types and loading.
//!
//! Config is loaded from a JSON file (e.g. `~/.stickerbot/config.json`) and environment.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::stickers::CollisionPolicy;

/// Top-level application config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Discord connection settings.
    #[serde(default)]
    pub discord: DiscordConfig,

    /// Sticker root and catalog options.
    #[serde(default)]
    pub stickers: StickersConfig,
}

/// Discord bot token and command settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscordConfig {
    /// Bot token. Overridden by DISCORD_BOT_TOKEN env when set.
    pub bot_token: Option<String>,

    /// Prefix that marks a message as a command (default "!").
    #[serde(default = "default_command_prefix")]
    pub command_prefix: String,

    /// REST API base URL (default https://discord.com/api/v10).
    pub api_base: Option<String>,
}

fn default_command_prefix() -> String {
    "!".to_string()
}

impl Default for DiscordConfig {
    fn default() -> Self {
        Self {
            bot_token: None,
            command_prefix: default_command_prefix(),
            api_base: None,
        }
    }
}

/// Where stickers live and how the catalog is built.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StickersConfig {
    /// Sticker root. Relative paths are resolved against the config file's parent. Default: `stickers` next to the config file.
    #[serde(default)]
    pub directory: Option<PathBuf>,

    /// "warn" (default): later registrations replace earlier ones and are logged. "reject": duplicate names abort startup.
    #[serde(default)]
    pub on_collision: CollisionPolicy,

    /// Seconds before the "Missing webhook" notice deletes itself (default 8).
    #[serde(default = "default_notice_seconds")]
    pub notice_seconds: u64,
}

fn default_notice_seconds() -> u64 {
    8
}

impl Default for StickersConfig {
    fn default() -> Self {
        Self {
            directory: None,
            on_collision: CollisionPolicy::default(),
            notice_seconds: default_notice_seconds(),
        }
    }
}

impl StickersConfig {
    pub fn notice_ttl(&self) -> Duration {
        Duration::from_secs(self.notice_seconds)
    }
}

/// Resolve the Discord bot token: env DISCORD_BOT_TOKEN overrides config.
pub fn resolve_discord_token(config: &Config) -> Option<String> {
    std::env::var("DISCORD_BOT_TOKEN")
        .ok()
        .and_then(|s| {
            let t = s.trim();
            if t.is_empty() {
                None
            } else {
                Some(t.to_string())
            }
        })
        .or_else(|| {
            config
                .discord
                .bot_token
                .as_ref()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        })
}

/// Resolve config path from env or default.
pub fn default_config_path() -> PathBuf {
    std::env::var("STICKERBOT_CONFIG_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            dirs::home_dir()
                .map(|h| h.join(".stickerbot").join("config.json"))
                .unwrap_or_else(|| PathBuf::from("config.json"))
        })
}

/// Load config from the given path, or the default path (or STICKERBOT_CONFIG_PATH). Missing file => default config.
/// Returns the config and the path that was used (for resolving the sticker root).
pub fn load_config(path: Option<PathBuf>) -> Result<(Config, PathBuf)> {
    let path = path.unwrap_or_else(default_config_path);
    let config = if !path.exists() {
        log::debug!("config file not found, using defaults: {}", path.display());
        Config::default()
    } else {
        let s = std::fs::read_to_string(&path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        serde_json::from_str(&s)
            .with_context(|| format!("parsing config from {}", path.display()))?
    };
    Ok((config, path))
}

fn config_parent(config_path: &Path) -> &Path {
    config_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
}

/// Resolve the sticker root: `stickers.directory` if set (relative paths resolved against the config file's parent), otherwise `stickers` next to the config file.
pub fn resolve_stickers_dir(config: &Config, config_path: &Path) -> PathBuf {
    let parent = config_parent(config_path);
    match &config.stickers.directory {
        Some(d) if !d.as_os_str().is_empty() => {
            if d.is_absolute() {
                d.clone()
            } else {
                parent.join(d)
            }
        }
        _ => parent.join("stickers"),
    }
}
