//! Initialize the configuration directory: create ~/.stickerbot, a default config, and the sticker root.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::config;

/// Create the config directory and default files if they do not exist.
/// - Creates the config directory (parent of config file path).
/// - Writes `config.json` with `{}` if missing.
/// - Creates the sticker root resolved from that config if missing.
///
/// Returns the sticker root.
pub fn init_config_dir(config_path: &Path) -> Result<PathBuf> {
    let config_dir = config_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(config_dir)
        .with_context(|| format!("creating config directory {}", config_dir.display()))?;

    if !config_path.exists() {
        std::fs::write(config_path, b"{}")
            .with_context(|| format!("writing default config to {}", config_path.display()))?;
        log::info!("created default config at {}", config_path.display());
    }

    let (config, _) = config::load_config(Some(config_path.to_path_buf()))?;
    let stickers_dir = config::resolve_stickers_dir(&config, config_path);
    if !stickers_dir.exists() {
        std::fs::create_dir_all(&stickers_dir)
            .with_context(|| format!("creating sticker root {}", stickers_dir.display()))?;
        log::info!("created sticker root at {}", stickers_dir.display());
    } else {
        log::debug!(
            "sticker root already exists at {}, skipping",
            stickers_dir.display()
        );
    }

    Ok(stickers_dir)
}
