//! Bot runner: build the catalog, connect to Discord, and dispatch commands.
//!
//! The catalog is built before the gateway connects; a malformed descriptor stops
//! startup. Each inbound message is handled in its own task.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

use crate::channels::{identity, DiscordClient, GatewayConnector, InboundMessage};
use crate::commands::{CommandFramework, Resolved};
use crate::config::{self, Config};
use crate::dispatch::{self, DeliveryOutcome, DeliveryRequest, Invocation, Transport, TransportError};
use crate::stickers::{ActionDescriptor, Catalog, CatalogBuilder};

/// Shared state for message handlers. Everything in here is read-only.
#[derive(Clone)]
pub struct BotState {
    pub commands: Arc<CommandFramework>,
    pub discord: DiscordClient,
    pub notice_ttl: Duration,
}

/// Build the catalog for the configured sticker root.
pub fn build_catalog(config: &Config, stickers_dir: &Path) -> Result<Catalog> {
    CatalogBuilder::new(stickers_dir)
        .on_collision(config.stickers.on_collision)
        .build()
        .with_context(|| format!("building sticker catalog from {}", stickers_dir.display()))
}

/// Handle one inbound message: parse the command, resolve it, and run it.
/// Failures are logged here; nothing is retried.
async fn process_inbound_message(state: BotState, msg: InboundMessage) {
    if msg.author.bot {
        return;
    }
    let Some(name) = state.commands.parse(&msg.content) else {
        return;
    };
    let Some(resolved) = state.commands.resolve(name) else {
        log::debug!("unknown command {:?}", name);
        return;
    };
    if let Err(e) = run_command(&state, &msg, resolved).await {
        log::warn!("command {:?} in channel {} failed: {}", name, msg.channel_id, e);
    }
}

async fn run_command(
    state: &BotState,
    msg: &InboundMessage,
    resolved: Resolved,
) -> Result<(), TransportError> {
    let text = |content: String| DeliveryRequest {
        content,
        file: None,
    };
    match resolved {
        Resolved::ListCategories => {
            let listing = text(state.commands.list_categories());
            state.discord.send_message(&msg.channel_id, &listing).await
        }
        Resolved::Help => {
            let help = text(state.commands.help_text());
            state.discord.send_message(&msg.channel_id, &help).await
        }
        Resolved::Action(action) => match action.as_ref() {
            ActionDescriptor::Category(category) => {
                let listing = dispatch::invoke_category(category);
                state.discord.send_message(&msg.channel_id, &listing).await
            }
            ActionDescriptor::Item(item) => {
                let channel = state.discord.channel(&msg.channel_id).await?;
                let invocation = Invocation {
                    guild_id: msg.guild_id.clone().or(channel.guild_id),
                    channel_id: msg.channel_id.clone(),
                    channel_name: channel.name.unwrap_or_default(),
                    message_id: msg.id.clone(),
                    author: identity(msg),
                };
                let outcome =
                    dispatch::invoke_item(item, &invocation, &state.discord, state.notice_ttl)
                        .await?;
                if let DeliveryOutcome::MissingWebhook { channel } = outcome {
                    log::info!("sticker {} not sent: no webhook for #{}", item.name, channel);
                }
                Ok(())
            }
        },
    }
}

/// Run the bot until Ctrl+C or SIGTERM.
/// `config_path` is the path to the config file (used to resolve the sticker root).
/// `stickers_dir` overrides the configured sticker root.
pub async fn run_bot(config: Config, config_path: PathBuf, stickers_dir: Option<PathBuf>) -> Result<()> {
    let token = config::resolve_discord_token(&config).context(
        "no Discord bot token configured (set discord.botToken or DISCORD_BOT_TOKEN)",
    )?;
    let stickers_dir =
        stickers_dir.unwrap_or_else(|| config::resolve_stickers_dir(&config, &config_path));
    let catalog = Arc::new(build_catalog(&config, &stickers_dir)?);
    log::info!(
        "loaded {} sticker pack(s) from {}",
        catalog.index.categories().len(),
        stickers_dir.display()
    );

    let state = BotState {
        commands: Arc::new(CommandFramework::new(
            config.discord.command_prefix.clone(),
            catalog,
        )),
        discord: DiscordClient::new(token.clone(), config.discord.api_base.clone()),
        notice_ttl: config.stickers.notice_ttl(),
    };

    let (inbound_tx, mut inbound_rx) = mpsc::channel::<InboundMessage>(64);
    let gateway = Arc::new(GatewayConnector::new(token, None));
    let gateway_task = gateway.clone().start_inbound(inbound_tx);

    let processor = tokio::spawn(async move {
        while let Some(msg) = inbound_rx.recv().await {
            tokio::spawn(process_inbound_message(state.clone(), msg));
        }
    });

    shutdown_signal().await;
    log::info!("shutdown signal received, stopping gateway");
    gateway.stop();
    gateway_task.abort();
    let _ = gateway_task.await;
    let _ = processor.await;
    log::info!("bot stopped");
    Ok(())
}

/// Future that completes when the process should shut down (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_catalog_uses_configured_policy() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        for pack in ["alpha", "beta"] {
            std::fs::create_dir_all(root.join(pack)).unwrap();
            std::fs::write(root.join(pack).join("woof.png"), b"png").unwrap();
        }
        let mut config = Config::default();
        assert!(build_catalog(&config, root).is_ok());
        config.stickers.on_collision = crate::stickers::CollisionPolicy::Reject;
        let err = build_catalog(&config, root).unwrap_err();
        assert!(format!("{:#}", err).contains("Woof"));
    }

    #[tokio::test]
    async fn run_bot_without_token_fails_before_connecting() {
        if std::env::var_os("DISCORD_BOT_TOKEN").is_some() {
            return;
        }
        let dir = tempfile::tempdir().unwrap();
        let err = run_bot(Config::default(), dir.path().join("config.json"), None)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("token"));
    }
}
