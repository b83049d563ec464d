//! Invoke catalog actions against a chat transport.
//!
//! Category actions become a plain listing message. Item actions are posted through
//! a channel webhook under the invoking user's name and avatar; when the channel has
//! no usable webhook a short-lived notice is posted instead and nothing else happens.

use async_trait::async_trait;
use std::path::PathBuf;
use std::time::Duration;

use crate::stickers::{CategoryConfig, ItemConfig};

/// Text plus optional attachment to deliver.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeliveryRequest {
    pub content: String,
    pub file: Option<PathBuf>,
}

/// Display identity used when posting through a webhook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub display_name: String,
    pub avatar_url: String,
}

/// A webhook as reported by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Webhook {
    pub id: String,
    pub channel_id: String,
    /// Name of the channel the webhook posts into.
    pub channel_name: String,
    pub url: String,
    pub token: Option<String>,
}

impl Webhook {
    fn usable_in(&self, channel_name: &str) -> bool {
        self.channel_name == channel_name && self.token.as_deref().is_some_and(|t| !t.is_empty())
    }
}

/// Where and by whom an action was invoked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// None for direct messages, which have no webhooks.
    pub guild_id: Option<String>,
    pub channel_id: String,
    pub channel_name: String,
    /// The message that triggered the command; deleted before the sticker is posted.
    pub message_id: String,
    pub author: Identity,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Delivered,
    /// No webhook with a token posts into the invoking channel.
    MissingWebhook { channel: String },
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("discord request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("discord api error: {0}")]
    Api(String),
    #[error("reading attachment {}: {source}", path.display())]
    Attachment {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Chat primitives dispatch needs from the outside world.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Every webhook in the guild.
    async fn webhooks(&self, guild_id: &str) -> Result<Vec<Webhook>, TransportError>;

    async fn execute_webhook(
        &self,
        webhook: &Webhook,
        identity: &Identity,
        delivery: &DeliveryRequest,
    ) -> Result<(), TransportError>;

    async fn delete_message(&self, channel_id: &str, message_id: &str)
        -> Result<(), TransportError>;

    async fn send_message(
        &self,
        channel_id: &str,
        delivery: &DeliveryRequest,
    ) -> Result<(), TransportError>;

    /// Post `text` and remove it again after `ttl`.
    async fn send_notice(
        &self,
        channel_id: &str,
        text: &str,
        ttl: Duration,
    ) -> Result<(), TransportError>;
}

/// Replace the placeholder in `template` with `value`.
///
/// `{}` and `{0}` are substituted, `{{` and `}}` are literal braces, any other
/// brace sequence is kept verbatim.
pub fn fill_placeholder(template: &str, value: &str) -> String {
    let mut out = String::with_capacity(template.len() + value.len());
    let mut rest = template;
    while let Some(i) = rest.find(['{', '}']) {
        out.push_str(&rest[..i]);
        let tail = &rest[i..];
        if tail.starts_with("{{") {
            out.push('{');
            rest = &tail[2..];
        } else if tail.starts_with("}}") {
            out.push('}');
            rest = &tail[2..];
        } else if tail.starts_with("{}") {
            out.push_str(value);
            rest = &tail[2..];
        } else if tail.starts_with("{0}") {
            out.push_str(value);
            rest = &tail[3..];
        } else {
            out.push_str(&tail[..1]);
            rest = &tail[1..];
        }
    }
    out.push_str(rest);
    out
}

/// Listing message for a category action.
pub fn invoke_category(config: &CategoryConfig) -> DeliveryRequest {
    let names = config.item_names.join(" ");
    DeliveryRequest {
        content: fill_placeholder(&config.message_template, &names)
            .trim()
            .to_string(),
        file: config.thumbnail.clone(),
    }
}

pub fn missing_webhook_notice(channel_name: &str) -> String {
    format!("Missing webhook for #{}", channel_name)
}

/// Post a sticker through the invoking channel's webhook, impersonating the author.
///
/// Transport failures propagate as-is. A delete that succeeded is not undone when the
/// delivery afterwards fails.
pub async fn invoke_item(
    config: &ItemConfig,
    invocation: &Invocation,
    transport: &dyn Transport,
    notice_ttl: Duration,
) -> Result<DeliveryOutcome, TransportError> {
    let webhooks = match &invocation.guild_id {
        Some(guild_id) => transport.webhooks(guild_id).await?,
        None => Vec::new(),
    };
    let Some(webhook) = webhooks
        .into_iter()
        .find(|w| w.usable_in(&invocation.channel_name))
    else {
        log::debug!(
            "no webhook for #{} ({}), not sending {}",
            invocation.channel_name,
            invocation.channel_id,
            config.name
        );
        transport
            .send_notice(
                &invocation.channel_id,
                &missing_webhook_notice(&invocation.channel_name),
                notice_ttl,
            )
            .await?;
        return Ok(DeliveryOutcome::MissingWebhook {
            channel: invocation.channel_name.clone(),
        });
    };

    transport
        .delete_message(&invocation.channel_id, &invocation.message_id)
        .await?;
    let delivery = DeliveryRequest {
        content: config.message.clone(),
        file: config.file.clone(),
    };
    transport
        .execute_webhook(&webhook, &invocation.author, &delivery)
        .await?;
    Ok(DeliveryOutcome::Delivered)
}
