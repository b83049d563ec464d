//! Discord REST client: channel lookup, webhooks, message send/delete.

use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use crate::channels::inbound::{InboundMessage, MessageAuthor};
use crate::dispatch::{DeliveryRequest, Identity, Transport, TransportError, Webhook};

const DISCORD_API_BASE: &str = "https://discord.com/api/v10";
const DISCORD_CDN_BASE: &str = "https://cdn.discordapp.com";

/// Channel object subset.
#[derive(Debug, Clone, Deserialize)]
pub struct ChannelInfo {
    pub id: String,
    /// Absent for direct messages.
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub guild_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WebhookInfo {
    id: String,
    #[serde(default)]
    channel_id: Option<String>,
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CreatedMessage {
    id: String,
}

/// Bot-authenticated client for the Discord HTTP API.
#[derive(Clone)]
pub struct DiscordClient {
    api_base: String,
    token: String,
    client: reqwest::Client,
}

impl DiscordClient {
    pub fn new(token: impl Into<String>, api_base: Option<String>) -> Self {
        let api_base = api_base
            .map(|u| u.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DISCORD_API_BASE.to_string());
        Self {
            api_base,
            token: token.into(),
            client: reqwest::Client::new(),
        }
    }

    fn authorized(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder.header(reqwest::header::AUTHORIZATION, format!("Bot {}", self.token))
    }

    /// GET /channels/{id}.
    pub async fn channel(&self, channel_id: &str) -> Result<ChannelInfo, TransportError> {
        let url = format!("{}/channels/{}", self.api_base, channel_id);
        let res = self.authorized(self.client.get(&url)).send().await?;
        let res = check(res, "get channel").await?;
        Ok(res.json().await?)
    }

    /// GET /guilds/{id}/channels, as id -> name.
    async fn guild_channel_names(
        &self,
        guild_id: &str,
    ) -> Result<HashMap<String, String>, TransportError> {
        let url = format!("{}/guilds/{}/channels", self.api_base, guild_id);
        let res = self.authorized(self.client.get(&url)).send().await?;
        let res = check(res, "list guild channels").await?;
        let channels: Vec<ChannelInfo> = res.json().await?;
        Ok(channels
            .into_iter()
            .filter_map(|c| c.name.map(|name| (c.id, name)))
            .collect())
    }

    /// GET /guilds/{id}/webhooks joined with channel names.
    pub async fn guild_webhooks(&self, guild_id: &str) -> Result<Vec<Webhook>, TransportError> {
        let url = format!("{}/guilds/{}/webhooks", self.api_base, guild_id);
        let res = self.authorized(self.client.get(&url)).send().await?;
        let res = check(res, "list guild webhooks").await?;
        let infos: Vec<WebhookInfo> = res.json().await?;
        let names = self.guild_channel_names(guild_id).await?;
        Ok(infos
            .into_iter()
            .map(|w| {
                let channel_id = w.channel_id.unwrap_or_default();
                let channel_name = names.get(&channel_id).cloned().unwrap_or_default();
                let url = w.url.unwrap_or_else(|| match &w.token {
                    Some(token) => format!("{}/webhooks/{}/{}", self.api_base, w.id, token),
                    None => String::new(),
                });
                Webhook {
                    id: w.id,
                    channel_id,
                    channel_name,
                    url,
                    token: w.token,
                }
            })
            .collect())
    }

    /// POST /channels/{id}/messages. Returns the new message id.
    pub async fn post_message(
        &self,
        channel_id: &str,
        delivery: &DeliveryRequest,
    ) -> Result<String, TransportError> {
        let url = format!("{}/channels/{}/messages", self.api_base, channel_id);
        let payload = serde_json::json!({ "content": delivery.content });
        let builder = with_delivery(
            self.authorized(self.client.post(&url)),
            payload,
            delivery.file.as_deref(),
        )
        .await?;
        let res = check(builder.send().await?, "send message").await?;
        let created: CreatedMessage = res.json().await?;
        Ok(created.id)
    }

    /// DELETE /channels/{id}/messages/{message_id}.
    pub async fn delete(&self, channel_id: &str, message_id: &str) -> Result<(), TransportError> {
        let url = format!(
            "{}/channels/{}/messages/{}",
            self.api_base, channel_id, message_id
        );
        let res = self.authorized(self.client.delete(&url)).send().await?;
        check(res, "delete message").await?;
        Ok(())
    }

    /// POST {webhook url}?wait=true with the given display identity.
    pub async fn execute(
        &self,
        webhook: &Webhook,
        identity: &Identity,
        delivery: &DeliveryRequest,
    ) -> Result<(), TransportError> {
        let url = format!("{}?wait=true", webhook.url);
        let payload = serde_json::json!({
            "content": delivery.content,
            "username": identity.display_name,
            "avatar_url": identity.avatar_url,
        });
        let builder = with_delivery(self.client.post(&url), payload, delivery.file.as_deref()).await?;
        check(builder.send().await?, "execute webhook").await?;
        Ok(())
    }
}

/// JSON body when there is no attachment, multipart (`payload_json` + `files[0]`) otherwise.
async fn with_delivery(
    builder: reqwest::RequestBuilder,
    payload: serde_json::Value,
    file: Option<&Path>,
) -> Result<reqwest::RequestBuilder, TransportError> {
    let Some(path) = file else {
        return Ok(builder.json(&payload));
    };
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|source| TransportError::Attachment {
            path: path.to_path_buf(),
            source,
        })?;
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("sticker")
        .to_string();
    let form = reqwest::multipart::Form::new()
        .text("payload_json", payload.to_string())
        .part(
            "files[0]",
            reqwest::multipart::Part::bytes(bytes).file_name(file_name),
        );
    Ok(builder.multipart(form))
}

async fn check(res: reqwest::Response, what: &str) -> Result<reqwest::Response, TransportError> {
    if res.status().is_success() {
        return Ok(res);
    }
    let status = res.status();
    let body = res.text().await.unwrap_or_default();
    Err(TransportError::Api(format!("{} failed: {} {}", what, status, body)))
}

#[async_trait]
impl Transport for DiscordClient {
    async fn webhooks(&self, guild_id: &str) -> Result<Vec<Webhook>, TransportError> {
        self.guild_webhooks(guild_id).await
    }

    async fn execute_webhook(
        &self,
        webhook: &Webhook,
        identity: &Identity,
        delivery: &DeliveryRequest,
    ) -> Result<(), TransportError> {
        self.execute(webhook, identity, delivery).await
    }

    async fn delete_message(
        &self,
        channel_id: &str,
        message_id: &str,
    ) -> Result<(), TransportError> {
        self.delete(channel_id, message_id).await
    }

    async fn send_message(
        &self,
        channel_id: &str,
        delivery: &DeliveryRequest,
    ) -> Result<(), TransportError> {
        self.post_message(channel_id, delivery).await.map(|_| ())
    }

    async fn send_notice(
        &self,
        channel_id: &str,
        text: &str,
        ttl: Duration,
    ) -> Result<(), TransportError> {
        let delivery = DeliveryRequest {
            content: text.to_string(),
            file: None,
        };
        let message_id = self.post_message(channel_id, &delivery).await?;
        let client = self.clone();
        let channel_id = channel_id.to_string();
        tokio::spawn(async move {
            tokio::time::sleep(ttl).await;
            if let Err(e) = client.delete(&channel_id, &message_id).await {
                log::debug!("deleting notice {} in {}: {}", message_id, channel_id, e);
            }
        });
        Ok(())
    }
}

/// Name shown for the author: guild nickname, then global display name, then username.
pub fn display_name(message: &InboundMessage) -> String {
    message
        .member
        .as_ref()
        .and_then(|m| m.nick.clone())
        .filter(|n| !n.is_empty())
        .or_else(|| message.author.global_name.clone().filter(|n| !n.is_empty()))
        .unwrap_or_else(|| message.author.username.clone())
}

/// CDN avatar URL, or the default avatar when the user has none.
pub fn avatar_url(author: &MessageAuthor) -> String {
    match &author.avatar {
        Some(hash) => {
            let ext = if hash.starts_with("a_") { "gif" } else { "png" };
            format!(
                "{}/avatars/{}/{}.{}",
                DISCORD_CDN_BASE, author.id, hash, ext
            )
        }
        None => {
            let index = author.id.parse::<u64>().map(|id| (id >> 22) % 6).unwrap_or(0);
            format!("{}/embed/avatars/{}.png", DISCORD_CDN_BASE, index)
        }
    }
}

/// Display identity of the message author.
pub fn identity(message: &InboundMessage) -> Identity {
    Identity {
        display_name: display_name(message),
        avatar_url: avatar_url(&message.author),
    }
}
