//! Inbound message from Discord: delivered to the bot for command handling.

use serde::Deserialize;

/// Author of a Discord message (user object subset).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct MessageAuthor {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub global_name: Option<String>,
    /// Avatar hash; None when the user has the default avatar.
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub bot: bool,
}

/// Guild member subset attached to guild messages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct MessageMember {
    #[serde(default)]
    pub nick: Option<String>,
}

/// A message created in a channel the bot can see (MESSAGE_CREATE payload subset).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct InboundMessage {
    pub id: String,
    pub channel_id: String,
    #[serde(default)]
    pub guild_id: Option<String>,
    #[serde(default)]
    pub content: String,
    pub author: MessageAuthor,
    #[serde(default)]
    pub member: Option<MessageMember>,
}
