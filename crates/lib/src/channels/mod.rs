//! Discord transport: REST client for sends/deletes/webhooks and the gateway loop for inbound messages.

mod discord;
mod gateway;
mod inbound;

pub use discord::{avatar_url, display_name, identity, ChannelInfo, DiscordClient};
pub use gateway::{GatewayConnector, DEFAULT_GATEWAY_URL};
pub use inbound::{InboundMessage, MessageAuthor, MessageMember};
