//! stickerbot core library: sticker catalog, dispatch, Discord transport, and the bot runner
//! used by the CLI.

pub mod bot;
pub mod channels;
pub mod commands;
pub mod config;
pub mod dispatch;
pub mod init;
pub mod stickers;
