//! Discord gateway: websocket session that forwards MESSAGE_CREATE events to the bot.
//!
//! Each session identifies from scratch (no resume). On errors, reconnect requests
//! or invalid sessions the loop waits a few seconds and connects again.

use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;

use crate::channels::inbound::InboundMessage;

pub const DEFAULT_GATEWAY_URL: &str = "wss://gateway.discord.gg/?v=10&encoding=json";

/// GUILDS | GUILD_MESSAGES | MESSAGE_CONTENT.
const INTENTS: u64 = (1 << 0) | (1 << 9) | (1 << 15);
const RECONNECT_DELAY: Duration = Duration::from_secs(5);

const OP_DISPATCH: u8 = 0;
const OP_HEARTBEAT: u8 = 1;
const OP_IDENTIFY: u8 = 2;
const OP_RECONNECT: u8 = 7;
const OP_INVALID_SESSION: u8 = 9;
const OP_HELLO: u8 = 10;

#[derive(Debug, Deserialize)]
struct GatewayPayload {
    op: u8,
    #[serde(default)]
    d: serde_json::Value,
    #[serde(default)]
    s: Option<u64>,
    #[serde(default)]
    t: Option<String>,
}

enum SessionEnd {
    Stopped,
    Reconnect,
}

/// Gateway connector: keeps a session open and forwards messages until stopped.
pub struct GatewayConnector {
    token: String,
    url: String,
    running: AtomicBool,
}

impl GatewayConnector {
    pub fn new(token: impl Into<String>, url: Option<String>) -> Self {
        Self {
            token: token.into(),
            url: url.unwrap_or_else(|| DEFAULT_GATEWAY_URL.to_string()),
            running: AtomicBool::new(false),
        }
    }

    fn running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    /// Start the gateway loop and forward messages to `inbound_tx`. Returns a handle to await on shutdown.
    pub fn start_inbound(self: Arc<Self>, inbound_tx: mpsc::Sender<InboundMessage>) -> JoinHandle<()> {
        self.running.store(true, Ordering::SeqCst);
        log::info!("discord gateway: connecting to {}", self.url);
        tokio::spawn(async move {
            run_gateway_loop(self, inbound_tx).await;
        })
    }

    async fn run_session(
        &self,
        inbound_tx: &mpsc::Sender<InboundMessage>,
    ) -> anyhow::Result<SessionEnd> {
        let (ws, _) = tokio_tungstenite::connect_async(self.url.as_str()).await?;
        let (mut write, mut read) = ws.split();

        let hello = loop {
            match read.next().await {
                Some(Ok(Message::Text(text))) => break serde_json::from_str::<GatewayPayload>(&text)?,
                Some(Ok(_)) => continue,
                Some(Err(e)) => return Err(e.into()),
                None => anyhow::bail!("gateway closed before hello"),
            }
        };
        if hello.op != OP_HELLO {
            anyhow::bail!("expected hello (op 10), got op {}", hello.op);
        }
        let interval_ms = hello
            .d
            .get("heartbeat_interval")
            .and_then(|v| v.as_u64())
            .ok_or_else(|| anyhow::anyhow!("hello without heartbeat_interval"))?;

        write
            .send(Message::Text(identify_payload(&self.token).to_string()))
            .await?;

        let mut heartbeat = tokio::time::interval(Duration::from_millis(interval_ms));
        heartbeat.tick().await;
        let mut seq: Option<u64> = None;

        loop {
            if !self.running() {
                let _ = write.send(Message::Close(None)).await;
                return Ok(SessionEnd::Stopped);
            }
            tokio::select! {
                _ = heartbeat.tick() => {
                    write.send(Message::Text(heartbeat_payload(seq).to_string())).await?;
                }
                frame = read.next() => {
                    let Some(frame) = frame else {
                        return Ok(SessionEnd::Reconnect);
                    };
                    let text = match frame? {
                        Message::Text(text) => text,
                        Message::Close(reason) => {
                            log::info!("discord gateway closed: {:?}", reason);
                            return Ok(SessionEnd::Reconnect);
                        }
                        _ => continue,
                    };
                    let payload: GatewayPayload = match serde_json::from_str(&text) {
                        Ok(p) => p,
                        Err(e) => {
                            log::debug!("discord gateway: unparseable frame: {}", e);
                            continue;
                        }
                    };
                    if payload.s.is_some() {
                        seq = payload.s;
                    }
                    match payload.op {
                        OP_DISPATCH => match payload.t.as_deref() {
                            Some("READY") => log::info!("discord gateway ready"),
                            Some("MESSAGE_CREATE") => {
                                match serde_json::from_value::<InboundMessage>(payload.d) {
                                    Ok(msg) => {
                                        if inbound_tx.send(msg).await.is_err() {
                                            log::debug!("discord gateway: inbound channel closed, stopping");
                                            return Ok(SessionEnd::Stopped);
                                        }
                                    }
                                    Err(e) => log::debug!("discord gateway: bad MESSAGE_CREATE: {}", e),
                                }
                            }
                            _ => {}
                        },
                        OP_HEARTBEAT => {
                            write.send(Message::Text(heartbeat_payload(seq).to_string())).await?;
                        }
                        OP_RECONNECT | OP_INVALID_SESSION => {
                            log::info!("discord gateway asked to reconnect (op {})", payload.op);
                            return Ok(SessionEnd::Reconnect);
                        }
                        _ => {}
                    }
                }
            }
        }
    }
}

async fn run_gateway_loop(connector: Arc<GatewayConnector>, inbound_tx: mpsc::Sender<InboundMessage>) {
    while connector.running() {
        match connector.run_session(&inbound_tx).await {
            Ok(SessionEnd::Stopped) => break,
            Ok(SessionEnd::Reconnect) => log::debug!("discord gateway: session ended, reconnecting"),
            Err(e) => log::warn!("discord gateway error: {}", e),
        }
        if !connector.running() {
            break;
        }
        tokio::time::sleep(RECONNECT_DELAY).await;
    }
    log::info!("discord gateway loop stopped");
}

fn identify_payload(token: &str) -> serde_json::Value {
    serde_json::json!({
        "op": OP_IDENTIFY,
        "d": {
            "token": token,
            "intents": INTENTS,
            "properties": {
                "os": std::env::consts::OS,
                "browser": "stickerbot",
                "device": "stickerbot"
            }
        }
    })
}

fn heartbeat_payload(seq: Option<u64>) -> serde_json::Value {
    serde_json::json!({ "op": OP_HEARTBEAT, "d": seq })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identify_requests_message_content() {
        let p = identify_payload("tok");
        assert_eq!(p["op"], 2);
        assert_eq!(p["d"]["token"], "tok");
        assert_eq!(p["d"]["intents"], 33281);
    }

    #[test]
    fn heartbeat_carries_last_sequence() {
        assert_eq!(heartbeat_payload(None)["d"], serde_json::Value::Null);
        assert_eq!(heartbeat_payload(Some(42))["d"], 42);
    }

    #[test]
    fn parses_dispatch_frame() {
        let p: GatewayPayload = serde_json::from_str(
            r#"{"op":0,"s":3,"t":"MESSAGE_CREATE","d":{"id":"1","channel_id":"2","content":"!x","author":{"id":"4","username":"u"}}}"#,
        )
        .unwrap();
        assert_eq!(p.op, OP_DISPATCH);
        assert_eq!(p.s, Some(3));
        let msg: InboundMessage = serde_json::from_value(p.d).unwrap();
        assert_eq!(msg.guild_id, None);
        assert_eq!(msg.content, "!x");
    }
}
