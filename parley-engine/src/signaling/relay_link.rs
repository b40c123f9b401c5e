use crate::signaling::SignalingOutput;
use anyhow::{Context, Result};
use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use parley_core::{ClientMessage, RelayMessage};
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};

/// WebSocket connection to a parley relay.
///
/// Dropping the link closes the socket once queued frames are written.
pub struct RelayLink {
    tx: mpsc::UnboundedSender<ClientMessage>,
}

impl RelayLink {
    /// Connects to `url` and returns the link plus the inbound message stream
    /// the engine consumes. The stream ends when the relay goes away.
    pub async fn connect(url: &str) -> Result<(Self, mpsc::UnboundedReceiver<RelayMessage>)> {
        let (stream, _) = connect_async(url)
            .await
            .with_context(|| format!("Failed to connect to relay at {url}"))?;
        info!("Connected to relay at {}", url);

        let (mut write, mut read) = stream.split();
        let (out_tx, mut out_rx) = mpsc::unbounded_channel::<ClientMessage>();
        let (in_tx, in_rx) = mpsc::unbounded_channel::<RelayMessage>();

        tokio::spawn(async move {
            while let Some(msg) = out_rx.recv().await {
                let json = match serde_json::to_string(&msg) {
                    Ok(json) => json,
                    Err(e) => {
                        warn!("Failed to encode {:?}: {}", msg, e);
                        continue;
                    }
                };
                if write.send(Message::Text(json.into())).await.is_err() {
                    warn!("Relay socket closed while sending");
                    break;
                }
            }
            let _ = write.close().await;
        });

        tokio::spawn(async move {
            while let Some(frame) = read.next().await {
                match frame {
                    Ok(Message::Text(text)) => match serde_json::from_str::<RelayMessage>(&text) {
                        Ok(msg) => {
                            if in_tx.send(msg).is_err() {
                                break;
                            }
                        }
                        Err(e) => warn!("Ignoring invalid relay frame: {}", e),
                    },
                    Ok(Message::Close(_)) => break,
                    Ok(_) => {}
                    Err(e) => {
                        warn!("Relay socket error: {}", e);
                        break;
                    }
                }
            }
            debug!("Relay read loop finished");
        });

        Ok((Self { tx: out_tx }, in_rx))
    }
}

#[async_trait]
impl SignalingOutput for RelayLink {
    async fn send_message(&self, msg: ClientMessage) {
        if self.tx.send(msg).is_err() {
            warn!("Relay link closed, dropping outgoing frame");
        }
    }
}
