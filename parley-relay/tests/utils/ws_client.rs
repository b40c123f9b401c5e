use anyhow::{Context, Result};
use futures::{SinkExt, StreamExt};
use std::net::SocketAddr;
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use parley_core::{ClientMessage, PeerId, RelayMessage};
use parley_relay::{PeerRegistry, WS_PATH, serve};

use super::RECV_TIMEOUT_MS;

/// Start a relay on an ephemeral local port.
pub async fn spawn_relay(registry: PeerRegistry) -> Result<SocketAddr> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(e) = serve(listener, registry).await {
            tracing::error!("[TestRelay] stopped: {}", e);
        }
    });

    Ok(addr)
}

pub struct WsTestClient {
    pub peer_id: PeerId,
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl WsTestClient {
    /// Open a socket to the relay and read the welcome frame.
    pub async fn connect(addr: SocketAddr) -> Result<Self> {
        let url = format!("ws://{}{}", addr, WS_PATH);
        let (stream, _) = connect_async(&url)
            .await
            .context("Failed to open relay socket")?;

        let mut client = Self {
            peer_id: PeerId::from(""),
            stream,
        };

        match client.recv().await? {
            RelayMessage::Welcome(notice) => client.peer_id = notice.socket_id,
            other => anyhow::bail!("Expected welcome, got {:?}", other),
        }
        Ok(client)
    }

    pub async fn send(&mut self, msg: &ClientMessage) -> Result<()> {
        let json = serde_json::to_string(msg)?;
        self.send_raw(&json).await
    }

    pub async fn send_raw(&mut self, text: &str) -> Result<()> {
        self.stream
            .send(Message::Text(text.to_owned().into()))
            .await
            .context("Failed to send frame")?;
        Ok(())
    }

    pub async fn recv(&mut self) -> Result<RelayMessage> {
        loop {
            let next = tokio::time::timeout(
                std::time::Duration::from_millis(RECV_TIMEOUT_MS),
                self.stream.next(),
            )
            .await
            .context("Timeout waiting for frame")?;

            match next {
                Some(Ok(Message::Text(text))) => {
                    return serde_json::from_str(&text).context("Relay sent an invalid frame");
                }
                Some(Ok(_)) => continue,
                Some(Err(e)) => anyhow::bail!("Socket error: {}", e),
                None => anyhow::bail!("Socket closed"),
            }
        }
    }

    pub async fn close(mut self) -> Result<()> {
        self.stream.close(None).await?;
        Ok(())
    }
}
