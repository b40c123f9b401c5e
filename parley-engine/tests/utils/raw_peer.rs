use anyhow::{Context, Result, bail};
use std::time::Duration;
use tokio::sync::mpsc;

use parley_core::{ClientMessage, PeerId, RelayMessage, SignalingPayload};
use parley_relay::PeerRegistry;

use super::RECV_TIMEOUT_MS;

/// A hand-driven relay connection standing in for a remote browser.
pub struct RawPeer {
    pub peer_id: PeerId,
    registry: PeerRegistry,
    rx: mpsc::UnboundedReceiver<RelayMessage>,
}

impl RawPeer {
    pub async fn connect(registry: &PeerRegistry) -> Result<Self> {
        let (peer_id, mut rx) = registry.connect();
        match rx.recv().await {
            Some(RelayMessage::Welcome(_)) => {}
            other => bail!("Expected welcome, got {:?}", other),
        }
        Ok(Self {
            peer_id,
            registry: registry.clone(),
            rx,
        })
    }

    pub fn send(&self, msg: ClientMessage) {
        self.registry.dispatch(&self.peer_id, msg);
    }

    pub async fn recv(&mut self) -> Result<RelayMessage> {
        tokio::time::timeout(Duration::from_millis(RECV_TIMEOUT_MS), self.rx.recv())
            .await
            .context("Timeout waiting for relay message")?
            .context("Relay channel closed")
    }

    /// Skips ICE candidates until a signaling frame of another kind arrives.
    pub async fn recv_description(&mut self) -> Result<SignalingPayload> {
        loop {
            match self.recv().await? {
                RelayMessage::WebRtcSignaling(relayed) => match relayed.body.payload {
                    SignalingPayload::IceCandidate { .. } => continue,
                    payload => return Ok(payload),
                },
                other => bail!("Expected signaling, got {:?}", other),
            }
        }
    }

    pub fn disconnect(&self) {
        self.registry.disconnect(&self.peer_id);
    }
}
