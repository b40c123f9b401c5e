use crate::capability::MediaTrack;
use anyhow::Result;
use async_trait::async_trait;
use parley_core::{IceCandidate, IceServerConfig, SessionDescription};
use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeerConnectionState {
    New,
    Connecting,
    Connected,
    Disconnected,
    Failed,
    Closed,
}

/// Events a transport reports back to the engine on its event channel.
#[derive(Debug)]
pub enum TransportEvent {
    LocalCandidate(IceCandidate),
    ConnectionStateChanged(PeerConnectionState),
    RemoteTrack(MediaTrack),
}

/// One peer-to-peer negotiation transport, owned by a single call session.
#[async_trait]
pub trait NegotiationTransport: Send + Sync {
    async fn create_offer(&self) -> Result<SessionDescription>;

    async fn create_answer(&self) -> Result<SessionDescription>;

    async fn set_local_description(&self, desc: SessionDescription) -> Result<()>;

    async fn set_remote_description(&self, desc: SessionDescription) -> Result<()>;

    async fn local_description(&self) -> Result<Option<SessionDescription>>;

    async fn remote_description(&self) -> Result<Option<SessionDescription>>;

    async fn add_ice_candidate(&self, candidate: IceCandidate) -> Result<()>;

    async fn add_track(&self, track: &MediaTrack, stream_id: &str) -> Result<()>;

    /// Swaps the track behind the outgoing video sender without renegotiating.
    async fn replace_outgoing_video_track(&self, track: &MediaTrack) -> Result<()>;

    async fn close(&self) -> Result<()>;
}

#[async_trait]
pub trait TransportFactory: Send + Sync {
    /// Creates a transport that reports its events on `events`.
    async fn create_transport(
        &self,
        ice_servers: &[IceServerConfig],
        events: mpsc::Sender<TransportEvent>,
    ) -> Result<Box<dyn NegotiationTransport>>;
}
