use crate::capability::{MediaStream, NegotiationTransport, TransportEvent};
use crate::error::{EngineError, EngineResult};
use crate::session::{CallRole, CallState, CallStatus};
use parley_core::{CallType, IceCandidate, PeerId, SessionDescription};
use tokio::sync::{mpsc, oneshot};
use tokio::time::Instant;
use tracing::warn;

pub(crate) type Responder = oneshot::Sender<EngineResult<()>>;

/// Everything the engine knows about the one call it is currently in.
pub(crate) struct CallSession {
    /// Tags capture results so late completions can be told apart.
    pub(crate) id: u64,
    pub(crate) remote: PeerId,
    pub(crate) call_type: CallType,
    pub(crate) role: CallRole,
    pub(crate) state: CallState,
    pub(crate) local_stream: Option<MediaStream>,
    pub(crate) remote_stream: MediaStream,
    pub(crate) screen_share: Option<MediaStream>,
    pub(crate) transport: Option<Box<dyn NegotiationTransport>>,
    pub(crate) transport_events: Option<mpsc::Receiver<TransportEvent>>,
    /// An OFFER that arrived before the local transport existed.
    pub(crate) pending_offer: Option<SessionDescription>,
    /// Remote candidates held until the remote description is applied.
    pub(crate) pending_candidates: Vec<IceCandidate>,
    pub(crate) remote_description_set: bool,
    pub(crate) pending_switch: Option<Responder>,
    pub(crate) pre_offer_deadline: Option<Instant>,
}

impl CallSession {
    pub(crate) fn outgoing(
        id: u64,
        callee: PeerId,
        call_type: CallType,
        deadline: Option<Instant>,
    ) -> Self {
        let mut session = Self::new(id, callee, call_type, CallRole::Caller, CallState::PreOfferSent);
        session.pre_offer_deadline = deadline;
        session
    }

    pub(crate) fn incoming(id: u64, caller: PeerId, call_type: CallType) -> Self {
        Self::new(id, caller, call_type, CallRole::Callee, CallState::PreOfferReceived)
    }

    fn new(id: u64, remote: PeerId, call_type: CallType, role: CallRole, state: CallState) -> Self {
        let remote_stream = MediaStream::new(format!("remote-{remote}"));
        Self {
            id,
            remote,
            call_type,
            role,
            state,
            local_stream: None,
            remote_stream,
            screen_share: None,
            transport: None,
            transport_events: None,
            pending_offer: None,
            pending_candidates: Vec::new(),
            remote_description_set: false,
            pending_switch: None,
            pre_offer_deadline: None,
        }
    }

    pub(crate) fn status(&self, local_id: Option<PeerId>) -> CallStatus {
        CallStatus {
            local_id,
            state: self.state,
            remote: Some(self.remote.clone()),
            call_type: Some(self.call_type),
            role: Some(self.role),
            screen_sharing: self.screen_share.is_some(),
        }
    }

    /// Stops every captured track and closes the transport.
    pub(crate) async fn release(mut self) {
        if let Some(stream) = self.local_stream.take() {
            stream.stop();
        }
        if let Some(stream) = self.screen_share.take() {
            stream.stop();
        }
        if let Some(transport) = self.transport.take() {
            if let Err(e) = transport.close().await {
                warn!("Failed to close transport for {}: {:#}", self.remote, e);
            }
        }
        if let Some(reply) = self.pending_switch.take() {
            let _ = reply.send(Err(EngineError::InvalidState {
                action: "switch media source",
                state: CallState::Ended,
            }));
        }
    }
}
