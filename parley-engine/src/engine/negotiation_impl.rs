use crate::capability::NegotiationTransport;
use crate::engine::{CallEngine, TRANSPORT_EVENT_BUFFER};
use crate::error::{EngineError, EngineResult};
use crate::session::{CallRole, CallState};
use crate::ui::InfoReason;
use parley_core::{IceCandidate, PeerId, SessionDescription, SignalingPayload};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

impl CallEngine {
    /// Creates the transport and, depending on role, sends the OFFER or
    /// answers an OFFER that arrived early.
    pub(super) async fn start_negotiation(&mut self) {
        if let Err(e) = self.create_transport().await {
            error!("Failed to set up negotiation transport: {}", e);
            self.abort_session(InfoReason::ConnectionFailed).await;
            return;
        }

        let Some(session) = self.session.as_mut() else {
            return;
        };
        match session.role {
            CallRole::Caller => {
                if let Err(e) = self.send_offer().await {
                    error!("Failed to send offer: {}", e);
                    self.abort_session(InfoReason::ConnectionFailed).await;
                }
            }
            CallRole::Callee => {
                if let Some(offer) = session.pending_offer.take() {
                    debug!("Answering held OFFER from {}", session.remote);
                    self.answer_offer(offer).await;
                }
            }
        }
    }

    async fn create_transport(&mut self) -> EngineResult<()> {
        let (events_tx, events_rx) = mpsc::channel(TRANSPORT_EVENT_BUFFER);
        let transport = self
            .transports
            .create_transport(&self.config.ice_servers, events_tx)
            .await?;

        let Some(session) = self.session.as_mut() else {
            let _ = transport.close().await;
            return Ok(());
        };
        let transport = session.transport.insert(transport);
        session.transport_events = Some(events_rx);

        if let Some(stream) = &session.local_stream {
            for track in stream.tracks() {
                transport.add_track(track, stream.id()).await?;
            }
        }
        self.ui.update_remote_preview(&session.remote_stream);
        Ok(())
    }

    async fn send_offer(&mut self) -> EngineResult<()> {
        let Some(session) = &self.session else {
            return Ok(());
        };
        let Some(transport) = &session.transport else {
            return Ok(());
        };

        let offer = transport.create_offer().await?;
        transport.set_local_description(offer.clone()).await?;
        info!("Sending OFFER to {}", session.remote);
        self.signaling
            .send_signaling(session.remote.clone(), SignalingPayload::Offer { offer })
            .await;
        Ok(())
    }

    /// Routes a signaling frame. Frames from anyone but the current remote are dropped.
    pub(super) async fn handle_signaling(&mut self, from: &PeerId, payload: SignalingPayload) {
        if let Some(session) = self.session.as_ref().filter(|s| &s.remote != from) {
            warn!(
                "{} (sent by {}, in a call with {})",
                EngineError::NegotiationMismatch {
                    message: payload.kind(),
                    state: session.state,
                },
                from,
                session.remote
            );
            return;
        }

        match payload {
            SignalingPayload::Offer { offer } => self.handle_offer(offer).await,
            SignalingPayload::Answer { answer } => self.handle_answer(answer).await,
            SignalingPayload::IceCandidate { candidate } => self.handle_candidate(candidate).await,
        }
    }

    async fn handle_offer(&mut self, offer: SessionDescription) {
        let state = self.current_state();
        let Some(session) = self.session.as_mut() else {
            warn!("{}", EngineError::NegotiationMismatch { message: "OFFER", state });
            return;
        };
        let expected = session.role == CallRole::Callee
            && session.state == CallState::Negotiating
            && !session.remote_description_set
            && session.pending_offer.is_none();
        if !expected {
            warn!("{}", EngineError::NegotiationMismatch { message: "OFFER", state });
            return;
        }

        if session.transport.is_none() {
            debug!("Holding OFFER from {} until local media is ready", session.remote);
            session.pending_offer = Some(offer);
            return;
        }
        self.answer_offer(offer).await;
    }

    async fn answer_offer(&mut self, offer: SessionDescription) {
        if let Err(e) = self.try_answer_offer(offer).await {
            error!("Failed to answer offer: {}", e);
            self.abort_session(InfoReason::ConnectionFailed).await;
        }
    }

    async fn try_answer_offer(&mut self, offer: SessionDescription) -> EngineResult<()> {
        let Some(session) = self.session.as_mut() else {
            return Ok(());
        };
        let Some(transport) = session.transport.as_ref() else {
            return Ok(());
        };

        transport.set_remote_description(offer).await?;
        session.remote_description_set = true;
        let answer = transport.create_answer().await?;
        transport.set_local_description(answer.clone()).await?;

        info!("Sending ANSWER to {}", session.remote);
        self.signaling
            .send_signaling(session.remote.clone(), SignalingPayload::Answer { answer })
            .await;

        self.flush_candidates().await;
        self.set_state(CallState::Connected);
        Ok(())
    }

    async fn handle_answer(&mut self, answer: SessionDescription) {
        let state = self.current_state();
        let Some(session) = self.session.as_mut() else {
            warn!("{}", EngineError::NegotiationMismatch { message: "ANSWER", state });
            return;
        };
        if session.role == CallRole::Caller && session.state == CallState::Connected {
            debug!("Ignoring duplicate ANSWER from {}", session.remote);
            return;
        }
        let expected = session.role == CallRole::Caller
            && session.state == CallState::Negotiating
            && !session.remote_description_set;
        let Some(transport) = session.transport.as_ref().filter(|_| expected) else {
            warn!("{}", EngineError::NegotiationMismatch { message: "ANSWER", state });
            return;
        };

        if let Err(e) = transport.set_remote_description(answer).await {
            error!("Failed to apply ANSWER from {}: {:#}", session.remote, e);
            self.abort_session(InfoReason::ConnectionFailed).await;
            return;
        }
        session.remote_description_set = true;
        info!("Call with {} negotiated", session.remote);

        self.flush_candidates().await;
        self.set_state(CallState::Connected);
    }

    async fn handle_candidate(&mut self, candidate: IceCandidate) {
        let state = self.current_state();
        let Some(session) = self.session.as_mut().filter(|s| s.state.is_negotiating()) else {
            warn!("{}", EngineError::NegotiationMismatch { message: "ICE candidate", state });
            return;
        };

        match session.transport.as_ref() {
            Some(transport) if session.remote_description_set => {
                apply_candidate(transport.as_ref(), candidate).await
            }
            _ => {
                debug!("Holding ICE candidate from {}", session.remote);
                session.pending_candidates.push(candidate);
            }
        }
    }

    async fn flush_candidates(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let pending = std::mem::take(&mut session.pending_candidates);
        let Some(transport) = session.transport.as_ref() else {
            return;
        };
        if !pending.is_empty() {
            debug!("Applying {} held ICE candidates", pending.len());
        }
        for candidate in pending {
            apply_candidate(transport.as_ref(), candidate).await;
        }
    }
}

async fn apply_candidate(transport: &dyn NegotiationTransport, candidate: IceCandidate) {
    if let Err(e) = transport.add_ice_candidate(candidate).await {
        warn!("{}", EngineError::CandidateApply(format!("{e:#}")));
    }
}
