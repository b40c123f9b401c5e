use crate::engine::CallEngine;
use crate::error::{EngineError, EngineResult};
use crate::session::{CallSession, CallState};
use parley_core::{CallType, IncomingPreOffer, PeerId, PreOfferAnswer};
use tokio::time::Instant;
use tracing::info;

impl CallEngine {
    pub(super) async fn send_pre_offer(
        &mut self,
        call_type: CallType,
        callee: PeerId,
    ) -> EngineResult<()> {
        if self.session.is_some() {
            return Err(EngineError::CallInProgress);
        }
        if self.local_id.as_ref() == Some(&callee) {
            return Err(EngineError::SelfCall);
        }

        let deadline = self
            .config
            .pre_offer_timeout
            .map(|timeout| Instant::now() + timeout);
        let id = self.allocate_session_id();
        info!("Sending {:?} pre-offer to {}", call_type, callee);

        self.session = Some(CallSession::outgoing(id, callee.clone(), call_type, deadline));
        self.ui.show_calling_dialog();
        self.signaling.send_pre_offer(callee, call_type).await;
        self.publish_status();
        Ok(())
    }

    pub(super) async fn handle_pre_offer(&mut self, incoming: IncomingPreOffer) {
        let IncomingPreOffer {
            caller_socket_id: caller,
            call_type,
        } = incoming;

        if let Some(session) = &self.session {
            info!(
                "Busy with {}, answering pre-offer from {} as unavailable",
                session.remote, caller
            );
            self.signaling
                .send_pre_offer_answer(caller, PreOfferAnswer::CallUnavailable)
                .await;
            return;
        }

        info!("Incoming {:?} pre-offer from {}", call_type, caller);
        let id = self.allocate_session_id();
        self.session = Some(CallSession::incoming(id, caller.clone(), call_type));
        self.ui.show_incoming_call_dialog(call_type, &caller);
        self.publish_status();
    }

    pub(super) async fn accept_call(&mut self) -> EngineResult<()> {
        let (caller, call_type) =
            self.require_state("accept a call", &[CallState::PreOfferReceived])?;
        info!("Accepting call from {}", caller);

        self.set_state(CallState::Accepted);
        self.ui.remove_all_dialogs();
        self.signaling
            .send_pre_offer_answer(caller, PreOfferAnswer::CallAccepted)
            .await;
        self.ui.show_call_elements(call_type);
        self.set_state(CallState::Negotiating);
        self.begin_local_setup().await;
        Ok(())
    }

    pub(super) async fn reject_call(&mut self) -> EngineResult<()> {
        let (caller, _) = self.require_state("reject a call", &[CallState::PreOfferReceived])?;
        info!("Rejecting call from {}", caller);

        self.set_state(CallState::Rejected);
        self.signaling
            .send_pre_offer_answer(caller, PreOfferAnswer::CallRejected)
            .await;
        self.teardown(None).await;
        Ok(())
    }

    pub(super) async fn cancel_call(&mut self) -> EngineResult<()> {
        let (callee, _) = self.require_state("cancel a call", &[CallState::PreOfferSent])?;
        info!("Cancelling pre-offer to {}", callee);

        self.signaling.send_hang_up(callee).await;
        self.teardown(None).await;
        Ok(())
    }
}
