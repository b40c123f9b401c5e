use crate::engine::CallEngine;
use crate::error::EngineError;
use crate::session::{CallRole, CallState};
use crate::ui::InfoReason;
use parley_core::{PeerId, PreOfferAnswerData};
use tracing::{info, warn};

impl CallEngine {
    pub(super) async fn handle_pre_offer_answer(
        &mut self,
        from: &PeerId,
        data: PreOfferAnswerData,
    ) {
        let answer = data.pre_offer_answer;
        let Some(session) = self.session.as_mut() else {
            warn!(
                "{}",
                EngineError::NegotiationMismatch {
                    message: "pre-offer answer",
                    state: self.resting_state,
                }
            );
            return;
        };
        if &session.remote != from {
            warn!(
                "{} (sent by {}, calling {})",
                EngineError::NegotiationMismatch {
                    message: "pre-offer answer",
                    state: session.state,
                },
                from,
                session.remote
            );
            return;
        }
        if session.role != CallRole::Caller || session.state != CallState::PreOfferSent {
            warn!(
                "{}",
                EngineError::NegotiationMismatch {
                    message: "pre-offer answer",
                    state: session.state,
                }
            );
            return;
        }

        session.pre_offer_deadline = None;
        let call_type = session.call_type;
        info!("{} answered pre-offer with {:?}", session.remote, answer);
        self.ui.remove_all_dialogs();

        match InfoReason::from_answer(answer) {
            None => {
                self.ui.show_call_elements(call_type);
                self.set_state(CallState::Negotiating);
                self.begin_local_setup().await;
            }
            Some(reason) => self.teardown(Some(reason)).await,
        }
    }

    pub(super) async fn handle_pre_offer_expired(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        session.pre_offer_deadline = None;
        if session.state != CallState::PreOfferSent {
            return;
        }

        let callee = session.remote.clone();
        info!("Pre-offer to {} went unanswered", callee);
        self.signaling.send_hang_up(callee).await;
        self.teardown(Some(InfoReason::CallUnavailable)).await;
    }
}
