use crate::engine::CallEngine;
use crate::error::EngineResult;
use crate::session::CallState;
use crate::ui::InfoReason;
use parley_core::PeerId;
use tracing::{debug, info};

impl CallEngine {
    pub(super) async fn hang_up(&mut self) -> EngineResult<()> {
        let (remote, _) = self.require_state(
            "hang up",
            &[
                CallState::PreOfferSent,
                CallState::PreOfferReceived,
                CallState::Negotiating,
                CallState::Connected,
            ],
        )?;
        if self.current_state() == CallState::PreOfferReceived {
            return self.reject_call().await;
        }

        info!("Hanging up call with {}", remote);
        self.signaling.send_hang_up(remote).await;
        self.teardown(None).await;
        Ok(())
    }

    /// Ends the current call from this side without surfacing a reason.
    pub(super) async fn end_call_locally(&mut self) {
        if let Err(e) = self.hang_up().await {
            debug!("Nothing to hang up: {}", e);
        }
    }

    pub(super) async fn handle_remote_end(&mut self, peer: &PeerId, reason: InfoReason) {
        match &self.session {
            Some(session) if &session.remote == peer => {
                info!("Call with {} ended: {:?}", peer, reason);
                self.teardown(Some(reason)).await;
            }
            _ => debug!("Ignoring {:?} for {}, not in a call with them", reason, peer),
        }
    }

    /// Tells the remote the call is over, then tears down locally.
    pub(super) async fn abort_session(&mut self, reason: InfoReason) {
        if let Some(session) = &self.session {
            self.signaling.send_hang_up(session.remote.clone()).await;
        }
        self.teardown(Some(reason)).await;
    }

    /// Releases every resource of the current session and returns to rest.
    pub(super) async fn teardown(&mut self, reason: Option<InfoReason>) {
        let Some(session) = self.session.take() else {
            return;
        };
        let remote = session.remote.clone();
        session.release().await;

        self.ui.remove_all_dialogs();
        self.ui.reset_call_elements();
        if let Some(reason) = reason {
            self.ui.show_info_dialog(reason);
        }
        self.resting_state = CallState::Ended;
        self.publish_status();
        info!("Call with {} torn down", remote);
    }
}
