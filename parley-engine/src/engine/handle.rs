use crate::engine::{EngineCommand, UserAction};
use crate::error::{EngineError, EngineResult};
use crate::session::CallStatus;
use parley_core::{CallType, PeerId};
use tokio::sync::{mpsc, oneshot, watch};

/// Cheap, cloneable front end to a running [`CallEngine`](super::CallEngine).
#[derive(Clone)]
pub struct CallHandle {
    command_tx: mpsc::Sender<EngineCommand>,
    status_rx: watch::Receiver<CallStatus>,
}

impl CallHandle {
    pub(crate) fn new(
        command_tx: mpsc::Sender<EngineCommand>,
        status_rx: watch::Receiver<CallStatus>,
    ) -> Self {
        Self {
            command_tx,
            status_rx,
        }
    }

    pub async fn send_pre_offer(
        &self,
        call_type: CallType,
        callee: impl Into<PeerId>,
    ) -> EngineResult<()> {
        self.request(UserAction::SendPreOffer {
            call_type,
            callee: callee.into(),
        })
        .await
    }

    pub async fn accept(&self) -> EngineResult<()> {
        self.request(UserAction::Accept).await
    }

    pub async fn reject(&self) -> EngineResult<()> {
        self.request(UserAction::Reject).await
    }

    /// Withdraws an unanswered pre-offer.
    pub async fn cancel_call(&self) -> EngineResult<()> {
        self.request(UserAction::CancelCall).await
    }

    pub async fn hang_up(&self) -> EngineResult<()> {
        self.request(UserAction::HangUp).await
    }

    /// Resolves once the new source is live on the outgoing video sender.
    pub async fn switch_source(&self, to_screen_share: bool) -> EngineResult<()> {
        self.request(UserAction::SwitchSource { to_screen_share })
            .await
    }

    pub fn status(&self) -> CallStatus {
        self.status_rx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<CallStatus> {
        self.status_rx.clone()
    }

    /// Waits until the published status satisfies `predicate`.
    pub async fn wait_for(
        &self,
        predicate: impl FnMut(&CallStatus) -> bool,
    ) -> EngineResult<CallStatus> {
        let mut status_rx = self.subscribe();
        let status = status_rx
            .wait_for(predicate)
            .await
            .map_err(|_| EngineError::EngineStopped)?;
        Ok(status.clone())
    }

    async fn request(&self, action: UserAction) -> EngineResult<()> {
        let (reply, response) = oneshot::channel();
        self.command_tx
            .send(EngineCommand { action, reply })
            .await
            .map_err(|_| EngineError::EngineStopped)?;
        response.await.map_err(|_| EngineError::EngineStopped)?
    }
}
