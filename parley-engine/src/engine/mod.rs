mod handle;
mod local_media_impl;
mod negotiation_impl;
mod pre_offer_answer_impl;
mod pre_offer_impl;
mod switch_source_impl;
mod teardown_impl;
mod transport_event_impl;

pub use handle::*;

use crate::capability::{MediaDevices, MediaStream, TransportEvent, TransportFactory};
use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::session::{CallSession, CallState, CallStatus, Responder};
use crate::signaling::SignalingOutput;
use crate::ui::{CallUi, InfoReason};
use parley_core::{CallType, PeerId, RelayMessage};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::time::Instant;
use tracing::{debug, info, warn};

const COMMAND_BUFFER: usize = 32;
const TRANSPORT_EVENT_BUFFER: usize = 64;

/// The capabilities an engine drives.
#[derive(Clone)]
pub struct EngineServices {
    pub devices: Arc<dyn MediaDevices>,
    pub transports: Arc<dyn TransportFactory>,
    pub signaling: Arc<dyn SignalingOutput>,
    pub ui: Arc<dyn CallUi>,
}

pub(crate) enum UserAction {
    SendPreOffer { call_type: CallType, callee: PeerId },
    Accept,
    Reject,
    CancelCall,
    HangUp,
    SwitchSource { to_screen_share: bool },
}

pub(crate) struct EngineCommand {
    pub(crate) action: UserAction,
    pub(crate) reply: Responder,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CapturePurpose {
    Call,
    ScreenShare,
}

pub(crate) struct CaptureOutcome {
    pub(crate) session_id: u64,
    pub(crate) purpose: CapturePurpose,
    pub(crate) result: EngineResult<MediaStream>,
}

enum EngineEvent {
    Command(EngineCommand),
    Relay(RelayMessage),
    Capture(CaptureOutcome),
    Transport(TransportEvent),
    PreOfferExpired,
}

/// Per-client call negotiation state machine.
///
/// All inputs (user commands, relay messages, capture completions and
/// transport events) are serialized through [`CallEngine::run`], so handlers
/// never interleave.
pub struct CallEngine {
    config: EngineConfig,
    devices: Arc<dyn MediaDevices>,
    transports: Arc<dyn TransportFactory>,
    signaling: Arc<dyn SignalingOutput>,
    ui: Arc<dyn CallUi>,
    command_rx: mpsc::Receiver<EngineCommand>,
    relay_rx: mpsc::UnboundedReceiver<RelayMessage>,
    capture_tx: mpsc::UnboundedSender<CaptureOutcome>,
    capture_rx: mpsc::UnboundedReceiver<CaptureOutcome>,
    status_tx: watch::Sender<CallStatus>,
    local_id: Option<PeerId>,
    session: Option<CallSession>,
    resting_state: CallState,
    next_session_id: u64,
}

impl CallEngine {
    pub fn new(
        config: EngineConfig,
        services: EngineServices,
        relay_rx: mpsc::UnboundedReceiver<RelayMessage>,
    ) -> (Self, CallHandle) {
        let (command_tx, command_rx) = mpsc::channel(COMMAND_BUFFER);
        let (capture_tx, capture_rx) = mpsc::unbounded_channel();
        let (status_tx, status_rx) = watch::channel(CallStatus::resting(CallState::Idle, None));

        let engine = Self {
            config,
            devices: services.devices,
            transports: services.transports,
            signaling: services.signaling,
            ui: services.ui,
            command_rx,
            relay_rx,
            capture_tx,
            capture_rx,
            status_tx,
            local_id: None,
            session: None,
            resting_state: CallState::Idle,
            next_session_id: 0,
        };
        (engine, CallHandle::new(command_tx, status_rx))
    }

    /// Runs until every [`CallHandle`] is dropped or the relay goes away.
    pub async fn run(mut self) {
        info!("Call engine started");

        loop {
            let event = tokio::select! {
                cmd = self.command_rx.recv() => match cmd {
                    Some(cmd) => EngineEvent::Command(cmd),
                    None => {
                        info!("All call handles dropped, stopping engine");
                        self.end_call_locally().await;
                        break;
                    }
                },
                msg = self.relay_rx.recv() => match msg {
                    Some(msg) => EngineEvent::Relay(msg),
                    None => {
                        warn!("Relay connection lost, stopping engine");
                        self.teardown(Some(InfoReason::RelayLost)).await;
                        break;
                    }
                },
                Some(outcome) = self.capture_rx.recv() => EngineEvent::Capture(outcome),
                event = next_session_event(&mut self.session) => event,
            };

            self.handle_event(event).await;
        }

        info!("Call engine stopped");
    }

    async fn handle_event(&mut self, event: EngineEvent) {
        match event {
            EngineEvent::Command(EngineCommand { action, reply }) => {
                self.handle_command(action, reply).await
            }
            EngineEvent::Relay(msg) => self.handle_relay_message(msg).await,
            EngineEvent::Capture(outcome) => self.handle_capture_outcome(outcome).await,
            EngineEvent::Transport(event) => self.handle_transport_event(event).await,
            EngineEvent::PreOfferExpired => self.handle_pre_offer_expired().await,
        }
        self.publish_status();
    }

    async fn handle_command(&mut self, action: UserAction, reply: Responder) {
        let result = match action {
            UserAction::SendPreOffer { call_type, callee } => {
                self.send_pre_offer(call_type, callee).await
            }
            UserAction::Accept => self.accept_call().await,
            UserAction::Reject => self.reject_call().await,
            UserAction::CancelCall => self.cancel_call().await,
            UserAction::HangUp => self.hang_up().await,
            UserAction::SwitchSource { to_screen_share } => {
                // Replies on its own once the display capture settles.
                self.switch_source(to_screen_share, reply).await;
                return;
            }
        };
        if let Err(e) = &result {
            debug!("Command rejected: {}", e);
        }
        let _ = reply.send(result);
    }

    async fn handle_relay_message(&mut self, msg: RelayMessage) {
        match msg {
            RelayMessage::Welcome(notice) => {
                info!("Registered with relay as {}", notice.socket_id);
                self.local_id = Some(notice.socket_id);
            }
            RelayMessage::PreOffer(incoming) => self.handle_pre_offer(incoming).await,
            RelayMessage::PreOfferAnswer(relayed) => {
                self.handle_pre_offer_answer(&relayed.from, relayed.body)
                    .await
            }
            RelayMessage::WebRtcSignaling(relayed) => {
                self.handle_signaling(&relayed.from, relayed.body.payload)
                    .await
            }
            RelayMessage::UserHangedUp(notice) => {
                self.handle_remote_end(&notice.socket_id, InfoReason::PeerHungUp)
                    .await
            }
            RelayMessage::PeerDisconnected(notice) => {
                self.handle_remote_end(&notice.socket_id, InfoReason::PeerDisconnected)
                    .await
            }
        }
    }

    fn allocate_session_id(&mut self) -> u64 {
        self.next_session_id += 1;
        self.next_session_id
    }

    /// The current remote and call type, if the session is in one of `allowed`.
    fn require_state(
        &self,
        action: &'static str,
        allowed: &[CallState],
    ) -> EngineResult<(PeerId, CallType)> {
        match &self.session {
            Some(session) if allowed.contains(&session.state) => {
                Ok((session.remote.clone(), session.call_type))
            }
            Some(session) => Err(EngineError::InvalidState {
                action,
                state: session.state,
            }),
            None => Err(EngineError::InvalidState {
                action,
                state: self.resting_state,
            }),
        }
    }

    fn current_state(&self) -> CallState {
        self.session
            .as_ref()
            .map_or(self.resting_state, |session| session.state)
    }

    fn set_state(&mut self, state: CallState) {
        if let Some(session) = self.session.as_mut() {
            debug!("Call with {}: {:?} -> {:?}", session.remote, session.state, state);
            session.state = state;
        }
        self.publish_status();
    }

    fn publish_status(&self) {
        let status = match &self.session {
            Some(session) => session.status(self.local_id.clone()),
            None => CallStatus::resting(self.resting_state, self.local_id.clone()),
        };
        self.status_tx.send_if_modified(|current| {
            if *current == status {
                false
            } else {
                *current = status;
                true
            }
        });
    }
}

async fn next_session_event(session: &mut Option<CallSession>) -> EngineEvent {
    let Some(session) = session.as_mut() else {
        return std::future::pending().await;
    };
    let deadline = session.pre_offer_deadline;

    tokio::select! {
        event = next_transport_event(&mut session.transport_events) => EngineEvent::Transport(event),
        _ = sleep_until(deadline) => EngineEvent::PreOfferExpired,
    }
}

async fn next_transport_event(events: &mut Option<mpsc::Receiver<TransportEvent>>) -> TransportEvent {
    if let Some(events) = events {
        if let Some(event) = events.recv().await {
            return event;
        }
    }
    std::future::pending().await
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
