use parley_core::{CallType, PeerId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallState {
    Idle,
    PreOfferSent,
    PreOfferReceived,
    Accepted,
    Rejected,
    Negotiating,
    Connected,
    Ended,
}

impl CallState {
    /// States in which offer/answer/candidate messages are meaningful.
    pub fn is_negotiating(&self) -> bool {
        matches!(self, Self::Negotiating | Self::Connected)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallRole {
    Caller,
    Callee,
}

/// Snapshot of the engine published after every transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallStatus {
    /// Personal code assigned by the relay, once the welcome has arrived.
    pub local_id: Option<PeerId>,
    pub state: CallState,
    pub remote: Option<PeerId>,
    pub call_type: Option<CallType>,
    pub role: Option<CallRole>,
    pub screen_sharing: bool,
}

impl CallStatus {
    pub fn resting(state: CallState, local_id: Option<PeerId>) -> Self {
        Self {
            local_id,
            state,
            remote: None,
            call_type: None,
            role: None,
            screen_sharing: false,
        }
    }
}
