//! Presentation seam. The engine tells the UI what to show and never reads
//! anything back from it.

use crate::capability::MediaStream;
use parley_core::{CallType, PeerId, PreOfferAnswer};
use tracing::info;

/// Why a call ended or never started, as shown in an info dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfoReason {
    CalleeNotFound,
    CallUnavailable,
    CallRejected,
    CaptureUnavailable,
    PeerHungUp,
    PeerDisconnected,
    ConnectionFailed,
    RelayLost,
}

impl InfoReason {
    /// `None` for an accepted pre-offer.
    pub fn from_answer(answer: PreOfferAnswer) -> Option<Self> {
        match answer {
            PreOfferAnswer::CallAccepted => None,
            PreOfferAnswer::CallRejected => Some(Self::CallRejected),
            PreOfferAnswer::CallUnavailable => Some(Self::CallUnavailable),
            PreOfferAnswer::CalleeNotFound => Some(Self::CalleeNotFound),
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Self::CalleeNotFound => "Callee not found. Check the personal code.",
            Self::CallUnavailable => "Callee is busy or not answering. Try again later.",
            Self::CallRejected => "Call rejected.",
            Self::CaptureUnavailable => "Camera or microphone is not available.",
            Self::PeerHungUp => "The other side hung up.",
            Self::PeerDisconnected => "The other side disconnected.",
            Self::ConnectionFailed => "Connection failed.",
            Self::RelayLost => "Lost connection to the signaling server.",
        }
    }
}

pub trait CallUi: Send + Sync {
    fn show_calling_dialog(&self);
    fn show_incoming_call_dialog(&self, call_type: CallType, caller: &PeerId);
    fn remove_all_dialogs(&self);
    fn show_info_dialog(&self, reason: InfoReason);
    fn update_local_preview(&self, stream: &MediaStream);
    fn update_remote_preview(&self, stream: &MediaStream);
    fn show_call_elements(&self, call_type: CallType);
    fn reset_call_elements(&self);
}

/// Headless UI that only logs.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingUi;

impl CallUi for TracingUi {
    fn show_calling_dialog(&self) {
        info!("Calling...");
    }

    fn show_incoming_call_dialog(&self, call_type: CallType, caller: &PeerId) {
        info!("Incoming {:?} call from {}", call_type, caller);
    }

    fn remove_all_dialogs(&self) {}

    fn show_info_dialog(&self, reason: InfoReason) {
        info!("{}", reason.message());
    }

    fn update_local_preview(&self, stream: &MediaStream) {
        info!("Local preview: {} ({} tracks)", stream.id(), stream.tracks().len());
    }

    fn update_remote_preview(&self, stream: &MediaStream) {
        info!("Remote preview: {} ({} tracks)", stream.id(), stream.tracks().len());
    }

    fn show_call_elements(&self, call_type: CallType) {
        info!("In {:?} call", call_type);
    }

    fn reset_call_elements(&self) {}
}
