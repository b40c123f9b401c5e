use crate::session::CallState;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// Camera, microphone or display capture was denied or is missing.
    #[error("media capture unavailable: {0}")]
    CaptureUnavailable(String),

    /// A remote ICE candidate could not be applied. Never fatal to the call.
    #[error("failed to apply ICE candidate: {0}")]
    CandidateApply(String),

    /// A negotiation message arrived in a state that does not expect it.
    #[error("unexpected {message} while {state:?}")]
    NegotiationMismatch {
        message: &'static str,
        state: CallState,
    },

    #[error("cannot {action} while {state:?}")]
    InvalidState {
        action: &'static str,
        state: CallState,
    },

    #[error("a call is already in progress")]
    CallInProgress,

    #[error("cannot call your own personal code")]
    SelfCall,

    #[error("a media source switch is already pending")]
    SwitchPending,

    #[error("negotiation transport failed: {0:#}")]
    Transport(#[from] anyhow::Error),

    #[error("call engine has stopped")]
    EngineStopped,
}

pub type EngineResult<T> = Result<T, EngineError>;
