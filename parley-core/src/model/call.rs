use serde::{Deserialize, Serialize};

/// What kind of session a pre-offer asks for.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Hash, Eq, PartialEq)]
pub enum CallType {
    #[serde(rename = "CHAT_PERSONAL_CODE")]
    Chat,
    #[serde(rename = "VIDEO_PERSONAL_CODE")]
    Video,
}

impl CallType {
    /// Whether the call captures camera and microphone.
    pub fn has_media(&self) -> bool {
        matches!(self, CallType::Video)
    }
}

/// Callee's (or relay's) verdict on a pre-offer.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Hash, Eq, PartialEq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PreOfferAnswer {
    CallAccepted,
    CallRejected,
    CallUnavailable,
    CalleeNotFound,
}
