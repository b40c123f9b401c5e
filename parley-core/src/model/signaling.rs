use crate::model::call::{CallType, PreOfferAnswer};
use crate::model::peer::PeerId;
use crate::model::session::{IceCandidate, SessionDescription};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IceServerConfig {
    pub urls: Vec<String>,
    pub username: Option<String>,
    pub credential: Option<String>,
}

impl IceServerConfig {
    pub fn stun(url: impl Into<String>) -> Self {
        Self {
            urls: vec![url.into()],
            username: None,
            credential: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PreOffer {
    pub callee_personal_code: PeerId,
    pub call_type: CallType,
}

/// A pre-offer as the callee sees it, stamped with the caller's id by the relay.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct IncomingPreOffer {
    pub caller_socket_id: PeerId,
    pub call_type: CallType,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PreOfferAnswerData {
    pub caller_socket_id: PeerId,
    pub pre_offer_answer: PreOfferAnswer,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SignalingData {
    pub connected_user_socket_id: PeerId,
    #[serde(flatten)]
    pub payload: SignalingPayload,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SignalingPayload {
    Offer { offer: SessionDescription },
    Answer { answer: SessionDescription },
    IceCandidate { candidate: IceCandidate },
}

impl SignalingPayload {
    pub fn kind(&self) -> &'static str {
        match self {
            SignalingPayload::Offer { .. } => "OFFER",
            SignalingPayload::Answer { .. } => "ANSWER",
            SignalingPayload::IceCandidate { .. } => "ICE_CANDIDATE",
        }
    }
}

/// A forwarded frame, stamped by the relay with the id of the peer that sent it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Relayed<T> {
    pub from: PeerId,
    #[serde(flatten)]
    pub body: T,
}

impl<T> Relayed<T> {
    pub fn new(from: PeerId, body: T) -> Self {
        Self { from, body }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HangUp {
    pub connected_user_socket_id: PeerId,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PeerNotice {
    pub socket_id: PeerId,
}

/// Frames a client sends to the relay.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ClientMessage {
    PreOffer(PreOffer),
    PreOfferAnswer(PreOfferAnswerData),
    #[serde(rename = "webRTC-signaling")]
    WebRtcSignaling(SignalingData),
    UserHangedUp(HangUp),
}

impl ClientMessage {
    /// The peer this frame is addressed to.
    pub fn destination(&self) -> &PeerId {
        match self {
            ClientMessage::PreOffer(data) => &data.callee_personal_code,
            ClientMessage::PreOfferAnswer(data) => &data.caller_socket_id,
            ClientMessage::WebRtcSignaling(data) => &data.connected_user_socket_id,
            ClientMessage::UserHangedUp(data) => &data.connected_user_socket_id,
        }
    }
}

/// Frames the relay delivers to a client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum RelayMessage {
    Welcome(PeerNotice),
    PreOffer(IncomingPreOffer),
    PreOfferAnswer(Relayed<PreOfferAnswerData>),
    #[serde(rename = "webRTC-signaling")]
    WebRtcSignaling(Relayed<SignalingData>),
    UserHangedUp(PeerNotice),
    PeerDisconnected(PeerNotice),
}
