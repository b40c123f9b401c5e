mod call;
mod peer;
mod session;
mod signaling;

pub use call::{CallType, PreOfferAnswer};
pub use peer::PeerId;
pub use session::{IceCandidate, SdpType, SessionDescription};
pub use signaling::{
    ClientMessage, HangUp, IceServerConfig, IncomingPreOffer, PeerNotice, PreOffer,
    PreOfferAnswerData, RelayMessage, Relayed, SignalingData, SignalingPayload,
};
