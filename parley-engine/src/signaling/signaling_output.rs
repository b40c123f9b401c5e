use async_trait::async_trait;
use parley_core::{
    CallType, ClientMessage, HangUp, PeerId, PreOffer, PreOfferAnswer, PreOfferAnswerData,
    SignalingData, SignalingPayload,
};

/// Outbound half of the relay connection.
///
/// Sends are fire-and-forget; a lost relay shows up on the inbound channel.
#[async_trait]
pub trait SignalingOutput: Send + Sync {
    async fn send_message(&self, msg: ClientMessage);

    async fn send_pre_offer(&self, callee: PeerId, call_type: CallType) {
        self.send_message(ClientMessage::PreOffer(PreOffer {
            callee_personal_code: callee,
            call_type,
        }))
        .await;
    }

    async fn send_pre_offer_answer(&self, caller: PeerId, answer: PreOfferAnswer) {
        self.send_message(ClientMessage::PreOfferAnswer(PreOfferAnswerData {
            caller_socket_id: caller,
            pre_offer_answer: answer,
        }))
        .await;
    }

    async fn send_signaling(&self, to: PeerId, payload: SignalingPayload) {
        self.send_message(ClientMessage::WebRtcSignaling(SignalingData {
            connected_user_socket_id: to,
            payload,
        }))
        .await;
    }

    async fn send_hang_up(&self, to: PeerId) {
        self.send_message(ClientMessage::UserHangedUp(HangUp {
            connected_user_socket_id: to,
        }))
        .await;
    }
}
