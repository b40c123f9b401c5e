use parley_core::{
    CallType, ClientMessage, PeerId, PreOffer, PreOfferAnswer, PreOfferAnswerData, RelayMessage,
    Relayed,
};
use parley_relay::PeerRegistry;

use crate::integration::init_tracing;
use crate::utils::TestPeer;

#[tokio::test]
async fn test_unknown_callee_yields_callee_not_found() {
    init_tracing();

    let registry = PeerRegistry::with_ids(["abc", "xyz"]);
    let mut x = TestPeer::connect(&registry).await.unwrap();
    let mut y = TestPeer::connect(&registry).await.unwrap();

    x.send(ClientMessage::PreOffer(PreOffer {
        callee_personal_code: PeerId::from("nobody"),
        call_type: CallType::Chat,
    }));

    assert_eq!(
        x.recv().await.unwrap(),
        RelayMessage::PreOfferAnswer(Relayed::new(
            PeerId::from("nobody"),
            PreOfferAnswerData {
                caller_socket_id: PeerId::from("abc"),
                pre_offer_answer: PreOfferAnswer::CalleeNotFound,
            }
        ))
    );
    y.expect_silence().await;
}

#[tokio::test]
async fn test_departed_callee_yields_callee_not_found() {
    init_tracing();

    let registry = PeerRegistry::with_ids(["abc", "xyz"]);
    let mut x = TestPeer::connect(&registry).await.unwrap();
    let y = TestPeer::connect(&registry).await.unwrap();
    y.disconnect();

    x.send(ClientMessage::PreOffer(PreOffer {
        callee_personal_code: PeerId::from("xyz"),
        call_type: CallType::Video,
    }));

    match x.recv().await.unwrap() {
        RelayMessage::PreOfferAnswer(relayed) => {
            assert_eq!(relayed.from, PeerId::from("xyz"));
            assert_eq!(relayed.body.pre_offer_answer, PreOfferAnswer::CalleeNotFound)
        }
        other => panic!("unexpected {:?}", other),
    }
}
