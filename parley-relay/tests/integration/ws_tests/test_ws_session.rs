use std::time::Duration;

use parley_core::{CallType, ClientMessage, IncomingPreOffer, PreOffer, RelayMessage};
use parley_relay::PeerRegistry;

use crate::integration::init_tracing;
use crate::utils::{WsTestClient, spawn_relay};

#[tokio::test]
async fn test_pre_offer_over_websocket() {
    init_tracing();

    let registry = PeerRegistry::with_ids(["abc", "xyz"]);
    let addr = spawn_relay(registry.clone()).await.unwrap();

    let mut x = WsTestClient::connect(addr).await.unwrap();
    let mut y = WsTestClient::connect(addr).await.unwrap();
    assert_eq!(x.peer_id.as_str(), "abc");
    assert_eq!(y.peer_id.as_str(), "xyz");

    x.send(&ClientMessage::PreOffer(PreOffer {
        callee_personal_code: y.peer_id.clone(),
        call_type: CallType::Video,
    }))
    .await
    .unwrap();

    assert_eq!(
        y.recv().await.unwrap(),
        RelayMessage::PreOffer(IncomingPreOffer {
            caller_socket_id: x.peer_id.clone(),
            call_type: CallType::Video,
        })
    );
}

#[tokio::test]
async fn test_invalid_frame_keeps_connection_open() {
    init_tracing();

    let registry = PeerRegistry::with_ids(["abc", "xyz"]);
    let addr = spawn_relay(registry.clone()).await.unwrap();

    let mut x = WsTestClient::connect(addr).await.unwrap();
    let mut y = WsTestClient::connect(addr).await.unwrap();

    x.send_raw("{\"event\":\"join\",\"data\":{}}").await.unwrap();
    x.send_raw("not json at all").await.unwrap();

    x.send(&ClientMessage::PreOffer(PreOffer {
        callee_personal_code: y.peer_id.clone(),
        call_type: CallType::Chat,
    }))
    .await
    .unwrap();

    assert!(matches!(y.recv().await.unwrap(), RelayMessage::PreOffer(_)));
    assert!(registry.is_live(&x.peer_id));
}

#[tokio::test]
async fn test_socket_close_removes_peer_and_notifies_contact() {
    init_tracing();

    let registry = PeerRegistry::with_ids(["abc", "xyz"]);
    let addr = spawn_relay(registry.clone()).await.unwrap();

    let mut x = WsTestClient::connect(addr).await.unwrap();
    let mut y = WsTestClient::connect(addr).await.unwrap();

    x.send(&ClientMessage::PreOffer(PreOffer {
        callee_personal_code: y.peer_id.clone(),
        call_type: CallType::Video,
    }))
    .await
    .unwrap();
    let _ = y.recv().await.unwrap();

    let yid = y.peer_id.clone();
    y.close().await.unwrap();

    match x.recv().await.unwrap() {
        RelayMessage::PeerDisconnected(notice) => assert_eq!(notice.socket_id, yid),
        other => panic!("unexpected {:?}", other),
    }

    let start = std::time::Instant::now();
    while registry.is_live(&yid) {
        assert!(start.elapsed() < Duration::from_secs(2), "peer never removed");
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
}
