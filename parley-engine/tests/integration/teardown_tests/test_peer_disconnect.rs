use parley_core::CallType;
use parley_engine::{CallState, InfoReason};
use parley_relay::PeerRegistry;
use std::time::Duration;

use crate::integration::{eventually, init_tracing};
use crate::utils::{MockMediaDevices, TestClient, TestClientConfig};

#[tokio::test(start_paused = true)]
async fn test_peer_disconnect_mid_negotiation() {
    init_tracing();
    let registry = PeerRegistry::with_ids(["abc", "xyz"]);
    let x = TestClient::connect(&registry, "x").await.unwrap();
    // The callee's camera is slow, so the OFFER is held and X stays NEGOTIATING.
    let slow_camera = MockMediaDevices::new().with_capture_delay(Duration::from_secs(10));
    let y = TestClient::connect_with(&registry, TestClientConfig::new("y").devices(slow_camera))
        .await
        .unwrap();

    x.handle
        .send_pre_offer(CallType::Video, "xyz")
        .await
        .unwrap();
    y.wait_for_state(CallState::PreOfferReceived).await.unwrap();
    y.handle.accept().await.unwrap();

    assert!(eventually(|| x.sent_descriptions().len() == 1).await);
    assert_eq!(x.status().state, CallState::Negotiating);

    y.disconnect();

    x.wait_for_state(CallState::Ended).await.unwrap();
    assert_eq!(x.ui.infos(), vec![InfoReason::PeerDisconnected]);
    let local = x.devices.user_streams();
    assert_eq!(local.len(), 1);
    assert!(local[0].is_stopped());
    assert!(x.transports.last().unwrap().lock().unwrap().closed);

    // Y's capture finishes after its engine is gone and is released anyway.
    tokio::time::sleep(Duration::from_secs(11)).await;
    let late = y.devices.user_streams();
    assert_eq!(late.len(), 1);
    assert!(late[0].is_stopped());
    y.wait_stopped().await.unwrap();
}
