use parley_core::CallType;
use parley_engine::{CallState, EngineError};
use parley_relay::PeerRegistry;

use crate::integration::init_tracing;
use crate::utils::{MockMediaDevices, TestClient, TestClientConfig, establish_call};

#[tokio::test]
async fn test_switch_to_screen() {
    init_tracing();
    let registry = PeerRegistry::with_ids(["abc", "xyz"]);
    let x = TestClient::connect(&registry, "x").await.unwrap();
    let y = TestClient::connect(&registry, "y").await.unwrap();
    establish_call(&x, &y, CallType::Video).await.unwrap();

    let sent_before = x.sent_descriptions().len();
    let y_received_before = y.transports.last().unwrap().lock().unwrap().remote.clone();

    x.handle.switch_source(true).await.unwrap();

    let camera = x.devices.camera_track().unwrap();
    let screen = x.devices.screen_track().unwrap();
    let record = x.transports.last().unwrap();
    {
        let record = record.lock().unwrap();
        assert_eq!(record.outgoing_video.as_ref().map(|t| t.id()), Some(screen.id()));
        assert_eq!(record.replace_calls, 1);
    }

    assert!(screen.is_live());
    assert!(!camera.is_live(), "camera must not keep sending");
    assert!(!camera.is_stopped(), "camera stays restorable");

    // Live substitution: no new OFFER/ANSWER in either direction.
    assert_eq!(x.sent_descriptions().len(), sent_before);
    assert_eq!(
        y.transports.last().unwrap().lock().unwrap().remote,
        y_received_before
    );

    let status = x.status();
    assert_eq!(status.state, CallState::Connected);
    assert!(status.screen_sharing);
    assert_eq!(x.ui.last_local_preview().as_deref(), Some("screen-stream-1"));
}

#[tokio::test]
async fn test_declined_screen_capture_keeps_camera() {
    init_tracing();
    let registry = PeerRegistry::with_ids(["abc", "xyz"]);
    let config = TestClientConfig::new("x").devices(MockMediaDevices::new().deny_display());
    let x = TestClient::connect_with(&registry, config).await.unwrap();
    let y = TestClient::connect(&registry, "y").await.unwrap();
    establish_call(&x, &y, CallType::Video).await.unwrap();

    let res = x.handle.switch_source(true).await;
    assert!(matches!(res, Err(EngineError::CaptureUnavailable(_))));

    let camera = x.devices.camera_track().unwrap();
    let record = x.transports.last().unwrap();
    let record = record.lock().unwrap();
    assert_eq!(record.outgoing_video.as_ref().map(|t| t.id()), Some(camera.id()));
    assert_eq!(record.replace_calls, 0);
    assert!(camera.is_live());
    assert_eq!(x.status().state, CallState::Connected);
    assert!(!x.status().screen_sharing);
}
