use parley_core::CallType;
use parley_engine::{CallState, EngineError};
use parley_relay::PeerRegistry;

use crate::integration::init_tracing;
use crate::utils::{TestClient, establish_call};

#[tokio::test]
async fn test_switch_to_current_source_is_noop() {
    init_tracing();
    let registry = PeerRegistry::with_ids(["abc", "xyz"]);
    let x = TestClient::connect(&registry, "x").await.unwrap();
    let y = TestClient::connect(&registry, "y").await.unwrap();
    establish_call(&x, &y, CallType::Video).await.unwrap();

    x.handle.switch_source(false).await.unwrap();

    assert!(x.devices.display_streams().is_empty());
    assert_eq!(x.transports.last().unwrap().lock().unwrap().replace_calls, 0);
}

#[tokio::test]
async fn test_switch_outside_call_fails() {
    init_tracing();
    let registry = PeerRegistry::with_ids(["abc"]);
    let x = TestClient::connect(&registry, "x").await.unwrap();

    let res = x.handle.switch_source(true).await;
    assert!(matches!(
        res,
        Err(EngineError::InvalidState {
            state: CallState::Idle,
            ..
        })
    ));
    assert!(x.devices.display_streams().is_empty());
}

#[tokio::test]
async fn test_switch_in_chat_call_fails() {
    init_tracing();
    let registry = PeerRegistry::with_ids(["abc", "xyz"]);
    let x = TestClient::connect(&registry, "x").await.unwrap();
    let y = TestClient::connect(&registry, "y").await.unwrap();
    establish_call(&x, &y, CallType::Chat).await.unwrap();

    let res = x.handle.switch_source(true).await;
    assert!(matches!(res, Err(EngineError::InvalidState { .. })));
    assert!(x.devices.display_streams().is_empty());
}
