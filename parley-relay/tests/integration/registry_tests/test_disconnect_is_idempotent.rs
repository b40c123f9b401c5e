use parley_core::PeerId;
use parley_relay::PeerRegistry;

use crate::integration::init_tracing;
use crate::utils::TestPeer;

#[tokio::test]
async fn test_disconnect_is_idempotent() {
    init_tracing();

    let registry = PeerRegistry::with_ids(["abc", "xyz"]);
    let x = TestPeer::connect(&registry).await.unwrap();
    let _y = TestPeer::connect(&registry).await.unwrap();

    let abc = x.peer_id.clone();
    registry.disconnect(&abc);
    registry.disconnect(&abc);
    registry.disconnect(&PeerId::from("never-seen"));

    assert!(!registry.is_live(&abc));
    assert_eq!(registry.live_peers(), vec![PeerId::from("xyz")]);
}
