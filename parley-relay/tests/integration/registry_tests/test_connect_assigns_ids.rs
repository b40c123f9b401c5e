use std::collections::HashSet;

use parley_relay::PeerRegistry;

use crate::integration::init_tracing;
use crate::utils::TestPeer;

#[tokio::test]
async fn test_connect_assigns_unique_ids() {
    init_tracing();

    let registry = PeerRegistry::new();
    let mut peers = Vec::new();
    for _ in 0..32 {
        peers.push(TestPeer::connect(&registry).await.unwrap());
    }

    let ids: HashSet<_> = peers.iter().map(|p| p.peer_id.clone()).collect();
    assert_eq!(ids.len(), 32);
    assert_eq!(registry.len(), 32);
    assert!(ids.iter().all(|id| registry.is_live(id)));
}

#[tokio::test]
async fn test_connect_echoes_assigned_id() {
    init_tracing();

    let registry = PeerRegistry::with_ids(["abc", "xyz"]);
    let x = TestPeer::connect(&registry).await.unwrap();
    let y = TestPeer::connect(&registry).await.unwrap();

    assert_eq!(x.peer_id.as_str(), "abc");
    assert_eq!(y.peer_id.as_str(), "xyz");
}
