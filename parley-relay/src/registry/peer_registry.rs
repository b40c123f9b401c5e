use crate::registry::RelayError;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use parley_core::{
    ClientMessage, HangUp, IncomingPreOffer, PeerId, PeerNotice, PreOffer, PreOfferAnswer,
    PreOfferAnswerData, RelayMessage, Relayed,
};
use std::collections::{HashSet, VecDeque};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Draws from the configured id source before falling back to a random uuid.
const MAX_ID_ATTEMPTS: usize = 16;

type IdSource = dyn Fn() -> PeerId + Send + Sync;

struct PeerEntry {
    tx: mpsc::UnboundedSender<RelayMessage>,
    /// Peers this connection has exchanged frames with; told when it goes away.
    contacts: HashSet<PeerId>,
}

struct RegistryInner {
    peers: DashMap<PeerId, PeerEntry>,
    id_source: Box<IdSource>,
}

/// Live-peer presence and addressed forwarding.
///
/// An id is present exactly while its connection is open. All lookups and
/// mutations go through per-key shard locks, so a frame is never handed to a
/// peer whose removal completed first.
#[derive(Clone)]
pub struct PeerRegistry {
    inner: Arc<RegistryInner>,
}

impl Default for PeerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl PeerRegistry {
    pub fn new() -> Self {
        Self::with_id_source(PeerId::new)
    }

    /// Registry that names new connections with `id_source`.
    pub fn with_id_source<F>(id_source: F) -> Self
    where
        F: Fn() -> PeerId + Send + Sync + 'static,
    {
        Self {
            inner: Arc::new(RegistryInner {
                peers: DashMap::new(),
                id_source: Box::new(id_source),
            }),
        }
    }

    /// Registry that names connections with `ids` in order, then with random ids.
    pub fn with_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let queue: VecDeque<PeerId> = ids
            .into_iter()
            .map(|id| PeerId::from(id.as_ref()))
            .collect();
        let queue = Mutex::new(queue);
        Self::with_id_source(move || {
            queue
                .lock()
                .ok()
                .and_then(|mut queue| queue.pop_front())
                .unwrap_or_else(PeerId::new)
        })
    }

    /// Registers a new connection and returns its id plus the channel the
    /// relay delivers on. The first frame queued is always `welcome`.
    pub fn connect(&self) -> (PeerId, mpsc::UnboundedReceiver<RelayMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut candidate = (self.inner.id_source)();
        let mut attempts = 1;

        let peer_id = loop {
            match self.inner.peers.entry(candidate) {
                Entry::Vacant(slot) => {
                    let peer_id = slot.key().clone();
                    let _ = tx.send(RelayMessage::Welcome(PeerNotice {
                        socket_id: peer_id.clone(),
                    }));
                    slot.insert(PeerEntry {
                        tx,
                        contacts: HashSet::new(),
                    });
                    break peer_id;
                }
                Entry::Occupied(slot) => {
                    warn!("Id source produced live id {}, drawing another", slot.key());
                    candidate = if attempts < MAX_ID_ATTEMPTS {
                        (self.inner.id_source)()
                    } else {
                        PeerId::new()
                    };
                    attempts += 1;
                }
            }
        };

        info!("Peer {} connected ({} live)", peer_id, self.len());
        (peer_id, rx)
    }

    /// Removes `peer_id` and tells its contacts. Removing an absent id is a no-op.
    pub fn disconnect(&self, peer_id: &PeerId) {
        let Some((_, entry)) = self.inner.peers.remove(peer_id) else {
            debug!("Disconnect for unknown peer {}", peer_id);
            return;
        };
        info!("Peer {} disconnected ({} live)", peer_id, self.len());

        for contact in entry.contacts {
            let Some(mut other) = self.inner.peers.get_mut(&contact) else {
                continue;
            };
            other.contacts.remove(peer_id);
            let notice = RelayMessage::PeerDisconnected(PeerNotice {
                socket_id: peer_id.clone(),
            });
            if other.tx.send(notice).is_err() {
                debug!("Contact {} is already closing", contact);
            }
        }
    }

    pub fn is_live(&self, peer_id: &PeerId) -> bool {
        self.inner.peers.contains_key(peer_id)
    }

    pub fn live_peers(&self) -> Vec<PeerId> {
        self.inner.peers.iter().map(|e| e.key().clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.inner.peers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.peers.is_empty()
    }

    /// Delivers `msg` to `to` and records both ends as contacts.
    pub fn forward(&self, from: &PeerId, to: &PeerId, msg: RelayMessage) -> Result<(), RelayError> {
        {
            let Some(mut target) = self.inner.peers.get_mut(to) else {
                return Err(RelayError::RoutingMiss(to.clone()));
            };
            target
                .tx
                .send(msg)
                .map_err(|_| RelayError::ChannelClosed(to.clone()))?;
            if from != to {
                target.contacts.insert(from.clone());
            }
        }

        if from != to {
            if let Some(mut source) = self.inner.peers.get_mut(from) {
                source.contacts.insert(to.clone());
            }
        }
        Ok(())
    }

    /// Applies the relay protocol to one frame received from `from`.
    pub fn dispatch(&self, from: &PeerId, msg: ClientMessage) {
        match msg {
            ClientMessage::PreOffer(PreOffer {
                callee_personal_code,
                call_type,
            }) => {
                let incoming = RelayMessage::PreOffer(IncomingPreOffer {
                    caller_socket_id: from.clone(),
                    call_type,
                });
                match self.forward(from, &callee_personal_code, incoming) {
                    Ok(()) => debug!("pre-offer {} -> {}", from, callee_personal_code),
                    Err(e) => {
                        info!("pre-offer from {} not routed: {}", from, e);
                        // Answered on the callee's behalf, so it is stamped as coming from them.
                        let not_found = PreOfferAnswerData {
                            caller_socket_id: from.clone(),
                            pre_offer_answer: PreOfferAnswer::CalleeNotFound,
                        };
                        self.reply(
                            from,
                            RelayMessage::PreOfferAnswer(Relayed::new(
                                callee_personal_code,
                                not_found,
                            )),
                        );
                    }
                }
            }

            ClientMessage::PreOfferAnswer(data) => {
                let to = data.caller_socket_id.clone();
                let relayed = Relayed::new(from.clone(), data);
                self.forward_or_drop(from, &to, RelayMessage::PreOfferAnswer(relayed));
            }

            ClientMessage::WebRtcSignaling(data) => {
                let to = data.connected_user_socket_id.clone();
                let relayed = Relayed::new(from.clone(), data);
                self.forward_or_drop(from, &to, RelayMessage::WebRtcSignaling(relayed));
            }

            ClientMessage::UserHangedUp(HangUp {
                connected_user_socket_id,
            }) => {
                let notice = RelayMessage::UserHangedUp(PeerNotice {
                    socket_id: from.clone(),
                });
                self.forward_or_drop(from, &connected_user_socket_id, notice);
            }
        }
    }

    fn forward_or_drop(&self, from: &PeerId, to: &PeerId, msg: RelayMessage) {
        let event = event_name(&msg);
        match self.forward(from, to, msg) {
            Ok(()) => debug!("{} {} -> {}", event, from, to),
            Err(RelayError::RoutingMiss(_)) => {
                debug!("Dropping {} from {}: {} is not connected", event, from, to)
            }
            Err(e) => error!("Failed to forward {} from {}: {}", event, from, e),
        }
    }

    fn reply(&self, to: &PeerId, msg: RelayMessage) {
        let event = event_name(&msg);
        let Some(peer) = self.inner.peers.get(to) else {
            debug!("Dropping {} reply: {} is not connected", event, to);
            return;
        };
        if peer.tx.send(msg).is_err() {
            debug!("Dropping {} reply: {} is already closing", event, to);
        }
    }
}

fn event_name(msg: &RelayMessage) -> &'static str {
    match msg {
        RelayMessage::Welcome(_) => "welcome",
        RelayMessage::PreOffer(_) => "pre-offer",
        RelayMessage::PreOfferAnswer(_) => "pre-offer-answer",
        RelayMessage::WebRtcSignaling(_) => "webRTC-signaling",
        RelayMessage::UserHangedUp(_) => "user-hanged-up",
        RelayMessage::PeerDisconnected(_) => "peer-disconnected",
    }
}
