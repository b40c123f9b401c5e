use crate::capability::{PeerConnectionState, TransportEvent};
use crate::engine::CallEngine;
use crate::ui::InfoReason;
use parley_core::SignalingPayload;
use tracing::{debug, info};

impl CallEngine {
    pub(super) async fn handle_transport_event(&mut self, event: TransportEvent) {
        let Some(session) = self.session.as_mut() else {
            return;
        };

        match event {
            TransportEvent::LocalCandidate(candidate) => {
                self.signaling
                    .send_signaling(
                        session.remote.clone(),
                        SignalingPayload::IceCandidate { candidate },
                    )
                    .await;
            }
            TransportEvent::ConnectionStateChanged(state) => {
                info!("Peer connection with {} is {:?}", session.remote, state);
                if state == PeerConnectionState::Failed {
                    self.abort_session(InfoReason::ConnectionFailed).await;
                }
            }
            TransportEvent::RemoteTrack(track) => {
                debug!("Remote {:?} track {} from {}", track.kind(), track.id(), session.remote);
                session.remote_stream.add_track(track);
                self.ui.update_remote_preview(&session.remote_stream);
            }
        }
    }
}
