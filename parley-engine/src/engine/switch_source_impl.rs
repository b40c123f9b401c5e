use crate::capability::MediaStream;
use crate::engine::CallEngine;
use crate::error::{EngineError, EngineResult};
use crate::session::{CallState, Responder};
use tracing::{debug, info, warn};

const SWITCH: &str = "switch media source";

impl CallEngine {
    /// Switching to the screen replies once display capture settles; switching
    /// back to the camera replies immediately.
    pub(super) async fn switch_source(&mut self, to_screen_share: bool, reply: Responder) {
        let state = self.current_state();
        let Some(session) = self
            .session
            .as_mut()
            .filter(|s| s.state == CallState::Connected && s.call_type.has_media())
        else {
            let _ = reply.send(Err(EngineError::InvalidState { action: SWITCH, state }));
            return;
        };
        if session.pending_switch.is_some() {
            let _ = reply.send(Err(EngineError::SwitchPending));
            return;
        }
        if to_screen_share == session.screen_share.is_some() {
            debug!("Already on the requested media source");
            let _ = reply.send(Ok(()));
            return;
        }

        if to_screen_share {
            session.pending_switch = Some(reply);
            let session_id = session.id;
            self.spawn_display_capture(session_id);
        } else {
            let _ = reply.send(self.restore_camera().await);
        }
    }

    pub(super) async fn on_screen_capture(&mut self, result: EngineResult<MediaStream>) {
        let reply = self.session.as_mut().and_then(|s| s.pending_switch.take());
        let Some(reply) = reply else {
            if let Ok(stream) = result {
                stream.stop();
            }
            return;
        };

        let result = match result {
            Ok(stream) => self.apply_screen_share(stream).await,
            Err(e) => {
                warn!("Screen capture failed, staying on camera: {}", e);
                Err(e)
            }
        };
        let _ = reply.send(result);
    }

    /// Sends the screen track in place of the camera's.
    ///
    /// The camera track is disabled rather than stopped, so switching back is a
    /// track replacement with no new capture. The camera is only stopped when
    /// the call is torn down.
    async fn apply_screen_share(&mut self, stream: MediaStream) -> EngineResult<()> {
        let state = self.current_state();
        let Some(session) = self.session.as_mut().filter(|s| s.state == CallState::Connected) else {
            stream.stop();
            return Err(EngineError::InvalidState { action: SWITCH, state });
        };
        let (Some(transport), Some(screen_track)) =
            (session.transport.as_ref(), stream.video_track().cloned())
        else {
            stream.stop();
            return Err(EngineError::CaptureUnavailable(
                "display capture produced no video track".to_owned(),
            ));
        };

        if let Err(e) = transport.replace_outgoing_video_track(&screen_track).await {
            stream.stop();
            return Err(e.into());
        }
        if let Some(camera) = session.local_stream.as_ref().and_then(|s| s.video_track()) {
            camera.set_enabled(false);
        }

        info!("Sharing screen with {}", session.remote);
        self.ui.update_local_preview(&stream);
        session.screen_share = Some(stream);
        Ok(())
    }

    async fn restore_camera(&mut self) -> EngineResult<()> {
        let Some(session) = self.session.as_mut() else {
            return Err(EngineError::InvalidState {
                action: SWITCH,
                state: self.resting_state,
            });
        };
        let Some(camera) = session
            .local_stream
            .as_ref()
            .and_then(|s| s.video_track())
            .cloned()
        else {
            return Err(EngineError::CaptureUnavailable(
                "no camera track to switch back to".to_owned(),
            ));
        };
        if let Some(transport) = session.transport.as_ref() {
            transport.replace_outgoing_video_track(&camera).await?;
        }

        camera.set_enabled(true);
        if let Some(screen) = session.screen_share.take() {
            screen.stop();
        }
        if let Some(local) = &session.local_stream {
            self.ui.update_local_preview(local);
        }
        info!("Switched back to camera with {}", session.remote);
        Ok(())
    }
}
