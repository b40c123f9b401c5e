use crate::capability::{MediaConstraints, MediaStream};
use crate::engine::{CallEngine, CaptureOutcome, CapturePurpose};
use crate::error::EngineResult;
use crate::ui::InfoReason;
use tokio::sync::mpsc;
use tracing::{debug, warn};

impl CallEngine {
    /// Captures local media for the current session, then starts negotiating.
    /// Chat calls skip capture entirely.
    pub(super) async fn begin_local_setup(&mut self) {
        let Some(session) = &self.session else {
            return;
        };
        match MediaConstraints::for_call(session.call_type, self.config.call_constraints) {
            Some(constraints) => {
                let session_id = session.id;
                let devices = self.devices.clone();
                let capture_tx = self.capture_tx.clone();
                debug!("Capturing local media for session {}", session_id);

                tokio::spawn(async move {
                    let result = devices.get_user_media(constraints).await;
                    deliver(
                        &capture_tx,
                        CaptureOutcome {
                            session_id,
                            purpose: CapturePurpose::Call,
                            result,
                        },
                    );
                });
            }
            None => self.start_negotiation().await,
        }
    }

    pub(super) fn spawn_display_capture(&self, session_id: u64) {
        let devices = self.devices.clone();
        let capture_tx = self.capture_tx.clone();
        debug!("Capturing display for session {}", session_id);

        tokio::spawn(async move {
            let result = devices.get_display_media().await;
            deliver(
                &capture_tx,
                CaptureOutcome {
                    session_id,
                    purpose: CapturePurpose::ScreenShare,
                    result,
                },
            );
        });
    }

    pub(super) async fn handle_capture_outcome(&mut self, outcome: CaptureOutcome) {
        let CaptureOutcome {
            session_id,
            purpose,
            result,
        } = outcome;

        if self.session.as_ref().map(|s| s.id) != Some(session_id) {
            if let Ok(stream) = result {
                debug!("Releasing {:?} capture of ended session {}", purpose, session_id);
                stream.stop();
            }
            return;
        }

        match purpose {
            CapturePurpose::Call => self.on_call_media(result).await,
            CapturePurpose::ScreenShare => self.on_screen_capture(result).await,
        }
    }

    async fn on_call_media(&mut self, result: EngineResult<MediaStream>) {
        match result {
            Ok(stream) => {
                let Some(session) = self.session.as_mut() else {
                    stream.stop();
                    return;
                };
                self.ui.update_local_preview(&stream);
                session.local_stream = Some(stream);
                self.start_negotiation().await;
            }
            Err(e) => {
                warn!("Local media capture failed: {}", e);
                self.abort_session(InfoReason::CaptureUnavailable).await;
            }
        }
    }
}

/// Hands a finished capture to the engine, or releases it if the engine is gone.
fn deliver(capture_tx: &mpsc::UnboundedSender<CaptureOutcome>, outcome: CaptureOutcome) {
    if let Err(mpsc::error::SendError(outcome)) = capture_tx.send(outcome) {
        if let Ok(stream) = outcome.result {
            debug!("Engine stopped, releasing capture of session {}", outcome.session_id);
            stream.stop();
        }
    }
}
