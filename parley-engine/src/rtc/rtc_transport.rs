use crate::capability::{
    MediaTrack, NegotiationTransport, PeerConnectionState, TrackKind, TransportEvent,
    TransportFactory,
};
use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use parley_core::{IceCandidate, IceServerConfig, SdpType, SessionDescription};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::{Mutex, mpsc};
use tracing::{debug, info};
use webrtc::api::APIBuilder;
use webrtc::api::interceptor_registry::register_default_interceptors;
use webrtc::api::media_engine::{MIME_TYPE_OPUS, MIME_TYPE_VP8, MediaEngine};
use webrtc::data_channel::RTCDataChannel;
use webrtc::ice_transport::ice_candidate::{RTCIceCandidate, RTCIceCandidateInit};
use webrtc::ice_transport::ice_server::RTCIceServer;
use webrtc::interceptor::registry::Registry;
use webrtc::peer_connection::RTCPeerConnection;
use webrtc::peer_connection::configuration::RTCConfiguration;
use webrtc::peer_connection::peer_connection_state::RTCPeerConnectionState;
use webrtc::peer_connection::sdp::sdp_type::RTCSdpType;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;
use webrtc::rtp_transceiver::RTCRtpTransceiver;
use webrtc::rtp_transceiver::rtp_codec::{RTCRtpCodecCapability, RTPCodecType};
use webrtc::rtp_transceiver::rtp_receiver::RTCRtpReceiver;
use webrtc::rtp_transceiver::rtp_sender::RTCRtpSender;
use webrtc::track::track_local::TrackLocal;
use webrtc::track::track_local::track_local_static_sample::TrackLocalStaticSample;
use webrtc::track::track_remote::TrackRemote;

const CHAT_CHANNEL_LABEL: &str = "chat";
const OUTGOING_STREAM_ID: &str = "parley";

#[derive(Debug, Clone, Copy, Default)]
pub struct RtcTransportFactory;

#[async_trait]
impl TransportFactory for RtcTransportFactory {
    async fn create_transport(
        &self,
        ice_servers: &[IceServerConfig],
        events: mpsc::Sender<TransportEvent>,
    ) -> Result<Box<dyn NegotiationTransport>> {
        Ok(Box::new(RtcTransport::new(ice_servers, events).await?))
    }
}

pub struct RtcTransport {
    peer_connection: Arc<RTCPeerConnection>,
    video_sender: Mutex<Option<Arc<RTCRtpSender>>>,
    has_tracks: AtomicBool,
    has_chat_channel: AtomicBool,
}

impl RtcTransport {
    pub async fn new(
        ice_servers: &[IceServerConfig],
        events: mpsc::Sender<TransportEvent>,
    ) -> Result<Self> {
        let mut media_engine = MediaEngine::default();
        media_engine.register_default_codecs()?;
        let registry = register_default_interceptors(Registry::new(), &mut media_engine)?;

        let api = APIBuilder::new()
            .with_media_engine(media_engine)
            .with_interceptor_registry(registry)
            .build();

        let rtc_config = RTCConfiguration {
            ice_servers: ice_servers
                .iter()
                .map(|server| RTCIceServer {
                    urls: server.urls.clone(),
                    username: server.username.clone().unwrap_or_default(),
                    credential: server.credential.clone().unwrap_or_default(),
                })
                .collect(),
            ..Default::default()
        };

        let peer_connection = Arc::new(
            api.new_peer_connection(rtc_config)
                .await
                .context("Failed to create peer connection")?,
        );

        let state_tx = events.clone();
        peer_connection.on_peer_connection_state_change(Box::new(
            move |s: RTCPeerConnectionState| {
                let tx = state_tx.clone();
                Box::pin(async move {
                    info!("Peer connection state changed: {:?}", s);
                    let _ = tx
                        .send(TransportEvent::ConnectionStateChanged(connection_state(s)))
                        .await;
                })
            },
        ));

        let ice_tx = events.clone();
        peer_connection.on_ice_candidate(Box::new(move |c: Option<RTCIceCandidate>| {
            let tx = ice_tx.clone();
            Box::pin(async move {
                let Some(candidate) = c else { return };
                let Ok(init) = candidate.to_json() else {
                    return;
                };
                let _ = tx
                    .send(TransportEvent::LocalCandidate(IceCandidate {
                        candidate: init.candidate,
                        sdp_mid: init.sdp_mid,
                        sdp_m_line_index: init.sdp_mline_index,
                        username_fragment: init.username_fragment,
                    }))
                    .await;
            })
        }));

        let track_tx = events;
        peer_connection.on_track(Box::new(
            move |track: Arc<TrackRemote>,
                  _receiver: Arc<RTCRtpReceiver>,
                  _transceiver: Arc<RTCRtpTransceiver>| {
                let tx = track_tx.clone();
                Box::pin(async move {
                    let kind = match track.kind() {
                        RTPCodecType::Audio => TrackKind::Audio,
                        _ => TrackKind::Video,
                    };
                    let _ = tx
                        .send(TransportEvent::RemoteTrack(MediaTrack::new(track.id(), kind)))
                        .await;
                })
            },
        ));

        peer_connection.on_data_channel(Box::new(move |dc: Arc<RTCDataChannel>| {
            Box::pin(async move {
                debug!("Remote opened data channel '{}'", dc.label());
            })
        }));

        Ok(Self {
            peer_connection,
            video_sender: Mutex::new(None),
            has_tracks: AtomicBool::new(false),
            has_chat_channel: AtomicBool::new(false),
        })
    }
}

#[async_trait]
impl NegotiationTransport for RtcTransport {
    async fn create_offer(&self) -> Result<SessionDescription> {
        // Without tracks the offer needs a data channel to have anything to negotiate.
        if !self.has_tracks.load(Ordering::SeqCst)
            && !self.has_chat_channel.swap(true, Ordering::SeqCst)
        {
            self.peer_connection
                .create_data_channel(CHAT_CHANNEL_LABEL, None)
                .await
                .context("Failed to create chat data channel")?;
        }
        let offer = self.peer_connection.create_offer(None).await?;
        from_rtc(&offer)
    }

    async fn create_answer(&self) -> Result<SessionDescription> {
        let answer = self.peer_connection.create_answer(None).await?;
        from_rtc(&answer)
    }

    async fn set_local_description(&self, desc: SessionDescription) -> Result<()> {
        self.peer_connection
            .set_local_description(to_rtc(desc)?)
            .await?;
        Ok(())
    }

    async fn set_remote_description(&self, desc: SessionDescription) -> Result<()> {
        self.peer_connection
            .set_remote_description(to_rtc(desc)?)
            .await?;
        Ok(())
    }

    async fn local_description(&self) -> Result<Option<SessionDescription>> {
        self.peer_connection
            .local_description()
            .await
            .map(|desc| from_rtc(&desc))
            .transpose()
    }

    async fn remote_description(&self) -> Result<Option<SessionDescription>> {
        self.peer_connection
            .remote_description()
            .await
            .map(|desc| from_rtc(&desc))
            .transpose()
    }

    async fn add_ice_candidate(&self, candidate: IceCandidate) -> Result<()> {
        self.peer_connection
            .add_ice_candidate(RTCIceCandidateInit {
                candidate: candidate.candidate,
                sdp_mid: candidate.sdp_mid,
                sdp_mline_index: candidate.sdp_m_line_index,
                username_fragment: candidate.username_fragment,
            })
            .await?;
        Ok(())
    }

    async fn add_track(&self, track: &MediaTrack, stream_id: &str) -> Result<()> {
        let local = local_track(track, stream_id);
        let sender = self
            .peer_connection
            .add_track(local)
            .await
            .with_context(|| format!("Failed to add track {}", track.id()))?;
        self.has_tracks.store(true, Ordering::SeqCst);

        if track.kind() == TrackKind::Video {
            *self.video_sender.lock().await = Some(sender);
        }
        Ok(())
    }

    async fn replace_outgoing_video_track(&self, track: &MediaTrack) -> Result<()> {
        let Some(sender) = self.video_sender.lock().await.clone() else {
            bail!("no outgoing video sender");
        };
        sender
            .replace_track(Some(local_track(track, OUTGOING_STREAM_ID)))
            .await
            .with_context(|| format!("Failed to switch outgoing video to {}", track.id()))?;
        debug!("Outgoing video now carries {}", track.id());
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.peer_connection.close().await?;
        Ok(())
    }
}

fn local_track(track: &MediaTrack, stream_id: &str) -> Arc<dyn TrackLocal + Send + Sync> {
    let mime_type = match track.kind() {
        TrackKind::Audio => MIME_TYPE_OPUS,
        TrackKind::Video => MIME_TYPE_VP8,
    };
    Arc::new(TrackLocalStaticSample::new(
        RTCRtpCodecCapability {
            mime_type: mime_type.to_owned(),
            ..Default::default()
        },
        track.id().to_owned(),
        stream_id.to_owned(),
    ))
}

fn connection_state(state: RTCPeerConnectionState) -> PeerConnectionState {
    match state {
        RTCPeerConnectionState::Connecting => PeerConnectionState::Connecting,
        RTCPeerConnectionState::Connected => PeerConnectionState::Connected,
        RTCPeerConnectionState::Disconnected => PeerConnectionState::Disconnected,
        RTCPeerConnectionState::Failed => PeerConnectionState::Failed,
        RTCPeerConnectionState::Closed => PeerConnectionState::Closed,
        _ => PeerConnectionState::New,
    }
}

fn to_rtc(desc: SessionDescription) -> Result<RTCSessionDescription> {
    Ok(match desc.sdp_type {
        SdpType::Offer => RTCSessionDescription::offer(desc.sdp)?,
        SdpType::Answer => RTCSessionDescription::answer(desc.sdp)?,
        other => bail!("unsupported session description type {:?}", other),
    })
}

fn from_rtc(desc: &RTCSessionDescription) -> Result<SessionDescription> {
    Ok(match desc.sdp_type {
        RTCSdpType::Offer => SessionDescription::offer(desc.sdp.clone()),
        RTCSdpType::Answer => SessionDescription::answer(desc.sdp.clone()),
        other => bail!("unsupported session description type {:?}", other),
    })
}
