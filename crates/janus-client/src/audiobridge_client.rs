use std::sync::Arc;

use tokio::sync::broadcast;

use crate::client::Client;
use crate::error::Error;
use crate::ids::{HandleId, ParticipantId, RoomId, SessionId};
use crate::message::{AudioBridgeData, JanusMessage, PluginData};
use crate::requests::{audiobridge, RtpEndpoint};

#[derive(Debug, Clone)]
pub struct AudioBridgeConfig {
    pub url: String,
    pub room: RoomId,
    pub display_name: String,
    pub rtp_host: String,
    pub rtp_port: u16,
    pub sampling_rate: u32,
}

/// A plain-RTP participant connection to Janus's AudioBridge plugin:
/// joins a mixing room without negotiating WebRTC, telling Janus to send
/// the mixed room audio to (and accept our audio from) a fixed UDP
/// address instead.
pub struct AudioBridgeClient {
    client: Client,
    session: SessionId,
    handle: HandleId,
    room: RoomId,
    participant_id: Option<ParticipantId>,
    rtp_target: Option<(String, u16)>,
    events: broadcast::Receiver<Arc<JanusMessage>>,
}

impl AudioBridgeClient {
    pub async fn connect(config: &AudioBridgeConfig) -> Result<Self, Error> {
        let (client, events) = Client::connect(&config.url).await?;
        let session = client.create_session().await?;
        let handle = client.attach(session, "janus.plugin.audiobridge").await?;

        Ok(Self {
            client,
            session,
            handle,
            room: config.room,
            participant_id: None,
            rtp_target: None,
            events,
        })
    }

    /// Creates the room, tolerating the "room already exists" error Janus
    /// returns on repeated startups.
    pub async fn ensure_room(&self, config: &AudioBridgeConfig) -> Result<(), Error> {
        let request = audiobridge::Request::Create {
            room: self.room,
            description: format!("vk-bridge audiobridge room {}", self.room.0),
            is_private: false,
            sampling_rate: config.sampling_rate,
            audiolevel_event: true,
            audio_active_packets: 50,
            audio_level_average: 25,
            record: false,
            allow_rtp_participants: true,
            admin_key: audiobridge::ADMIN_KEY,
        };

        match self
            .client
            .send_plugin_message(self.session, self.handle, &request, true)
            .await
        {
            Ok(_) => Ok(()),
            Err(Error::JanusPlugin(e)) if e.is_room_exists() => {
                tracing::info!(room = self.room.0, "audiobridge room already exists");
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    /// Joins as a plain-RTP participant and tells Janus where our audio
    /// lives. Janus answers `join` with its own RTP target for the mixed
    /// room audio; we then send a `configure` carrying the same descriptor
    /// so the mountpoint picks it up even if `join` alone didn't apply it.
    pub async fn join(&mut self, config: &AudioBridgeConfig) -> Result<(), Error> {
        let request = audiobridge::Request::Join {
            room: self.room,
            display: config.display_name.clone(),
            muted: false,
            rtp: RtpEndpoint {
                ip: config.rtp_host.clone(),
                port: config.rtp_port,
                payload_type: 111,
                audiolevel_ext: None,
            },
        };

        let response = self
            .client
            .send_plugin_message(self.session, self.handle, &request, true)
            .await?;
        let data = audiobridge_data(&response)?;

        if data.audiobridge.as_deref() != Some("joined") {
            return Err(Error::InvalidResponse);
        }

        self.participant_id = data.id;
        if let Some(rtp) = &data.rtp {
            self.rtp_target = Some((rtp.ip.clone(), rtp.port));
        }

        let configure = audiobridge::Request::Configure {
            rtp: RtpEndpoint {
                ip: config.rtp_host.clone(),
                port: config.rtp_port,
                payload_type: 111,
                audiolevel_ext: Some(1),
            },
        };
        self.client
            .send_plugin_message(self.session, self.handle, &configure, true)
            .await?;

        Ok(())
    }

    pub fn participant_id(&self) -> Option<ParticipantId> {
        self.participant_id
    }

    /// The UDP address Janus will send mixed room audio to us from.
    pub fn rtp_target(&self) -> Option<(&str, u16)> {
        self.rtp_target.as_ref().map(|(ip, port)| (ip.as_str(), *port))
    }

    pub async fn keep_alive(&self) -> Result<(), Error> {
        self.client.keep_alive(self.session).await
    }

    /// Tells Janus to forward one participant's audio to a UDP destination,
    /// independent of the mixed room audio already flowing to `rtp_target`.
    pub async fn rtp_forward(
        &self,
        publisher_id: ParticipantId,
        host: &str,
        port: u16,
    ) -> Result<(), Error> {
        let request = audiobridge::Request::RtpForward {
            room: self.room,
            publisher_id,
            host: host.to_string(),
            port,
            codec: "opus",
            ptype: 111,
            ssrc: 12_345_678,
            admin_key: audiobridge::ADMIN_KEY,
        };

        self.client
            .send_plugin_message(self.session, self.handle, &request, true)
            .await?;
        Ok(())
    }

    /// Next unsolicited event from this handle: participant joins/leaves,
    /// talking/stopped-talking, room destroyed.
    pub async fn next_event(&mut self) -> Option<Arc<JanusMessage>> {
        loop {
            match self.events.recv().await {
                Ok(msg) => return Some(msg),
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    pub async fn close(&self) -> Result<(), Error> {
        let _ = self.client.detach(self.session, self.handle).await;
        let _ = self.client.destroy_session(self.session).await;
        self.client.close().await
    }
}

fn audiobridge_data(msg: &JanusMessage) -> Result<&AudioBridgeData, Error> {
    let plugindata = match msg {
        JanusMessage::Event(e) => e.plugindata.as_ref(),
        JanusMessage::Success(s) => s.plugindata(),
        _ => None,
    };

    match plugindata {
        Some(PluginData::AudioBridge(data)) => Ok(data),
        _ => Err(Error::InvalidResponse),
    }
}
