use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::broadcast;

use crate::client::Client;
use crate::error::Error;
use crate::ids::{HandleId, ParticipantId, RoomId, SessionId};
use crate::message::{JanusMessage, PluginData, VideoRoomData};
use crate::requests::videoroom;

#[derive(Debug, Clone)]
pub struct VideoRoomConfig {
    pub url: String,
    pub room: RoomId,
    pub display_name: String,
    pub rtp_video_host: String,
    pub rtp_video_port: u16,
}

#[derive(Debug, Clone)]
pub struct Publisher {
    pub id: ParticipantId,
    pub display: String,
    pub video_codec: String,
}

/// Joins a Janus VideoRoom as a non-publishing participant purely to learn
/// about other publishers, then uses RTP forwarding to receive one
/// publisher's video without negotiating a WebRTC subscription.
pub struct VideoRoomClient {
    client: Client,
    session: SessionId,
    handle: HandleId,
    room: RoomId,
    publishers: HashMap<ParticipantId, Publisher>,
    /// publisher_id -> stream_id, needed to stop/restart a forward.
    forwards: HashMap<ParticipantId, u64>,
    events: broadcast::Receiver<Arc<JanusMessage>>,
}

impl VideoRoomClient {
    pub async fn connect(config: &VideoRoomConfig) -> Result<Self, Error> {
        let (client, events) = Client::connect(&config.url).await?;
        let session = client.create_session().await?;
        let handle = client.attach(session, "janus.plugin.videoroom").await?;

        Ok(Self {
            client,
            session,
            handle,
            room: config.room,
            publishers: HashMap::new(),
            forwards: HashMap::new(),
            events,
        })
    }

    /// Joins as a receive-only publisher: this still lets us see the
    /// `publishers` list and get notified as new ones arrive, without
    /// ever publishing media ourselves.
    pub async fn join(&mut self, config: &VideoRoomConfig) -> Result<(), Error> {
        let exists = videoroom::Request::Exists { room: self.room };
        let response = self
            .client
            .send_plugin_message(self.session, self.handle, &exists, true)
            .await?;
        let room_exists = videoroom_data(&response)?.exists.unwrap_or(false);

        if !room_exists {
            let create = videoroom::Request::Create {
                room: self.room,
                description: format!("vk-bridge videoroom {}", self.room.0),
                publishers: 10,
                bitrate: 2_000_000,
                videocodec: "vp8,h264",
                audiocodec: "opus",
                notify_joining: true,
            };
            match self
                .client
                .send_plugin_message(self.session, self.handle, &create, true)
                .await
            {
                Ok(_) | Err(Error::JanusPlugin(_)) => {}
                Err(err) => return Err(err),
            }
        }

        let join = videoroom::Request::JoinPublisher {
            ptype: "publisher",
            room: self.room,
            display: config.display_name.clone(),
        };
        let response = self
            .client
            .send_plugin_message(self.session, self.handle, &join, true)
            .await?;
        let data = videoroom_data(&response)?;

        for publisher in &data.publishers {
            self.publishers.insert(
                publisher.id,
                Publisher {
                    id: publisher.id,
                    display: publisher.display.clone(),
                    video_codec: publisher.video_codec.clone(),
                },
            );
        }

        Ok(())
    }

    pub fn publishers(&self) -> impl Iterator<Item = &Publisher> {
        self.publishers.values()
    }

    /// Sets up RTP forwarding of one publisher's video stream to our
    /// configured port. Idempotent: does nothing if already forwarding.
    pub async fn subscribe_to_publisher(
        &mut self,
        config: &VideoRoomConfig,
        publisher_id: ParticipantId,
    ) -> Result<(), Error> {
        if self.forwards.contains_key(&publisher_id) {
            return Ok(());
        }

        let request = videoroom::Request::RtpForward {
            room: self.room,
            publisher_id,
            host: config.rtp_video_host.clone(),
            video_port: config.rtp_video_port,
            video_pt: 96,
            admin_key: videoroom::ADMIN_KEY,
        };

        let response = self
            .client
            .send_plugin_message(self.session, self.handle, &request, true)
            .await?;
        let data = videoroom_data(&response)?;

        if data.videoroom.as_deref() != Some("rtp_forward") {
            return Err(Error::InvalidResponse);
        }

        if let Some(stream_id) = data.rtp_stream.as_ref().and_then(|s| s.video_stream_id) {
            self.forwards.insert(publisher_id, stream_id);
        }

        Ok(())
    }

    pub async fn stop_forward(&mut self, publisher_id: ParticipantId) -> Result<(), Error> {
        let Some(stream_id) = self.forwards.remove(&publisher_id) else {
            return Ok(());
        };

        let request = videoroom::Request::StopRtpForward {
            room: self.room,
            publisher_id,
            stream_id,
            admin_key: videoroom::ADMIN_KEY,
        };
        self.client
            .send_plugin_message(self.session, self.handle, &request, true)
            .await?;

        Ok(())
    }

    /// Janus's VideoRoom RTP forwarding has no keyframe-request primitive,
    /// so a keyframe is obtained by tearing the forward down and setting
    /// it back up, which makes the publisher's browser renegotiate and
    /// send a fresh keyframe.
    pub async fn request_keyframe(
        &mut self,
        config: &VideoRoomConfig,
        publisher_id: ParticipantId,
    ) -> Result<(), Error> {
        self.stop_forward(publisher_id).await?;
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        self.subscribe_to_publisher(config, publisher_id).await
    }

    pub async fn next_event(&mut self) -> Option<Arc<JanusMessage>> {
        loop {
            match self.events.recv().await {
                Ok(msg) => return Some(msg),
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Applies a `publishers`/`unpublished`/`leaving` push event to the
    /// local publisher map. Returns the publisher that newly appeared, if
    /// this event was a join.
    pub fn apply_event(&mut self, msg: &JanusMessage) -> Option<Publisher> {
        let JanusMessage::Event(event) = msg else {
            return None;
        };
        let Some(PluginData::VideoRoom(data)) = &event.plugindata else {
            return None;
        };

        for publisher in &data.publishers {
            if !self.publishers.contains_key(&publisher.id) {
                let entry = Publisher {
                    id: publisher.id,
                    display: publisher.display.clone(),
                    video_codec: publisher.video_codec.clone(),
                };
                self.publishers.insert(publisher.id, entry.clone());
                return Some(entry);
            }
        }

        if let Some(id) = data.leaving.as_ref().and_then(|v| v.as_u64()) {
            self.publishers.remove(&ParticipantId(id));
            self.forwards.remove(&ParticipantId(id));
        }
        if let Some(id) = data.unpublished.as_ref().and_then(|v| v.as_u64()) {
            self.publishers.remove(&ParticipantId(id));
            self.forwards.remove(&ParticipantId(id));
        }

        None
    }

    pub async fn close(&self) -> Result<(), Error> {
        let _ = self.client.detach(self.session, self.handle).await;
        let _ = self.client.destroy_session(self.session).await;
        self.client.close().await
    }
}

fn videoroom_data(msg: &JanusMessage) -> Result<&VideoRoomData, Error> {
    let plugindata = match msg {
        JanusMessage::Event(e) => e.plugindata.as_ref(),
        JanusMessage::Success(s) => s.plugindata(),
        _ => None,
    };

    match plugindata {
        Some(PluginData::VideoRoom(data)) => Ok(data),
        _ => Err(Error::InvalidResponse),
    }
}
