//! Incoming message shapes received from Janus over the websocket.
//!
//! Janus's own envelope (`janus: "ack" | "event" | "success" | ...`) is
//! fixed; the `plugindata.data` body underneath is plugin-specific and, for
//! both plugins this client talks to, a loose bag of optional fields rather
//! than one variant per request. Janus itself doesn't distinguish a
//! `joined` event from a `configured` one in the schema, only by the value
//! of the `audiobridge`/`videoroom` discriminant field.

use serde::Deserialize;

use crate::error::JanusError;
use crate::ids::{HandleId, ParticipantId, RoomId, SessionId, TransactionId};

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "janus")]
pub enum JanusMessage {
    #[serde(rename = "ack")]
    Ack(Ack),
    #[serde(rename = "success")]
    Success(Success),
    #[serde(rename = "event")]
    Event(Event),
    #[serde(rename = "error")]
    Error(ErrorMessage),
    #[serde(rename = "hangup")]
    Hangup(Hangup),
    #[serde(rename = "webrtcup")]
    WebRtcUp(SenderOnly),
    #[serde(rename = "detached")]
    Detached(SenderOnly),
    #[serde(rename = "timeout")]
    Timeout(Timeout),
    #[serde(rename = "keepalive")]
    KeepAlive(KeepAlive),
}

impl JanusMessage {
    pub fn transaction_id(&self) -> Option<&TransactionId> {
        match self {
            JanusMessage::Ack(m) => Some(&m.transaction),
            JanusMessage::Success(m) => Some(&m.transaction),
            JanusMessage::Event(m) => m.transaction.as_ref(),
            JanusMessage::Error(m) => m.transaction.as_ref(),
            JanusMessage::KeepAlive(m) => Some(&m.transaction),
            _ => None,
        }
    }

    pub fn session_id(&self) -> Option<SessionId> {
        match self {
            JanusMessage::Success(m) => m.session_id,
            JanusMessage::Event(m) => Some(m.session_id),
            JanusMessage::Error(m) => Some(m.session_id),
            JanusMessage::Hangup(m) => Some(m.session_id),
            JanusMessage::WebRtcUp(m) => Some(m.session_id),
            JanusMessage::Detached(m) => Some(m.session_id),
            _ => None,
        }
    }

    pub fn sender(&self) -> Option<HandleId> {
        match self {
            JanusMessage::Success(m) => m.sender,
            JanusMessage::Event(m) => Some(m.sender),
            JanusMessage::Hangup(m) => Some(m.sender),
            JanusMessage::WebRtcUp(m) => Some(m.sender),
            JanusMessage::Detached(m) => Some(m.sender),
            _ => None,
        }
    }

    /// Turns a Janus-level or plugin-level error into `Err`, passing
    /// everything else through unchanged.
    pub fn into_result(self) -> Result<Self, crate::error::Error> {
        match self {
            JanusMessage::Error(e) => Err(crate::error::Error::Janus(e.error)),
            JanusMessage::Event(Event {
                plugindata: Some(ref data),
                ..
            }) if data.error_code().is_some() => {
                Err(crate::error::Error::JanusPlugin(data.plugin_error().expect(
                    "error_code present implies plugin_error() returns Some",
                )))
            }
            msg => Ok(msg),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Ack {
    pub transaction: TransactionId,
}

#[derive(Debug, Clone, Deserialize)]
pub struct KeepAlive {
    pub session_id: SessionId,
    pub transaction: TransactionId,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Timeout {
    pub session_id: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SenderOnly {
    pub session_id: SessionId,
    pub sender: HandleId,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Hangup {
    pub session_id: SessionId,
    pub sender: HandleId,
    pub reason: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ErrorMessage {
    pub session_id: SessionId,
    pub transaction: Option<TransactionId>,
    pub error: JanusError,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Event {
    pub sender: HandleId,
    pub session_id: SessionId,
    #[serde(default)]
    pub transaction: Option<TransactionId>,
    pub plugindata: Option<PluginData>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Success {
    Plugin(PluginSuccess),
    Janus(JanusSuccess),
}

impl Success {
    fn transaction(&self) -> &TransactionId {
        match self {
            Success::Plugin(s) => &s.transaction,
            Success::Janus(s) => &s.transaction,
        }
    }

    pub fn plugindata(&self) -> Option<&PluginData> {
        match self {
            Success::Plugin(s) => Some(&s.plugindata),
            Success::Janus(_) => None,
        }
    }

    pub fn data_id(&self) -> Option<u64> {
        match self {
            Success::Janus(s) => s.data.as_ref().map(|d| d.id),
            Success::Plugin(_) => None,
        }
    }
}

impl std::ops::Deref for Success {
    type Target = TransactionId;

    fn deref(&self) -> &Self::Target {
        self.transaction()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct JanusSuccess {
    pub sender: Option<HandleId>,
    pub session_id: Option<SessionId>,
    pub transaction: TransactionId,
    pub data: Option<SuccessData>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SuccessData {
    pub id: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PluginSuccess {
    pub sender: Option<HandleId>,
    pub session_id: Option<SessionId>,
    pub transaction: TransactionId,
    pub plugindata: PluginData,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "plugin", content = "data")]
pub enum PluginData {
    #[serde(rename = "janus.plugin.audiobridge")]
    AudioBridge(AudioBridgeData),
    #[serde(rename = "janus.plugin.videoroom")]
    VideoRoom(VideoRoomData),
}

impl PluginData {
    pub fn error_code(&self) -> Option<crate::error::JanusInternalError> {
        match self {
            PluginData::AudioBridge(d) => d.error_code,
            PluginData::VideoRoom(d) => d.error_code,
        }
    }

    pub fn plugin_error(&self) -> Option<crate::error::JanusPluginError> {
        let (error, error_code) = match self {
            PluginData::AudioBridge(d) => (d.error.clone(), d.error_code?),
            PluginData::VideoRoom(d) => (d.error.clone(), d.error_code?),
        };
        Some(crate::error::JanusPluginError {
            error: error.unwrap_or_default(),
            error_code,
        })
    }
}

/// Body of `janus.plugin.audiobridge` events and success responses.
///
/// The `audiobridge` field is the event discriminant Janus sends
/// (`"created"`, `"joined"`, `"event"`, `"rtp_forward"`, `"talking"`,
/// `"stopped-talking"`, `"destroyed"`); which of the other fields are
/// present depends on which one it is.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AudioBridgeData {
    pub audiobridge: Option<String>,
    pub room: Option<RoomId>,
    pub id: Option<ParticipantId>,
    #[serde(default)]
    pub participants: Vec<AudioBridgeParticipant>,
    pub leaving: Option<ParticipantId>,
    pub rtp: Option<RtpInfo>,
    pub stream_id: Option<u64>,
    pub error: Option<String>,
    pub error_code: Option<crate::error::JanusInternalError>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AudioBridgeParticipant {
    pub id: ParticipantId,
    #[serde(default)]
    pub display: String,
    #[serde(default)]
    pub muted: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RtpInfo {
    pub ip: String,
    pub port: u16,
}

/// Body of `janus.plugin.videoroom` events and success responses. Same
/// loose-bag shape as [`AudioBridgeData`], discriminated by `videoroom`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VideoRoomData {
    pub videoroom: Option<String>,
    pub room: Option<RoomId>,
    pub id: Option<ParticipantId>,
    pub exists: Option<bool>,
    #[serde(default)]
    pub publishers: Vec<VideoRoomPublisher>,
    pub unpublished: Option<serde_json::Value>,
    pub leaving: Option<serde_json::Value>,
    pub rtp_stream: Option<RtpStreamInfo>,
    pub error: Option<String>,
    pub error_code: Option<crate::error::JanusInternalError>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VideoRoomPublisher {
    pub id: ParticipantId,
    #[serde(default)]
    pub display: String,
    #[serde(default, rename = "audio_codec")]
    pub audio_codec: String,
    #[serde(default, rename = "video_codec")]
    pub video_codec: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RtpStreamInfo {
    pub video_stream_id: Option<u64>,
}
