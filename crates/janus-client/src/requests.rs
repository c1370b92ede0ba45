//! Outgoing plugin request bodies, sent as the `body` of a Janus `message`
//! request.

use serde::Serialize;

use crate::ids::{ParticipantId, RoomId};

#[derive(Debug, Clone, Serialize)]
pub struct RtpEndpoint {
    pub ip: String,
    pub port: u16,
    pub payload_type: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audiolevel_ext: Option<u8>,
}

pub mod audiobridge {
    use super::*;

    pub const ADMIN_KEY: &str = "audiobridge_admin";

    #[derive(Debug, Clone, Serialize)]
    #[serde(tag = "request")]
    pub enum Request {
        #[serde(rename = "create")]
        Create {
            room: RoomId,
            description: String,
            is_private: bool,
            sampling_rate: u32,
            audiolevel_event: bool,
            audio_active_packets: u32,
            audio_level_average: u32,
            record: bool,
            /// Required for Janus to accept participants that join with a
            /// plain `rtp` descriptor instead of negotiating WebRTC.
            allow_rtp_participants: bool,
            admin_key: &'static str,
        },
        #[serde(rename = "destroy")]
        Destroy {
            room: RoomId,
            admin_key: &'static str,
        },
        #[serde(rename = "join")]
        Join {
            room: RoomId,
            display: String,
            muted: bool,
            rtp: RtpEndpoint,
        },
        #[serde(rename = "configure")]
        Configure { rtp: RtpEndpoint },
        #[serde(rename = "rtp_forward")]
        RtpForward {
            room: RoomId,
            publisher_id: ParticipantId,
            host: String,
            port: u16,
            codec: &'static str,
            ptype: u8,
            ssrc: u32,
            admin_key: &'static str,
        },
    }
}

pub mod videoroom {
    use super::*;

    pub const ADMIN_KEY: &str = "videoroom_admin_secret";

    #[derive(Debug, Clone, Serialize)]
    #[serde(tag = "request")]
    pub enum Request {
        #[serde(rename = "exists")]
        Exists { room: RoomId },
        #[serde(rename = "create")]
        Create {
            room: RoomId,
            description: String,
            publishers: u32,
            bitrate: u32,
            videocodec: &'static str,
            audiocodec: &'static str,
            notify_joining: bool,
        },
        #[serde(rename = "join")]
        JoinPublisher {
            ptype: &'static str,
            room: RoomId,
            display: String,
        },
        #[serde(rename = "rtp_forward")]
        RtpForward {
            room: RoomId,
            publisher_id: ParticipantId,
            host: String,
            video_port: u16,
            video_pt: u8,
            admin_key: &'static str,
        },
        #[serde(rename = "stop_rtp_forward")]
        StopRtpForward {
            room: RoomId,
            publisher_id: ParticipantId,
            stream_id: u64,
            admin_key: &'static str,
        },
    }
}
