use janus_client::message::{JanusMessage, PluginData};
use janus_client::requests::{audiobridge, RtpEndpoint};
use janus_client::{ParticipantId, RoomId};
use pretty_assertions::assert_eq;

#[test]
fn join_request_serializes_with_literal_field_names() {
    let request = audiobridge::Request::Join {
        room: RoomId(1234),
        display: "vk-bridge".into(),
        muted: false,
        rtp: RtpEndpoint {
            ip: "127.0.0.1".into(),
            port: 20000,
            payload_type: 111,
            audiolevel_ext: None,
        },
    };

    let value = serde_json::to_value(&request).unwrap();
    assert_eq!(
        value,
        serde_json::json!({
            "request": "join",
            "room": 1234,
            "display": "vk-bridge",
            "muted": false,
            "rtp": {"ip": "127.0.0.1", "port": 20000, "payload_type": 111},
        })
    );
}

#[test]
fn parses_audiobridge_joined_event_with_rtp_target() {
    let raw = serde_json::json!({
        "janus": "event",
        "session_id": 1,
        "sender": 2,
        "transaction": "abc123",
        "plugindata": {
            "plugin": "janus.plugin.audiobridge",
            "data": {
                "audiobridge": "joined",
                "room": 5555,
                "id": 42,
                "participants": [],
                "rtp": {"ip": "10.0.0.5", "port": 40000},
            }
        }
    });

    let msg: JanusMessage = serde_json::from_value(raw).unwrap();
    let JanusMessage::Event(event) = msg else {
        panic!("expected an event message");
    };
    let Some(PluginData::AudioBridge(data)) = event.plugindata else {
        panic!("expected audiobridge plugin data");
    };

    assert_eq!(data.audiobridge.as_deref(), Some("joined"));
    assert_eq!(data.id, Some(ParticipantId(42)));
    let rtp = data.rtp.expect("rtp target present");
    assert_eq!(rtp.ip, "10.0.0.5");
    assert_eq!(rtp.port, 40000);
}

#[test]
fn room_exists_error_is_recognized_as_non_fatal() {
    let raw = serde_json::json!({
        "janus": "event",
        "session_id": 1,
        "sender": 2,
        "plugindata": {
            "plugin": "janus.plugin.audiobridge",
            "data": {
                "error": "Room already exists",
                "error_code": 486,
            }
        }
    });

    let msg: JanusMessage = serde_json::from_value(raw).unwrap();
    let err = msg.into_result().unwrap_err();
    let janus_client::Error::JanusPlugin(plugin_error) = err else {
        panic!("expected a plugin error");
    };
    assert!(plugin_error.is_room_exists());
}

#[test]
fn videoroom_rtp_forward_request_uses_its_own_admin_key() {
    use janus_client::requests::videoroom;

    let request = videoroom::Request::RtpForward {
        room: RoomId(5679),
        publisher_id: ParticipantId(7),
        host: "127.0.0.1".into(),
        video_port: 5006,
        video_pt: 96,
        admin_key: videoroom::ADMIN_KEY,
    };

    let value = serde_json::to_value(&request).unwrap();
    assert_eq!(value["admin_key"], "videoroom_admin_secret");
    assert_eq!(value["video_pt"], 96);
}
