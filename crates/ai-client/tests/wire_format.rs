use ai_client::message::ServerMessage;
use ai_client::requests::{
    ClientContent, ClientContentRequest, GenerationConfig, Media, MediaChunk, MediaChunksInput,
    MediaInput, PrebuiltVoiceConfig, RealtimeInputAudio, RealtimeInputImage, SetupConfig,
    SetupRequest, SpeechConfig, SystemInstruction, TextPart, Turn, VoiceConfig,
};
use pretty_assertions::assert_eq;

#[test]
fn setup_request_nests_voice_under_speech_config() {
    let request = SetupRequest {
        setup: SetupConfig {
            model: "gemini-2.0-flash-exp".into(),
            generation_config: GenerationConfig {
                response_modalities: vec!["AUDIO"],
                media_resolution: "MEDIA_RESOLUTION_MEDIUM",
                speech_config: SpeechConfig {
                    voice_config: VoiceConfig {
                        prebuilt_voice_config: PrebuiltVoiceConfig {
                            voice_name: "Puck".into(),
                        },
                    },
                },
            },
            tools: Vec::new(),
            system_instruction: Some(SystemInstruction {
                parts: vec![TextPart {
                    text: "be terse".into(),
                }],
            }),
        },
    };

    let value = serde_json::to_value(&request).unwrap();
    assert_eq!(
        value,
        serde_json::json!({
            "setup": {
                "model": "gemini-2.0-flash-exp",
                "generation_config": {
                    "response_modalities": ["AUDIO"],
                    "media_resolution": "MEDIA_RESOLUTION_MEDIUM",
                    "speech_config": {
                        "voice_config": {
                            "prebuilt_voice_config": {
                                "voice_name": "Puck"
                            }
                        }
                    }
                },
                "tools": [],
                "system_instruction": {
                    "parts": [{"text": "be terse"}]
                }
            }
        })
    );
}

#[test]
fn audio_chunk_uses_camel_case_realtime_input() {
    let request = RealtimeInputAudio {
        realtime_input: MediaChunksInput {
            media_chunks: vec![MediaChunk {
                mime_type: "audio/pcm;rate=16000".into(),
                data: "abc123".into(),
            }],
        },
    };

    let value = serde_json::to_value(&request).unwrap();
    assert_eq!(
        value,
        serde_json::json!({
            "realtimeInput": {
                "mediaChunks": [{"mimeType": "audio/pcm;rate=16000", "data": "abc123"}]
            }
        })
    );
}

#[test]
fn image_frame_uses_snake_case_realtime_input() {
    let request = RealtimeInputImage {
        realtime_input: MediaInput {
            media: Media {
                mime_type: "image/jpeg".into(),
                data: "xyz789".into(),
            },
        },
    };

    let value = serde_json::to_value(&request).unwrap();
    assert_eq!(
        value,
        serde_json::json!({
            "realtime_input": {
                "media": {"mime_type": "image/jpeg", "data": "xyz789"}
            }
        })
    );
}

#[test]
fn client_content_carries_turn_complete_flag() {
    let request = ClientContentRequest {
        client_content: ClientContent {
            turns: vec![Turn {
                role: "user",
                parts: vec![TextPart {
                    text: "hello".into(),
                }],
            }],
            turn_complete: true,
        },
    };

    let value = serde_json::to_value(&request).unwrap();
    assert_eq!(value["clientContent"]["turnComplete"], true);
    assert_eq!(value["clientContent"]["turns"][0]["role"], "user");
}

#[test]
fn parses_server_content_with_inline_audio_and_turn_complete() {
    let raw = serde_json::json!({
        "serverContent": {
            "turnComplete": true,
            "modelTurn": {
                "parts": [
                    {"inlineData": {"mimeType": "audio/pcm;rate=24000", "data": "aGVsbG8="}},
                    {"text": "hi there"}
                ]
            }
        }
    });

    let msg: ServerMessage = serde_json::from_value(raw).unwrap();
    let content = msg.server_content.expect("serverContent present");
    assert!(content.turn_complete);
    assert!(!content.interrupted);

    let parts = content.model_turn.expect("modelTurn present").parts;
    assert_eq!(parts.len(), 2);
    assert_eq!(
        parts[0].inline_data.as_ref().unwrap().mime_type,
        "audio/pcm;rate=24000"
    );
    assert_eq!(parts[1].text.as_deref(), Some("hi there"));
}

#[test]
fn setup_complete_event_is_recognized() {
    let raw = serde_json::json!({"setupComplete": {}});
    let msg: ServerMessage = serde_json::from_value(raw).unwrap();
    assert!(msg.setup_complete.is_some());
    assert!(msg.server_content.is_none());
}
