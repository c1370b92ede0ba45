//! Outgoing message shapes sent to the Gemini Live API.
//!
//! Field casing here is not a single convention. Audio goes out through
//! `realtimeInput.mediaChunks` (camelCase), but images go through
//! `realtime_input.media` (snake_case), a quirk of the underlying Google
//! SDK's own wire format, reproduced here rather than normalized away.

use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct SetupRequest {
    pub setup: SetupConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct SetupConfig {
    pub model: String,
    pub generation_config: GenerationConfig,
    pub tools: Vec<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<SystemInstruction>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerationConfig {
    pub response_modalities: Vec<&'static str>,
    pub media_resolution: &'static str,
    pub speech_config: SpeechConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct SpeechConfig {
    pub voice_config: VoiceConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct VoiceConfig {
    pub prebuilt_voice_config: PrebuiltVoiceConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct PrebuiltVoiceConfig {
    pub voice_name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SystemInstruction {
    pub parts: Vec<TextPart>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TextPart {
    pub text: String,
}

/// `realtimeInput.mediaChunks`, used for streamed audio.
#[derive(Debug, Clone, Serialize)]
pub struct RealtimeInputAudio {
    #[serde(rename = "realtimeInput")]
    pub realtime_input: MediaChunksInput,
}

#[derive(Debug, Clone, Serialize)]
pub struct MediaChunksInput {
    #[serde(rename = "mediaChunks")]
    pub media_chunks: Vec<MediaChunk>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MediaChunk {
    #[serde(rename = "mimeType")]
    pub mime_type: String,
    pub data: String,
}

/// `realtime_input.media`, used for single-frame image input. Distinct key
/// casing from [`RealtimeInputAudio`] is intentional, see module docs.
#[derive(Debug, Clone, Serialize)]
pub struct RealtimeInputImage {
    pub realtime_input: MediaInput,
}

#[derive(Debug, Clone, Serialize)]
pub struct MediaInput {
    pub media: Media,
}

#[derive(Debug, Clone, Serialize)]
pub struct Media {
    pub mime_type: String,
    pub data: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ClientContentRequest {
    #[serde(rename = "clientContent")]
    pub client_content: ClientContent,
}

#[derive(Debug, Clone, Serialize)]
pub struct ClientContent {
    pub turns: Vec<Turn>,
    #[serde(rename = "turnComplete")]
    pub turn_complete: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct Turn {
    pub role: &'static str,
    pub parts: Vec<TextPart>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ToolResponseRequest {
    #[serde(rename = "toolResponse")]
    pub tool_response: ToolResponseBody,
}

#[derive(Debug, Clone, Serialize)]
pub struct ToolResponseBody {
    #[serde(rename = "functionResponses")]
    pub function_responses: Vec<serde_json::Value>,
}
