//! Incoming message shapes received from the Gemini Live API.
//!
//! Like Janus's plugin data, a server message here is a loose bag of
//! optional top-level keys rather than a tagged enum: `setupComplete`,
//! `serverContent`, `toolCall`, and `toolCallCancellation` are each
//! independently optional and the server only ever sets one per message,
//! but nothing in the schema enforces that.

use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServerMessage {
    #[serde(rename = "setupComplete")]
    pub setup_complete: Option<serde_json::Value>,
    #[serde(rename = "serverContent")]
    pub server_content: Option<ServerContent>,
    #[serde(rename = "toolCall")]
    pub tool_call: Option<serde_json::Value>,
    #[serde(rename = "toolCallCancellation")]
    pub tool_call_cancellation: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServerContent {
    #[serde(default)]
    pub interrupted: bool,
    #[serde(rename = "turnComplete", default)]
    pub turn_complete: bool,
    #[serde(rename = "modelTurn")]
    pub model_turn: Option<ModelTurn>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModelTurn {
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Part {
    #[serde(rename = "inlineData")]
    pub inline_data: Option<InlineData>,
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InlineData {
    #[serde(rename = "mimeType", default)]
    pub mime_type: String,
    #[serde(default)]
    pub data: String,
}
