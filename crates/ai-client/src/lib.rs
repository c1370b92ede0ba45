//! Client for Google's Gemini Live API, a bidirectional websocket protocol
//! for real-time multimodal conversation.
//!
//! Handles the setup handshake, audio/image/text input, and the
//! `serverContent`/`toolCall` event stream coming back, including turn
//! completion and interruption signals. Tool-call handling itself (deciding
//! what to do with a `toolCall` and building a response) is left to the
//! caller; this crate only moves the wire messages.

mod client;
pub mod error;
pub mod message;
pub mod requests;
mod transport;

pub use client::{AiClient, AiConfig, AiEvent, AiStats};
pub use error::Error;
