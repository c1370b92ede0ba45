//! Minimal Janus Gateway websocket client for plain-RTP participants.
//!
//! Unlike a full WebRTC signalling client, nothing here negotiates SDP or
//! ICE: both the AudioBridge and VideoRoom plugin wrappers join rooms with
//! a fixed `rtp` descriptor and receive media as plain RTP on a UDP socket
//! owned elsewhere (see `rtp-core`). What's kept from a general-purpose
//! Janus client is the websocket transport and the transaction-correlated
//! request/response engine, since Janus's ack-then-event reply pattern is
//! the same regardless of which plugin or flow is in use.

mod audiobridge_client;
mod client;
pub mod error;
mod ids;
pub mod message;
pub mod requests;
mod transport;
mod videoroom_client;

pub use audiobridge_client::{AudioBridgeClient, AudioBridgeConfig};
pub use client::Client;
pub use error::Error;
pub use ids::{HandleId, ParticipantId, RoomId, SessionId, TransactionId};
pub use message::JanusMessage;
pub use videoroom_client::{Publisher, VideoRoomClient, VideoRoomConfig};
