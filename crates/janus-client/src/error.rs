use displaydoc::Display;
use serde::{Deserialize, Serialize};
use serde_repr::{Deserialize_repr, Serialize_repr};
use thiserror::Error;

#[derive(Debug, Display, Error)]
pub enum Error {
    /// websocket error: {0}
    Websocket(#[from] tokio_tungstenite::tungstenite::Error),
    /// not connected to janus
    NotConnected,
    /// got invalid response from janus
    InvalidResponse,
    /// got invalid json from janus: {0}
    InvalidJsonResponse(#[from] serde_json::Error),
    /// tried to use an invalid session
    InvalidSession,
    /// janus error: {0}
    Janus(#[from] JanusError),
    /// janus plugin error: {0}
    JanusPlugin(#[from] JanusPluginError),
    /// timed out waiting for a response from janus
    Timeout,
}

#[derive(Debug, Clone, Serialize, Deserialize, Error)]
#[error("{reason}")]
pub struct JanusError {
    pub code: JanusInternalError,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Error)]
#[error("{error}")]
pub struct JanusPluginError {
    pub error: String,
    pub error_code: JanusInternalError,
}

impl JanusPluginError {
    /// Janus's AudioBridge and VideoRoom plugins both use this code when a
    /// room with the requested id already exists.
    pub fn is_room_exists(&self) -> bool {
        matches!(
            self.error_code,
            JanusInternalError::AudiobridgeErrorRoomExists
                | JanusInternalError::VideoroomErrorRoomExists
        )
    }
}

#[derive(Serialize_repr, Deserialize_repr, PartialEq, Eq, Debug, Clone, Copy)]
#[repr(u32)]
pub enum JanusInternalError {
    ErrorUnknown = 490,
    ErrorUnauthorized = 403,
    ErrorUnauthorizedPlugin = 405,
    ErrorTransportSpecific = 450,
    ErrorMissingRequest = 452,
    ErrorUnknownRequest = 453,
    ErrorInvalidJson = 454,
    ErrorInvalidJsonObject = 455,
    ErrorMissingMandatoryElement = 456,
    ErrorInvalidRequestPath = 457,
    ErrorSessionNotFound = 458,
    ErrorHandleNotFound = 459,
    ErrorPluginNotFound = 460,
    ErrorPluginAttach = 461,
    ErrorPluginMessage = 462,
    ErrorPluginDetach = 463,

    AudiobridgeErrorUnknownError = 480,
    AudiobridgeErrorNoMessage = 481,
    AudiobridgeErrorInvalidJson = 482,
    AudiobridgeErrorInvalidRequest = 483,
    AudiobridgeErrorJoinFirst = 484,
    AudiobridgeErrorAlreadyJoined = 485,
    // Janus reports this code when a `create` targets a room id that
    // already exists.
    AudiobridgeErrorRoomExists = 486,
    AudiobridgeErrorNoSuchRoom = 487,
    AudiobridgeErrorNoSuchFeed = 488,
    AudiobridgeErrorMissingElement = 489,
    AudiobridgeErrorInvalidElement = 491,
    AudiobridgeErrorIdExists = 492,
    AudiobridgeErrorAlreadyPresent = 493,
    AudiobridgeErrorUnauthorized = 494,
    AudiobridgeErrorLibOpusError = 495,
    AudiobridgeErrorUnknownGroup = 496,

    VideoroomErrorUnknownError = 499,
    VideoroomErrorNoMessage = 421,
    VideoroomErrorInvalidJson = 422,
    VideoroomErrorInvalidRequest = 423,
    VideoroomErrorJoinFirst = 424,
    VideoroomErrorAlreadyJoined = 425,
    VideoroomErrorNoSuchRoom = 426,
    VideoroomErrorRoomExists = 427,
    VideoroomErrorNoSuchFeed = 428,
    VideoroomErrorMissingElement = 429,
    VideoroomErrorInvalidElement = 430,
    VideoroomErrorInvalidSdpType = 431,
    VideoroomErrorPublishersFull = 432,
    VideoroomErrorUnauthorized = 433,
    VideoroomErrorAlreadyPublished = 434,
    VideoroomErrorNotPublished = 435,
    VideoroomErrorIdExists = 436,
    VideoroomErrorInvalidSdp = 437,
}
