use displaydoc::Display;
use thiserror::Error;

#[derive(Debug, Display, Error)]
pub enum Error {
    /// websocket error: {0}
    Websocket(#[from] tokio_tungstenite::tungstenite::Error),
    /// not connected to the AI service
    NotConnected,
    /// no API key configured
    MissingApiKey,
    /// got invalid json from the AI service: {0}
    InvalidJson(#[from] serde_json::Error),
    /// timed out waiting for session setup to complete
    SetupTimeout,
}
