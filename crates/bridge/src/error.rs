use displaydoc::Display;
use thiserror::Error;

#[derive(Debug, Display, Error)]
pub enum Error {
    /// no AI API key configured
    MissingApiKey,
    /// RTP port {0} is out of the allowed range 1024..65535
    InvalidRtpPort(u16),
    /// audio codec unavailable: {0}
    AudioCodec(#[from] audio_codec::Error),
    /// failed to bind RTP transport: {0}
    Rtp(#[from] rtp_core::Error),
    /// failed to reach janus: {0}
    Janus(#[from] janus_client::error::Error),
    /// failed to connect to the AI service: {0}
    Ai(#[from] ai_client::Error),
    /// configuration error: {0}
    Config(#[from] config::ConfigError),
}
