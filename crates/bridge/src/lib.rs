mod bridge;
mod debug_audio;
mod error;
mod fifo;
mod settings;
mod stats;
mod status;
pub mod trace;

pub use bridge::Bridge;
pub use error::Error;
pub use settings::{AiSettings, AudioSettings, JanusSettings, Settings};
pub use stats::{AgentState, BridgeStats, BridgeStatsSnapshot};
pub use status::{
    AiStatus, AudioProcessorStatus, AudioStatus, BridgeStatus, JanusStatus, JitterBufferStatus,
    RtpStatus, VadStatus,
};
