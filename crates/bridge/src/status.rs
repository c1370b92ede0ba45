//! The `get_status()` snapshot the CLI's `get`/`health` subcommands print.

use serde::Serialize;

use crate::stats::{AgentState, BridgeStatsSnapshot};

#[derive(Debug, Clone, Serialize)]
pub struct JanusStatus {
    pub connected: bool,
    pub room: u64,
    pub participant_id: Option<u64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AiStatus {
    pub connected: bool,
    pub ready: bool,
    pub is_speaking: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct RtpStatus {
    pub receiver_running: bool,
    pub sender_running: bool,
    pub jitter_buffer: JitterBufferStatus,
}

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct JitterBufferStatus {
    pub packets_in: u64,
    pub packets_out: u64,
    pub packets_dropped: u64,
    pub current_size: usize,
}

impl From<jitter_buffer::JitterBufferStats> for JitterBufferStatus {
    fn from(s: jitter_buffer::JitterBufferStats) -> Self {
        Self {
            packets_in: s.packets_in,
            packets_out: s.packets_out,
            packets_dropped: s.packets_dropped,
            current_size: s.current_size,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct VadStatus {
    pub available: bool,
    pub threshold: f32,
    pub is_speaking: bool,
    pub speech_ratio: f32,
    pub silence_filtered_pct: f32,
}

impl From<vad::VadStats> for VadStatus {
    fn from(s: vad::VadStats) -> Self {
        Self {
            available: s.available,
            threshold: s.threshold,
            is_speaking: s.is_speaking,
            speech_ratio: s.speech_ratio,
            silence_filtered_pct: s.silence_filtered_pct,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct AudioProcessorStatus {
    pub decode_count: u64,
    pub encode_count: u64,
    pub decode_errors: u64,
    pub encode_errors: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct AudioStatus {
    pub processor_ready: bool,
    pub processor_stats: AudioProcessorStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct BridgeStatus {
    pub state: AgentState,
    pub running: bool,
    pub is_speaking: bool,
    pub janus: JanusStatus,
    pub ai: AiStatus,
    pub audio: AudioStatus,
    pub rtp: RtpStatus,
    pub vad: VadStatus,
    pub stats: BridgeStatsSnapshot,
}
