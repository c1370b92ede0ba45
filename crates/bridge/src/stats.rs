//! Aggregate lifecycle state and counters for one running bridge instance.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use serde::Serialize;

/// Lifecycle states a bridge instance moves through. `Error` is terminal:
/// a bridge that reaches it must be discarded and a fresh one constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentState {
    Initializing,
    Connecting,
    Ready,
    Active,
    Paused,
    Stopping,
    Stopped,
    Error,
}

/// Counters incremented from the orchestrator's tasks. All relaxed-ordering
/// atomics: a one-frame misjudgment anywhere this is read is harmless, and
/// nothing here synchronizes access to other data.
#[derive(Debug)]
pub struct BridgeStats {
    started_at: Instant,

    pub rtp_packets_received: AtomicU64,
    pub rtp_bytes_received: AtomicU64,
    pub rtp_packets_sent: AtomicU64,
    pub rtp_bytes_sent: AtomicU64,
    pub rtp_packets_lost: AtomicU64,

    pub audio_chunks_to_ai: AtomicU64,
    pub audio_chunks_from_ai: AtomicU64,

    pub interruptions: AtomicU64,
    pub turns_completed: AtomicU64,
    pub participants_joined: AtomicU64,

    pub decode_errors: AtomicU64,
    pub encode_errors: AtomicU64,
    pub janus_errors: AtomicU64,
    pub ai_errors: AtomicU64,
}

impl Default for BridgeStats {
    fn default() -> Self {
        Self::new()
    }
}

impl BridgeStats {
    pub fn new() -> Self {
        Self {
            started_at: Instant::now(),
            rtp_packets_received: AtomicU64::new(0),
            rtp_bytes_received: AtomicU64::new(0),
            rtp_packets_sent: AtomicU64::new(0),
            rtp_bytes_sent: AtomicU64::new(0),
            rtp_packets_lost: AtomicU64::new(0),
            audio_chunks_to_ai: AtomicU64::new(0),
            audio_chunks_from_ai: AtomicU64::new(0),
            interruptions: AtomicU64::new(0),
            turns_completed: AtomicU64::new(0),
            participants_joined: AtomicU64::new(0),
            decode_errors: AtomicU64::new(0),
            encode_errors: AtomicU64::new(0),
            janus_errors: AtomicU64::new(0),
            ai_errors: AtomicU64::new(0),
        }
    }

    pub fn uptime_seconds(&self) -> f64 {
        self.started_at.elapsed().as_secs_f64()
    }

    pub fn rtp_packet_loss_rate(&self) -> f64 {
        let received = self.rtp_packets_received.load(Ordering::Relaxed);
        let lost = self.rtp_packets_lost.load(Ordering::Relaxed);
        let total = received + lost;
        if total == 0 {
            0.0
        } else {
            lost as f64 / total as f64
        }
    }

    pub fn snapshot(&self) -> BridgeStatsSnapshot {
        BridgeStatsSnapshot {
            rtp_packets_received: self.rtp_packets_received.load(Ordering::Relaxed),
            rtp_bytes_received: self.rtp_bytes_received.load(Ordering::Relaxed),
            rtp_packets_sent: self.rtp_packets_sent.load(Ordering::Relaxed),
            rtp_bytes_sent: self.rtp_bytes_sent.load(Ordering::Relaxed),
            rtp_packets_lost: self.rtp_packets_lost.load(Ordering::Relaxed),
            rtp_packet_loss_rate: self.rtp_packet_loss_rate(),
            audio_chunks_to_ai: self.audio_chunks_to_ai.load(Ordering::Relaxed),
            audio_chunks_from_ai: self.audio_chunks_from_ai.load(Ordering::Relaxed),
            interruptions: self.interruptions.load(Ordering::Relaxed),
            turns_completed: self.turns_completed.load(Ordering::Relaxed),
            participants_joined: self.participants_joined.load(Ordering::Relaxed),
            decode_errors: self.decode_errors.load(Ordering::Relaxed),
            encode_errors: self.encode_errors.load(Ordering::Relaxed),
            janus_errors: self.janus_errors.load(Ordering::Relaxed),
            ai_errors: self.ai_errors.load(Ordering::Relaxed),
            uptime_seconds: self.uptime_seconds(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BridgeStatsSnapshot {
    pub rtp_packets_received: u64,
    pub rtp_bytes_received: u64,
    pub rtp_packets_sent: u64,
    pub rtp_bytes_sent: u64,
    pub rtp_packets_lost: u64,
    pub rtp_packet_loss_rate: f64,
    pub audio_chunks_to_ai: u64,
    pub audio_chunks_from_ai: u64,
    pub interruptions: u64,
    pub turns_completed: u64,
    pub participants_joined: u64,
    pub decode_errors: u64,
    pub encode_errors: u64,
    pub janus_errors: u64,
    pub ai_errors: u64,
    pub uptime_seconds: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn loss_rate_is_zero_with_no_traffic() {
        let stats = BridgeStats::new();
        assert_eq!(stats.rtp_packet_loss_rate(), 0.0);
    }

    #[test]
    fn loss_rate_reflects_lost_over_total() {
        let stats = BridgeStats::new();
        stats.rtp_packets_received.store(90, Ordering::Relaxed);
        stats.rtp_packets_lost.store(10, Ordering::Relaxed);
        assert_eq!(stats.rtp_packet_loss_rate(), 0.1);
    }
}
