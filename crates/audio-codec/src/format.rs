/// An audio format tuple. Only three canonical instances appear in the
/// bridge: Janus's mixed Opus stream and the AI service's two PCM16 rates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioFormat {
    pub sample_rate: u32,
    pub channels: u8,
    pub bit_depth: u8,
}

impl AudioFormat {
    pub const JANUS_OPUS_48K_MONO: AudioFormat = AudioFormat {
        sample_rate: 48_000,
        channels: 1,
        bit_depth: 16,
    };
    pub const AI_IN_PCM16_16K_MONO: AudioFormat = AudioFormat {
        sample_rate: 16_000,
        channels: 1,
        bit_depth: 16,
    };
    pub const AI_OUT_PCM16_24K_MONO: AudioFormat = AudioFormat {
        sample_rate: 24_000,
        channels: 1,
        bit_depth: 16,
    };

    pub fn bytes_per_second(&self) -> u32 {
        self.sample_rate * self.channels as u32 * (self.bit_depth as u32 / 8)
    }

    pub fn samples_for_ms(&self, ms: u32) -> u32 {
        self.sample_rate * ms / 1000
    }
}
