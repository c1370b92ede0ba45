use crate::model::VadModel;

const TARGET_RMS: f32 = 5000.0;
const MAX_GAIN: f32 = 50.0;
const CHUNK_SIZE: usize = 512;

#[derive(Debug, Clone, Copy)]
pub struct VadStats {
    pub available: bool,
    pub threshold: f32,
    pub is_speaking: bool,
    pub total_frames: u64,
    pub speech_frames: u64,
    pub silence_frames: u64,
    pub speech_ratio: f32,
    pub silence_filtered_pct: f32,
}

/// Speech/silence classifier for 16kHz PCM16 buffers, with RMS-based
/// normalization ahead of the model (WebRTC/Janus audio is far quieter than
/// what the model was trained on) and hysteresis on the boolean decision.
/// Fails open: if no model is loaded, every buffer is treated as speech.
pub struct VoiceActivityDetector {
    model: Option<VadModel>,
    threshold: f32,
    sample_rate: u32,
    min_speech_duration_ms: u32,
    min_silence_duration_ms: u32,

    is_speaking: bool,
    speech_frames: u32,
    silence_frames: u32,

    total_frames: u64,
    speech_frames_total: u64,
    silence_frames_total: u64,
}

impl VoiceActivityDetector {
    pub fn new(model: Option<VadModel>, threshold: f32, sample_rate: u32) -> Self {
        Self::with_durations(model, threshold, sample_rate, 100, 200)
    }

    pub fn with_durations(
        model: Option<VadModel>,
        threshold: f32,
        sample_rate: u32,
        min_speech_duration_ms: u32,
        min_silence_duration_ms: u32,
    ) -> Self {
        Self {
            model,
            threshold,
            sample_rate,
            min_speech_duration_ms,
            min_silence_duration_ms,
            is_speaking: false,
            speech_frames: 0,
            silence_frames: 0,
            total_frames: 0,
            speech_frames_total: 0,
            silence_frames_total: 0,
        }
    }

    pub fn is_available(&self) -> bool {
        self.model.is_some()
    }

    pub fn is_speaking(&self) -> bool {
        self.is_speaking
    }

    /// Normalizes the buffer to typical speech loudness, then evaluates the
    /// model over 512-sample chunks and returns the per-buffer maximum
    /// probability. Returns 1.0 (pass everything) if no model is loaded or
    /// inference fails.
    pub fn speech_probability(&mut self, pcm16: &[i16]) -> f32 {
        let Some(model) = self.model.as_mut() else {
            return 1.0;
        };

        if pcm16.is_empty() {
            return 0.0;
        }

        let sum_sq: f64 = pcm16.iter().map(|&s| (s as f64) * (s as f64)).sum();
        let rms = (sum_sq / pcm16.len() as f64).sqrt() as f32;

        let gain = if rms > 1.0 {
            (TARGET_RMS / rms).min(MAX_GAIN)
        } else {
            1.0
        };

        let normalized: Vec<f32> = pcm16
            .iter()
            .map(|&s| {
                let amplified = (s as f32 * gain).clamp(i16::MIN as f32, i16::MAX as f32);
                amplified / 32768.0
            })
            .collect();

        let mut max_prob = 0.0f32;
        for chunk in normalized.chunks(CHUNK_SIZE) {
            if chunk.len() < CHUNK_SIZE / 2 {
                continue;
            }

            let padded;
            let chunk = if chunk.len() < CHUNK_SIZE {
                let mut buf = chunk.to_vec();
                buf.resize(CHUNK_SIZE, 0.0);
                padded = buf;
                &padded[..]
            } else {
                chunk
            };

            match model.probability(chunk) {
                Ok(prob) => max_prob = max_prob.max(prob),
                Err(err) => {
                    tracing::error!(?err, "vad inference error, passing audio through");
                    return 1.0;
                }
            }
        }

        max_prob
    }

    /// Runs hysteresis over `is_speech_frame = probability > threshold` and
    /// returns the current smoothed speaking state.
    pub fn is_speech(&mut self, pcm16: &[i16]) -> bool {
        self.total_frames += 1;

        if !self.is_available() {
            return true;
        }

        let prob = self.speech_probability(pcm16);
        let is_speech_frame = prob > self.threshold;

        let frame_duration_ms = (pcm16.len() as f32 / self.sample_rate as f32) * 1000.0;

        if is_speech_frame {
            self.speech_frames += 1;
            self.speech_frames_total += 1;
            self.silence_frames = 0;

            let speech_duration = self.speech_frames as f32 * frame_duration_ms;
            if speech_duration >= self.min_speech_duration_ms as f32 {
                self.is_speaking = true;
            }
        } else {
            self.silence_frames += 1;
            self.silence_frames_total += 1;
            self.speech_frames = 0;

            let silence_duration = self.silence_frames as f32 * frame_duration_ms;
            if silence_duration >= self.min_silence_duration_ms as f32 {
                self.is_speaking = false;
            }
        }

        self.is_speaking
    }

    pub fn reset(&mut self) {
        self.is_speaking = false;
        self.speech_frames = 0;
        self.silence_frames = 0;
    }

    pub fn stats(&self) -> VadStats {
        let total = self.speech_frames_total + self.silence_frames_total;
        let speech_ratio = if total > 0 {
            self.speech_frames_total as f32 / total as f32
        } else {
            0.0
        };

        VadStats {
            available: self.is_available(),
            threshold: self.threshold,
            is_speaking: self.is_speaking,
            total_frames: self.total_frames,
            speech_frames: self.speech_frames_total,
            silence_frames: self.silence_frames_total,
            speech_ratio,
            silence_filtered_pct: (1.0 - speech_ratio) * 100.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn fails_open_without_a_model() {
        let mut vad = VoiceActivityDetector::new(None, 0.5, 16_000);
        assert!(!vad.is_available());
        assert!(vad.is_speech(&vec![0i16; 1600]));
    }

    #[test]
    fn stats_start_at_zero() {
        let vad = VoiceActivityDetector::new(None, 0.5, 16_000);
        let stats = vad.stats();
        assert_eq!(stats.total_frames, 0);
        assert_eq!(stats.speech_ratio, 0.0);
    }
}
