use std::sync::atomic::{AtomicU64, Ordering};

use opus::{Application, Channels, Decoder, Encoder};

use crate::format::AudioFormat;
use crate::resample::resample_i16;
use crate::Error;

const OPUS_COMPLEXITY: i32 = 5;

#[derive(Debug, Default)]
pub struct AudioProcessorStats {
    pub decode_count: AtomicU64,
    pub encode_count: AtomicU64,
    pub decode_errors: AtomicU64,
    pub encode_errors: AtomicU64,
}

/// Bridges Janus's Opus/48kHz world and the AI service's PCM16/16k+24k
/// world. Decode/encode errors never propagate; they are counted and the
/// caller receives `None`/an empty frame list instead.
pub struct AudioProcessor {
    janus_format: AudioFormat,
    ai_in_format: AudioFormat,
    ai_out_format: AudioFormat,
    frame_samples: usize,

    decoder: Decoder,
    encoder: Encoder,

    stats: AudioProcessorStats,
}

impl AudioProcessor {
    pub fn new() -> Result<Self, Error> {
        let janus_format = AudioFormat::JANUS_OPUS_48K_MONO;
        let ai_in_format = AudioFormat::AI_IN_PCM16_16K_MONO;
        let ai_out_format = AudioFormat::AI_OUT_PCM16_24K_MONO;

        let decoder = Decoder::new(janus_format.sample_rate, Channels::Mono)
            .map_err(Error::CodecInit)?;

        let mut encoder = Encoder::new(janus_format.sample_rate, Channels::Mono, Application::Voip)
            .map_err(Error::CodecInit)?;
        encoder
            .set_complexity(OPUS_COMPLEXITY)
            .map_err(Error::CodecInit)?;

        Ok(Self {
            janus_format,
            ai_in_format,
            ai_out_format,
            frame_samples: janus_format.samples_for_ms(20) as usize,
            decoder,
            encoder,
            stats: AudioProcessorStats::default(),
        })
    }

    pub fn stats(&self) -> &AudioProcessorStats {
        &self.stats
    }

    fn decode_opus(&mut self, opus_data: &[u8]) -> Option<Vec<i16>> {
        let mut out = vec![0i16; self.frame_samples];
        match self.decoder.decode(opus_data, &mut out, false) {
            Ok(n) => {
                out.truncate(n);
                self.stats.decode_count.fetch_add(1, Ordering::Relaxed);
                Some(out)
            }
            Err(err) => {
                self.stats.decode_errors.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(?err, "opus decode error");
                None
            }
        }
    }

    fn encode_opus(&mut self, pcm_samples: &[i16]) -> Option<Vec<u8>> {
        let mut out = vec![0u8; 4000];
        match self.encoder.encode(pcm_samples, &mut out) {
            Ok(n) => {
                out.truncate(n);
                self.stats.encode_count.fetch_add(1, Ordering::Relaxed);
                Some(out)
            }
            Err(err) => {
                self.stats.encode_errors.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(?err, "opus encode error");
                None
            }
        }
    }

    /// Opus 48kHz → PCM16 16kHz little-endian bytes, for forwarding to the
    /// AI service.
    pub fn janus_to_ai(&mut self, opus_data: &[u8]) -> Option<Vec<u8>> {
        let pcm_48k = self.decode_opus(opus_data)?;
        if pcm_48k.is_empty() {
            return None;
        }

        let pcm_16k = resample_i16(&pcm_48k, self.janus_format.sample_rate, self.ai_in_format.sample_rate);
        Some(pcm16_to_le_bytes(&pcm_16k))
    }

    /// PCM16 24kHz bytes → list of 20ms Opus frames at 48kHz, for sending to
    /// Janus. The final partial frame is zero-padded rather than dropped.
    pub fn ai_to_janus(&mut self, pcm_data: &[u8]) -> Vec<Vec<u8>> {
        if pcm_data.is_empty() {
            return Vec::new();
        }

        let pcm_24k = le_bytes_to_pcm16(pcm_data);
        if pcm_24k.is_empty() {
            return Vec::new();
        }

        let pcm_48k = resample_i16(&pcm_24k, self.ai_out_format.sample_rate, self.janus_format.sample_rate);

        let mut frames = Vec::new();
        for chunk in pcm_48k.chunks(self.frame_samples) {
            let frame = if chunk.len() < self.frame_samples {
                let mut padded = chunk.to_vec();
                padded.resize(self.frame_samples, 0);
                padded
            } else {
                chunk.to_vec()
            };

            if let Some(opus_frame) = self.encode_opus(&frame) {
                frames.push(opus_frame);
            }
        }

        frames
    }
}

fn pcm16_to_le_bytes(samples: &[i16]) -> Vec<u8> {
    let mut out = Vec::with_capacity(samples.len() * 2);
    for sample in samples {
        out.extend_from_slice(&sample.to_le_bytes());
    }
    out
}

fn le_bytes_to_pcm16(bytes: &[u8]) -> Vec<i16> {
    bytes
        .chunks_exact(2)
        .map(|chunk| i16::from_le_bytes([chunk[0], chunk[1]]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn opus_round_trip_preserves_frame_length() {
        let mut processor = AudioProcessor::new().expect("opus codecs available");
        let frame: Vec<i16> = (0..960).map(|i| ((i as f32 * 0.1).sin() * 8000.0) as i16).collect();
        let encoded = processor.encode_opus(&frame).expect("encodes");
        let decoded = processor.decode_opus(&encoded).expect("decodes");
        assert_eq!(decoded.len(), 960);
    }

    #[test]
    fn ai_to_janus_pads_final_partial_frame() {
        let mut processor = AudioProcessor::new().expect("opus codecs available");
        // 10ms of silence at 24kHz resamples to fewer than 960 samples at 48kHz.
        let pcm = vec![0u8; 24_000 / 100 * 2];
        let frames = processor.ai_to_janus(&pcm);
        assert_eq!(frames.len(), 1);
    }

    #[test]
    fn janus_to_ai_round_trips_a_real_opus_frame() {
        let mut processor = AudioProcessor::new().expect("opus codecs available");
        let frame: Vec<i16> = (0..960).map(|i| ((i as f32 * 0.1).sin() * 8000.0) as i16).collect();
        let encoded = processor.encode_opus(&frame).expect("encodes");
        let pcm_16k = processor.janus_to_ai(&encoded).expect("decodes and resamples");
        assert_eq!(pcm_16k.len(), 16_000 / 100 * 2);
    }
}
