//! Optional raw-PCM-to-WAV dumping, enabled by `Settings.audio.debug_audio`.
//! Lets an operator capture exactly what crossed the Janus/AI boundary
//! without needing a packet capture.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use hound::{SampleFormat, WavSpec, WavWriter};
use parking_lot::Mutex;

pub struct DebugAudioWriter {
    writer: Mutex<WavWriter<BufWriter<File>>>,
}

impl DebugAudioWriter {
    pub fn create(dir: &str, file_name: &str, sample_rate: u32) -> std::io::Result<Self> {
        std::fs::create_dir_all(dir)?;
        let path = Path::new(dir).join(file_name);
        let spec = WavSpec {
            channels: 1,
            sample_rate,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let writer = WavWriter::create(&path, spec)
            .map_err(|err| std::io::Error::new(std::io::ErrorKind::Other, err))?;
        tracing::info!(path = %path.display(), "writing debug audio");
        Ok(Self {
            writer: Mutex::new(writer),
        })
    }

    /// Appends little-endian PCM16 samples. A write failure is logged once
    /// and otherwise ignored; debug capture must never take the bridge down.
    pub fn write(&self, pcm: &[u8]) {
        let mut writer = self.writer.lock();
        for chunk in pcm.chunks_exact(2) {
            let sample = i16::from_le_bytes([chunk[0], chunk[1]]);
            if let Err(err) = writer.write_sample(sample) {
                tracing::warn!(?err, "failed to write debug audio sample");
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn write_produces_a_readable_wav_file() {
        let dir = std::env::temp_dir().join(format!("vk-bridge-debug-audio-test-{}", std::process::id()));
        let dir = dir.to_str().unwrap().to_string();
        let writer = DebugAudioWriter::create(&dir, "capture.wav", 16_000).unwrap();

        let samples: [i16; 4] = [0, 100, -100, i16::MAX];
        let mut pcm = Vec::new();
        for sample in samples {
            pcm.extend_from_slice(&sample.to_le_bytes());
        }
        writer.write(&pcm);
        drop(writer);

        let mut reader = hound::WavReader::open(Path::new(&dir).join("capture.wav")).unwrap();
        assert_eq!(reader.spec().sample_rate, 16_000);
        assert_eq!(reader.spec().channels, 1);
        let read_back: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
        assert_eq!(read_back, samples);

        std::fs::remove_dir_all(&dir).ok();
    }
}
