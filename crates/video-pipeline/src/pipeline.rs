use std::time::{Duration, Instant};

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{ImageEncoder, RgbImage};
use rtp_core::RtpPacket;

use crate::decoder::Vp8Decoder;
use crate::reassembly::{is_keyframe, FrameAssembler};
use crate::Error;

const MAX_CONSECUTIVE_DECODE_ERRORS: u32 = 5;
const DEFAULT_TARGET_WIDTH: u32 = 1280;
const DEFAULT_TARGET_HEIGHT: u32 = 720;
const DEFAULT_JPEG_QUALITY: u8 = 85;

#[derive(Debug, Default, Clone, Copy)]
pub struct VideoStats {
    pub packets_received: u64,
    pub frames_decoded: u64,
    pub frames_sent: u64,
    pub keyframes_received: u64,
    pub decode_errors: u64,
    pub has_keyframe: bool,
}

/// Reassembles VP8 RTP packets into frames, decodes them keeping decoder
/// state continuous across P-frames, and emits JPEG-encoded frames at a
/// target rate. All frames are decoded regardless of emission rate: VP8
/// P-frames require the preceding frame's decoder state.
pub struct VideoPipeline {
    assembler: FrameAssembler,
    decoder: Option<Vp8Decoder>,

    target_fps: f64,
    target_width: u32,
    target_height: u32,
    jpeg_quality: u8,

    has_keyframe: bool,
    consecutive_decode_errors: u32,
    last_emit: Option<Instant>,

    stats: VideoStats,
}

impl VideoPipeline {
    pub fn new(target_fps: f64) -> Result<Self, Error> {
        Ok(Self {
            assembler: FrameAssembler::new(),
            decoder: Some(Vp8Decoder::new()?),
            target_fps,
            target_width: DEFAULT_TARGET_WIDTH,
            target_height: DEFAULT_TARGET_HEIGHT,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            has_keyframe: false,
            consecutive_decode_errors: 0,
            last_emit: None,
            stats: VideoStats::default(),
        })
    }

    pub fn stats(&self) -> VideoStats {
        self.stats
    }

    /// Processes one incoming RTP video packet. Returns a JPEG frame when a
    /// complete VP8 frame was assembled, decoded, and the output rate limit
    /// allows emitting it right now. Returns `true` in the second slot of
    /// the tuple when a keyframe request should be issued (decoder desync
    /// recovery).
    pub fn process_packet(&mut self, packet: &RtpPacket) -> (Option<Vec<u8>>, bool) {
        self.stats.packets_received += 1;

        let Some(frame_data) = self.assembler.push(packet) else {
            return (None, false);
        };

        self.decode_and_emit(&frame_data)
    }

    fn decode_and_emit(&mut self, frame_data: &[u8]) -> (Option<Vec<u8>>, bool) {
        let keyframe = is_keyframe(frame_data);

        if keyframe {
            self.has_keyframe = true;
            self.stats.keyframes_received += 1;
            self.consecutive_decode_errors = 0;
        }

        if !self.has_keyframe && !keyframe {
            tracing::debug!("waiting for first keyframe, skipping p-frame");
            return (None, false);
        }

        let should_send = self
            .last_emit
            .map(|t| t.elapsed() >= Duration::from_secs_f64(1.0 / self.target_fps))
            .unwrap_or(true);

        let Some(decoder) = self.decoder.as_mut() else {
            return (None, false);
        };

        match decoder.decode(frame_data) {
            Ok(frames) => {
                self.consecutive_decode_errors = 0;
                let mut jpeg = None;

                for frame in frames {
                    self.stats.frames_decoded += 1;

                    if should_send && jpeg.is_none() {
                        match encode_jpeg(
                            frame.width,
                            frame.height,
                            &frame.rgb,
                            self.target_width,
                            self.target_height,
                            self.jpeg_quality,
                        ) {
                            Ok(bytes) => {
                                self.last_emit = Some(Instant::now());
                                self.stats.frames_sent += 1;
                                jpeg = Some(bytes);
                            }
                            Err(err) => {
                                tracing::warn!(?err, "jpeg encode failed");
                            }
                        }
                    }
                }

                (jpeg, false)
            }
            Err(err) => {
                self.stats.decode_errors += 1;
                self.consecutive_decode_errors += 1;

                if keyframe {
                    tracing::error!(?err, "keyframe decode error, resetting decoder");
                    self.reset_decoder();
                    return (None, true);
                }

                if self.consecutive_decode_errors >= MAX_CONSECUTIVE_DECODE_ERRORS {
                    tracing::warn!(
                        consecutive_errors = self.consecutive_decode_errors,
                        "too many consecutive p-frame decode errors, resetting decoder"
                    );
                    self.reset_decoder();
                    return (None, true);
                }

                (None, false)
            }
        }
    }

    fn reset_decoder(&mut self) {
        self.has_keyframe = false;
        self.consecutive_decode_errors = 0;
        self.decoder = Vp8Decoder::new().ok();
    }

    pub fn stats_has_keyframe(&self) -> bool {
        self.has_keyframe
    }
}

fn encode_jpeg(
    width: u32,
    height: u32,
    rgb: &[u8],
    target_width: u32,
    target_height: u32,
    quality: u8,
) -> Result<Vec<u8>, Error> {
    let image = RgbImage::from_raw(width, height, rgb.to_vec())
        .expect("decoder produces a buffer matching width*height*3");

    let image = if width > target_width || height > target_height {
        // Aspect-preserving fit within target_width x target_height, the
        // way PIL's Image.thumbnail() scales down to fit a bounding box.
        let scale = (target_width as f64 / width as f64).min(target_height as f64 / height as f64);
        let new_width = ((width as f64 * scale).round() as u32).max(1);
        let new_height = ((height as f64 * scale).round() as u32).max(1);
        image::imageops::resize(&image, new_width, new_height, FilterType::Lanczos3)
    } else {
        image
    };

    let mut out = Vec::new();
    JpegEncoder::new_with_quality(&mut out, quality)
        .write_image(&image, image.width(), image.height(), image::ExtendedColorType::Rgb8)
        .map_err(Error::JpegEncode)?;

    Ok(out)
}
