//! Audio codec bridge: Opus ↔ PCM16 conversion and sample-rate conversion
//! between Janus's 48kHz mixed audio and the AI service's 16k/24k PCM.

mod error;
mod format;
mod processor;
mod resample;

pub use error::Error;
pub use format::AudioFormat;
pub use processor::{AudioProcessor, AudioProcessorStats};
pub use resample::resample_i16;
