//! Voice-activity detection: RMS normalization ahead of a small local ONNX
//! model, with hysteresis on the resulting probability and a fail-open
//! policy when no model is available.

mod detector;
mod error;
mod model;

pub use detector::{VadStats, VoiceActivityDetector};
pub use error::Error;
pub use model::VadModel;
