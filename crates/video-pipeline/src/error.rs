use displaydoc::Display;
use thiserror::Error;

#[derive(Debug, Display, Error)]
pub enum Error {
    /// failed to initialize vp8 decoder: {0}
    DecoderInit(String),
    /// vp8 frame decode failed: {0}
    Decode(String),
    /// jpeg encode failed
    JpegEncode(#[source] image::ImageError),
}
