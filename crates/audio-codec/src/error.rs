use displaydoc::Display;
use thiserror::Error;

#[derive(Debug, Display, Error)]
pub enum Error {
    /// failed to construct opus codec state
    CodecInit(#[source] opus::Error),
}
