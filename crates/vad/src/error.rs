use displaydoc::Display;
use thiserror::Error;

#[derive(Debug, Display, Error)]
pub enum Error {
    /// failed to load voice activity model from {path}
    ModelLoad {
        path: String,
        #[source]
        source: ort::Error,
    },
    /// voice activity model inference failed
    Inference(#[source] ort::Error),
}
