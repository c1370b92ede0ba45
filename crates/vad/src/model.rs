use std::path::Path;

use ort::session::Session;
use ort::value::Tensor;

use crate::Error;

/// Wraps a small local ONNX voice-activity model (Silero-style: a single
/// input chunk of samples in, a speech probability out). Model state
/// (recurrent hidden state) is reset per `SileroVad` instance, not shared
/// across buffers within it; each `probability` call is independent, which
/// matches the source detector's per-chunk classification.
pub struct VadModel {
    session: Session,
    sample_rate: i64,
}

impl VadModel {
    pub fn load(path: impl AsRef<Path>, sample_rate: u32) -> Result<Self, Error> {
        let path_ref = path.as_ref();
        let session = Session::builder()
            .map_err(Error::Inference)?
            .commit_from_file(path_ref)
            .map_err(|source| Error::ModelLoad {
                path: path_ref.display().to_string(),
                source,
            })?;

        Ok(Self {
            session,
            sample_rate: sample_rate as i64,
        })
    }

    /// Runs inference on one chunk of normalized float32 samples in
    /// [-1.0, 1.0]. Returns a speech probability in [0.0, 1.0].
    pub fn probability(&mut self, chunk: &[f32]) -> Result<f32, Error> {
        let input = Tensor::from_array(([1usize, chunk.len()], chunk.to_vec()))
            .map_err(Error::Inference)?;
        let sample_rate = Tensor::from_array(([1usize], vec![self.sample_rate]))
            .map_err(Error::Inference)?;

        let outputs = self
            .session
            .run(ort::inputs![
                "input" => input,
                "sr" => sample_rate,
            ])
            .map_err(Error::Inference)?;

        let (_, prob) = outputs[0]
            .try_extract_raw_tensor::<f32>()
            .map_err(Error::Inference)?;

        Ok(prob.first().copied().unwrap_or(0.0))
    }
}
