use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::error::GenerationError;

pub const DEFAULT_MAX_LENGTH: u64 = 100;
pub const DEFAULT_NUM_RETURN_SEQUENCES: usize = 1;
/// Sampling temperature used when `do_sample` is on.
pub const SAMPLING_TEMPERATURE: f64 = 1.0;

/// Knobs passed through to the backend on every generation call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams {
    pub max_length: u64,
    pub num_return_sequences: usize,
    pub do_sample: bool,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            max_length: DEFAULT_MAX_LENGTH,
            num_return_sequences: DEFAULT_NUM_RETURN_SEQUENCES,
            do_sample: true,
        }
    }
}

impl GenerationParams {
    /// Greedy decoding when sampling is off.
    pub fn temperature(&self) -> f64 {
        if self.do_sample {
            SAMPLING_TEMPERATURE
        } else {
            0.0
        }
    }
}

/// A single continuation returned by a pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub generated_text: String,
}

impl Candidate {
    pub fn new(generated_text: impl Into<String>) -> Self {
        Self {
            generated_text: generated_text.into(),
        }
    }
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    /// Generate continuations for `prompt`
    async fn generate(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<Vec<Candidate>, GenerationError>;

    /// Name of the model behind this pipeline
    fn model(&self) -> &str;
}
