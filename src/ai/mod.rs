pub mod error;
pub mod history;
pub mod pipeline;
pub mod provider;

use std::{num::NonZeroUsize, sync::Arc};

use tracing::{debug, info};

use crate::record::{Commit, Node};
use error::{GenerationError, LoadError};
use history::History;
use pipeline::{GenerationParams, Pipeline};
use provider::{ModelLocation, load_pipeline};

/// A loaded generation pipeline plus the history of what it produced.
pub struct AI {
    pipeline: Box<dyn Pipeline>,
    params: GenerationParams,
    history: History,
}

impl AI {
    /// Loads the model behind `location` and starts with an empty history.
    pub fn load(location: &ModelLocation) -> Result<Self, LoadError> {
        Ok(Self::with_pipeline(load_pipeline(location)?))
    }

    pub fn with_pipeline(pipeline: Box<dyn Pipeline>) -> Self {
        Self {
            pipeline,
            params: GenerationParams::default(),
            history: History::default(),
        }
    }

    pub fn with_params(mut self, params: GenerationParams) -> Self {
        self.params = params;
        self
    }

    pub fn with_history_capacity(mut self, capacity: NonZeroUsize) -> Self {
        self.history = History::bounded(capacity);
        self
    }

    pub fn params(&self) -> &GenerationParams {
        &self.params
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Generates a continuation of `text` and records it under `text`,
    /// replacing any earlier result for the same input.
    pub async fn run(&mut self, text: &str, reference: Arc<Commit>) -> Result<(), GenerationError> {
        debug!(model = self.pipeline.model(), commit = %reference.id, "running generation");

        let candidates = self.pipeline.generate(text, &self.params).await?;
        let output = candidates
            .into_iter()
            .next()
            .ok_or_else(|| GenerationError::NoCandidates {
                model: self.pipeline.model().to_string(),
            })?
            .generated_text;

        info!(commit = %reference.id, chars = output.len(), "generation recorded");
        self.history
            .insert(Node::new(output, reference, text.to_string()));
        Ok(())
    }
}
