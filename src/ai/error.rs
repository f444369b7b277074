use rig::{client::ClientBuilderError, completion::PromptError};
use thiserror::Error;

/// Failures while resolving a model location into a pipeline.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Invalid model location '{0}', expected 'provider:model'")]
    InvalidLocation(String),
    #[error("Unsupported provider: {0}")]
    UnknownProvider(String),
    #[error("Model name is empty")]
    EmptyModel,
    #[error("Missing credentials: set {var}")]
    MissingCredentials { var: &'static str },
    #[error("Invalid endpoint '{0}', expected an http(s) URL")]
    InvalidEndpoint(String),
    #[error("Failed to build client: {0}")]
    Client(#[from] ClientBuilderError),
}

/// Failures raised while generating text.
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("Generation failed for model '{model}': {source}")]
    Backend {
        model: String,
        #[source]
        source: PromptError,
    },
    #[error("Model '{model}' returned no candidates")]
    NoCandidates { model: String },
}
