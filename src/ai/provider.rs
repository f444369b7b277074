use std::{fmt, str::FromStr};

use async_trait::async_trait;
use rig::{
    agent::AgentBuilder,
    client::CompletionClient,
    completion::{CompletionModel, Prompt},
    providers::{anthropic, gemini, ollama, openai},
};
use tracing::{debug, info};

use super::{
    error::{GenerationError, LoadError},
    pipeline::{Candidate, GenerationParams, Pipeline},
};

pub const DEFAULT_MODEL_LOCATION: &str = "gemini:gemini-2.0-flash";

const GEMINI_API_KEY: &str = "GEMINI_API_KEY";
const OPENAI_API_KEY: &str = "OPENAI_API_KEY";
const ANTHROPIC_API_KEY: &str = "ANTHROPIC_API_KEY";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Gemini,
    OpenAI,
    Anthropic,
    Ollama,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Gemini => "gemini",
            ProviderKind::OpenAI => "openai",
            ProviderKind::Anthropic => "anthropic",
            ProviderKind::Ollama => "ollama",
        }
    }

    /// Environment variable holding the API key, if the provider needs one.
    pub fn credentials_var(&self) -> Option<&'static str> {
        match self {
            ProviderKind::Gemini => Some(GEMINI_API_KEY),
            ProviderKind::OpenAI => Some(OPENAI_API_KEY),
            ProviderKind::Anthropic => Some(ANTHROPIC_API_KEY),
            ProviderKind::Ollama => None,
        }
    }
}

impl FromStr for ProviderKind {
    type Err = LoadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gemini" => Ok(ProviderKind::Gemini),
            "openai" => Ok(ProviderKind::OpenAI),
            "anthropic" => Ok(ProviderKind::Anthropic),
            "ollama" => Ok(ProviderKind::Ollama),
            other => Err(LoadError::UnknownProvider(other.to_string())),
        }
    }
}

/// Where a model is loaded from, written as `provider:model`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelLocation {
    pub provider: ProviderKind,
    pub model: String,
    /// Base URL override; only ollama honours it.
    pub endpoint: Option<String>,
}

impl ModelLocation {
    pub fn with_endpoint(mut self, endpoint: Option<String>) -> Self {
        self.endpoint = endpoint;
        self
    }
}

impl FromStr for ModelLocation {
    type Err = LoadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (provider, model) = s
            .split_once(':')
            .ok_or_else(|| LoadError::InvalidLocation(s.to_string()))?;
        let provider = provider.parse()?;
        let model = model.trim();
        if model.is_empty() {
            return Err(LoadError::EmptyModel);
        }

        Ok(Self {
            provider,
            model: model.to_string(),
            endpoint: None,
        })
    }
}

impl fmt::Display for ModelLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.provider.as_str(), self.model)
    }
}

/// A pipeline backed by any `rig` completion model.
pub struct RigPipeline<M: CompletionModel> {
    model: M,
    name: String,
}

impl<M: CompletionModel> RigPipeline<M> {
    pub fn new(model: M, name: impl Into<String>) -> Self {
        Self {
            model,
            name: name.into(),
        }
    }
}

#[async_trait]
impl<M> Pipeline for RigPipeline<M>
where
    M: CompletionModel + 'static,
{
    async fn generate(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<Vec<Candidate>, GenerationError> {
        let agent = AgentBuilder::new(self.model.clone())
            .temperature(params.temperature())
            .max_tokens(params.max_length)
            .build();

        // The completion APIs hand back one choice per call.
        let mut candidates = Vec::with_capacity(params.num_return_sequences);
        for _ in 0..params.num_return_sequences {
            let text = agent
                .prompt(prompt)
                .await
                .map_err(|source| GenerationError::Backend {
                    model: self.name.clone(),
                    source,
                })?;
            candidates.push(Candidate::new(text.trim()));
        }

        debug!(model = %self.name, count = candidates.len(), "received candidates");
        Ok(candidates)
    }

    fn model(&self) -> &str {
        &self.name
    }
}

fn credentials(provider: ProviderKind) -> Result<String, LoadError> {
    let Some(var) = provider.credentials_var() else {
        return Ok(String::new());
    };
    match std::env::var(var) {
        Ok(key) if !key.trim().is_empty() => Ok(key),
        _ => Err(LoadError::MissingCredentials { var }),
    }
}

/// Resolves a model location into a ready pipeline.
///
/// Nothing is sent over the network here; an unknown model name only
/// surfaces on the first generation call.
pub fn load_pipeline(location: &ModelLocation) -> Result<Box<dyn Pipeline>, LoadError> {
    let key = credentials(location.provider)?;
    let name = location.model.as_str();
    info!(%location, "loading generation pipeline");

    let pipeline: Box<dyn Pipeline> = match location.provider {
        ProviderKind::Gemini => {
            let client = gemini::Client::new(&key);
            Box::new(RigPipeline::new(client.completion_model(name), name))
        }
        ProviderKind::OpenAI => {
            let client = openai::Client::new(&key);
            Box::new(RigPipeline::new(client.completion_model(name), name))
        }
        ProviderKind::Anthropic => {
            let client = anthropic::Client::new(&key);
            Box::new(RigPipeline::new(client.completion_model(name), name))
        }
        ProviderKind::Ollama => {
            let mut builder = ollama::ClientBuilder::new();
            if let Some(url) = &location.endpoint {
                if !url.starts_with("http://") && !url.starts_with("https://") {
                    return Err(LoadError::InvalidEndpoint(url.clone()));
                }
                builder = builder.base_url(url);
            }
            let client = builder.build()?;
            Box::new(RigPipeline::new(client.completion_model(name), name))
        }
    };

    Ok(pipeline)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_provider_and_model() {
        let location: ModelLocation = "ollama:qwen2.5-coder".parse().unwrap();
        assert_eq!(location.provider, ProviderKind::Ollama);
        assert_eq!(location.model, "qwen2.5-coder");
        assert_eq!(location.to_string(), "ollama:qwen2.5-coder");
    }

    #[test]
    fn default_location_parses() {
        let location: ModelLocation = DEFAULT_MODEL_LOCATION.parse().unwrap();
        assert_eq!(location.provider, ProviderKind::Gemini);
    }

    #[test]
    fn rejects_malformed_locations() {
        assert!(matches!(
            "gpt2".parse::<ModelLocation>(),
            Err(LoadError::InvalidLocation(_))
        ));
        assert!(matches!(
            "huggingface:gpt2".parse::<ModelLocation>(),
            Err(LoadError::UnknownProvider(p)) if p == "huggingface"
        ));
        assert!(matches!(
            "openai: ".parse::<ModelLocation>(),
            Err(LoadError::EmptyModel)
        ));
    }

    #[test]
    fn load_without_credentials_fails() {
        temp_env::with_var_unset(GEMINI_API_KEY, || {
            let location: ModelLocation = "gemini:gemini-2.0-flash".parse().unwrap();
            let err = load_pipeline(&location).err().unwrap();
            assert!(matches!(
                err,
                LoadError::MissingCredentials { var: GEMINI_API_KEY }
            ));
        });
    }

    #[test]
    fn load_with_credentials_keeps_model_name() {
        temp_env::with_var(OPENAI_API_KEY, Some("sk-test"), || {
            let location: ModelLocation = "openai:gpt-4o-mini".parse().unwrap();
            let pipeline = load_pipeline(&location).unwrap();
            assert_eq!(pipeline.model(), "gpt-4o-mini");
        });
    }

    #[test]
    fn ollama_needs_no_credentials() {
        let location = "ollama:llama3"
            .parse::<ModelLocation>()
            .unwrap()
            .with_endpoint(Some("http://127.0.0.1:11434".to_string()));
        let pipeline = load_pipeline(&location).unwrap();
        assert_eq!(pipeline.model(), "llama3");
    }

    #[test]
    fn ollama_endpoint_must_be_http() {
        let location = "ollama:llama3"
            .parse::<ModelLocation>()
            .unwrap()
            .with_endpoint(Some("localhost:11434".to_string()));
        let err = load_pipeline(&location).err().unwrap();
        assert!(matches!(err, LoadError::InvalidEndpoint(url) if url == "localhost:11434"));
    }
}
