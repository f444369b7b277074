use std::{
    fs,
    io::Write,
    num::NonZeroUsize,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::ai::{
    pipeline::{DEFAULT_MAX_LENGTH, DEFAULT_NUM_RETURN_SEQUENCES, GenerationParams},
    provider::{DEFAULT_MODEL_LOCATION, ModelLocation},
};

const APP_DIR: &str = "diffscribe";
const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ScribeConfig {
    /// Model location as `provider:model`
    pub model: String,
    pub ollama_host: Option<String>,
    pub max_length: u64,
    pub num_return_sequences: usize,
    pub do_sample: bool,
    /// Maximum number of history entries; unbounded when unset
    pub history_capacity: Option<usize>,
    /// Path to a handlebars template used to render commits into prompts
    pub prompt_template: Option<PathBuf>,
}

impl Default for ScribeConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL_LOCATION.to_string(),
            ollama_host: None,
            max_length: DEFAULT_MAX_LENGTH,
            num_return_sequences: DEFAULT_NUM_RETURN_SEQUENCES,
            do_sample: true,
            history_capacity: None,
            prompt_template: None,
        }
    }
}

impl ScribeConfig {
    pub fn path() -> Result<PathBuf> {
        directories::BaseDirs::new()
            .map(|dirs| dirs.config_dir().join(APP_DIR).join(CONFIG_FILE))
            .context("Could not determine config directory")
    }

    /// Loads the user config, writing the defaults on first use.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::path()?)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path()?)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            let content = fs::read_to_string(config_path).with_context(|| {
                format!("Failed to read config file: {}", config_path.display())
            })?;

            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {}", config_path.display()))
        } else {
            let config = Self::default();
            config.save_to(config_path)?;
            Ok(config)
        }
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let content = serde_json::to_string_pretty(self).context("Failed to serialize config")?;

        let mut file = fs::File::create(config_path)
            .with_context(|| format!("Failed to create config file: {}", config_path.display()))?;

        file.write_all(content.as_bytes())
            .with_context(|| format!("Failed to write config file: {}", config_path.display()))?;

        Ok(())
    }

    pub fn model_location(&self) -> Result<ModelLocation> {
        let location: ModelLocation = self
            .model
            .parse()
            .with_context(|| format!("Invalid model in config: {}", self.model))?;
        Ok(location.with_endpoint(self.ollama_host.clone()))
    }

    pub fn generation_params(&self) -> GenerationParams {
        GenerationParams {
            max_length: self.max_length,
            num_return_sequences: self.num_return_sequences,
            do_sample: self.do_sample,
        }
    }

    pub fn history_capacity(&self) -> Option<NonZeroUsize> {
        self.history_capacity.and_then(NonZeroUsize::new)
    }

    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "model" => {
                value.parse::<ModelLocation>()?;
                self.model = value.to_string();
            }
            "ollama_host" => self.ollama_host = optional(value).map(str::to_string),
            "max_length" => self.max_length = parse_value(key, value)?,
            "num_return_sequences" => {
                let count: usize = parse_value(key, value)?;
                if count == 0 {
                    return Err(anyhow!("num_return_sequences must be at least 1"));
                }
                self.num_return_sequences = count;
            }
            "do_sample" => self.do_sample = parse_value(key, value)?,
            "history_capacity" => {
                let capacity: Option<usize> = optional(value)
                    .map(|v| parse_value(key, v))
                    .transpose()?;
                if capacity == Some(0) {
                    return Err(anyhow!(
                        "history_capacity must be at least 1; use none for unbounded"
                    ));
                }
                self.history_capacity = capacity;
            }
            "prompt_template" => self.prompt_template = optional(value).map(PathBuf::from),
            _ => return Err(anyhow!("Unknown config key: {}", key)),
        }
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "model" => Some(self.model.clone()),
            "ollama_host" => self.ollama_host.clone(),
            "max_length" => Some(self.max_length.to_string()),
            "num_return_sequences" => Some(self.num_return_sequences.to_string()),
            "do_sample" => Some(self.do_sample.to_string()),
            "history_capacity" => self.history_capacity.map(|c| c.to_string()),
            "prompt_template" => self
                .prompt_template
                .as_ref()
                .map(|p| p.display().to_string()),
            _ => None,
        }
    }

    pub fn list(&self) -> Vec<(&str, String)> {
        [
            "model",
            "ollama_host",
            "max_length",
            "num_return_sequences",
            "do_sample",
            "history_capacity",
            "prompt_template",
        ]
        .into_iter()
        .filter_map(|key| self.get(key).map(|value| (key, value)))
        .collect()
    }
}

/// Empty values and `none` clear optional settings.
fn optional(value: &str) -> Option<&str> {
    let value = value.trim();
    (!value.is_empty() && !value.eq_ignore_ascii_case("none")).then_some(value)
}

fn parse_value<T>(key: &str, value: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value
        .trim()
        .parse()
        .with_context(|| format!("Invalid value for {key}: {value}"))
}
