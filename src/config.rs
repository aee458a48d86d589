//! Client configuration: explicit values, environment variables or a YAML file.
//!
//! YAML files may omit `api_key`; the key is then read from the environment so
//! secrets need not live next to endpoint settings.
//!
//! ```yaml
//! # studio.yaml
//! url: https://studio.example.com/api/v2/predict/generic/project/endpoint
//! streaming: true
//! params:
//!   select_expert: Meta-Llama-3-8B-Instruct
//!   max_tokens_to_generate: 512
//!   process_prompt: false
//! ```

use crate::types::CompletionParameters;
use crate::{Error, ErrorContext, Result};
use secrecy::SecretString;
use serde::Deserialize;
use std::path::Path;

pub const STUDIO_URL_ENV: &str = "SAMBASTUDIO_URL";
pub const STUDIO_API_KEY_ENV: &str = "SAMBASTUDIO_API_KEY";
pub const CLOUD_URL_ENV: &str = "SAMBANOVA_URL";
pub const CLOUD_API_KEY_ENV: &str = "SAMBANOVA_API_KEY";

pub const DEFAULT_CLOUD_URL: &str = "https://api.sambanova.ai/v1/chat/completions";

fn require_env(name: &str) -> Result<String> {
    std::env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| {
            Error::configuration_with_context(
                format!("{} is not set", name),
                ErrorContext::new().with_field_path(name).with_source("env"),
            )
        })
}

fn read_yaml<T: for<'de> Deserialize<'de>>(yaml: &str) -> Result<T> {
    serde_yaml::from_str(yaml).map_err(|e| {
        Error::configuration_with_context(
            "invalid configuration file",
            ErrorContext::new()
                .with_details(e.to_string())
                .with_source("yaml"),
        )
    })
}

/// Settings for a self-hosted studio endpoint.
#[derive(Debug)]
pub struct StudioConfig {
    /// Endpoint URL, buffered or streaming form.
    pub url: String,
    pub api_key: SecretString,
    /// Route buffered `complete` calls through the streaming endpoint.
    pub streaming: bool,
    /// Model kwargs sent with every call.
    pub params: CompletionParameters,
}

#[derive(Debug, Deserialize)]
struct StudioFile {
    url: Option<String>,
    api_key: Option<String>,
    #[serde(default)]
    streaming: bool,
    #[serde(default, alias = "model_kwargs")]
    params: CompletionParameters,
}

impl StudioConfig {
    pub fn new(url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            api_key: SecretString::from(api_key.into()),
            streaming: false,
            params: CompletionParameters::default(),
        }
    }

    /// Read `SAMBASTUDIO_URL` and `SAMBASTUDIO_API_KEY`.
    pub fn from_env() -> Result<Self> {
        Ok(Self::new(
            require_env(STUDIO_URL_ENV)?,
            require_env(STUDIO_API_KEY_ENV)?,
        ))
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let file: StudioFile = read_yaml(yaml)?;
        let url = match file.url {
            Some(url) => url,
            None => require_env(STUDIO_URL_ENV)?,
        };
        let api_key = match file.api_key {
            Some(key) => key,
            None => require_env(STUDIO_API_KEY_ENV)?,
        };
        Ok(Self {
            url,
            api_key: SecretString::from(api_key),
            streaming: file.streaming,
            params: file.params,
        })
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_yaml_str(&std::fs::read_to_string(path)?)
    }

    pub fn with_streaming(mut self, streaming: bool) -> Self {
        self.streaming = streaming;
        self
    }

    pub fn with_params(mut self, params: CompletionParameters) -> Self {
        self.params = params;
        self
    }
}

/// Settings for the cloud API. Every tuning field has a default.
#[derive(Debug)]
pub struct CloudConfig {
    pub url: String,
    pub api_key: SecretString,
    pub model: String,
    pub max_tokens: u32,
    pub stop_tokens: Vec<String>,
    pub temperature: f64,
    pub top_p: f64,
    pub top_k: u32,
    /// Ask the server for a final usage-statistics event.
    pub include_usage: bool,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct CloudFile {
    url: Option<String>,
    api_key: Option<String>,
    model: String,
    max_tokens: u32,
    stop_tokens: Vec<String>,
    temperature: f64,
    top_p: f64,
    top_k: u32,
    include_usage: bool,
}

impl Default for CloudFile {
    fn default() -> Self {
        Self {
            url: None,
            api_key: None,
            model: "llama3-8b".to_string(),
            max_tokens: 1024,
            stop_tokens: vec!["<|eot_id|>".to_string()],
            temperature: 0.0,
            top_p: 0.0,
            top_k: 1,
            include_usage: true,
        }
    }
}

impl CloudConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        let defaults = CloudFile::default();
        Self {
            url: DEFAULT_CLOUD_URL.to_string(),
            api_key: SecretString::from(api_key.into()),
            model: defaults.model,
            max_tokens: defaults.max_tokens,
            stop_tokens: defaults.stop_tokens,
            temperature: defaults.temperature,
            top_p: defaults.top_p,
            top_k: defaults.top_k,
            include_usage: defaults.include_usage,
        }
    }

    /// Read `SAMBANOVA_API_KEY` and, if set, `SAMBANOVA_URL`.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::new(require_env(CLOUD_API_KEY_ENV)?);
        if let Ok(url) = require_env(CLOUD_URL_ENV) {
            config.url = url;
        }
        Ok(config)
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let file: CloudFile = read_yaml(yaml)?;
        let api_key = match file.api_key {
            Some(key) => key,
            None => require_env(CLOUD_API_KEY_ENV)?,
        };
        let url = file
            .url
            .or_else(|| require_env(CLOUD_URL_ENV).ok())
            .unwrap_or_else(|| DEFAULT_CLOUD_URL.to_string());
        Ok(Self {
            url,
            api_key: SecretString::from(api_key),
            model: file.model,
            max_tokens: file.max_tokens,
            stop_tokens: file.stop_tokens,
            temperature: file.temperature,
            top_p: file.top_p,
            top_k: file.top_k,
            include_usage: file.include_usage,
        })
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_yaml_str(&std::fs::read_to_string(path)?)
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_stop_tokens(mut self, stop_tokens: Vec<String>) -> Self {
        self.stop_tokens = stop_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_top_p(mut self, top_p: f64) -> Self {
        self.top_p = top_p;
        self
    }

    pub fn with_top_k(mut self, top_k: u32) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn with_include_usage(mut self, include_usage: bool) -> Self {
        self.include_usage = include_usage;
        self
    }

    /// The uniform parameter bag equivalent to this configuration.
    pub fn params(&self) -> CompletionParameters {
        CompletionParameters::new()
            .with_model(self.model.clone())
            .with_max_tokens(self.max_tokens)
            .with_stop_sequences(self.stop_tokens.clone())
            .with_temperature(self.temperature)
            .with_top_p(self.top_p)
            .with_top_k(self.top_k)
    }
}
