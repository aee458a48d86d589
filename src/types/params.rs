//! Uniform completion parameters

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Provider-neutral tuning parameters.
///
/// Field naming on the wire is owned by [`crate::protocol::params::map_params`];
/// this struct only carries values. Unset fields are not sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletionParameters {
    /// Model or expert name (CoE endpoints).
    #[serde(alias = "select_expert", skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(alias = "max_tokens_to_generate", skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,
    #[serde(alias = "stop", skip_serializing_if = "Vec::is_empty")]
    pub stop_sequences: Vec<String>,
    /// Wrap the prompt in a conversation envelope (generic v1/v2 only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub process_prompt: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub do_sample: Option<bool>,
    /// Pass-through fields sent verbatim (after alias renaming).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CompletionParameters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_top_p(mut self, top_p: f64) -> Self {
        self.top_p = Some(top_p);
        self
    }

    pub fn with_top_k(mut self, top_k: u32) -> Self {
        self.top_k = Some(top_k);
        self
    }

    pub fn with_stop_sequences(mut self, stop: Vec<String>) -> Self {
        self.stop_sequences = stop;
        self
    }

    pub fn with_process_prompt(mut self, process_prompt: bool) -> Self {
        self.process_prompt = Some(process_prompt);
        self
    }

    pub fn with_do_sample(mut self, do_sample: bool) -> Self {
        self.do_sample = Some(do_sample);
        self
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    /// Configured stop sequences followed by the call-time ones.
    ///
    /// Duplicates are kept; configured entries always come first.
    pub fn merged_stop(&self, call_stop: &[String]) -> Vec<String> {
        self.stop_sequences
            .iter()
            .chain(call_stop.iter())
            .cloned()
            .collect()
    }
}
