//! Client for self-hosted studio endpoints (OpenAI-compatible, generic v1, generic v2).

use super::execution::{collect_deltas, execute_buffered, execute_stream};
use super::TextCompletionClient;
use crate::config::StudioConfig;
use crate::pipeline::DeltaStream;
use crate::protocol::{
    build_request, classify, map_params, EndpointDescriptor, OutboundRequest, ProtocolVariant,
};
use crate::transport::HttpTransport;
use crate::Result;
use secrecy::ExposeSecret;

/// Studio endpoint client.
///
/// The wire format is classified once from the configured URL; every call then
/// dispatches on that variant.
///
/// ```rust,no_run
/// use sambanova_client::{StudioClient, StudioConfig, TextCompletionClient};
/// use sambanova_client::types::CompletionParameters;
///
/// # async fn run() -> sambanova_client::Result<()> {
/// let config = StudioConfig::new(
///     "https://studio.example.com/api/v2/predict/generic/project/endpoint",
///     "api-key",
/// )
/// .with_params(CompletionParameters::new().with_model("Meta-Llama-3-8B-Instruct"));
/// let client = StudioClient::new(config)?;
/// let text = client.complete("tell me a joke", &[]).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct StudioClient {
    config: StudioConfig,
    endpoint: EndpointDescriptor,
    transport: HttpTransport,
}

impl StudioClient {
    pub fn new(config: StudioConfig) -> Result<Self> {
        let endpoint = classify(&config.url)?;
        Ok(Self {
            config,
            endpoint,
            transport: HttpTransport::from_env(),
        })
    }

    /// Build from `SAMBASTUDIO_URL` / `SAMBASTUDIO_API_KEY`.
    pub fn from_env() -> Result<Self> {
        Self::new(StudioConfig::from_env()?)
    }

    pub fn with_transport(mut self, transport: HttpTransport) -> Self {
        self.transport = transport;
        self
    }

    pub fn endpoint(&self) -> &EndpointDescriptor {
        &self.endpoint
    }

    pub fn variant(&self) -> ProtocolVariant {
        self.endpoint.variant
    }

    pub fn config(&self) -> &StudioConfig {
        &self.config
    }

    pub(crate) fn transport(&self) -> &HttpTransport {
        &self.transport
    }

    /// Map parameters and build the request for one call.
    pub fn prepare(&self, prompt: &str, stop: &[String], stream: bool) -> Result<OutboundRequest> {
        let mapped = map_params(self.endpoint.variant, &self.config.params, stop)?;
        build_request(
            &self.endpoint,
            mapped,
            prompt,
            stream,
            self.config.api_key.expose_secret(),
            false,
        )
    }
}

#[async_trait::async_trait]
impl TextCompletionClient for StudioClient {
    fn llm_type(&self) -> &'static str {
        "sambastudio-llm"
    }

    fn identifying_params(&self) -> serde_json::Value {
        serde_json::json!({
            "streaming": self.config.streaming,
            "model_kwargs": self.config.params,
        })
    }

    async fn complete(&self, prompt: &str, stop: &[String]) -> Result<String> {
        if self.config.streaming {
            let stream = self.stream(prompt, stop).await?;
            return collect_deltas(stream, None).await;
        }
        let request = self.prepare(prompt, stop, false)?;
        execute_buffered(&self.transport, self.endpoint.variant, request).await
    }

    async fn stream(&self, prompt: &str, stop: &[String]) -> Result<DeltaStream> {
        let request = self.prepare(prompt, stop, true)?;
        execute_stream(&self.transport, self.endpoint.variant, request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CompletionParameters;

    #[test]
    fn unsupported_url_fails_at_construction() {
        let err = StudioClient::new(StudioConfig::new("https://studio.example.com/api/nlp", "k"))
            .unwrap_err();
        assert!(matches!(err, crate::Error::UnsupportedEndpoint { .. }));
    }

    #[test]
    fn prepare_targets_stream_url_only_when_streaming() {
        let client = StudioClient::new(StudioConfig::new(
            "https://studio.example.com/api/v2/predict/generic/p/e",
            "k",
        ))
        .unwrap();
        assert!(!client.prepare("x", &[], false).unwrap().url.contains("stream"));
        assert!(client.prepare("x", &[], true).unwrap().url.contains("generic/stream"));
    }

    #[test]
    fn identifying_params_exclude_credentials() {
        let client = StudioClient::new(
            StudioConfig::new("https://studio.example.com/openai/v1/infer", "very-secret")
                .with_params(CompletionParameters::new().with_max_tokens(8)),
        )
        .unwrap();
        let params = client.identifying_params();
        assert_eq!(params["model_kwargs"]["max_tokens"], 8);
        assert!(!params.to_string().contains("very-secret"));
        assert_eq!(client.llm_type(), "sambastudio-llm");
    }
}
