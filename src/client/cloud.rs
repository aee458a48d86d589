//! Client for the multi-tenant cloud API. Always streams.

use super::execution::{collect_deltas, execute_stream};
use super::TextCompletionClient;
use crate::config::CloudConfig;
use crate::pipeline::DeltaStream;
use crate::protocol::{build_request, map_params, EndpointDescriptor, OutboundRequest, ProtocolVariant};
use crate::transport::HttpTransport;
use crate::Result;
use secrecy::ExposeSecret;

/// Cloud API client.
///
/// A prompt that parses as a JSON array is sent as the message list; anything
/// else is sent as a single user message.
#[derive(Debug)]
pub struct CloudClient {
    config: CloudConfig,
    endpoint: EndpointDescriptor,
    transport: HttpTransport,
}

impl CloudClient {
    pub fn new(config: CloudConfig) -> Self {
        let endpoint = EndpointDescriptor::cloud(config.url.clone());
        Self {
            config,
            endpoint,
            transport: HttpTransport::from_env(),
        }
    }

    /// Build from `SAMBANOVA_API_KEY` (and optionally `SAMBANOVA_URL`).
    pub fn from_env() -> Result<Self> {
        Ok(Self::new(CloudConfig::from_env()?))
    }

    pub fn with_transport(mut self, transport: HttpTransport) -> Self {
        self.transport = transport;
        self
    }

    pub fn config(&self) -> &CloudConfig {
        &self.config
    }

    pub(crate) fn transport(&self) -> &HttpTransport {
        &self.transport
    }

    pub fn prepare(&self, prompt: &str, stop: &[String]) -> Result<OutboundRequest> {
        let mapped = map_params(ProtocolVariant::Cloud, &self.config.params(), stop)?;
        build_request(
            &self.endpoint,
            mapped,
            prompt,
            true,
            self.config.api_key.expose_secret(),
            self.config.include_usage,
        )
    }
}

#[async_trait::async_trait]
impl TextCompletionClient for CloudClient {
    fn llm_type(&self) -> &'static str {
        "SambaNova Cloud"
    }

    fn identifying_params(&self) -> serde_json::Value {
        serde_json::json!({
            "model": self.config.model,
            "max_tokens": self.config.max_tokens,
            "stop": self.config.stop_tokens,
            "temperature": self.config.temperature,
            "top_p": self.config.top_p,
            "top_k": self.config.top_k,
        })
    }

    async fn complete(&self, prompt: &str, stop: &[String]) -> Result<String> {
        let stream = self.stream(prompt, stop).await?;
        collect_deltas(stream, None).await
    }

    async fn stream(&self, prompt: &str, stop: &[String]) -> Result<DeltaStream> {
        let request = self.prepare(prompt, stop)?;
        execute_stream(&self.transport, ProtocolVariant::Cloud, request).await
    }
}
