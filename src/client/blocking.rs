//! Blocking variants of the client calls, for callers without an async runtime.
//!
//! These use `reqwest::blocking` and fail with a configuration error when
//! invoked from inside a tokio runtime.

use super::{CloudClient, StudioClient};
use crate::pipeline::{BlockingDeltaIter, StreamDecoder};
use crate::protocol::{decode_response, OutboundRequest, ProtocolVariant};
use crate::transport::HttpTransport;
use crate::types::TextDelta;
use crate::Result;
use tracing::info;
use uuid::Uuid;

/// Delta iterator over a blocking HTTP response body.
pub type BlockingDeltas = BlockingDeltaIter<reqwest::blocking::Response>;

pub trait BlockingTextCompletionClient {
    /// Run one completion and return the full text.
    fn complete_blocking(&self, prompt: &str, stop: &[String]) -> Result<String>;

    /// Start a streaming completion. The body is read as the iterator advances.
    fn stream_blocking(&self, prompt: &str, stop: &[String]) -> Result<BlockingDeltas>;

    /// Stream, report each delta to `observer`, and return the joined text.
    fn complete_blocking_with_observer(
        &self,
        prompt: &str,
        stop: &[String],
        observer: &mut dyn FnMut(&TextDelta),
    ) -> Result<String> {
        let mut text = String::new();
        for delta in self.stream_blocking(prompt, stop)? {
            let delta = delta?;
            observer(&delta);
            text.push_str(&delta.text);
        }
        Ok(text)
    }
}

fn open_stream(
    transport: &HttpTransport,
    variant: ProtocolVariant,
    request: &OutboundRequest,
) -> Result<BlockingDeltas> {
    let call_id = Uuid::new_v4();
    info!(%call_id, %variant, url = %request.url, "blocking streaming completion");
    let resp = transport.post_blocking(request)?;
    let status = resp.status().as_u16();
    Ok(BlockingDeltaIter::new(StreamDecoder::new(variant, status), resp))
}

fn collect(deltas: BlockingDeltas) -> Result<String> {
    deltas.map(|d| d.map(|d| d.text)).collect()
}

impl BlockingTextCompletionClient for StudioClient {
    fn complete_blocking(&self, prompt: &str, stop: &[String]) -> Result<String> {
        if self.config().streaming {
            return collect(self.stream_blocking(prompt, stop)?);
        }
        let request = self.prepare(prompt, stop, false)?;
        let call_id = Uuid::new_v4();
        info!(%call_id, variant = %self.variant(), url = %request.url, "blocking buffered completion");
        let body = self.transport().post_blocking(&request)?.text()?;
        decode_response(self.variant(), &body)
    }

    fn stream_blocking(&self, prompt: &str, stop: &[String]) -> Result<BlockingDeltas> {
        let request = self.prepare(prompt, stop, true)?;
        open_stream(self.transport(), self.variant(), &request)
    }
}

impl BlockingTextCompletionClient for CloudClient {
    fn complete_blocking(&self, prompt: &str, stop: &[String]) -> Result<String> {
        collect(self.stream_blocking(prompt, stop)?)
    }

    fn stream_blocking(&self, prompt: &str, stop: &[String]) -> Result<BlockingDeltas> {
        let request = self.prepare(prompt, stop)?;
        open_stream(self.transport(), ProtocolVariant::Cloud, &request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CloudConfig;

    #[tokio::test]
    async fn refuses_to_block_inside_runtime() {
        let client = CloudClient::new(CloudConfig::new("k").with_url("http://127.0.0.1:9/v1"));
        let err = client.complete_blocking("hi", &[]).unwrap_err();
        assert!(matches!(err, crate::Error::Configuration { .. }));
    }
}
