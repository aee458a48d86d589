//! Text-completion clients.
//!
//! Keep the public surface small: one trait for async callers, one for blocking
//! callers, and a client type per upstream API. Implementation details are split
//! into submodules under `src/client/`.

pub mod blocking;
pub mod cloud;
mod execution;
pub mod studio;

pub use blocking::BlockingTextCompletionClient;
pub use cloud::CloudClient;
pub use execution::collect_deltas;
pub use studio::StudioClient;

use crate::pipeline::DeltaStream;
use crate::types::TextDelta;
use crate::Result;

/// Observer invoked once per delta, in delivery order.
pub type DeltaObserver<'a> = &'a mut (dyn FnMut(&TextDelta) + Send);

/// Capability set shared by every client: single-shot completion and a lazily
/// produced, per-call sequence of text deltas.
///
/// `stop` sequences are appended after the ones configured on the client.
#[async_trait::async_trait]
pub trait TextCompletionClient: Send + Sync {
    /// Short identifier of the upstream API.
    fn llm_type(&self) -> &'static str;

    /// Snapshot of the parameters sent with every call (no credentials).
    fn identifying_params(&self) -> serde_json::Value;

    /// Run one completion and return the full text.
    async fn complete(&self, prompt: &str, stop: &[String]) -> Result<String>;

    /// Start a streaming completion. Nothing is read from the server until the
    /// returned stream is polled.
    async fn stream(&self, prompt: &str, stop: &[String]) -> Result<DeltaStream>;

    /// Stream a completion, report each delta to `observer`, and return the joined text.
    ///
    /// On failure the error is returned and no partial text is handed back.
    async fn complete_with_observer(
        &self,
        prompt: &str,
        stop: &[String],
        observer: DeltaObserver<'_>,
    ) -> Result<String> {
        let stream = self.stream(prompt, stop).await?;
        collect_deltas(stream, Some(observer)).await
    }
}
