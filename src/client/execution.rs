//! Per-call execution shared by the clients: send, then decode buffered or streamed.

use crate::pipeline::{decode_stream, DeltaStream, StreamDecoder};
use crate::protocol::{decode_response, OutboundRequest, ProtocolVariant};
use crate::transport::HttpTransport;
use crate::types::TextDelta;
use crate::Result;
use futures::StreamExt;
use tracing::{debug, info};
use uuid::Uuid;

pub(crate) async fn execute_buffered(
    transport: &HttpTransport,
    variant: ProtocolVariant,
    request: OutboundRequest,
) -> Result<String> {
    let call_id = Uuid::new_v4();
    info!(%call_id, %variant, url = %request.url, "buffered completion");

    let resp = transport.post(&request).await?;
    let body = resp.text().await?;
    let text = decode_response(variant, &body)?;
    debug!(%call_id, chars = text.len(), "buffered completion done");
    Ok(text)
}

pub(crate) async fn execute_stream(
    transport: &HttpTransport,
    variant: ProtocolVariant,
    request: OutboundRequest,
) -> Result<DeltaStream> {
    let call_id = Uuid::new_v4();
    info!(%call_id, %variant, url = %request.url, "streaming completion");

    let (status, body) = transport.post_stream(&request).await?;
    Ok(decode_stream(StreamDecoder::new(variant, status), body))
}

/// Drain a delta stream into one string, calling `observer` for every delta.
///
/// Returns the first error instead of any partial text.
pub async fn collect_deltas(
    mut stream: DeltaStream,
    mut observer: Option<&mut (dyn FnMut(&TextDelta) + Send)>,
) -> Result<String> {
    let mut text = String::new();
    while let Some(delta) = stream.next().await {
        let delta = delta?;
        if let Some(observer) = observer.as_mut() {
            observer(&delta);
        }
        text.push_str(&delta.text);
    }
    Ok(text)
}
