//! Endpoint classification

use super::ProtocolVariant;
use crate::{Error, Result};
use url::Url;

const OPENAI_SEGMENT: &str = "openai";
const GENERIC_V2_SEGMENT: &str = "api/v2/predict/generic";
const GENERIC_V1_SEGMENT: &str = "api/predict/generic";
const STREAM_SUFFIX: &str = "/stream";

/// A classified endpoint. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointDescriptor {
    /// URL used for buffered calls.
    pub base_url: String,
    /// URL used for streaming calls.
    pub stream_url: String,
    pub variant: ProtocolVariant,
}

impl EndpointDescriptor {
    /// Descriptor for the cloud API. There is nothing to classify: one URL, one format.
    pub fn cloud(url: impl Into<String>) -> Self {
        let url = url.into();
        Self {
            base_url: url.clone(),
            stream_url: url,
            variant: ProtocolVariant::Cloud,
        }
    }

    pub fn url_for(&self, streaming: bool) -> &str {
        if streaming {
            &self.stream_url
        } else {
            &self.base_url
        }
    }
}

/// Classify a studio endpoint URL and derive its buffered/streaming URL pair.
///
/// Either the buffered or the streaming form of a generic URL is accepted.
pub fn classify(url: &str) -> Result<EndpointDescriptor> {
    let url = url.trim();
    Url::parse(url).map_err(|e| Error::unsupported_endpoint(url, e.to_string()))?;

    let variant = if url.contains(OPENAI_SEGMENT) {
        ProtocolVariant::OpenAiCompatible
    } else if url.contains(GENERIC_V2_SEGMENT) {
        ProtocolVariant::GenericV2
    } else if url.contains(GENERIC_V1_SEGMENT) {
        ProtocolVariant::GenericV1
    } else {
        return Err(Error::unsupported_endpoint(
            url,
            "only openai, generic v1 and generic v2 APIs are supported",
        ));
    };

    if variant == ProtocolVariant::OpenAiCompatible {
        return Ok(EndpointDescriptor {
            base_url: url.to_string(),
            stream_url: url.to_string(),
            variant,
        });
    }

    let segment = if variant == ProtocolVariant::GenericV2 {
        GENERIC_V2_SEGMENT
    } else {
        GENERIC_V1_SEGMENT
    };
    let (base_url, stream_url) = split_stream_path(url, segment);

    Ok(EndpointDescriptor {
        base_url,
        stream_url,
        variant,
    })
}

/// Buffered and streaming forms of a generic URL. `/stream` goes directly after
/// the matched path segment; a URL already carrying it is mapped back.
fn split_stream_path(url: &str, segment: &str) -> (String, String) {
    let end = match url.find(segment) {
        Some(start) => start + segment.len(),
        None => return (url.to_string(), url.to_string()),
    };
    let (head, tail) = url.split_at(end);
    let already_streaming = tail
        .strip_prefix(STREAM_SUFFIX)
        .map(|rest| rest.is_empty() || rest.starts_with(|c: char| matches!(c, '/' | '?' | '#')))
        .unwrap_or(false);

    if already_streaming {
        let rest = &tail[STREAM_SUFFIX.len()..];
        (format!("{}{}", head, rest), url.to_string())
    } else {
        (url.to_string(), format!("{}{}{}", head, STREAM_SUFFIX, tail))
    }
}
