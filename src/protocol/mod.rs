//! # Wire Protocol Layer
//!
//! Everything that differs between the four supported wire formats lives here,
//! selected by a single [`ProtocolVariant`] tag that is derived once per client.
//!
//! ```text
//! URL ──classify──► ProtocolVariant ──map_params──► wire params
//!                          │                           │
//!                          └────────build_request──────┘──► OutboundRequest
//! response body ──decode_response──► completion text
//! ```
//!
//! ## Module Structure
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`endpoint`] | URL classification and streaming URL derivation |
//! | [`params`] | Parameter renaming and the generic v1 type envelope |
//! | [`request`] | Payload and header construction per variant |
//! | [`response`] | Buffered (non-streaming) response extraction |
//!
//! Streaming responses are decoded by [`crate::pipeline`].

pub mod endpoint;
pub mod params;
pub mod request;
pub mod response;

pub use endpoint::{classify, EndpointDescriptor};
pub use params::map_params;
pub use request::{build_request, OutboundRequest};
pub use response::decode_response;

use std::fmt;

/// The four upstream wire formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProtocolVariant {
    /// Studio OpenAI-compatible chat completions (SSE streaming).
    OpenAiCompatible,
    /// Studio legacy generic predict API (`api/predict/generic`, NDJSON streaming).
    GenericV1,
    /// Studio generic predict API v2 (`api/v2/predict/generic`, NDJSON streaming).
    GenericV2,
    /// Cloud chat completions (SSE streaming only).
    Cloud,
}

impl ProtocolVariant {
    /// Whether streamed bodies are framed as server-sent events (otherwise NDJSON).
    pub fn uses_sse(self) -> bool {
        matches!(self, ProtocolVariant::OpenAiCompatible | ProtocolVariant::Cloud)
    }

    /// Whether the variant authenticates with a bearer token (otherwise a `key` header).
    pub fn uses_bearer_auth(self) -> bool {
        self.uses_sse()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ProtocolVariant::OpenAiCompatible => "openai_compatible",
            ProtocolVariant::GenericV1 => "generic_v1",
            ProtocolVariant::GenericV2 => "generic_v2",
            ProtocolVariant::Cloud => "cloud",
        }
    }
}

impl fmt::Display for ProtocolVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
