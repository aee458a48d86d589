//! # sambanova-client
//!
//! Text-completion clients for SambaNova Cloud and self-hosted SambaStudio endpoints.
//!
//! ## Overview
//!
//! SambaStudio exposes three wire formats (OpenAI-compatible chat, generic predict v1
//! and v2) and the cloud API a fourth. This crate hides those differences behind one
//! call surface: a prompt plus a uniform [`types::CompletionParameters`] bag goes in,
//! completion text (or a lazily decoded sequence of text deltas) comes out.
//!
//! - **URL-driven**: the wire format of a studio endpoint is derived from its URL
//! - **Streaming-first**: SSE and NDJSON bodies are decoded incrementally
//! - **Stateless**: every call builds its own request and connection
//! - **Async and blocking**: [`TextCompletionClient`] and [`BlockingTextCompletionClient`]
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use futures::StreamExt;
//! use sambanova_client::{CloudClient, TextCompletionClient};
//!
//! #[tokio::main]
//! async fn main() -> sambanova_client::Result<()> {
//!     let client = CloudClient::from_env()?;
//!
//!     let mut deltas = client.stream("Why is the sky blue?", &[]).await?;
//!     while let Some(delta) = deltas.next().await {
//!         print!("{}", delta?.text);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`protocol`] | Endpoint classification, parameter mapping, request building, buffered decoding |
//! | [`pipeline`] | Incremental decoding of streamed bodies |
//! | [`client`] | Completion clients and the orchestration of a single call |
//! | [`config`] | Explicit, environment and YAML configuration |
//! | [`transport`] | HTTP POST primitive |
//! | [`types`] | Parameter bag, deltas and stream events |

pub mod client;
pub mod config;
pub mod pipeline;
pub mod protocol;
pub mod transport;
pub mod types;

pub use client::{
    collect_deltas, BlockingTextCompletionClient, CloudClient, StudioClient, TextCompletionClient,
};
pub use config::{CloudConfig, StudioConfig};
pub use pipeline::{DeltaStream, StreamDecoder};
pub use protocol::ProtocolVariant;
pub use types::{CompletionParameters, StreamState, TextDelta};

use futures::Stream;
use std::pin::Pin;

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// A unified pinned, boxed stream that emits `Result<T>`
pub type BoxStream<'a, T> = Pin<Box<dyn Stream<Item = Result<T>> + Send + 'a>>;

/// Error type for the library
pub mod error;
pub use error::{Error, ErrorContext};
