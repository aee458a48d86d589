//! # Types Module
//!
//! Call-scoped value types shared by the protocol adapters and the streaming
//! decoder. None of them outlive a single completion call.
//!
//! ## Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`CompletionParameters`] | Uniform parameter bag mapped onto each wire format |
//! | [`TextDelta`] | One incremental fragment of generated text |
//! | [`StreamEvent`] | A single server-sent event (event name + data) |
//! | [`StreamState`] | Observable state of a delta sequence |
//!
//! ## Example
//!
//! ```rust
//! use sambanova_client::types::CompletionParameters;
//!
//! let params = CompletionParameters::new()
//!     .with_model("Meta-Llama-3-70B-Instruct-4096")
//!     .with_max_tokens(256)
//!     .with_temperature(0.01)
//!     .with_stop_sequences(vec!["<|eot_id|>".to_string()]);
//! assert_eq!(params.max_tokens, Some(256));
//! ```

pub mod events;
pub mod params;

pub use events::{StreamEvent, StreamState, TextDelta};
pub use params::CompletionParameters;
