//! HTTP transport. One fresh connection per call; no pooling, no retries.

pub mod http;

pub use http::HttpTransport;
