use thiserror::Error;

/// Structured error context for configuration failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorContext {
    /// Configuration key or environment variable that caused the error (e.g., "SAMBASTUDIO_URL")
    pub field_path: Option<String>,
    /// Additional context about the error (e.g., expected type, actual value)
    pub details: Option<String>,
    /// Source of the error (e.g., "env", "yaml")
    pub source: Option<String>,
}

impl ErrorContext {
    pub fn new() -> Self {
        Self {
            field_path: None,
            details: None,
            source: None,
        }
    }

    pub fn with_field_path(mut self, path: impl Into<String>) -> Self {
        self.field_path = Some(path.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

impl Default for ErrorContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Unified error type for the completion clients.
///
/// Nothing is retried internally. Transport failures carry the underlying
/// `reqwest::Error` unchanged.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Unsupported endpoint {url}: {reason}")]
    UnsupportedEndpoint { url: String, reason: String },

    #[error("Unsupported parameter `{name}`: {reason}")]
    UnsupportedParameter { name: String, reason: String },

    #[error("Malformed response: {reason} (body: {body})")]
    MalformedResponse { reason: String, body: String },

    #[error("Stream protocol error (HTTP {status}): {reason} (payload: {payload})")]
    StreamProtocol {
        status: u16,
        reason: String,
        payload: String,
    },

    /// Non-success status on a buffered call. Streaming calls report it as `StreamProtocol`.
    #[error("Completion call failed with HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error(transparent)]
    Transport(#[from] reqwest::Error),

    #[error("Configuration error: {message}{}", format_context(.context))]
    Configuration {
        message: String,
        context: ErrorContext,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

fn format_context(ctx: &ErrorContext) -> String {
    let mut parts = Vec::new();
    if let Some(ref field) = ctx.field_path {
        parts.push(format!("field: {}", field));
    }
    if let Some(ref details) = ctx.details {
        parts.push(format!("details: {}", details));
    }
    if let Some(ref source) = ctx.source {
        parts.push(format!("source: {}", source));
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!(" ({})", parts.join(", "))
    }
}

impl Error {
    pub fn unsupported_endpoint(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::UnsupportedEndpoint {
            url: url.into(),
            reason: reason.into(),
        }
    }

    pub fn unsupported_parameter(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::UnsupportedParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }

    pub fn malformed_response(reason: impl Into<String>, body: impl Into<String>) -> Self {
        Error::MalformedResponse {
            reason: reason.into(),
            body: body.into(),
        }
    }

    pub fn stream_protocol(
        status: u16,
        reason: impl Into<String>,
        payload: impl Into<String>,
    ) -> Self {
        Error::StreamProtocol {
            status,
            reason: reason.into(),
            payload: payload.into(),
        }
    }

    /// Create a new configuration error with structured context
    pub fn configuration_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Configuration {
            message: msg.into(),
            context,
        }
    }

    /// Extract error context if available
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            Error::Configuration { context, .. } => Some(context),
            _ => None,
        }
    }

    /// HTTP status attached to the failure, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::StreamProtocol { status, .. } | Error::HttpStatus { status, .. } => {
                Some(*status)
            }
            Error::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
