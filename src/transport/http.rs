use crate::protocol::OutboundRequest;
use crate::{BoxStream, Error, ErrorContext, Result};
use bytes::Bytes;
use futures::TryStreamExt;
use reqwest::Proxy;
use std::env;
use std::time::Duration;
use tracing::warn;

const DEFAULT_TIMEOUT_SECS: u64 = 120;
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// POST primitive used by the clients.
///
/// A new `reqwest` client is built for every call with idle pooling disabled, so no
/// connection outlives the call that opened it.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    timeout: Duration,
    connect_timeout: Duration,
    proxy: Option<String>,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            proxy: None,
        }
    }

    /// Defaults overridable by env:
    /// - `SAMBA_HTTP_TIMEOUT_SECS` (whole call, including the streamed body)
    /// - `SAMBA_HTTP_CONNECT_TIMEOUT_SECS`
    /// - `SAMBA_PROXY_URL`
    pub fn from_env() -> Self {
        let secs = |name: &str, default: u64| {
            env::var(name)
                .ok()
                .and_then(|s| s.parse::<u64>().ok())
                .filter(|s| *s > 0)
                .unwrap_or(default)
        };
        Self {
            timeout: Duration::from_secs(secs("SAMBA_HTTP_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)),
            connect_timeout: Duration::from_secs(secs(
                "SAMBA_HTTP_CONNECT_TIMEOUT_SECS",
                DEFAULT_CONNECT_TIMEOUT_SECS,
            )),
            proxy: env::var("SAMBA_PROXY_URL").ok().filter(|s| !s.is_empty()),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn with_proxy(mut self, proxy_url: impl Into<String>) -> Self {
        self.proxy = Some(proxy_url.into());
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn proxy(&self) -> Option<Proxy> {
        let url = self.proxy.as_deref()?;
        match Proxy::all(url) {
            Ok(proxy) => Some(proxy),
            Err(e) => {
                warn!(proxy = url, error = %e, "ignoring invalid proxy url");
                None
            }
        }
    }

    fn client(&self) -> Result<reqwest::Client> {
        let mut builder = reqwest::Client::builder()
            .timeout(self.timeout)
            .connect_timeout(self.connect_timeout)
            .pool_max_idle_per_host(0);
        if let Some(proxy) = self.proxy() {
            builder = builder.proxy(proxy);
        }
        Ok(builder.build()?)
    }

    fn blocking_client(&self) -> Result<reqwest::blocking::Client> {
        let mut builder = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .connect_timeout(self.connect_timeout)
            .pool_max_idle_per_host(0);
        if let Some(proxy) = self.proxy() {
            builder = builder.proxy(proxy);
        }
        Ok(builder.build()?)
    }

    /// Send the request and return the response once its status is known to be a success.
    ///
    /// A non-success status fails with `StreamProtocol` for streaming requests and
    /// `HttpStatus` otherwise.
    pub async fn post(&self, request: &OutboundRequest) -> Result<reqwest::Response> {
        let mut req = self.client()?.post(&request.url).json(&request.body);
        for (name, value) in &request.headers {
            req = req.header(name.as_str(), value.as_str());
        }

        let resp = req.send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(status_error(request, status.as_u16(), body));
        }
        Ok(resp)
    }

    /// Like [`post`](Self::post), returning the status and the body as a byte stream.
    pub async fn post_stream(
        &self,
        request: &OutboundRequest,
    ) -> Result<(u16, BoxStream<'static, Bytes>)> {
        let resp = self.post(request).await?;
        let status = resp.status().as_u16();
        let body = resp.bytes_stream().map_err(Error::Transport);
        Ok((status, Box::pin(body)))
    }

    /// Blocking POST. Must not be called from inside an async runtime.
    pub fn post_blocking(&self, request: &OutboundRequest) -> Result<reqwest::blocking::Response> {
        if tokio::runtime::Handle::try_current().is_ok() {
            return Err(Error::configuration_with_context(
                "blocking call issued from inside an async runtime",
                ErrorContext::new()
                    .with_details("use the async client methods instead")
                    .with_source("transport"),
            ));
        }

        let mut req = self.blocking_client()?.post(&request.url).json(&request.body);
        for (name, value) in &request.headers {
            req = req.header(name.as_str(), value.as_str());
        }

        let resp = req.send()?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().unwrap_or_default();
            return Err(status_error(request, status.as_u16(), body));
        }
        Ok(resp)
    }
}

/// Non-success status: `StreamProtocol` for streaming calls, `HttpStatus` otherwise.
fn status_error(request: &OutboundRequest, status: u16, body: String) -> Error {
    warn!(status, url = %request.url, stream = request.stream, "completion call failed");
    if request.stream {
        Error::stream_protocol(status, "non-success status", body)
    } else {
        Error::HttpStatus { status, body }
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}
