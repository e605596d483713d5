//! HTTP call-and-assert step.

use crate::context::ExecutionContext;
use crate::step::{Step, StepError};
use crate::validator;
use async_trait::async_trait;
use indexmap::IndexMap;
use reqwest::{Client, Method, Request};
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Timeout applied when a call does not set its own.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Issues one request to `127.0.0.1:<port>` and asserts on the response.
///
/// The response must have status 200. When `body` is non-empty the body
/// must equal it exactly. Every entry of `response_headers` is matched
/// against the first value of that header; `"*"` requires a non-empty
/// value and `"-"` requires the header to be absent or empty.
#[derive(Debug, Clone)]
pub struct HttpCall {
    pub method: String,
    pub port: u16,
    /// Expected body; empty skips the check.
    pub body: String,
    pub request_headers: IndexMap<String, String>,
    pub response_headers: IndexMap<String, String>,
    /// `None` uses [`DEFAULT_TIMEOUT`].
    pub timeout: Option<Duration>,
}

impl HttpCall {
    pub fn new(method: impl Into<String>, port: u16) -> Self {
        Self {
            method: method.into(),
            port,
            body: String::new(),
            request_headers: IndexMap::new(),
            response_headers: IndexMap::new(),
            timeout: None,
        }
    }

    /// GET `port` and expect `body` back.
    pub fn get(port: u16, body: impl Into<String>) -> Self {
        Self::new("GET", port).with_body(body)
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    pub fn with_request_header(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.request_headers.insert(name.into(), value.into());
        self
    }

    /// Expect `name` to match `value`, which may be `"*"` or `"-"`.
    pub fn with_response_header(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.response_headers.insert(name.into(), value.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn url(&self) -> String {
        format!("http://127.0.0.1:{}", self.port)
    }

    /// Timeout used for the next run. A zero duration counts as unset.
    pub fn effective_timeout(&self) -> Duration {
        match self.timeout {
            Some(t) if !t.is_zero() => t,
            _ => DEFAULT_TIMEOUT,
        }
    }

    fn build_request(&self, client: &Client) -> Result<Request, StepError> {
        let method = Method::from_bytes(self.method.as_bytes()).map_err(
            |e| StepError::InvalidRequest(format!("method {:?}: {e}", self.method)),
        )?;

        let mut builder = client.request(method, self.url());
        for (name, value) in &self.request_headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        builder
            .build()
            .map_err(|e| StepError::InvalidRequest(e.to_string()))
    }
}

/// Request line and headers, without body.
fn dump_request(request: &Request) -> String {
    let url = request.url();
    let mut lines = vec![format!("{} {} HTTP/1.1", request.method(), url.path())];
    if let Some(host) = url.host_str() {
        lines.push(match url.port() {
            Some(port) => format!("Host: {host}:{port}"),
            None => format!("Host: {host}"),
        });
    }
    lines.extend(request.headers().iter().map(|(name, value)| {
        format!("{}: {}", name, String::from_utf8_lossy(value.as_bytes()))
    }));
    lines.push(String::new());
    lines.push(String::new());
    lines.join("\r\n")
}

#[async_trait]
impl Step for HttpCall {
    #[instrument(skip(self, _ctx), fields(port = self.port, method = %self.method))]
    async fn run(&mut self, _ctx: &mut ExecutionContext) -> Result<(), StepError> {
        let port = self.port;
        // Loopback targets are never routed through HTTP_PROXY and friends.
        let client = Client::builder()
            .no_proxy()
            .timeout(self.effective_timeout())
            .build()
            .map_err(|e| StepError::InvalidRequest(e.to_string()))?;

        let request = self.build_request(&client)?;
        info!("HTTP request:\n{}", dump_request(&request));

        let response = client
            .execute(request)
            .await
            .map_err(|source| StepError::Transport { port, source })?;

        let code = response.status().as_u16();
        if code != 200 {
            return Err(StepError::Status { port, code });
        }

        let headers = response.headers().clone();
        let body = response
            .bytes()
            .await
            .map_err(|source| StepError::BodyRead { port, source })?;
        debug!("Received {} byte body from :{}", body.len(), port);

        validator::validate_body(&body, &self.body)?;

        let mismatches =
            validator::validate_headers(&headers, &self.response_headers);
        if !mismatches.is_empty() {
            return Err(StepError::Headers(mismatches));
        }

        Ok(())
    }
}
