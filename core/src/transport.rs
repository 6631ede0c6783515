//! The I/O seam between `HttpClient` and the network.
//!
//! # Design
//! `HttpClient` never talks to a socket itself; it hands an `HttpRequest` to
//! a `Transport` and gets an `HttpResponse` back. Any received response,
//! whatever its status, is `Ok`: status interpretation belongs to the
//! client. `Err` means nothing came back.
//!
//! `UreqTransport` is the production implementation. `RecordingTransport`
//! replays scripted responses and records every request, so API modules can
//! be tested without a server.

use std::collections::VecDeque;
use std::fmt;
use std::sync::Mutex;
use std::time::Duration;

use crate::error::TransportError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

pub trait Transport: Send + Sync {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// Blocking transport backed by a shared `ureq::Agent`.
#[derive(Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
    timeout: Duration,
}

impl UreqTransport {
    pub fn new(timeout: Duration) -> Self {
        // 4xx/5xx come back as data so the client decides what they mean.
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(timeout))
            .build()
            .new_agent();
        Self { agent, timeout }
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let url = request.full_url();
        let body = request.body.as_ref().map(|b| b.to_bytes());

        let result = match request.method {
            HttpMethod::Get => {
                let mut builder = self.agent.get(&url);
                for (name, value) in &request.headers {
                    builder = builder.header(name.as_str(), value.as_str());
                }
                builder.call()
            }
            HttpMethod::Delete => {
                let mut builder = self.agent.delete(&url);
                for (name, value) in &request.headers {
                    builder = builder.header(name.as_str(), value.as_str());
                }
                builder.call()
            }
            HttpMethod::Post | HttpMethod::Put => {
                let mut builder = if request.method == HttpMethod::Post {
                    self.agent.post(&url)
                } else {
                    self.agent.put(&url)
                };
                for (name, value) in &request.headers {
                    builder = builder.header(name.as_str(), value.as_str());
                }
                match &body {
                    Some(bytes) => builder.send(bytes.as_slice()),
                    None => builder.send_empty(),
                }
            }
        };

        let mut response = result.map_err(|e| self.map_error(e))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|e| self.map_error(e))?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

impl fmt::Debug for UreqTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UreqTransport")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl UreqTransport {
    fn map_error(&self, error: ureq::Error) -> TransportError {
        match error {
            ureq::Error::Timeout(_) => TransportError::Timeout(self.timeout),
            other => TransportError::Network(other.to_string()),
        }
    }
}

/// Test double: returns queued responses in order and keeps every request.
///
/// When the queue runs dry it answers with a network error, which makes an
/// unexpected extra call visible in the test.
#[derive(Debug, Default)]
pub struct RecordingTransport {
    responses: Mutex<VecDeque<Result<HttpResponse, TransportError>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, status: u16, body: &str) -> &Self {
        self.push(Ok(HttpResponse::new(status, body)))
    }

    pub fn respond_json(&self, status: u16, body: &serde_json::Value) -> &Self {
        self.push(Ok(HttpResponse::new(status, body.to_string())))
    }

    pub fn fail(&self, error: TransportError) -> &Self {
        self.push(Err(error))
    }

    fn push(&self, outcome: Result<HttpResponse, TransportError>) -> &Self {
        if let Ok(mut queue) = self.responses.lock() {
            queue.push_back(outcome);
        }
        self
    }

    /// Every request seen so far, oldest first.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }

    pub fn last_request(&self) -> Option<HttpRequest> {
        self.requests.lock().ok().and_then(|r| r.last().cloned())
    }
}

impl Transport for RecordingTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        if let Ok(mut seen) = self.requests.lock() {
            seen.push(request.clone());
        }
        self.responses
            .lock()
            .ok()
            .and_then(|mut queue| queue.pop_front())
            .unwrap_or_else(|| Err(TransportError::Network("no scripted response".to_string())))
    }
}
