//! The single point of outbound HTTP access for the app.
//!
//! # Design
//! `HttpClient` is an explicitly constructed value, not a global. It owns
//! the configuration and shares its `Transport` and `Session` through
//! `Arc`, so clones are cheap and every resource module can hold one.
//!
//! Each call goes through `execute`, which:
//! - attaches `accept`, `content-type` and (when a token is stored)
//!   `authorization` headers,
//! - logs the request (method + URL) and the response (status + URL),
//! - invalidates the session on 401,
//! - maps non-2xx statuses to `ClientError` variants.
//!
//! Nothing is retried.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, MultipartForm, Query, RequestBody};
use crate::session::{MemorySession, Session};
use crate::transport::{Transport, UreqTransport};

#[derive(Clone)]
pub struct HttpClient {
    config: ClientConfig,
    transport: Arc<dyn Transport>,
    session: Arc<dyn Session>,
}

impl fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl HttpClient {
    /// Client over the network with an empty in-memory session.
    pub fn new(config: ClientConfig) -> Self {
        let transport = Arc::new(UreqTransport::new(config.timeout));
        Self::with_transport(config, transport)
    }

    pub fn with_transport(config: ClientConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            config,
            transport,
            session: Arc::new(MemorySession::new()),
        }
    }

    pub fn with_session(mut self, session: Arc<dyn Session>) -> Self {
        self.session = session;
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn session(&self) -> &dyn Session {
        self.session.as_ref()
    }

    /// Build a request against `path` (which starts with `/`) with the
    /// standard headers.
    pub fn request(
        &self,
        method: HttpMethod,
        path: &str,
        query: Query,
        body: Option<RequestBody>,
    ) -> HttpRequest {
        let mut headers = vec![("accept".to_string(), "application/json".to_string())];
        if let Some(body) = &body {
            headers.push(("content-type".to_string(), body.content_type()));
        }
        if let Some(token) = self.session.token() {
            headers.push(("authorization".to_string(), format!("Bearer {token}")));
        }
        HttpRequest {
            method,
            url: format!("{}{}", self.config.base_url, path),
            query,
            headers,
            body,
        }
    }

    /// Send a built request and check its status.
    pub fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ClientError> {
        let url = request.full_url();
        let started = Instant::now();
        tracing::debug!(method = %request.method, url = %url, "api request");

        let response = match self.transport.execute(&request) {
            Ok(response) => response,
            Err(err) => {
                tracing::error!(
                    method = %request.method,
                    url = %url,
                    error = %err,
                    "api request failed without a response"
                );
                return Err(err.into());
            }
        };

        tracing::debug!(
            status = response.status,
            url = %url,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "api response"
        );
        self.check_status(response, &url)
    }

    pub fn get<T: DeserializeOwned>(&self, path: &str, query: Query) -> Result<T, ClientError> {
        let request = self.request(HttpMethod::Get, path, query, None);
        decode(&self.execute(request)?)
    }

    pub fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.request(HttpMethod::Post, path, Query::new(), Some(encode(body)?));
        decode(&self.execute(request)?)
    }

    /// POST without a body, for action endpoints like `{id}/like`.
    pub fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let request = self.request(HttpMethod::Post, path, Query::new(), None);
        decode(&self.execute(request)?)
    }

    pub fn put<B, T>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.request(HttpMethod::Put, path, Query::new(), Some(encode(body)?));
        decode(&self.execute(request)?)
    }

    pub fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let request = self.request(HttpMethod::Delete, path, Query::new(), None);
        decode(&self.execute(request)?)
    }

    pub fn upload<T: DeserializeOwned>(&self, path: &str, form: MultipartForm) -> Result<T, ClientError> {
        let request = self.request(
            HttpMethod::Post,
            path,
            Query::new(),
            Some(RequestBody::Multipart(form)),
        );
        decode(&self.execute(request)?)
    }

    fn check_status(&self, response: HttpResponse, url: &str) -> Result<HttpResponse, ClientError> {
        if response.is_success() {
            return Ok(response);
        }
        tracing::warn!(status = response.status, url = %url, "api error response");
        match response.status {
            401 => {
                self.session.invalidate();
                Err(ClientError::Unauthorized {
                    body: response.body,
                })
            }
            404 => Err(ClientError::NotFound),
            status => Err(ClientError::Http {
                status,
                body: response.body,
            }),
        }
    }
}

fn encode<B: Serialize + ?Sized>(body: &B) -> Result<RequestBody, ClientError> {
    serde_json::to_string(body)
        .map(RequestBody::Json)
        .map_err(|e| ClientError::Serialization(e.to_string()))
}

/// An empty body decodes as JSON `null`, so `()` works for 204 responses.
fn decode<T: DeserializeOwned>(response: &HttpResponse) -> Result<T, ClientError> {
    let body = response.body.trim();
    let body = if body.is_empty() { "null" } else { body };
    serde_json::from_str(body).map_err(|e| ClientError::Deserialization(e.to_string()))
}
