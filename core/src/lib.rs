//! Client data layer for the ShareUpTime app.
//!
//! # Overview
//! Screens call resource API modules (or `FeedController`), which go through
//! a single `HttpClient` to the backend services. Results land in a
//! Redux-style `Store` whose slices hold the locally cached posts and
//! comments.
//!
//! # Design
//! - `HttpClient` is constructed explicitly and injected into every API
//!   module. Its `Transport` is a trait object, so tests swap in
//!   `RecordingTransport` instead of mocking a global.
//! - Every resource module fails with `ApiError`, which keeps the original
//!   `ClientError` as its source and adds a fixed user-facing message.
//! - The store is plain owned data mutated through `&mut`; reducers are pure
//!   functions of (state, action).
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod feed;
pub mod http;
pub mod session;
pub mod store;
pub mod transport;
pub mod types;

pub use api::{AuthApi, HealthApi, PostsApi, Service, ShareUpApi, UsersApi};
pub use client::HttpClient;
pub use config::{ClientConfig, Environment};
pub use error::{ApiError, ClientError, ErrorKind, Operation, TransportError};
pub use feed::FeedController;
pub use http::{HttpMethod, HttpRequest, HttpResponse, MultipartForm, Query, RequestBody};
pub use session::{MemorySession, Session};
pub use store::{Action, AppState, Store};
pub use transport::{RecordingTransport, Transport, UreqTransport};
pub use types::{Comment, Page, Post, User};
