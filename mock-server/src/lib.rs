//! In-memory stand-in for the ShareUpTime backend services.
//!
//! `app()` serves every resource route from one process. `stub(service)` is
//! the bare per-service health server: a single `GET /health`.

pub mod auth;
pub mod models;
pub mod posts;
pub mod state;
pub mod users;

use axum::{extract::State, routing::get, Json, Router};
use tokio::net::TcpListener;

pub use models::{HealthBody, PageBody, Post, User};
pub use state::{Db, Store};

/// Backend services: name and default stub port.
pub const SERVICES: [(&str, u16); 6] = [
    ("auth", 3001),
    ("users", 3002),
    ("posts", 3003),
    ("feed", 3004),
    ("media", 3005),
    ("notifications", 3006),
];

pub fn default_port(service: &str) -> Option<u16> {
    SERVICES
        .iter()
        .find(|(name, _)| *name == service)
        .map(|(_, port)| *port)
}

pub fn app() -> Router {
    app_with_store(Store::shared())
}

/// Full API over a caller-provided store, so tests can seed or inspect it.
pub fn app_with_store(db: Db) -> Router {
    let mut router = Router::new()
        .route("/health", get(|| health("mock-server")))
        .merge(auth::routes())
        .merge(posts::routes())
        .merge(users::routes());
    for (service, _) in SERVICES {
        router = router.route(&format!("/{service}/health"), get(move || health(service)));
    }
    router.with_state(db)
}

/// Single-route health server for one service.
pub fn stub(service: &'static str) -> Router {
    Router::new()
        .route("/health", get(|State(name): State<&'static str>| health(name)))
        .with_state(service)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

pub async fn run_stub(listener: TcpListener, service: &'static str) -> Result<(), std::io::Error> {
    axum::serve(listener, stub(service)).await
}

async fn health(service: &str) -> Json<HealthBody> {
    Json(HealthBody {
        status: "ok".to_string(),
        service: service.to_string(),
    })
}
