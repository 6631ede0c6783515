use tokio::net::TcpListener;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// `SERVICE=<name>` runs that service's health stub on its own port;
/// otherwise the full mock API runs on 3000. `PORT` overrides either.
#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let service = match std::env::var("SERVICE") {
        Ok(name) => match mock_server::SERVICES.iter().find(|(s, _)| *s == name) {
            Some((service, _)) => Some(*service),
            None => {
                return Err(std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    format!("unknown SERVICE {name:?}"),
                ))
            }
        },
        Err(_) => None,
    };

    let default_port = service
        .and_then(mock_server::default_port)
        .unwrap_or(3000);
    let port = std::env::var("PORT").unwrap_or_else(|_| default_port.to_string());
    let addr = format!("127.0.0.1:{port}");
    let listener = TcpListener::bind(&addr).await?;

    match service {
        Some(service) => {
            tracing::info!(%addr, service, "health stub listening");
            mock_server::run_stub(listener, service).await
        }
        None => {
            tracing::info!(%addr, "mock API listening");
            mock_server::run(listener).await
        }
    }
}
