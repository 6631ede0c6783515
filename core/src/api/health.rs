//! Health checks against each backend service.

use crate::api::Service;
use crate::client::HttpClient;
use crate::error::{ApiError, Operation};
use crate::http::Query;
use crate::types::HealthStatus;

/// `GET /{service}/health` on each backend service.
#[derive(Debug, Clone)]
pub struct HealthApi {
    http: HttpClient,
}

impl HealthApi {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    pub fn check(&self, service: Service) -> Result<HealthStatus, ApiError> {
        self.http
            .get(&service.path("health"), Query::new())
            .map_err(|e| ApiError::new(Operation::HealthCheck, e))
    }

    /// Check every service; failures are reported per service, not raised.
    pub fn check_all(&self) -> Vec<(Service, Result<HealthStatus, ApiError>)> {
        Service::ALL
            .iter()
            .map(|service| (*service, self.check(*service)))
            .collect()
    }
}
