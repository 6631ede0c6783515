//! Client configuration: which backend to talk to and how long to wait.

use std::env;
use std::time::Duration;

pub const DEVELOPMENT_BASE_URL: &str = "http://localhost:3000";
pub const PRODUCTION_BASE_URL: &str = "https://api.shareuptime.com";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Build mode the client runs in. Selects the default base URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    /// Development for debug builds, production otherwise.
    pub fn current() -> Self {
        if cfg!(debug_assertions) {
            Environment::Development
        } else {
            Environment::Production
        }
    }

    pub fn base_url(&self) -> &'static str {
        match self {
            Environment::Development => DEVELOPMENT_BASE_URL,
            Environment::Production => PRODUCTION_BASE_URL,
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Some(Environment::Development),
            "production" | "prod" => Some(Environment::Production),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub environment: Environment,
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::for_environment(Environment::current())
    }
}

impl ClientConfig {
    pub fn for_environment(environment: Environment) -> Self {
        Self {
            environment,
            base_url: environment.base_url().to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Point the client at an arbitrary base URL (a mock server, a staging
    /// host). A trailing slash is stripped.
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Defaults by build mode, overridden by `SHAREUP_ENV`,
    /// `SHAREUP_API_URL` and `SHAREUP_TIMEOUT_SECS` when set. Unparseable
    /// values are ignored with a warning.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let environment = match lookup("SHAREUP_ENV") {
            Some(raw) => Environment::parse(&raw).unwrap_or_else(|| {
                tracing::warn!(value = %raw, "unknown SHAREUP_ENV, using build default");
                Environment::current()
            }),
            None => Environment::current(),
        };
        let mut config = Self::for_environment(environment);

        if let Some(url) = lookup("SHAREUP_API_URL") {
            config = config.with_base_url(&url);
        }
        if let Some(raw) = lookup("SHAREUP_TIMEOUT_SECS") {
            match raw.trim().parse::<u64>() {
                Ok(secs) => config.timeout = Duration::from_secs(secs),
                Err(_) => tracing::warn!(value = %raw, "invalid SHAREUP_TIMEOUT_SECS, keeping default"),
            }
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn environments_pick_their_base_url() {
        let dev = ClientConfig::for_environment(Environment::Development);
        let prod = ClientConfig::for_environment(Environment::Production);
        assert_eq!(dev.base_url, "http://localhost:3000");
        assert_eq!(prod.base_url, "https://api.shareuptime.com");
        assert_eq!(dev.timeout, Duration::from_secs(10));
    }

    #[test]
    fn env_overrides_are_applied() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("SHAREUP_ENV", "production"),
            ("SHAREUP_API_URL", "http://127.0.0.1:9999/"),
            ("SHAREUP_TIMEOUT_SECS", "3"),
        ]));
        assert_eq!(config.environment, Environment::Production);
        assert_eq!(config.base_url, "http://127.0.0.1:9999");
        assert_eq!(config.timeout, Duration::from_secs(3));
    }

    #[test]
    fn invalid_env_values_fall_back() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("SHAREUP_ENV", "staging"),
            ("SHAREUP_TIMEOUT_SECS", "soon"),
        ]));
        assert_eq!(config.environment, Environment::current());
        assert_eq!(config.timeout, DEFAULT_TIMEOUT);
    }
}
