//! Typed resource modules over `HttpClient`.
//!
//! Each module turns domain calls into requests against one service prefix
//! and tags every failure with the `Operation` that produced it.

pub mod auth;
pub mod health;
pub mod posts;
pub mod users;

use std::fmt;

pub use auth::AuthApi;
pub use health::HealthApi;
pub use posts::PostsApi;
pub use users::UsersApi;

use crate::client::HttpClient;

/// Backend microservices, addressed by path prefix under the base URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Service {
    Auth,
    Users,
    Posts,
    Feed,
    Media,
    Notifications,
}

impl Service {
    pub const ALL: [Service; 6] = [
        Service::Auth,
        Service::Users,
        Service::Posts,
        Service::Feed,
        Service::Media,
        Service::Notifications,
    ];

    pub fn prefix(&self) -> &'static str {
        match self {
            Service::Auth => "/auth",
            Service::Users => "/users",
            Service::Posts => "/posts",
            Service::Feed => "/feed",
            Service::Media => "/media",
            Service::Notifications => "/notifications",
        }
    }

    /// `prefix/suffix`, or just the prefix when `suffix` is empty.
    pub fn path(&self, suffix: &str) -> String {
        if suffix.is_empty() {
            self.prefix().to_string()
        } else {
            format!("{}/{}", self.prefix(), suffix.trim_start_matches('/'))
        }
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix().trim_start_matches('/'))
    }
}

/// All resource modules sharing one client (and so one session).
#[derive(Debug, Clone)]
pub struct ShareUpApi {
    pub auth: AuthApi,
    pub posts: PostsApi,
    pub users: UsersApi,
    pub health: HealthApi,
}

impl ShareUpApi {
    pub fn new(http: HttpClient) -> Self {
        Self {
            auth: AuthApi::new(http.clone()),
            posts: PostsApi::new(http.clone()),
            users: UsersApi::new(http.clone()),
            health: HealthApi::new(http),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_paths() {
        assert_eq!(Service::Posts.path(""), "/posts");
        assert_eq!(Service::Posts.path("abc/like"), "/posts/abc/like");
        assert_eq!(Service::Users.path("/me"), "/users/me");
        assert_eq!(Service::Notifications.to_string(), "notifications");
    }
}
