//! Auth service calls. Successful login, register and refresh store the
//! returned token in the client's session; logout clears it.

use crate::api::Service;
use crate::client::HttpClient;
use crate::error::{ApiError, Operation};
use crate::http::Query;
use crate::types::{
    AuthSession, EmailRequest, LoginRequest, MessageResponse, RefreshRequest, RegisterRequest,
    ResetPasswordRequest, TokenValidation, VerifyEmailRequest,
};

#[derive(Debug, Clone)]
pub struct AuthApi {
    http: HttpClient,
}

impl AuthApi {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    pub fn login(&self, email: &str, password: &str) -> Result<AuthSession, ApiError> {
        let body = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let session: AuthSession = self
            .http
            .post(&Service::Auth.path("login"), &body)
            .map_err(|e| ApiError::new(Operation::Login, e))?;
        self.http.session().store(&session.token);
        Ok(session)
    }

    pub fn register(&self, request: &RegisterRequest) -> Result<AuthSession, ApiError> {
        let session: AuthSession = self
            .http
            .post(&Service::Auth.path("register"), request)
            .map_err(|e| ApiError::new(Operation::Register, e))?;
        self.http.session().store(&session.token);
        Ok(session)
    }

    /// The local session is cleared even when the server call fails.
    pub fn logout(&self) -> Result<(), ApiError> {
        let result = self
            .http
            .post_empty::<Option<MessageResponse>>(&Service::Auth.path("logout"))
            .map(|_| ())
            .map_err(|e| ApiError::new(Operation::Logout, e));
        self.http.session().invalidate();
        result
    }

    pub fn refresh(&self, refresh_token: &str) -> Result<AuthSession, ApiError> {
        let body = RefreshRequest {
            refresh_token: refresh_token.to_string(),
        };
        let session: AuthSession = self
            .http
            .post(&Service::Auth.path("refresh"), &body)
            .map_err(|e| ApiError::new(Operation::RefreshToken, e))?;
        self.http.session().store(&session.token);
        Ok(session)
    }

    pub fn forgot_password(&self, email: &str) -> Result<MessageResponse, ApiError> {
        let body = EmailRequest {
            email: email.to_string(),
        };
        self.http
            .post(&Service::Auth.path("forgot-password"), &body)
            .map_err(|e| ApiError::new(Operation::ForgotPassword, e))
    }

    pub fn reset_password(&self, token: &str, new_password: &str) -> Result<MessageResponse, ApiError> {
        let body = ResetPasswordRequest {
            token: token.to_string(),
            new_password: new_password.to_string(),
        };
        self.http
            .post(&Service::Auth.path("reset-password"), &body)
            .map_err(|e| ApiError::new(Operation::ResetPassword, e))
    }

    pub fn verify_email(&self, token: &str) -> Result<MessageResponse, ApiError> {
        let body = VerifyEmailRequest {
            token: token.to_string(),
        };
        self.http
            .post(&Service::Auth.path("verify-email"), &body)
            .map_err(|e| ApiError::new(Operation::VerifyEmail, e))
    }

    pub fn resend_verification(&self, email: &str) -> Result<MessageResponse, ApiError> {
        let body = EmailRequest {
            email: email.to_string(),
        };
        self.http
            .post(&Service::Auth.path("resend-verification"), &body)
            .map_err(|e| ApiError::new(Operation::ResendVerification, e))
    }

    /// Ask the server whether the stored token is still valid.
    pub fn validate(&self) -> Result<TokenValidation, ApiError> {
        self.http
            .get(&Service::Auth.path("validate"), Query::new())
            .map_err(|e| ApiError::new(Operation::ValidateToken, e))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::config::ClientConfig;
    use crate::error::ErrorKind;
    use crate::http::HttpMethod;
    use crate::transport::RecordingTransport;

    fn api() -> (AuthApi, HttpClient, Arc<RecordingTransport>) {
        let transport = Arc::new(RecordingTransport::new());
        let config = ClientConfig::default().with_base_url("http://localhost:3000");
        let http = HttpClient::with_transport(config, transport.clone());
        (AuthApi::new(http.clone()), http, transport)
    }

    fn session_json() -> serde_json::Value {
        json!({
            "user": {
                "id": "00000000-0000-0000-0000-000000000001",
                "username": "mehmet",
                "email": "mehmet@example.com"
            },
            "token": "access-1",
            "refreshToken": "refresh-1"
        })
    }

    #[test]
    fn login_stores_token() {
        let (api, http, transport) = api();
        transport.respond_json(200, &session_json());

        let session = api.login("mehmet@example.com", "secret").unwrap();
        assert_eq!(session.user.username, "mehmet");
        assert_eq!(http.session().token().as_deref(), Some("access-1"));

        let req = transport.last_request().unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.url, "http://localhost:3000/auth/login");
    }

    #[test]
    fn failed_login_is_tagged_and_keeps_cause() {
        let (api, http, transport) = api();
        transport.respond(401, r#"{"error":"invalid credentials"}"#);

        let err = api.login("mehmet@example.com", "wrong").unwrap_err();
        assert_eq!(err.operation, Operation::Login);
        assert_eq!(err.kind(), ErrorKind::Unauthorized);
        assert!(err.to_string().contains("invalid credentials"));
        assert_eq!(http.session().token(), None);
    }

    #[test]
    fn logout_clears_session_even_on_failure() {
        let (api, http, transport) = api();
        http.session().store("access-1");
        transport.respond(500, "down");

        let err = api.logout().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Server);
        assert_eq!(http.session().token(), None);
    }

    #[test]
    fn logout_accepts_empty_body() {
        let (api, _http, transport) = api();
        transport.respond(204, "");
        api.logout().unwrap();
    }

    #[test]
    fn password_flows_hit_their_endpoints() {
        let (api, _http, transport) = api();
        for _ in 0..4 {
            transport.respond(200, r#"{"message":"ok"}"#);
        }

        api.forgot_password("a@b.c").unwrap();
        api.reset_password("reset-token", "n3w").unwrap();
        api.verify_email("verify-token").unwrap();
        api.resend_verification("a@b.c").unwrap();

        let urls: Vec<String> = transport.requests().into_iter().map(|r| r.url).collect();
        assert_eq!(
            urls,
            vec![
                "http://localhost:3000/auth/forgot-password",
                "http://localhost:3000/auth/reset-password",
                "http://localhost:3000/auth/verify-email",
                "http://localhost:3000/auth/resend-verification",
            ]
        );
        let reset = &transport.requests()[1];
        let body: serde_json::Value =
            serde_json::from_str(reset.body.as_ref().and_then(|b| b.as_json()).unwrap()).unwrap();
        assert_eq!(body, json!({"token": "reset-token", "newPassword": "n3w"}));
    }

    #[test]
    fn validate_uses_get() {
        let (api, http, transport) = api();
        http.session().store("access-1");
        transport.respond(200, r#"{"valid":true}"#);

        let out = api.validate().unwrap();
        assert!(out.valid);
        assert!(out.user.is_none());
        let req = transport.last_request().unwrap();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.header("authorization"), Some("Bearer access-1"));
    }

    #[test]
    fn refresh_replaces_token() {
        let (api, http, transport) = api();
        http.session().store("old");
        transport.respond_json(200, &session_json());

        api.refresh("refresh-0").unwrap();
        assert_eq!(http.session().token().as_deref(), Some("access-1"));
    }
}
