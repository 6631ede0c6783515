//! `/auth` routes. Tokens are opaque random strings held in memory.

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;

use crate::models::{
    AuthBody, Credentials, EmailBody, MessageBody, RefreshBody, RegisterBody, ResetBody, TokenBody,
    ValidateBody,
};
use crate::state::{error, ApiResult, Db, StoredUser};

const MIN_PASSWORD_LEN: usize = 6;

pub fn routes() -> Router<Db> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/register", post(register))
        .route("/auth/logout", post(logout))
        .route("/auth/refresh", post(refresh))
        .route("/auth/forgot-password", post(forgot_password))
        .route("/auth/reset-password", post(reset_password))
        .route("/auth/verify-email", post(verify_email))
        .route("/auth/resend-verification", post(resend_verification))
        .route("/auth/validate", get(validate))
}

async fn register(
    State(db): State<Db>,
    Json(input): Json<RegisterBody>,
) -> ApiResult<(StatusCode, Json<AuthBody>)> {
    let username = input.username.trim();
    if username.is_empty() || !input.email.contains('@') {
        return Err(error(StatusCode::BAD_REQUEST, "username and a valid email are required"));
    }
    if input.password.len() < MIN_PASSWORD_LEN {
        return Err(error(StatusCode::BAD_REQUEST, "password too short"));
    }

    let mut db = db.write().await;
    if db.find_by_email(&input.email).is_some() || db.username_taken(username, None) {
        return Err(error(StatusCode::CONFLICT, "username or email already registered"));
    }

    let user = StoredUser {
        id: Uuid::new_v4(),
        username: username.to_string(),
        email: input.email.trim().to_string(),
        password: input.password,
        full_name: input.full_name,
        avatar: None,
        bio: None,
        is_verified: false,
    };
    let id = user.id;
    db.users.insert(id, user);
    let (token, refresh_token) = db.issue_tokens(id);
    tracing::info!(user_id = %id, "user registered");

    let user = db
        .user_view(id, Some(id))
        .ok_or_else(|| error(StatusCode::INTERNAL_SERVER_ERROR, "user vanished"))?;
    Ok((
        StatusCode::CREATED,
        Json(AuthBody {
            user,
            token,
            refresh_token,
        }),
    ))
}

async fn login(State(db): State<Db>, Json(input): Json<Credentials>) -> ApiResult<Json<AuthBody>> {
    let mut db = db.write().await;
    let id = match db.find_by_email(&input.email) {
        Some(user) if user.password == input.password => user.id,
        _ => return Err(error(StatusCode::UNAUTHORIZED, "invalid credentials")),
    };
    let (token, refresh_token) = db.issue_tokens(id);
    let user = db
        .user_view(id, Some(id))
        .ok_or_else(|| error(StatusCode::INTERNAL_SERVER_ERROR, "user vanished"))?;
    Ok(Json(AuthBody {
        user,
        token,
        refresh_token,
    }))
}

async fn logout(State(db): State<Db>, headers: HeaderMap) -> ApiResult<StatusCode> {
    let mut db = db.write().await;
    let viewer = db.require_viewer(&headers)?;
    db.access_tokens.retain(|_, user| *user != viewer);
    db.refresh_tokens.retain(|_, user| *user != viewer);
    Ok(StatusCode::NO_CONTENT)
}

async fn refresh(State(db): State<Db>, Json(input): Json<RefreshBody>) -> ApiResult<Json<AuthBody>> {
    let mut db = db.write().await;
    let id = db
        .refresh_tokens
        .remove(&input.refresh_token)
        .ok_or_else(|| error(StatusCode::UNAUTHORIZED, "invalid refresh token"))?;
    let (token, refresh_token) = db.issue_tokens(id);
    let user = db
        .user_view(id, Some(id))
        .ok_or_else(|| error(StatusCode::UNAUTHORIZED, "user no longer exists"))?;
    Ok(Json(AuthBody {
        user,
        token,
        refresh_token,
    }))
}

/// Always succeeds so the response does not reveal which emails exist.
async fn forgot_password(Json(input): Json<EmailBody>) -> Json<MessageBody> {
    tracing::info!(email = %input.email, "password reset requested");
    Json(MessageBody::new("If the address is registered, a reset link has been sent"))
}

async fn reset_password(Json(input): Json<ResetBody>) -> ApiResult<Json<MessageBody>> {
    if input.token.trim().is_empty() {
        return Err(error(StatusCode::BAD_REQUEST, "reset token required"));
    }
    if input.new_password.len() < MIN_PASSWORD_LEN {
        return Err(error(StatusCode::BAD_REQUEST, "password too short"));
    }
    Ok(Json(MessageBody::new("Password has been reset")))
}

async fn verify_email(Json(input): Json<TokenBody>) -> ApiResult<Json<MessageBody>> {
    if input.token.trim().is_empty() {
        return Err(error(StatusCode::BAD_REQUEST, "verification token required"));
    }
    Ok(Json(MessageBody::new("Email verified")))
}

async fn resend_verification(Json(input): Json<EmailBody>) -> Json<MessageBody> {
    tracing::info!(email = %input.email, "verification email requested");
    Json(MessageBody::new("Verification email sent"))
}

async fn validate(State(db): State<Db>, headers: HeaderMap) -> ApiResult<Json<ValidateBody>> {
    let db = db.read().await;
    let viewer = db.require_viewer(&headers)?;
    Ok(Json(ValidateBody {
        valid: true,
        user: db.user_view(viewer, Some(viewer)),
    }))
}
