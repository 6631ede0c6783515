//! Error types for the ShareUpTime API client.
//!
//! # Design
//! Three layers, each wrapping the one below without discarding it:
//!
//! - `TransportError`: no response was received at all.
//! - `ClientError`: what `HttpClient` returns. Either a transport failure or
//!   a response the client could not turn into the expected value.
//! - `ApiError`: what every resource module returns. It tags a
//!   `ClientError` with the `Operation` that failed, which fixes the
//!   user-facing message. The original cause stays reachable via `source()`.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// Failures below HTTP: nothing came back from the server.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("network error: {0}")]
    Network(String),
}

/// Errors returned by `HttpClient`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The server returned 401. The session has already been invalidated.
    #[error("unauthorized: {body}")]
    Unauthorized { body: String },

    /// The server returned 404.
    #[error("resource not found")]
    NotFound,

    /// Any other non-2xx status.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),
}

impl ClientError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ClientError::Transport(TransportError::Timeout(_)) => ErrorKind::Timeout,
            ClientError::Transport(TransportError::Network(_)) => ErrorKind::Network,
            ClientError::Unauthorized { .. } => ErrorKind::Unauthorized,
            ClientError::NotFound => ErrorKind::NotFound,
            ClientError::Http { status, .. } if *status >= 500 => ErrorKind::Server,
            ClientError::Http { .. } => ErrorKind::Client,
            ClientError::Deserialization(_) => ErrorKind::Decode,
            ClientError::Serialization(_) => ErrorKind::Encode,
        }
    }

    /// HTTP status of the failed response, if one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Unauthorized { .. } => Some(401),
            ClientError::NotFound => Some(404),
            ClientError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Coarse classification of a failure, for callers that branch on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Network,
    Timeout,
    Unauthorized,
    NotFound,
    /// 4xx other than 401/404.
    Client,
    /// 5xx.
    Server,
    Decode,
    Encode,
}

/// Every call a resource module can make.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Login,
    Register,
    Logout,
    RefreshToken,
    ForgotPassword,
    ResetPassword,
    VerifyEmail,
    ResendVerification,
    ValidateToken,

    GetPosts,
    CreatePost,
    LikePost,
    BookmarkPost,
    SharePost,
    DeletePost,
    GetUserPosts,
    GetPost,
    UploadMedia,

    GetUser,
    GetMe,
    UpdateProfile,
    SearchUsers,
    FollowUser,
    GetFollowers,
    GetFollowing,
    UploadAvatar,
    DeleteAccount,
    ChangePassword,

    HealthCheck,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Login => "auth.login",
            Operation::Register => "auth.register",
            Operation::Logout => "auth.logout",
            Operation::RefreshToken => "auth.refresh",
            Operation::ForgotPassword => "auth.forgot_password",
            Operation::ResetPassword => "auth.reset_password",
            Operation::VerifyEmail => "auth.verify_email",
            Operation::ResendVerification => "auth.resend_verification",
            Operation::ValidateToken => "auth.validate",
            Operation::GetPosts => "posts.get_posts",
            Operation::CreatePost => "posts.create_post",
            Operation::LikePost => "posts.like_post",
            Operation::BookmarkPost => "posts.bookmark_post",
            Operation::SharePost => "posts.share_post",
            Operation::DeletePost => "posts.delete_post",
            Operation::GetUserPosts => "posts.get_user_posts",
            Operation::GetPost => "posts.get_post",
            Operation::UploadMedia => "posts.upload_media",
            Operation::GetUser => "users.get_user",
            Operation::GetMe => "users.get_me",
            Operation::UpdateProfile => "users.update_profile",
            Operation::SearchUsers => "users.search_users",
            Operation::FollowUser => "users.follow_user",
            Operation::GetFollowers => "users.get_followers",
            Operation::GetFollowing => "users.get_following",
            Operation::UploadAvatar => "users.upload_avatar",
            Operation::DeleteAccount => "users.delete_account",
            Operation::ChangePassword => "users.change_password",
            Operation::HealthCheck => "health.check",
        }
    }

    /// Fixed message shown to the user when this operation fails.
    pub fn user_message(&self) -> &'static str {
        match self {
            Operation::Login => "Giriş yapılamadı",
            Operation::Register => "Kayıt olunamadı",
            Operation::Logout => "Çıkış yapılamadı",
            Operation::RefreshToken => "Oturum yenilenemedi",
            Operation::ForgotPassword => "Şifre sıfırlama e-postası gönderilemedi",
            Operation::ResetPassword => "Şifre sıfırlanamadı",
            Operation::VerifyEmail => "E-posta doğrulanamadı",
            Operation::ResendVerification => "Doğrulama e-postası gönderilemedi",
            Operation::ValidateToken => "Oturum doğrulanamadı",
            Operation::GetPosts => "Gönderiler yüklenirken bir hata oluştu",
            Operation::CreatePost => "Gönderi oluşturulamadı",
            Operation::LikePost => "Beğeni işlemi başarısız oldu",
            Operation::BookmarkPost => "Kaydetme işlemi başarısız oldu",
            Operation::SharePost => "Paylaşım işlemi başarısız oldu",
            Operation::DeletePost => "Gönderi silinemedi",
            Operation::GetUserPosts => "Kullanıcı gönderileri yüklenemedi",
            Operation::GetPost => "Gönderi yüklenemedi",
            Operation::UploadMedia => "Medya yüklenemedi",
            Operation::GetUser | Operation::GetMe => "Kullanıcı bilgileri alınamadı",
            Operation::UpdateProfile => "Profil güncellenemedi",
            Operation::SearchUsers => "Kullanıcı araması başarısız oldu",
            Operation::FollowUser => "Takip işlemi başarısız oldu",
            Operation::GetFollowers => "Takipçiler yüklenemedi",
            Operation::GetFollowing => "Takip edilenler yüklenemedi",
            Operation::UploadAvatar => "Profil fotoğrafı yüklenemedi",
            Operation::DeleteAccount => "Hesap silinemedi",
            Operation::ChangePassword => "Şifre değiştirilemedi",
            Operation::HealthCheck => "Servis durumu alınamadı",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors returned by the resource API modules.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{operation} failed: {source}")]
pub struct ApiError {
    pub operation: Operation,
    #[source]
    pub source: ClientError,
}

impl ApiError {
    pub fn new(operation: Operation, source: ClientError) -> Self {
        Self { operation, source }
    }

    pub fn kind(&self) -> ErrorKind {
        self.source.kind()
    }

    pub fn user_message(&self) -> &'static str {
        self.operation.user_message()
    }
}
