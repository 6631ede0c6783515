//! Users service calls.

use uuid::Uuid;

use crate::api::Service;
use crate::client::HttpClient;
use crate::error::{ApiError, Operation};
use crate::http::{MultipartForm, Query};
use crate::types::{ChangePasswordRequest, FollowStatus, MediaUpload, MessageResponse, Page, UpdateProfile, User};

#[derive(Debug, Clone)]
pub struct UsersApi {
    http: HttpClient,
}

impl UsersApi {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    pub fn get_user(&self, id: Uuid) -> Result<User, ApiError> {
        self.http
            .get(&Service::Users.path(&id.to_string()), Query::new())
            .map_err(|e| ApiError::new(Operation::GetUser, e))
    }

    /// Profile of the user the session belongs to.
    pub fn get_me(&self) -> Result<User, ApiError> {
        self.http
            .get(&Service::Users.path("me"), Query::new())
            .map_err(|e| ApiError::new(Operation::GetMe, e))
    }

    pub fn update_profile(&self, update: &UpdateProfile) -> Result<User, ApiError> {
        self.http
            .put(&Service::Users.path("me"), update)
            .map_err(|e| ApiError::new(Operation::UpdateProfile, e))
    }

    pub fn search_users(&self, q: &str, page: u32, limit: u32) -> Result<Page<User>, ApiError> {
        let query = Query::new().with("q", q).with("page", page).with("limit", limit);
        self.http
            .get(&Service::Users.path("search"), query)
            .map_err(|e| ApiError::new(Operation::SearchUsers, e))
    }

    /// Toggle following `id`.
    pub fn follow_user(&self, id: Uuid) -> Result<FollowStatus, ApiError> {
        self.http
            .post_empty(&Service::Users.path(&format!("{id}/follow")))
            .map_err(|e| ApiError::new(Operation::FollowUser, e))
    }

    pub fn get_followers(&self, id: Uuid, page: u32, limit: u32) -> Result<Page<User>, ApiError> {
        self.http
            .get(&Service::Users.path(&format!("{id}/followers")), Query::paged(page, limit))
            .map_err(|e| ApiError::new(Operation::GetFollowers, e))
    }

    pub fn get_following(&self, id: Uuid, page: u32, limit: u32) -> Result<Page<User>, ApiError> {
        self.http
            .get(&Service::Users.path(&format!("{id}/following")), Query::paged(page, limit))
            .map_err(|e| ApiError::new(Operation::GetFollowing, e))
    }

    pub fn upload_avatar(
        &self,
        filename: &str,
        content_type: &str,
        data: Vec<u8>,
    ) -> Result<MediaUpload, ApiError> {
        let form = MultipartForm::new().file("file", filename, content_type, data);
        self.http
            .upload(&Service::Users.path("me/avatar"), form)
            .map_err(|e| ApiError::new(Operation::UploadAvatar, e))
    }

    /// Deletes the account and drops the local session.
    pub fn delete_account(&self) -> Result<(), ApiError> {
        self.http
            .delete::<()>(&Service::Users.path("me"))
            .map_err(|e| ApiError::new(Operation::DeleteAccount, e))?;
        self.http.session().invalidate();
        Ok(())
    }

    pub fn change_password(&self, current_password: &str, new_password: &str) -> Result<MessageResponse, ApiError> {
        let body = ChangePasswordRequest {
            current_password: current_password.to_string(),
            new_password: new_password.to_string(),
        };
        self.http
            .put(&Service::Users.path("me/password"), &body)
            .map_err(|e| ApiError::new(Operation::ChangePassword, e))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::config::ClientConfig;
    use crate::error::ErrorKind;
    use crate::http::HttpMethod;
    use crate::transport::RecordingTransport;

    fn api() -> (UsersApi, HttpClient, Arc<RecordingTransport>) {
        let transport = Arc::new(RecordingTransport::new());
        let config = ClientConfig::default().with_base_url("http://localhost:3000");
        let http = HttpClient::with_transport(config, transport.clone());
        (UsersApi::new(http.clone()), http, transport)
    }

    const USER: &str = r#"{"id":"00000000-0000-0000-0000-000000000007","username":"zeynep","email":"z@example.com","followersCount":3}"#;

    #[test]
    fn get_me_and_get_user() {
        let (api, _http, transport) = api();
        transport.respond(200, USER).respond(200, USER);

        let me = api.get_me().unwrap();
        assert_eq!(me.username, "zeynep");
        assert_eq!(me.followers_count, 3);
        api.get_user(me.id).unwrap();

        let urls: Vec<String> = transport.requests().into_iter().map(|r| r.url).collect();
        assert_eq!(
            urls,
            vec![
                "http://localhost:3000/users/me",
                "http://localhost:3000/users/00000000-0000-0000-0000-000000000007",
            ]
        );
    }

    #[test]
    fn search_encodes_query() {
        let (api, _http, transport) = api();
        transport.respond(200, r#"{"items":[],"hasMore":false,"total":0}"#);

        api.search_users("şule y", 1, 20).unwrap();
        assert_eq!(
            transport.last_request().unwrap().full_url(),
            "http://localhost:3000/users/search?q=%C5%9Fule%20y&page=1&limit=20"
        );
    }

    #[test]
    fn update_profile_uses_put() {
        let (api, _http, transport) = api();
        transport.respond(200, USER);

        api.update_profile(&UpdateProfile {
            bio: Some("hi".into()),
            ..Default::default()
        })
        .unwrap();
        let req = transport.last_request().unwrap();
        assert_eq!(req.method, HttpMethod::Put);
        assert_eq!(req.body.as_ref().and_then(|b| b.as_json()), Some(r#"{"bio":"hi"}"#));
    }

    #[test]
    fn followers_and_following_are_paged() {
        let (api, _http, transport) = api();
        let page = r#"{"items":[],"hasMore":false,"total":0}"#;
        transport.respond(200, page).respond(200, page);

        api.get_followers(Uuid::nil(), 2, 5).unwrap();
        api.get_following(Uuid::nil(), 1, 5).unwrap();
        let urls: Vec<String> = transport.requests().iter().map(|r| r.full_url()).collect();
        assert!(urls[0].ends_with("/users/00000000-0000-0000-0000-000000000000/followers?page=2&limit=5"));
        assert!(urls[1].ends_with("/users/00000000-0000-0000-0000-000000000000/following?page=1&limit=5"));
    }

    #[test]
    fn delete_account_drops_session() {
        let (api, http, transport) = api();
        http.session().store("tok");
        transport.respond(204, "");

        api.delete_account().unwrap();
        assert_eq!(http.session().token(), None);
    }

    #[test]
    fn change_password_error_keeps_server_detail() {
        let (api, _http, transport) = api();
        transport.respond(400, r#"{"error":"current password is wrong"}"#);

        let err = api.change_password("old", "new").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Client);
        assert_eq!(err.user_message(), "Şifre değiştirilemedi");
        assert_eq!(err.source.status(), Some(400));
    }

    #[test]
    fn follow_and_avatar() {
        let (api, _http, transport) = api();
        transport
            .respond(200, r#"{"isFollowing":true,"followersCount":4}"#)
            .respond(201, r#"{"url":"https://cdn.shareuptime.com/a.png"}"#);

        assert!(api.follow_user(Uuid::nil()).unwrap().is_following);
        let avatar = api.upload_avatar("a.png", "image/png", vec![1]).unwrap();
        assert_eq!(avatar.url, "https://cdn.shareuptime.com/a.png");
        assert_eq!(transport.last_request().unwrap().url, "http://localhost:3000/users/me/avatar");
    }
}
