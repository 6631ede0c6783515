//! Posts service calls, plus media upload for post attachments.

use uuid::Uuid;

use crate::api::Service;
use crate::client::HttpClient;
use crate::error::{ApiError, Operation};
use crate::http::{MultipartForm, Query};
use crate::types::{BookmarkStatus, CreatePost, LikeStatus, MediaUpload, Page, Post, ShareStatus};

#[derive(Debug, Clone)]
pub struct PostsApi {
    http: HttpClient,
}

impl PostsApi {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    /// One page of the feed. The caller tracks which page comes next.
    pub fn get_posts(&self, page: u32, limit: u32) -> Result<Page<Post>, ApiError> {
        self.http
            .get(&Service::Posts.path(""), Query::paged(page, limit))
            .map_err(|e| ApiError::new(Operation::GetPosts, e))
    }

    pub fn create_post(&self, input: &CreatePost) -> Result<Post, ApiError> {
        self.http
            .post(&Service::Posts.path(""), input)
            .map_err(|e| ApiError::new(Operation::CreatePost, e))
    }

    /// Toggle the like on the server; returns the resulting state.
    pub fn like_post(&self, id: Uuid) -> Result<LikeStatus, ApiError> {
        self.http
            .post_empty(&Service::Posts.path(&format!("{id}/like")))
            .map_err(|e| ApiError::new(Operation::LikePost, e))
    }

    pub fn bookmark_post(&self, id: Uuid) -> Result<BookmarkStatus, ApiError> {
        self.http
            .post_empty(&Service::Posts.path(&format!("{id}/bookmark")))
            .map_err(|e| ApiError::new(Operation::BookmarkPost, e))
    }

    pub fn share_post(&self, id: Uuid) -> Result<ShareStatus, ApiError> {
        self.http
            .post_empty(&Service::Posts.path(&format!("{id}/share")))
            .map_err(|e| ApiError::new(Operation::SharePost, e))
    }

    pub fn delete_post(&self, id: Uuid) -> Result<(), ApiError> {
        self.http
            .delete(&Service::Posts.path(&id.to_string()))
            .map_err(|e| ApiError::new(Operation::DeletePost, e))
    }

    pub fn get_user_posts(&self, user_id: Uuid, page: u32, limit: u32) -> Result<Page<Post>, ApiError> {
        self.http
            .get(
                &Service::Posts.path(&format!("user/{user_id}")),
                Query::paged(page, limit),
            )
            .map_err(|e| ApiError::new(Operation::GetUserPosts, e))
    }

    pub fn get_post(&self, id: Uuid) -> Result<Post, ApiError> {
        self.http
            .get(&Service::Posts.path(&id.to_string()), Query::new())
            .map_err(|e| ApiError::new(Operation::GetPost, e))
    }

    /// Upload an image or video to attach to a post. The returned URL goes
    /// into `CreatePost::images` / `videos`.
    pub fn upload_media(
        &self,
        filename: &str,
        content_type: &str,
        data: Vec<u8>,
    ) -> Result<MediaUpload, ApiError> {
        let form = MultipartForm::new().file("file", filename, content_type, data);
        self.http
            .upload(&Service::Media.path("upload"), form)
            .map_err(|e| ApiError::new(Operation::UploadMedia, e))
    }
}
