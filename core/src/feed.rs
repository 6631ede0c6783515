//! Screen-facing flows that pair a posts API call with store dispatches.
//!
//! Fetches are tagged with the sequence number of their `FetchPostsStart`,
//! so a completion that has been overtaken is dropped by the reducer.
//! Like, bookmark and share are applied optimistically and rolled back if
//! the server call fails.

use chrono::Utc;
use uuid::Uuid;

use crate::api::PostsApi;
use crate::error::ApiError;
use crate::store::{CommentsAction, PendingId, PostChange, PostsAction, Store};
use crate::types::{Comment, CreatePost, Post};

pub const DEFAULT_PAGE_SIZE: u32 = 20;

#[derive(Debug, Clone)]
pub struct FeedController {
    posts: PostsApi,
    page_size: u32,
}

impl FeedController {
    pub fn new(posts: PostsApi) -> Self {
        Self {
            posts,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Drop the cached feed and load page 1.
    pub fn refresh(&self, store: &mut Store) -> Result<(), ApiError> {
        store.dispatch(PostsAction::ResetPosts);
        self.fetch_page(store)
    }

    /// Load the next page. Does nothing while a fetch is running or once
    /// the server reported no more pages.
    pub fn load_more(&self, store: &mut Store) -> Result<(), ApiError> {
        let posts = &store.state().posts;
        if posts.loading || !posts.has_more {
            return Ok(());
        }
        self.fetch_page(store)
    }

    fn fetch_page(&self, store: &mut Store) -> Result<(), ApiError> {
        store.dispatch(PostsAction::FetchPostsStart);
        let request = Some(store.state().posts.latest_request());
        let page = store.state().posts.page;

        match self.posts.get_posts(page, self.page_size) {
            Ok(result) => {
                tracing::debug!(page, count = result.items.len(), has_more = result.has_more, "feed page loaded");
                store.dispatch(PostsAction::FetchPostsSuccess {
                    posts: result.items,
                    has_more: result.has_more,
                    request,
                });
                Ok(())
            }
            Err(err) => {
                tracing::warn!(page, error = %err, "feed page failed");
                store.dispatch(PostsAction::FetchPostsFailure {
                    error: err.user_message().to_string(),
                    request,
                });
                Err(err)
            }
        }
    }

    pub fn toggle_like(&self, store: &mut Store, post_id: Uuid) -> Result<(), ApiError> {
        self.optimistic(store, post_id, PostChange::ToggleLike, |api| {
            api.like_post(post_id).map(|_| ())
        })
    }

    pub fn toggle_bookmark(&self, store: &mut Store, post_id: Uuid) -> Result<(), ApiError> {
        self.optimistic(store, post_id, PostChange::ToggleBookmark, |api| {
            api.bookmark_post(post_id).map(|_| ())
        })
    }

    pub fn share(&self, store: &mut Store, post_id: Uuid) -> Result<(), ApiError> {
        self.optimistic(store, post_id, PostChange::IncrementShare, |api| {
            api.share_post(post_id).map(|_| ())
        })
    }

    fn optimistic(
        &self,
        store: &mut Store,
        post_id: Uuid,
        change: PostChange,
        call: impl FnOnce(&PostsApi) -> Result<(), ApiError>,
    ) -> Result<(), ApiError> {
        let pending = PendingId::new();
        store.dispatch(PostsAction::ApplyOptimistic {
            pending,
            post_id,
            change,
        });
        match call(&self.posts) {
            Ok(()) => {
                store.dispatch(PostsAction::ConfirmOptimistic(pending));
                Ok(())
            }
            Err(err) => {
                tracing::warn!(%post_id, ?change, %pending, error = %err, "rolling back optimistic change");
                store.dispatch(PostsAction::RollbackOptimistic(pending));
                Err(err)
            }
        }
    }

    pub fn create_post(&self, store: &mut Store, input: &CreatePost) -> Result<Post, ApiError> {
        let post = self.posts.create_post(input)?;
        store.dispatch(PostsAction::AddPost(post.clone()));
        Ok(post)
    }

    /// Removed locally only after the server confirms.
    pub fn delete_post(&self, store: &mut Store, post_id: Uuid) -> Result<(), ApiError> {
        self.posts.delete_post(post_id)?;
        store.dispatch(PostsAction::DeletePost(post_id));
        Ok(())
    }

    /// Local-only: there is no comments endpoint.
    pub fn add_comment(&self, store: &mut Store, post_id: Uuid, author_id: Uuid, text: &str) -> Comment {
        let comment = Comment {
            id: Uuid::new_v4(),
            post_id,
            text: text.to_string(),
            author_id,
            created_at: Utc::now(),
        };
        store.dispatch(CommentsAction::AddComment(comment.clone()));
        store.dispatch(PostsAction::IncrementComment(post_id));
        comment
    }
}
