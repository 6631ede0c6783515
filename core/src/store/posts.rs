//! Posts slice: the locally cached, optimistically updated feed.
//!
//! # Fetch lifecycle
//! `FetchPostsStart` sets `loading`; `FetchPostsSuccess` or
//! `FetchPostsFailure` clears it. On success the list is replaced when the
//! current page is 1 or the result is empty, and appended otherwise. The
//! page counter advances on every accepted success, whatever page the caller
//! asked for.
//!
//! Each `FetchPostsStart` also bumps a request sequence number. Completions
//! that carry `request: Some(seq)` are dropped unless `seq` is the latest
//! one, so an overtaken fetch cannot clobber `page` / `has_more`.
//! Completions with `request: None` are always applied.
//!
//! # Optimistic changes
//! `ToggleLike` and friends mutate in place with no record. The tracked
//! form is `ApplyOptimistic`, which remembers the change under a
//! `PendingId` until `ConfirmOptimistic` forgets it or
//! `RollbackOptimistic` reverses it.

use std::fmt;

use uuid::Uuid;

use crate::types::Post;

/// Tag for one in-flight optimistic change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PendingId(Uuid);

impl PendingId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PendingId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PendingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A reversible edit to a single post.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostChange {
    ToggleLike,
    ToggleBookmark,
    IncrementShare,
    IncrementComment,
}

impl PostChange {
    fn apply(self, post: &mut Post) {
        match self {
            PostChange::ToggleLike => {
                if post.is_liked {
                    post.likes = post.likes.saturating_sub(1);
                } else {
                    post.likes = post.likes.saturating_add(1);
                }
                post.is_liked = !post.is_liked;
            }
            PostChange::ToggleBookmark => post.is_bookmarked = !post.is_bookmarked,
            PostChange::IncrementShare => post.shares = post.shares.saturating_add(1),
            PostChange::IncrementComment => post.comments = post.comments.saturating_add(1),
        }
    }

    fn revert(self, post: &mut Post) {
        match self {
            // Toggles are their own inverse.
            PostChange::ToggleLike | PostChange::ToggleBookmark => self.apply(post),
            PostChange::IncrementShare => post.shares = post.shares.saturating_sub(1),
            PostChange::IncrementComment => post.comments = post.comments.saturating_sub(1),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct PendingChange {
    id: PendingId,
    post_id: Uuid,
    change: PostChange,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PostsAction {
    FetchPostsStart,
    FetchPostsSuccess {
        posts: Vec<Post>,
        has_more: bool,
        request: Option<u64>,
    },
    FetchPostsFailure {
        error: String,
        request: Option<u64>,
    },
    SetPosts(Vec<Post>),
    /// Prepend a post (own post just created).
    AddPost(Post),
    /// Replace the post with the same id, if present.
    UpdatePost(Post),
    DeletePost(Uuid),
    ToggleLike(Uuid),
    ToggleBookmark(Uuid),
    IncrementShare(Uuid),
    IncrementComment(Uuid),
    ApplyOptimistic {
        pending: PendingId,
        post_id: Uuid,
        change: PostChange,
    },
    ConfirmOptimistic(PendingId),
    RollbackOptimistic(PendingId),
    ClearError,
    ResetPosts,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PostsState {
    pub posts: Vec<Post>,
    pub loading: bool,
    pub error: Option<String>,
    pub has_more: bool,
    /// Next page to request.
    pub page: u32,
    request_seq: u64,
    pending: Vec<PendingChange>,
}

impl Default for PostsState {
    fn default() -> Self {
        Self {
            posts: Vec::new(),
            loading: false,
            error: None,
            has_more: true,
            page: 1,
            request_seq: 0,
            pending: Vec::new(),
        }
    }
}

impl PostsState {
    /// Sequence number of the most recent `FetchPostsStart`.
    pub fn latest_request(&self) -> u64 {
        self.request_seq
    }

    pub fn get(&self, id: Uuid) -> Option<&Post> {
        self.posts.iter().find(|p| p.id == id)
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    fn get_mut(&mut self, id: Uuid) -> Option<&mut Post> {
        self.posts.iter_mut().find(|p| p.id == id)
    }

    fn is_stale(&self, request: Option<u64>) -> bool {
        matches!(request, Some(seq) if seq != self.request_seq)
    }

    fn change(&mut self, id: Uuid, change: PostChange) -> bool {
        match self.get_mut(id) {
            Some(post) => {
                change.apply(post);
                true
            }
            None => false,
        }
    }

    pub fn reduce(&mut self, action: PostsAction) {
        match action {
            PostsAction::FetchPostsStart => {
                self.loading = true;
                self.error = None;
                self.request_seq += 1;
            }
            PostsAction::FetchPostsSuccess {
                posts,
                has_more,
                request,
            } => {
                if self.is_stale(request) {
                    tracing::debug!(?request, latest = self.request_seq, "dropping stale posts page");
                    return;
                }
                if self.page == 1 || posts.is_empty() {
                    self.posts = posts;
                } else {
                    self.posts.extend(posts);
                }
                self.has_more = has_more;
                self.page += 1;
                self.loading = false;
            }
            PostsAction::FetchPostsFailure { error, request } => {
                if self.is_stale(request) {
                    tracing::debug!(?request, latest = self.request_seq, "dropping stale fetch failure");
                    return;
                }
                self.loading = false;
                self.error = Some(error);
            }
            PostsAction::SetPosts(posts) => self.posts = posts,
            PostsAction::AddPost(post) => self.posts.insert(0, post),
            PostsAction::UpdatePost(post) => {
                if let Some(existing) = self.get_mut(post.id) {
                    *existing = post;
                }
            }
            PostsAction::DeletePost(id) => {
                self.posts.retain(|p| p.id != id);
                self.pending.retain(|p| p.post_id != id);
            }
            PostsAction::ToggleLike(id) => {
                self.change(id, PostChange::ToggleLike);
            }
            PostsAction::ToggleBookmark(id) => {
                self.change(id, PostChange::ToggleBookmark);
            }
            PostsAction::IncrementShare(id) => {
                self.change(id, PostChange::IncrementShare);
            }
            PostsAction::IncrementComment(id) => {
                self.change(id, PostChange::IncrementComment);
            }
            PostsAction::ApplyOptimistic {
                pending,
                post_id,
                change,
            } => {
                if self.change(post_id, change) {
                    self.pending.push(PendingChange {
                        id: pending,
                        post_id,
                        change,
                    });
                }
            }
            PostsAction::ConfirmOptimistic(pending) => {
                self.pending.retain(|p| p.id != pending);
            }
            PostsAction::RollbackOptimistic(pending) => {
                let Some(index) = self.pending.iter().position(|p| p.id == pending) else {
                    return;
                };
                let record = self.pending.remove(index);
                if let Some(post) = self.get_mut(record.post_id) {
                    record.change.revert(post);
                }
            }
            PostsAction::ClearError => self.error = None,
            PostsAction::ResetPosts => {
                // The sequence survives so pre-reset fetches stay stale.
                let request_seq = self.request_seq;
                *self = Self::default();
                self.request_seq = request_seq;
            }
        }
    }
}
