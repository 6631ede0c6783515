//! In-memory backing store shared by every handler.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use axum::http::{header, HeaderMap, StatusCode};
use axum::Json;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::{ErrorBody, Post, User};

pub type Db = Arc<RwLock<Store>>;

pub type ApiError = (StatusCode, Json<ErrorBody>);
pub type ApiResult<T> = Result<T, ApiError>;

pub fn error(status: StatusCode, message: &str) -> ApiError {
    (
        status,
        Json(ErrorBody {
            error: message.to_string(),
        }),
    )
}

#[derive(Clone, Debug)]
pub struct StoredUser {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password: String,
    pub full_name: Option<String>,
    pub avatar: Option<String>,
    pub bio: Option<String>,
    pub is_verified: bool,
}

#[derive(Clone, Debug)]
pub struct StoredPost {
    pub id: Uuid,
    pub author_id: Uuid,
    pub content: String,
    pub images: Vec<String>,
    pub videos: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub shares: u32,
    pub comments: u32,
    pub liked_by: HashSet<Uuid>,
    pub bookmarked_by: HashSet<Uuid>,
}

#[derive(Debug, Default)]
pub struct Store {
    pub users: HashMap<Uuid, StoredUser>,
    pub access_tokens: HashMap<String, Uuid>,
    pub refresh_tokens: HashMap<String, Uuid>,
    /// Newest first.
    pub posts: Vec<StoredPost>,
    /// (follower, followee)
    pub follows: HashSet<(Uuid, Uuid)>,
}

impl Store {
    pub fn shared() -> Db {
        Arc::new(RwLock::new(Store::default()))
    }

    /// User id behind the `Authorization: Bearer` header, if any.
    pub fn viewer(&self, headers: &HeaderMap) -> Option<Uuid> {
        let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
        let token = value.strip_prefix("Bearer ")?;
        self.access_tokens.get(token).copied()
    }

    pub fn require_viewer(&self, headers: &HeaderMap) -> ApiResult<Uuid> {
        self.viewer(headers)
            .ok_or_else(|| error(StatusCode::UNAUTHORIZED, "missing or invalid token"))
    }

    pub fn issue_tokens(&mut self, user_id: Uuid) -> (String, String) {
        let access = format!("at-{}", Uuid::new_v4().simple());
        let refresh = format!("rt-{}", Uuid::new_v4().simple());
        self.access_tokens.insert(access.clone(), user_id);
        self.refresh_tokens.insert(refresh.clone(), user_id);
        (access, refresh)
    }

    pub fn find_by_email(&self, email: &str) -> Option<&StoredUser> {
        self.users.values().find(|u| u.email.eq_ignore_ascii_case(email))
    }

    pub fn username_taken(&self, username: &str, except: Option<Uuid>) -> bool {
        self.users
            .values()
            .any(|u| Some(u.id) != except && u.username.eq_ignore_ascii_case(username))
    }

    pub fn followers_of(&self, id: Uuid) -> Vec<Uuid> {
        self.follows
            .iter()
            .filter(|(_, followee)| *followee == id)
            .map(|(follower, _)| *follower)
            .collect()
    }

    pub fn following_of(&self, id: Uuid) -> Vec<Uuid> {
        self.follows
            .iter()
            .filter(|(follower, _)| *follower == id)
            .map(|(_, followee)| *followee)
            .collect()
    }

    pub fn user_view(&self, id: Uuid, viewer: Option<Uuid>) -> Option<User> {
        let user = self.users.get(&id)?;
        Some(User {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            full_name: user.full_name.clone(),
            avatar: user.avatar.clone(),
            bio: user.bio.clone(),
            followers_count: self.followers_of(id).len() as u32,
            following_count: self.following_of(id).len() as u32,
            posts_count: self.posts.iter().filter(|p| p.author_id == id).count() as u32,
            is_verified: user.is_verified,
            is_following: viewer.is_some_and(|v| self.follows.contains(&(v, id))),
        })
    }

    /// Users sorted by username, so pages are stable.
    pub fn user_views(&self, mut ids: Vec<Uuid>, viewer: Option<Uuid>) -> Vec<User> {
        ids.sort_by_key(|id| self.users.get(id).map(|u| u.username.to_lowercase()));
        ids.into_iter()
            .filter_map(|id| self.user_view(id, viewer))
            .collect()
    }

    pub fn post_view(&self, post: &StoredPost, viewer: Option<Uuid>) -> Post {
        let author = self.users.get(&post.author_id);
        Post {
            id: post.id,
            author_id: post.author_id,
            author_username: author.map(|a| a.username.clone()).unwrap_or_default(),
            author_avatar: author.and_then(|a| a.avatar.clone()),
            content: post.content.clone(),
            images: post.images.clone(),
            videos: post.videos.clone(),
            created_at: post.created_at,
            updated_at: post.updated_at,
            likes: post.liked_by.len() as u32,
            comments: post.comments,
            shares: post.shares,
            is_liked: viewer.is_some_and(|v| post.liked_by.contains(&v)),
            is_bookmarked: viewer.is_some_and(|v| post.bookmarked_by.contains(&v)),
        }
    }

    pub fn post_mut(&mut self, id: Uuid) -> ApiResult<&mut StoredPost> {
        self.posts
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| error(StatusCode::NOT_FOUND, "post not found"))
    }

    /// Drop the user with everything that references them.
    pub fn remove_user(&mut self, id: Uuid) {
        self.users.remove(&id);
        self.access_tokens.retain(|_, user| *user != id);
        self.refresh_tokens.retain(|_, user| *user != id);
        self.posts.retain(|p| p.author_id != id);
        for post in &mut self.posts {
            post.liked_by.remove(&id);
            post.bookmarked_by.remove(&id);
        }
        self.follows.retain(|(a, b)| *a != id && *b != id);
    }
}
