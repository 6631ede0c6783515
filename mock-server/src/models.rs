//! Wire types served by the mock backend. camelCase on the wire.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    pub followers_count: u32,
    pub following_count: u32,
    pub posts_count: u32,
    pub is_verified: bool,
    pub is_following: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: Uuid,
    pub author_id: Uuid,
    pub author_username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_avatar: Option<String>,
    pub content: String,
    pub images: Vec<String>,
    pub videos: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub likes: u32,
    pub comments: u32,
    pub shares: u32,
    pub is_liked: bool,
    pub is_bookmarked: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageBody<T> {
    pub items: Vec<T>,
    pub has_more: bool,
    pub total: u64,
}

impl<T> PageBody<T> {
    /// Slice `items` into 1-based page `page` of size `limit`. Page 0 is
    /// treated as page 1, limit 0 as 20.
    pub fn paginate(items: Vec<T>, page: u32, limit: u32) -> Self {
        let page = page.max(1) as usize;
        let limit = if limit == 0 { 20 } else { limit as usize };
        let total = items.len();
        let start = (page - 1).saturating_mul(limit).min(total);
        let items: Vec<T> = items.into_iter().skip(start).take(limit).collect();
        let has_more = start + items.len() < total;
        Self {
            items,
            has_more,
            total: total as u64,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct PageParams {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
    #[serde(default)]
    pub q: Option<String>,
}

fn default_page() -> u32 {
    1
}

fn default_limit() -> u32 {
    20
}

// --- requests ---

#[derive(Debug, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterBody {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub full_name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshBody {
    pub refresh_token: String,
}

#[derive(Debug, Deserialize)]
pub struct EmailBody {
    pub email: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetBody {
    pub token: String,
    pub new_password: String,
}

#[derive(Debug, Deserialize)]
pub struct TokenBody {
    pub token: String,
}

#[derive(Debug, Deserialize)]
pub struct CreatePostBody {
    pub content: String,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub videos: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileBody {
    pub full_name: Option<String>,
    pub bio: Option<String>,
    pub username: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordBody {
    pub current_password: String,
    pub new_password: String,
}

// --- responses ---

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthBody {
    pub user: User,
    pub token: String,
    pub refresh_token: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageBody {
    pub message: String,
}

impl MessageBody {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ValidateBody {
    pub valid: bool,
    pub user: Option<User>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeBody {
    pub is_liked: bool,
    pub likes: u32,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookmarkBody {
    pub is_bookmarked: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ShareBody {
    pub shares: u32,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowBody {
    pub is_following: bool,
    pub followers_count: u32,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaBody {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealthBody {
    pub status: String,
    pub service: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paginate_middle_and_last_page() {
        let page = PageBody::paginate((1..=5).collect::<Vec<u32>>(), 2, 2);
        assert_eq!(page.items, vec![3, 4]);
        assert!(page.has_more);
        assert_eq!(page.total, 5);

        let last = PageBody::paginate((1..=5).collect::<Vec<u32>>(), 3, 2);
        assert_eq!(last.items, vec![5]);
        assert!(!last.has_more);
    }

    #[test]
    fn paginate_past_the_end_is_empty() {
        let page = PageBody::paginate(vec![1, 2], 9, 10);
        assert!(page.items.is_empty());
        assert!(!page.has_more);
    }

    #[test]
    fn page_params_default() {
        let params: PageParams = serde_json::from_str("{}").unwrap();
        assert_eq!(params.page, 1);
        assert_eq!(params.limit, 20);
        assert!(params.q.is_none());
    }

    #[test]
    fn register_body_full_name_optional() {
        let body: RegisterBody =
            serde_json::from_str(r#"{"username":"a","email":"a@b.c","password":"secret1"}"#).unwrap();
        assert!(body.full_name.is_none());
    }
}
