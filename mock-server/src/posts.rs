//! `/posts` routes and `/media/upload`.

use axum::{
    extract::{Multipart, Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use std::collections::HashSet;
use uuid::Uuid;

use crate::models::{BookmarkBody, CreatePostBody, LikeBody, MediaBody, PageBody, PageParams, Post, ShareBody};
use crate::state::{error, ApiResult, Db, StoredPost};

pub const CDN_BASE: &str = "https://cdn.shareuptime.com";

pub fn routes() -> Router<Db> {
    Router::new()
        .route("/posts", get(list_posts).post(create_post))
        .route("/posts/{id}", get(get_post).delete(delete_post))
        .route("/posts/{id}/like", post(like_post))
        .route("/posts/{id}/bookmark", post(bookmark_post))
        .route("/posts/{id}/share", post(share_post))
        .route("/posts/user/{user_id}", get(user_posts))
        .route("/media/upload", post(upload_media))
}

async fn list_posts(
    State(db): State<Db>,
    headers: HeaderMap,
    Query(params): Query<PageParams>,
) -> Json<PageBody<Post>> {
    let db = db.read().await;
    let viewer = db.viewer(&headers);
    let posts = db.posts.iter().map(|p| db.post_view(p, viewer)).collect();
    Json(PageBody::paginate(posts, params.page, params.limit))
}

async fn create_post(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(input): Json<CreatePostBody>,
) -> ApiResult<(StatusCode, Json<Post>)> {
    let mut db = db.write().await;
    let viewer = db.require_viewer(&headers)?;
    let content = input.content.trim().to_string();
    if content.is_empty() && input.images.is_empty() && input.videos.is_empty() {
        return Err(error(StatusCode::BAD_REQUEST, "post is empty"));
    }

    let now = Utc::now();
    let post = StoredPost {
        id: Uuid::new_v4(),
        author_id: viewer,
        content,
        images: input.images,
        videos: input.videos,
        created_at: now,
        updated_at: now,
        shares: 0,
        comments: 0,
        liked_by: HashSet::new(),
        bookmarked_by: HashSet::new(),
    };
    let view = db.post_view(&post, Some(viewer));
    db.posts.insert(0, post);
    Ok((StatusCode::CREATED, Json(view)))
}

async fn get_post(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Post>> {
    let db = db.read().await;
    let viewer = db.viewer(&headers);
    db.posts
        .iter()
        .find(|p| p.id == id)
        .map(|p| Json(db.post_view(p, viewer)))
        .ok_or_else(|| error(StatusCode::NOT_FOUND, "post not found"))
}

async fn delete_post(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let mut db = db.write().await;
    let viewer = db.require_viewer(&headers)?;
    let author = db.post_mut(id)?.author_id;
    if author != viewer {
        return Err(error(StatusCode::FORBIDDEN, "only the author can delete a post"));
    }
    db.posts.retain(|p| p.id != id);
    Ok(StatusCode::NO_CONTENT)
}

async fn like_post(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<LikeBody>> {
    let mut db = db.write().await;
    let viewer = db.require_viewer(&headers)?;
    let post = db.post_mut(id)?;
    let is_liked = if post.liked_by.remove(&viewer) {
        false
    } else {
        post.liked_by.insert(viewer);
        true
    };
    Ok(Json(LikeBody {
        is_liked,
        likes: post.liked_by.len() as u32,
    }))
}

async fn bookmark_post(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<BookmarkBody>> {
    let mut db = db.write().await;
    let viewer = db.require_viewer(&headers)?;
    let post = db.post_mut(id)?;
    let is_bookmarked = if post.bookmarked_by.remove(&viewer) {
        false
    } else {
        post.bookmarked_by.insert(viewer);
        true
    };
    Ok(Json(BookmarkBody { is_bookmarked }))
}

async fn share_post(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ShareBody>> {
    let mut db = db.write().await;
    db.require_viewer(&headers)?;
    let post = db.post_mut(id)?;
    post.shares += 1;
    Ok(Json(ShareBody { shares: post.shares }))
}

async fn user_posts(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(user_id): Path<Uuid>,
    Query(params): Query<PageParams>,
) -> ApiResult<Json<PageBody<Post>>> {
    let db = db.read().await;
    if !db.users.contains_key(&user_id) {
        return Err(error(StatusCode::NOT_FOUND, "user not found"));
    }
    let viewer = db.viewer(&headers);
    let posts = db
        .posts
        .iter()
        .filter(|p| p.author_id == user_id)
        .map(|p| db.post_view(p, viewer))
        .collect();
    Ok(Json(PageBody::paginate(posts, params.page, params.limit)))
}

async fn upload_media(
    State(db): State<Db>,
    headers: HeaderMap,
    multipart: Multipart,
) -> ApiResult<(StatusCode, Json<MediaBody>)> {
    db.read().await.require_viewer(&headers)?;
    let file = read_file(multipart).await?;
    let url = format!("{CDN_BASE}/media/{}/{}", Uuid::new_v4().simple(), file.filename);
    tracing::debug!(%url, size = file.size, "media stored");
    Ok((
        StatusCode::CREATED,
        Json(MediaBody {
            url,
            content_type: file.content_type,
        }),
    ))
}

pub struct UploadedFile {
    pub filename: String,
    pub content_type: Option<String>,
    pub size: usize,
}

/// Read the `file` field of a multipart body.
pub async fn read_file(mut multipart: Multipart) -> ApiResult<UploadedFile> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| error(StatusCode::BAD_REQUEST, &e.to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().unwrap_or("upload").to_string();
        let content_type = field.content_type().map(str::to_string);
        let data = field
            .bytes()
            .await
            .map_err(|e| error(StatusCode::BAD_REQUEST, &e.to_string()))?;
        if data.is_empty() {
            return Err(error(StatusCode::BAD_REQUEST, "empty file"));
        }
        return Ok(UploadedFile {
            filename,
            content_type,
            size: data.len(),
        });
    }
    Err(error(StatusCode::BAD_REQUEST, "missing file field"))
}
