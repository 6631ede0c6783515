//! `/users` routes.

use axum::{
    extract::{Multipart, Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post, put},
    Json, Router,
};
use uuid::Uuid;

use crate::models::{
    ChangePasswordBody, FollowBody, MediaBody, MessageBody, PageBody, PageParams, UpdateProfileBody, User,
};
use crate::posts::{read_file, CDN_BASE};
use crate::state::{error, ApiResult, Db};

pub fn routes() -> Router<Db> {
    Router::new()
        .route("/users/me", get(get_me).put(update_me).delete(delete_me))
        .route("/users/me/password", put(change_password))
        .route("/users/me/avatar", post(upload_avatar))
        .route("/users/search", get(search))
        .route("/users/{id}", get(get_user))
        .route("/users/{id}/follow", post(follow))
        .route("/users/{id}/followers", get(followers))
        .route("/users/{id}/following", get(following))
}

async fn get_me(State(db): State<Db>, headers: HeaderMap) -> ApiResult<Json<User>> {
    let db = db.read().await;
    let viewer = db.require_viewer(&headers)?;
    db.user_view(viewer, Some(viewer))
        .map(Json)
        .ok_or_else(|| error(StatusCode::NOT_FOUND, "user not found"))
}

async fn update_me(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(input): Json<UpdateProfileBody>,
) -> ApiResult<Json<User>> {
    let mut db = db.write().await;
    let viewer = db.require_viewer(&headers)?;
    if let Some(username) = &input.username {
        let username = username.trim();
        if username.is_empty() {
            return Err(error(StatusCode::BAD_REQUEST, "username cannot be empty"));
        }
        if db.username_taken(username, Some(viewer)) {
            return Err(error(StatusCode::CONFLICT, "username already taken"));
        }
    }

    let user = db
        .users
        .get_mut(&viewer)
        .ok_or_else(|| error(StatusCode::NOT_FOUND, "user not found"))?;
    if let Some(username) = input.username {
        user.username = username.trim().to_string();
    }
    if let Some(full_name) = input.full_name {
        user.full_name = Some(full_name);
    }
    if let Some(bio) = input.bio {
        user.bio = Some(bio);
    }
    db.user_view(viewer, Some(viewer))
        .map(Json)
        .ok_or_else(|| error(StatusCode::NOT_FOUND, "user not found"))
}

async fn delete_me(State(db): State<Db>, headers: HeaderMap) -> ApiResult<StatusCode> {
    let mut db = db.write().await;
    let viewer = db.require_viewer(&headers)?;
    db.remove_user(viewer);
    tracing::info!(user_id = %viewer, "account deleted");
    Ok(StatusCode::NO_CONTENT)
}

async fn change_password(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(input): Json<ChangePasswordBody>,
) -> ApiResult<Json<MessageBody>> {
    let mut db = db.write().await;
    let viewer = db.require_viewer(&headers)?;
    let user = db
        .users
        .get_mut(&viewer)
        .ok_or_else(|| error(StatusCode::NOT_FOUND, "user not found"))?;
    if user.password != input.current_password {
        return Err(error(StatusCode::BAD_REQUEST, "current password is wrong"));
    }
    if input.new_password.len() < 6 {
        return Err(error(StatusCode::BAD_REQUEST, "password too short"));
    }
    user.password = input.new_password;
    Ok(Json(MessageBody::new("Password changed")))
}

async fn upload_avatar(
    State(db): State<Db>,
    headers: HeaderMap,
    multipart: Multipart,
) -> ApiResult<(StatusCode, Json<MediaBody>)> {
    let viewer = db.read().await.require_viewer(&headers)?;
    let file = read_file(multipart).await?;
    let url = format!("{CDN_BASE}/avatars/{viewer}/{}", file.filename);

    let mut db = db.write().await;
    let user = db
        .users
        .get_mut(&viewer)
        .ok_or_else(|| error(StatusCode::NOT_FOUND, "user not found"))?;
    user.avatar = Some(url.clone());
    Ok((
        StatusCode::CREATED,
        Json(MediaBody {
            url,
            content_type: file.content_type,
        }),
    ))
}

async fn search(
    State(db): State<Db>,
    headers: HeaderMap,
    Query(params): Query<PageParams>,
) -> Json<PageBody<User>> {
    let db = db.read().await;
    let viewer = db.viewer(&headers);
    let needle = params.q.unwrap_or_default().trim().to_lowercase();
    let ids = db
        .users
        .values()
        .filter(|u| {
            u.username.to_lowercase().contains(&needle)
                || u.full_name
                    .as_deref()
                    .is_some_and(|n| n.to_lowercase().contains(&needle))
        })
        .map(|u| u.id)
        .collect();
    let users = db.user_views(ids, viewer);
    Json(PageBody::paginate(users, params.page, params.limit))
}

async fn get_user(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<User>> {
    let db = db.read().await;
    let viewer = db.viewer(&headers);
    db.user_view(id, viewer)
        .map(Json)
        .ok_or_else(|| error(StatusCode::NOT_FOUND, "user not found"))
}

async fn follow(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<FollowBody>> {
    let mut db = db.write().await;
    let viewer = db.require_viewer(&headers)?;
    if viewer == id {
        return Err(error(StatusCode::BAD_REQUEST, "cannot follow yourself"));
    }
    if !db.users.contains_key(&id) {
        return Err(error(StatusCode::NOT_FOUND, "user not found"));
    }
    let is_following = if db.follows.remove(&(viewer, id)) {
        false
    } else {
        db.follows.insert((viewer, id));
        true
    };
    Ok(Json(FollowBody {
        is_following,
        followers_count: db.followers_of(id).len() as u32,
    }))
}

async fn followers(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Query(params): Query<PageParams>,
) -> ApiResult<Json<PageBody<User>>> {
    let db = db.read().await;
    if !db.users.contains_key(&id) {
        return Err(error(StatusCode::NOT_FOUND, "user not found"));
    }
    let users = db.user_views(db.followers_of(id), db.viewer(&headers));
    Ok(Json(PageBody::paginate(users, params.page, params.limit)))
}

async fn following(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Query(params): Query<PageParams>,
) -> ApiResult<Json<PageBody<User>>> {
    let db = db.read().await;
    if !db.users.contains_key(&id) {
        return Err(error(StatusCode::NOT_FOUND, "user not found"));
    }
    let users = db.user_views(db.following_of(id), db.viewer(&headers));
    Ok(Json(PageBody::paginate(users, params.page, params.limit)))
}
