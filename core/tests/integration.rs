//! End-to-end flows against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then drives the resource APIs
//! and `FeedController` over real HTTP through `UreqTransport`. Catches
//! drift between the client DTOs and what the server actually sends.

use shareup_core::types::{CreatePost, RegisterRequest, UpdateProfile};
use shareup_core::{
    ClientConfig, ErrorKind, FeedController, HttpClient, Operation, Service, ShareUpApi, Store,
};

fn start_server() -> String {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });

    format!("http://{addr}")
}

fn api(base_url: &str) -> ShareUpApi {
    ShareUpApi::new(HttpClient::new(ClientConfig::default().with_base_url(base_url)))
}

fn register(api: &ShareUpApi, username: &str) -> shareup_core::types::AuthSession {
    api.auth
        .register(&RegisterRequest {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            password: "secret1".to_string(),
            full_name: None,
        })
        .unwrap()
}

#[test]
fn feed_lifecycle() {
    let base_url = start_server();
    let api = api(&base_url);

    // Step 1: register stores the token, validate sees it.
    let session = register(&api, "elif");
    let validation = api.auth.validate().unwrap();
    assert!(validation.valid);
    assert_eq!(validation.user.map(|u| u.id), Some(session.user.id));

    // Step 2: create five posts.
    for n in 1..=5 {
        let post = api
            .posts
            .create_post(&CreatePost {
                content: format!("post {n}"),
                ..CreatePost::default()
            })
            .unwrap();
        assert_eq!(post.author_id, session.user.id);
    }

    let page = api.posts.get_posts(1, 20).unwrap();
    assert_eq!(page.items.len(), 5);
    assert_eq!(page.items[0].content, "post 5");
    assert!(!page.has_more);

    // Step 3: page through the feed two at a time.
    let feed = FeedController::new(api.posts.clone()).with_page_size(2);
    let mut store = Store::new();
    feed.refresh(&mut store).unwrap();
    assert_eq!(store.state().posts.posts.len(), 2);
    assert_eq!(store.state().posts.page, 2);
    feed.load_more(&mut store).unwrap();
    feed.load_more(&mut store).unwrap();
    assert_eq!(store.state().posts.posts.len(), 5);
    assert!(!store.state().posts.has_more);

    // No more pages: load_more is a no-op.
    feed.load_more(&mut store).unwrap();
    assert_eq!(store.state().posts.posts.len(), 5);

    // Step 4: optimistic like is confirmed by the server.
    let first = store.state().posts.posts[0].id;
    feed.toggle_like(&mut store, first).unwrap();
    let liked = store.state().posts.get(first).unwrap();
    assert!(liked.is_liked);
    assert_eq!(liked.likes, 1);
    assert!(!store.state().posts.has_pending());
    assert!(api.posts.get_post(first).unwrap().is_liked);

    feed.share(&mut store, first).unwrap();
    assert_eq!(api.posts.get_post(first).unwrap().shares, 1);

    // Step 5: delete removes it on both sides.
    feed.delete_post(&mut store, first).unwrap();
    assert!(store.state().posts.get(first).is_none());
    let err = api.posts.get_post(first).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(err.operation, Operation::GetPost);

    // Step 6: after logout writes fail with 401 and the token is gone.
    api.auth.logout().unwrap();
    let err = api
        .posts
        .create_post(&CreatePost {
            content: "late".to_string(),
            ..CreatePost::default()
        })
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unauthorized);

    // A failed like is rolled back locally.
    let second = store.state().posts.posts[0].clone();
    assert!(feed.toggle_like(&mut store, second.id).is_err());
    assert_eq!(store.state().posts.get(second.id), Some(&second));
}

#[test]
fn login_refresh_and_profile() {
    let base_url = start_server();
    let api = api(&base_url);
    let registered = register(&api, "kerem");
    api.auth.logout().unwrap();

    let err = api.auth.login("kerem@example.com", "wrong").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unauthorized);
    assert_eq!(err.user_message(), "Giriş yapılamadı");

    let session = api.auth.login("kerem@example.com", "secret1").unwrap();
    assert_eq!(session.user.id, registered.user.id);

    let refreshed = api.auth.refresh(&session.refresh_token).unwrap();
    assert_ne!(refreshed.token, session.token);

    let me = api
        .users
        .update_profile(&UpdateProfile {
            bio: Some("İstanbul".to_string()),
            ..UpdateProfile::default()
        })
        .unwrap();
    assert_eq!(me.bio.as_deref(), Some("İstanbul"));
    assert_eq!(api.users.get_me().unwrap().bio.as_deref(), Some("İstanbul"));

    api.users.change_password("secret1", "secret2").unwrap();
    api.auth.logout().unwrap();
    assert!(api.auth.login("kerem@example.com", "secret2").is_ok());
}

#[test]
fn follow_search_and_uploads() {
    let base_url = start_server();
    let alice = api(&base_url);
    let bob = api(&base_url);
    let a = register(&alice, "alice");
    let b = register(&bob, "bob");

    let status = alice.users.follow_user(b.user.id).unwrap();
    assert!(status.is_following);
    assert_eq!(status.followers_count, 1);

    let followers = bob.users.get_followers(b.user.id, 1, 20).unwrap();
    assert_eq!(followers.items.len(), 1);
    assert_eq!(followers.items[0].id, a.user.id);
    let following = bob.users.get_following(a.user.id, 1, 20).unwrap();
    assert_eq!(following.items[0].id, b.user.id);

    let found = alice.users.search_users("bo", 1, 20).unwrap();
    assert_eq!(found.items.len(), 1);
    assert!(found.items[0].is_following);

    let media = alice
        .posts
        .upload_media("cat.png", "image/png", b"\x89PNG fake".to_vec())
        .unwrap();
    assert!(media.url.ends_with("/cat.png"));
    let post = alice
        .posts
        .create_post(&CreatePost {
            content: String::new(),
            images: vec![media.url.clone()],
            videos: Vec::new(),
        })
        .unwrap();
    assert_eq!(post.images, vec![media.url]);
    let by_alice = bob.posts.get_user_posts(a.user.id, 1, 20).unwrap();
    assert_eq!(by_alice.total, 1);

    let avatar = alice
        .users
        .upload_avatar("me.jpg", "image/jpeg", b"jpeg".to_vec())
        .unwrap();
    assert_eq!(bob.users.get_user(a.user.id).unwrap().avatar, Some(avatar.url));

    alice.users.delete_account().unwrap();
    assert_eq!(alice.users.get_me().unwrap_err().kind(), ErrorKind::Unauthorized);
    assert_eq!(bob.users.get_user(b.user.id).unwrap().followers_count, 0);
}

#[test]
fn every_service_is_healthy() {
    let base_url = start_server();
    let results = api(&base_url).health.check_all();
    assert_eq!(results.len(), Service::ALL.len());
    for (service, result) in results {
        let status = result.unwrap();
        assert_eq!(status.status, "ok");
        assert_eq!(status.service, service.to_string());
    }
}

#[test]
fn unreachable_server_is_a_network_error() {
    // Port 9 (discard) is not listening.
    let api = api("http://127.0.0.1:9");
    let err = api.posts.get_posts(1, 20).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Network);
    assert_eq!(err.user_message(), "Gönderiler yüklenirken bir hata oluştu");
}
