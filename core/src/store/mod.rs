//! Client-side store: the slices plus listener notification.
//!
//! `Store` owns the state. `dispatch` runs the matching slice reducer and
//! then calls every subscribed listener with the new state. Reducers run
//! one at a time because `dispatch` takes `&mut self`.

pub mod comments;
pub mod posts;

pub use comments::{CommentsAction, CommentsState};
pub use posts::{PendingId, PostChange, PostsAction, PostsState};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppState {
    pub posts: PostsState,
    pub comments: CommentsState,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Posts(PostsAction),
    Comments(CommentsAction),
}

impl From<PostsAction> for Action {
    fn from(action: PostsAction) -> Self {
        Action::Posts(action)
    }
}

impl From<CommentsAction> for Action {
    fn from(action: CommentsAction) -> Self {
        Action::Comments(action)
    }
}

/// Handle returned by `Store::subscribe`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subscription(u64);

type Listener = Box<dyn FnMut(&AppState) + Send>;

#[derive(Default)]
pub struct Store {
    state: AppState,
    listeners: Vec<(Subscription, Listener)>,
    next_subscription: u64,
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("state", &self.state)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(state: AppState) -> Self {
        Self {
            state,
            ..Self::default()
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn dispatch(&mut self, action: impl Into<Action>) {
        let action = action.into();
        tracing::trace!(?action, "dispatch");
        match action {
            Action::Posts(action) => self.state.posts.reduce(action),
            Action::Comments(action) => self.state.comments.reduce(action),
        }
        for (_, listener) in &mut self.listeners {
            listener(&self.state);
        }
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&AppState) + Send + 'static) -> Subscription {
        self.next_subscription += 1;
        let subscription = Subscription(self.next_subscription);
        self.listeners.push((subscription, Box::new(listener)));
        subscription
    }

    /// Returns whether the subscription was still registered.
    pub fn unsubscribe(&mut self, subscription: Subscription) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(s, _)| *s != subscription);
        self.listeners.len() != before
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    #[test]
    fn listeners_see_each_dispatch_until_unsubscribed() {
        let mut store = Store::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let sink = seen.clone();
        let sub = store.subscribe(move |state| sink.lock().unwrap().push(state.posts.loading));

        store.dispatch(PostsAction::FetchPostsStart);
        store.dispatch(PostsAction::FetchPostsFailure {
            error: "x".into(),
            request: None,
        });
        assert!(store.unsubscribe(sub));
        store.dispatch(PostsAction::FetchPostsStart);

        assert_eq!(*seen.lock().unwrap(), vec![true, false]);
        assert!(!store.unsubscribe(sub));
    }

    #[test]
    fn actions_route_to_their_slice() {
        let mut store = Store::new();
        store.dispatch(CommentsAction::SetComments(Vec::new()));
        store.dispatch(PostsAction::ResetPosts);
        assert_eq!(store.state(), &AppState::default());
    }
}
