//! Comments slice. A flat list; `for_post` filters by parent.

use uuid::Uuid;

use crate::types::Comment;

#[derive(Debug, Clone, PartialEq)]
pub enum CommentsAction {
    AddComment(Comment),
    RemoveComment(Uuid),
    SetComments(Vec<Comment>),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommentsState {
    pub comments: Vec<Comment>,
}

impl CommentsState {
    pub fn for_post(&self, post_id: Uuid) -> impl Iterator<Item = &Comment> {
        self.comments.iter().filter(move |c| c.post_id == post_id)
    }

    pub fn reduce(&mut self, action: CommentsAction) {
        match action {
            CommentsAction::AddComment(comment) => self.comments.push(comment),
            CommentsAction::RemoveComment(id) => self.comments.retain(|c| c.id != id),
            CommentsAction::SetComments(comments) => self.comments = comments,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn comment(id: u128, post: u128) -> Comment {
        Comment {
            id: Uuid::from_u128(id),
            post_id: Uuid::from_u128(post),
            text: format!("comment {id}"),
            author_id: Uuid::from_u128(99),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn add_remove_set() {
        let mut state = CommentsState::default();
        state.reduce(CommentsAction::AddComment(comment(1, 10)));
        state.reduce(CommentsAction::AddComment(comment(2, 10)));
        state.reduce(CommentsAction::AddComment(comment(3, 20)));
        state.reduce(CommentsAction::RemoveComment(Uuid::from_u128(2)));

        let ids: Vec<u128> = state.comments.iter().map(|c| c.id.as_u128()).collect();
        assert_eq!(ids, vec![1, 3]);

        state.reduce(CommentsAction::SetComments(vec![comment(4, 20)]));
        assert_eq!(state.comments.len(), 1);
    }

    #[test]
    fn for_post_filters_by_parent() {
        let mut state = CommentsState::default();
        state.reduce(CommentsAction::SetComments(vec![
            comment(1, 10),
            comment(2, 20),
            comment(3, 10),
        ]));
        let on_ten: Vec<u128> = state
            .for_post(Uuid::from_u128(10))
            .map(|c| c.id.as_u128())
            .collect();
        assert_eq!(on_ten, vec![1, 3]);
    }
}
