use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::auth::repo::User;
use crate::comments::repo::{Comment, CommentWithAuthor};

/// Request body for posting a comment.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentRequest {
    pub article_id: Option<String>,
    pub content: Option<String>,
}

/// Owner identity shown alongside a comment.
#[derive(Debug, Serialize)]
pub struct CommentAuthor {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

/// Comment as returned to clients, joined with its owner.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentView {
    pub id: Uuid,
    pub article_id: String,
    pub content: String,
    pub likes: i32,
    pub created_at: OffsetDateTime,
    pub user: CommentAuthor,
}

impl From<CommentWithAuthor> for CommentView {
    fn from(row: CommentWithAuthor) -> Self {
        Self {
            id: row.id,
            article_id: row.article_id,
            content: row.content,
            likes: row.likes,
            created_at: row.created_at,
            user: CommentAuthor {
                id: row.user_id,
                name: row.author_name,
                email: row.author_email,
            },
        }
    }
}

impl CommentView {
    /// Join a freshly created comment with its (already loaded) owner.
    pub fn with_owner(comment: Comment, owner: &User) -> Self {
        Self {
            id: comment.id,
            article_id: comment.article_id,
            content: comment.content,
            likes: comment.likes,
            created_at: comment.created_at,
            user: CommentAuthor {
                id: owner.id,
                name: owner.name.clone(),
                email: owner.email.clone(),
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CommentsData {
    pub comments: Vec<CommentView>,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct CommentData {
    pub comment: CommentView,
}

#[derive(Debug, Serialize)]
pub struct LikesData {
    pub likes: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_request_uses_camel_case() {
        let req: CreateCommentRequest =
            serde_json::from_str(r#"{"articleId":"basics","content":"hi"}"#).unwrap();
        assert_eq!(req.article_id.as_deref(), Some("basics"));
        assert_eq!(req.content.as_deref(), Some("hi"));
    }

    #[test]
    fn comment_view_serializes_joined_author() {
        let view = CommentView::from(CommentWithAuthor {
            id: Uuid::new_v4(),
            article_id: "basics".into(),
            user_id: Uuid::new_v4(),
            content: "hi".into(),
            likes: 3,
            created_at: OffsetDateTime::now_utc(),
            author_name: "A".into(),
            author_email: "a@x.com".into(),
        });
        let json = serde_json::to_string(&view).unwrap();
        assert!(json.contains(r#""articleId":"basics""#));
        assert!(json.contains(r#""likes":3"#));
        assert!(json.contains(r#""name":"A""#));
        assert!(!json.contains("password"));
    }
}
