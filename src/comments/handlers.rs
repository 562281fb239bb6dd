use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::extractors::CurrentUser,
    comments::{
        dto::{CommentData, CommentView, CommentsData, CreateCommentRequest, LikesData},
        repo::Comment,
    },
    error::ApiError,
    response::ApiResponse,
    state::AppState,
};

pub fn comment_routes() -> Router<AppState> {
    Router::new()
        .route("/comments", post(post_comment))
        .route("/comments/:id", get(get_comments).delete(delete_comment))
        .route("/comments/:id/like", post(like_comment))
}

/// Presence and whitespace validation; returns (article_id, trimmed content).
fn validate_new_comment(payload: CreateCommentRequest) -> Result<(String, String), ApiError> {
    let (article_id, content) = match (payload.article_id, payload.content) {
        (Some(a), Some(c)) if !a.is_empty() => (a, c),
        _ => {
            return Err(ApiError::Validation(
                "Article ID and content are required".into(),
            ))
        }
    };
    let content = content.trim();
    if content.is_empty() {
        return Err(ApiError::Validation("Comment cannot be empty".into()));
    }
    Ok((article_id, content.to_string()))
}

/// GET /comments/:articleId — public, newest first, owner identity joined.
#[instrument(skip(state))]
pub async fn get_comments(
    State(state): State<AppState>,
    Path(article_id): Path<String>,
) -> Result<Json<ApiResponse<CommentsData>>, ApiError> {
    let rows = Comment::list_for_article(&state.db, &article_id).await?;
    let comments: Vec<CommentView> = rows.into_iter().map(CommentView::from).collect();
    let count = comments.len();
    Ok(Json(ApiResponse::ok(CommentsData { comments, count })))
}

#[instrument(skip(state, caller, payload))]
pub async fn post_comment(
    State(state): State<AppState>,
    caller: CurrentUser,
    Json(payload): Json<CreateCommentRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CommentData>>), ApiError> {
    let (article_id, content) = validate_new_comment(payload)?;

    let comment = Comment::create(&state.db, &article_id, caller.0.id, &content).await?;
    info!(comment_id = %comment.id, user_id = %caller.0.id, article_id = %article_id, "comment posted");

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(
            "Comment posted successfully",
            CommentData {
                comment: CommentView::with_owner(comment, &caller.0),
            },
        )),
    ))
}

/// Owner-only delete; everyone else gets 403 and the row stays.
#[instrument(skip(state, caller))]
pub async fn delete_comment(
    State(state): State<AppState>,
    caller: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let comment = Comment::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Comment not found".into()))?;

    if comment.user_id != caller.0.id {
        warn!(comment_id = %id, user_id = %caller.0.id, owner_id = %comment.user_id, "delete by non-owner");
        return Err(ApiError::Forbidden(
            "Not authorized to delete this comment".into(),
        ));
    }

    Comment::delete(&state.db, id).await?;
    info!(comment_id = %id, user_id = %caller.0.id, "comment deleted");
    Ok(Json(ApiResponse::message("Comment deleted successfully")))
}

/// Any authenticated caller may like any comment, repeatedly; each call
/// increments, with no per-user dedup.
#[instrument(skip(state, caller))]
pub async fn like_comment(
    State(state): State<AppState>,
    caller: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<LikesData>>, ApiError> {
    let likes = Comment::like(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Comment not found".into()))?;

    info!(comment_id = %id, user_id = %caller.0.id, likes, "comment liked");
    Ok(Json(ApiResponse::with_message(
        "Comment liked",
        LikesData { likes },
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(article_id: Option<&str>, content: Option<&str>) -> CreateCommentRequest {
        CreateCommentRequest {
            article_id: article_id.map(Into::into),
            content: content.map(Into::into),
        }
    }

    #[test]
    fn new_comment_requires_article_and_content() {
        let err = validate_new_comment(payload(None, Some("hi"))).unwrap_err();
        assert_eq!(err.to_string(), "Article ID and content are required");

        let err = validate_new_comment(payload(Some("basics"), None)).unwrap_err();
        assert_eq!(err.to_string(), "Article ID and content are required");
    }

    #[test]
    fn new_comment_rejects_whitespace_only_content() {
        let err = validate_new_comment(payload(Some("basics"), Some("   \n\t "))).unwrap_err();
        assert_eq!(err.to_string(), "Comment cannot be empty");
    }

    #[test]
    fn new_comment_content_is_trimmed() {
        let (article_id, content) =
            validate_new_comment(payload(Some("basics"), Some("  hi  "))).unwrap();
        assert_eq!(article_id, "basics");
        assert_eq!(content, "hi");
    }
}
