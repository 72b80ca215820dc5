use axum::extract::{Path, State};
use axum::http::StatusCode;
use domains::{Comment, GraphValue};

use super::CommentBody;
use crate::web::error::ApiError;
use crate::web::extract::{CurrentUser, MaybeUser, Payload};
use crate::web::marshal::{envelope, Native};
use crate::web::AppState;

pub async fn add(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    CurrentUser(user): CurrentUser,
    Payload(body): Payload<CommentBody>,
) -> Result<Native, ApiError> {
    let comment = state.services.comments.add(&slug, &user, &body.comment).await?;
    Ok(Native::created(envelope("comment", comment.projection())))
}

pub async fn list(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    MaybeUser(viewer): MaybeUser,
) -> Result<Native, ApiError> {
    let comments = state.services.comments.list(&slug, &viewer).await?;
    let list = GraphValue::List(comments.iter().map(Comment::projection).collect());
    Ok(Native::ok(envelope("comments", list)))
}

pub async fn delete(
    State(state): State<AppState>,
    Path((slug, comment_id)): Path<(String, String)>,
    CurrentUser(user): CurrentUser,
) -> Result<StatusCode, ApiError> {
    state.services.comments.delete(&slug, &comment_id, &user).await?;
    Ok(StatusCode::NO_CONTENT)
}
