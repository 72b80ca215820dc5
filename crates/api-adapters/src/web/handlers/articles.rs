use axum::extract::{Path, State};
use axum::http::StatusCode;

use super::ArticleBody;
use crate::web::error::ApiError;
use crate::web::extract::{CurrentUser, FeedQuery, MaybeUser, Payload};
use crate::web::marshal::{envelope, Native};
use crate::web::AppState;

pub async fn list(
    State(state): State<AppState>,
    MaybeUser(viewer): MaybeUser,
    FeedQuery(filter): FeedQuery,
) -> Result<Native, ApiError> {
    let page = state.services.articles.list(&viewer, &filter).await?;
    Ok(Native::ok(page.projection()))
}

pub async fn feed(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    FeedQuery(filter): FeedQuery,
) -> Result<Native, ApiError> {
    let page = state.services.articles.personal_feed(&user, &filter).await?;
    Ok(Native::ok(page.projection()))
}

pub async fn create(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Payload(body): Payload<ArticleBody>,
) -> Result<Native, ApiError> {
    let article = state.services.articles.create(&user, &body.article).await?;
    Ok(Native::created(envelope("article", article.projection())))
}

pub async fn get_article(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    MaybeUser(viewer): MaybeUser,
) -> Result<Native, ApiError> {
    let article = state.services.articles.get(&slug, &viewer).await?;
    Ok(Native::ok(envelope("article", article.projection())))
}

pub async fn update(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    CurrentUser(user): CurrentUser,
    Payload(body): Payload<ArticleBody>,
) -> Result<Native, ApiError> {
    let article = state.services.articles.update(&slug, &user, &body.article).await?;
    Ok(Native::ok(envelope("article", article.projection())))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    CurrentUser(user): CurrentUser,
) -> Result<StatusCode, ApiError> {
    state.services.articles.delete(&slug, &user).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn favorite(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    CurrentUser(user): CurrentUser,
) -> Result<Native, ApiError> {
    let article = state.services.articles.favorite(&slug, &user).await?;
    Ok(Native::created(envelope("article", article.projection())))
}

pub async fn unfavorite(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    CurrentUser(user): CurrentUser,
) -> Result<Native, ApiError> {
    let article = state.services.articles.unfavorite(&slug, &user).await?;
    Ok(Native::accepted(envelope("article", article.projection())))
}
