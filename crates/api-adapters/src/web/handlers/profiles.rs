use axum::extract::{Path, State};

use crate::web::error::ApiError;
use crate::web::extract::{CurrentUser, MaybeUser};
use crate::web::marshal::{envelope, Native};
use crate::web::AppState;

pub async fn get_profile(
    State(state): State<AppState>,
    Path(username): Path<String>,
    MaybeUser(viewer): MaybeUser,
) -> Result<Native, ApiError> {
    let profile = state.services.profiles.get(&username, &viewer).await?;
    Ok(Native::ok(envelope("profile", profile.projection())))
}

pub async fn follow(
    State(state): State<AppState>,
    Path(username): Path<String>,
    CurrentUser(user): CurrentUser,
) -> Result<Native, ApiError> {
    let profile = state.services.profiles.follow(&username, &user).await?;
    Ok(Native::created(envelope("profile", profile.projection())))
}

pub async fn unfollow(
    State(state): State<AppState>,
    Path(username): Path<String>,
    CurrentUser(user): CurrentUser,
) -> Result<Native, ApiError> {
    let profile = state.services.profiles.unfollow(&username, &user).await?;
    Ok(Native::accepted(envelope("profile", profile.projection())))
}
