use axum::extract::State;
use domains::UserPatch;
use services::{Login, Registration};

use super::UserBody;
use crate::web::error::ApiError;
use crate::web::extract::{CurrentUser, Payload};
use crate::web::marshal::{envelope, Native};
use crate::web::AppState;

pub async fn register(
    State(state): State<AppState>,
    Payload(body): Payload<UserBody<Registration>>,
) -> Result<Native, ApiError> {
    let session = state.services.users.register(&body.user).await?;
    Ok(Native::ok(envelope("user", session.projection())))
}

pub async fn login(
    State(state): State<AppState>,
    Payload(body): Payload<UserBody<Login>>,
) -> Result<Native, ApiError> {
    let session = state.services.users.login(&body.user).await?;
    Ok(Native::created(envelope("user", session.projection())))
}

pub async fn current(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Native, ApiError> {
    let session = state.services.users.current(user)?;
    Ok(Native::ok(envelope("user", session.projection())))
}

pub async fn update(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Payload(body): Payload<UserBody<UserPatch>>,
) -> Result<Native, ApiError> {
    let session = state.services.users.update(&user, &body.user).await?;
    Ok(Native::ok(envelope("user", session.projection())))
}
