use axum::extract::State;

use crate::web::error::ApiError;
use crate::web::marshal::Native;
use crate::web::AppState;

pub async fn list(State(state): State<AppState>) -> Result<Native, ApiError> {
    let names = state.services.tags.list().await?;
    Ok(Native::ok(services::tags::projection(names)))
}
