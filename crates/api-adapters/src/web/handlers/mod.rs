//! Route handlers. Each one extracts, calls a service and wraps the
//! resulting projection in its resource envelope.

pub mod articles;
pub mod comments;
pub mod ops;
pub mod profiles;
pub mod tags;
pub mod users;

use serde::Deserialize;

/// `{"user": {...}}`. A missing key yields an empty payload, which then
/// fails field validation.
#[derive(Debug, Deserialize)]
pub struct UserBody<T: Default> {
    #[serde(default)]
    pub user: T,
}

#[derive(Debug, Deserialize)]
pub struct ArticleBody {
    #[serde(default)]
    pub article: services::ArticleInput,
}

#[derive(Debug, Deserialize)]
pub struct CommentBody {
    #[serde(default)]
    pub comment: services::CommentInput,
}
