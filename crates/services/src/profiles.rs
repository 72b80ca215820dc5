//! # ProfileService
//!
//! Profile lookup and the follow relationship between users.

use std::sync::Arc;

use domains::{DomainError, GraphExecutor, GraphValue, Identity, ResultSet, Result, Statement, User};
use tracing::instrument;

use crate::cypher::FOLLOWS;

pub struct ProfileService {
    graph: Arc<dyn GraphExecutor>,
}

impl ProfileService {
    pub fn new(graph: Arc<dyn GraphExecutor>) -> Self {
        Self { graph }
    }

    #[instrument(skip(self, viewer))]
    pub async fn get(&self, username: &str, viewer: &Identity) -> Result<User> {
        let statement = Statement::new(
            "MATCH (target:User {username: $username})
RETURN target,
    CASE
        WHEN $userId IS NULL THEN false
        ELSE EXISTS { (target)<-[:FOLLOWS]-(:User {id: $userId}) }
    END AS following",
        )
        .param("username", username)
        .param("userId", viewer.id());

        profile(self.graph.read(statement).await?)
    }

    /// Idempotent; following someone twice keeps one edge.
    #[instrument(skip(self, viewer), fields(viewer = viewer.id()))]
    pub async fn follow(&self, username: &str, viewer: &User) -> Result<User> {
        if username == viewer.username() {
            return Err(DomainError::invalid("username", "cannot follow yourself"));
        }
        self.toggle(username, viewer, FOLLOWS.upsert()).await
    }

    /// Tolerant; unfollowing someone not followed is a no-op.
    #[instrument(skip(self, viewer), fields(viewer = viewer.id()))]
    pub async fn unfollow(&self, username: &str, viewer: &User) -> Result<User> {
        self.toggle(username, viewer, FOLLOWS.remove()).await
    }

    async fn toggle(&self, username: &str, viewer: &User, edge_op: String) -> Result<User> {
        let statement = Statement::new(format!(
            "MATCH (target:User {{username: $username}})
MATCH (current:User {{id: $userId}})
{edge_op}
WITH DISTINCT target, current
RETURN target, EXISTS {{ (target)<-[:FOLLOWS]-(current) }} AS following"
        ))
        .param("username", username)
        .param("userId", viewer.id());

        profile(self.graph.write(statement).await?)
    }
}

fn profile(rows: ResultSet) -> Result<User> {
    let mut record = rows
        .into_first()
        .ok_or_else(|| DomainError::not_found("profile"))?;
    let following = record.get("following").and_then(GraphValue::as_bool).unwrap_or(false);
    Ok(User::from_value(record.take("target"))?.with_following(following))
}
