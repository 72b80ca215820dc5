//! # CommentService

use std::sync::Arc;

use domains::{
    Comment, DomainError, GraphExecutor, GraphValue, Identity, Record, Result, Statement, User,
};
use tracing::instrument;
use uuid::Uuid;

use crate::validation::CommentInput;

pub struct CommentService {
    graph: Arc<dyn GraphExecutor>,
}

fn decode(mut record: Record) -> Result<Comment> {
    let node = record
        .take("c")
        .into_node()
        .ok_or_else(|| DomainError::internal("row without comment node"))?;
    let following = record.get("following").and_then(GraphValue::as_bool).unwrap_or(false);
    let author = User::from_value(record.take("u"))?.with_following(following);
    Ok(Comment::new(node, author))
}

impl CommentService {
    pub fn new(graph: Arc<dyn GraphExecutor>) -> Self {
        Self { graph }
    }

    #[instrument(skip(self, author, input), fields(author = author.id()))]
    pub async fn add(&self, slug: &str, author: &User, input: &CommentInput) -> Result<Comment> {
        input.validate()?;
        let statement = Statement::new(
            "MATCH (a:Article {slug: $slug})
MATCH (u:User {id: $userId})
CREATE (u)-[:COMMENTED]->(c:Comment {
    id: $id,
    body: $body,
    createdAt: datetime(),
    updatedAt: datetime()
})-[:FOR]->(a)
RETURN c, u, false AS following",
        )
        .param("slug", slug)
        .param("userId", author.id())
        .param("id", Uuid::new_v4().to_string())
        .param("body", input.body.as_deref());

        let record = self
            .graph
            .write(statement)
            .await?
            .into_first()
            .ok_or_else(|| DomainError::not_found("article"))?;
        decode(record)
    }

    /// Newest first. An unknown article simply has no comments.
    #[instrument(skip(self, viewer))]
    pub async fn list(&self, slug: &str, viewer: &Identity) -> Result<Vec<Comment>> {
        let statement = Statement::new(
            "MATCH (:Article {slug: $slug})<-[:FOR]-(c:Comment)<-[:COMMENTED]-(u:User)
RETURN c, u,
    CASE
        WHEN $userId IS NULL THEN false
        ELSE EXISTS { (u)<-[:FOLLOWS]-(:User {id: $userId}) }
    END AS following
ORDER BY c.createdAt DESC",
        )
        .param("slug", slug)
        .param("userId", viewer.id());

        self.graph
            .read(statement)
            .await?
            .into_records()
            .map(decode)
            .collect()
    }

    /// Only the comment's own author may delete it. Hard delete.
    #[instrument(skip(self, author), fields(author = author.id()))]
    pub async fn delete(&self, slug: &str, comment_id: &str, author: &User) -> Result<()> {
        let statement = Statement::new(
            "MATCH (:Article {slug: $slug})<-[:FOR]-(c:Comment {id: $commentId})
    <-[:COMMENTED]-(:User {id: $userId})
WITH c, c.id AS id
DETACH DELETE c
RETURN id",
        )
        .param("slug", slug)
        .param("commentId", comment_id)
        .param("userId", author.id());

        if self.graph.write(statement).await?.is_empty() {
            return Err(DomainError::not_found("comment"));
        }
        Ok(())
    }
}
