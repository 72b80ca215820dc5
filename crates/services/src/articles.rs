//! # ArticleService
//!
//! Feeds, single-article lookup and the article mutations. Every statement
//! that returns an article re-derives `favorited`/`favoritesCount` after
//! its writes, so responses never carry pre-mutation state.

use std::sync::Arc;

use domains::slug::{article_slug, slugify};
use domains::{
    Article, ArticlePage, DomainError, GraphExecutor, GraphValue, Identity, Result, Statement, User,
};
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::cypher::{attach_tags, ARTICLE_COLUMNS, FAVORITED, HAS_TAG};
use crate::feed::{self, FeedFilter, FeedScope};
use crate::validation::ArticleInput;

/// `[{name, slug}]` for the tag-merge fragment.
fn tag_params(names: &[String]) -> GraphValue {
    GraphValue::List(
        names
            .iter()
            .map(|name| GraphValue::map([("name", name.clone()), ("slug", slugify(name))]))
            .collect(),
    )
}

pub struct ArticleService {
    graph: Arc<dyn GraphExecutor>,
}

impl ArticleService {
    pub fn new(graph: Arc<dyn GraphExecutor>) -> Self {
        Self { graph }
    }

    /// Global feed, optionally filtered.
    #[instrument(skip(self, viewer))]
    pub async fn list(&self, viewer: &Identity, filter: &FeedFilter) -> Result<ArticlePage> {
        let statement = feed::compose(&FeedScope::Global, filter, viewer.id());
        let page = feed::decode_page(self.graph.read(statement).await?)?;
        debug!(returned = page.articles.len(), total = page.articles_count, "global feed");
        Ok(page)
    }

    /// Articles by authors the viewer follows.
    #[instrument(skip(self, viewer), fields(viewer = viewer.id()))]
    pub async fn personal_feed(&self, viewer: &User, filter: &FeedFilter) -> Result<ArticlePage> {
        let scope = FeedScope::Following { user_id: viewer.id() };
        let statement = feed::compose(&scope, filter, Some(viewer.id()));
        feed::decode_page(self.graph.read(statement).await?)
    }

    /// Anonymous viewers are allowed; their `favorited` is always false.
    #[instrument(skip(self, viewer))]
    pub async fn get(&self, slug: &str, viewer: &Identity) -> Result<Article> {
        let statement = Statement::new(format!(
            "MATCH (a:Article {{slug: $slug}})\nRETURN{ARTICLE_COLUMNS}"
        ))
        .param("slug", slug)
        .param("userId", viewer.id());

        self.single(self.graph.read(statement).await?)
    }

    #[instrument(skip(self, author, input), fields(author = author.id()))]
    pub async fn create(&self, author: &User, input: &ArticleInput) -> Result<Article> {
        input.validate_create()?;
        let id = Uuid::new_v4();
        let title = input.title.as_deref().unwrap_or_default();

        let statement = Statement::new(format!(
            "MATCH (u:User {{id: $userId}})
CREATE (a:Article {{
    id: $id,
    slug: $slug,
    createdAt: datetime(),
    updatedAt: datetime()
}})
SET a += $properties
CREATE (u)-[:POSTED]->(a)
{}
WITH a
RETURN{ARTICLE_COLUMNS}",
            attach_tags()
        ))
        .param("userId", author.id())
        .param("id", id.to_string())
        .param("slug", article_slug(title, &id))
        .param("properties", article_properties(input))
        .param("tags", tag_params(&input.tags()));

        let article = self.single(self.graph.write(statement).await?)?;
        debug!(slug = article.slug(), "article created");
        Ok(article)
    }

    /// Only the author may update. A non-empty `tagList` replaces the tag
    /// set; an absent or empty one leaves it untouched.
    #[instrument(skip(self, author, input), fields(author = author.id()))]
    pub async fn update(&self, slug: &str, author: &User, input: &ArticleInput) -> Result<Article> {
        input.validate_update()?;
        let tags = input.tags();

        let statement = Statement::new(format!(
            "MATCH (:User {{id: $userId}})-[:POSTED]->(a:Article {{slug: $slug}})
SET a += $properties, a.updatedAt = datetime()
FOREACH (old IN CASE WHEN size($tags) > 0 THEN [ (a)-[rel:{rel}]->(:Tag) | rel ] ELSE [] END |
    DELETE old
)
{attach}
WITH a
RETURN{ARTICLE_COLUMNS}",
            rel = HAS_TAG.rel_type,
            attach = attach_tags(),
        ))
        .param("userId", author.id())
        .param("slug", slug)
        .param("properties", article_properties(input))
        .param("tags", tag_params(&tags));

        self.single(self.graph.write(statement).await?)
    }

    /// Only the author may delete; comments on the article go with it.
    #[instrument(skip(self, author), fields(author = author.id()))]
    pub async fn delete(&self, slug: &str, author: &User) -> Result<()> {
        let statement = Statement::new(
            "MATCH (:User {id: $userId})-[:POSTED]->(a:Article {slug: $slug})
WITH a, a.id AS id, [ (a)<-[:FOR]-(c:Comment) | c ] AS comments
FOREACH (c IN comments | DETACH DELETE c)
DETACH DELETE a
RETURN id",
        )
        .param("userId", author.id())
        .param("slug", slug);

        let rows = self.graph.write(statement).await?;
        if rows.is_empty() {
            return Err(DomainError::not_found("article"));
        }
        Ok(())
    }

    /// Idempotent: favoriting twice leaves one edge.
    #[instrument(skip(self, viewer), fields(viewer = viewer.id()))]
    pub async fn favorite(&self, slug: &str, viewer: &User) -> Result<Article> {
        self.toggle_favorite(slug, viewer, FAVORITED.upsert()).await
    }

    /// Tolerant: unfavoriting an article that was not favorited is a no-op.
    #[instrument(skip(self, viewer), fields(viewer = viewer.id()))]
    pub async fn unfavorite(&self, slug: &str, viewer: &User) -> Result<Article> {
        self.toggle_favorite(slug, viewer, FAVORITED.remove()).await
    }

    async fn toggle_favorite(&self, slug: &str, viewer: &User, edge_op: String) -> Result<Article> {
        let statement = Statement::new(format!(
            "MATCH (a:Article {{slug: $slug}})
MATCH (u:User {{id: $userId}})
{edge_op}
WITH DISTINCT a
RETURN{ARTICLE_COLUMNS}"
        ))
        .param("slug", slug)
        .param("userId", viewer.id());

        self.single(self.graph.write(statement).await?)
    }

    fn single(&self, rows: domains::ResultSet) -> Result<Article> {
        let mut record = rows
            .into_first()
            .ok_or_else(|| DomainError::not_found("article"))?;
        feed::decode_article(&mut record)
    }
}

/// Only the writable text fields that were supplied.
fn article_properties(input: &ArticleInput) -> GraphValue {
    let fields = [
        ("title", &input.title),
        ("description", &input.description),
        ("body", &input.body),
    ];
    GraphValue::map(
        fields
            .into_iter()
            .filter_map(|(key, value)| value.as_ref().map(|v| (key, v.clone()))),
    )
}
