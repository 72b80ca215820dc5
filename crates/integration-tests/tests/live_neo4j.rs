//! Tests against a running Neo4j 5.x server over Bolt.
//!
//! ```text
//! CONDUIT_TEST_NEO4J_URL=bolt://localhost:7687 \
//! CONDUIT_TEST_NEO4J_PASSWORD=secret \
//! cargo test -p integration-tests --test live_neo4j -- --ignored
//! ```
//!
//! Every test works on freshly named users and tags, so runs do not
//! interfere with each other or with existing data.

use std::env;
use std::sync::Arc;

use auth_adapters::{Argon2Hasher, JwtTokens};
use domains::{DomainError, GraphExecutor, GraphValue, Identity, Statement, User};
use secrecy::SecretString;
use services::{AppServices, ArticleInput, CommentInput, FeedFilter, Registration};
use storage_adapters::{Neo4jConfig, Neo4jGraph};
use uuid::Uuid;

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.into())
}

async fn graph() -> Neo4jGraph {
    Neo4jGraph::connect(Neo4jConfig {
        uri: env::var("CONDUIT_TEST_NEO4J_URL").expect("CONDUIT_TEST_NEO4J_URL"),
        username: env_or("CONDUIT_TEST_NEO4J_USER", "neo4j"),
        password: SecretString::from(env_or("CONDUIT_TEST_NEO4J_PASSWORD", "password")),
        database: env_or("CONDUIT_TEST_NEO4J_DATABASE", "neo4j"),
        max_connections: 4,
        fetch_size: 100,
    })
    .await
    .unwrap()
}

async fn services() -> AppServices {
    let tokens = JwtTokens::new(&SecretString::from("live-test-secret".to_string()), 600);
    AppServices::new(Arc::new(graph().await), Arc::new(Argon2Hasher), Arc::new(tokens))
}

fn unique(prefix: &str) -> String {
    format!("{prefix}-{}", Uuid::new_v4().simple())
}

async fn user(services: &AppServices) -> User {
    let username = unique("user");
    let registration = Registration {
        email: Some(format!("{username}@live.test")),
        username: Some(username),
        password: Some("live-password".into()),
        ..Default::default()
    };
    services.users.register(&registration).await.unwrap().user
}

async fn article(services: &AppServices, author: &User, tags: &[&str]) -> String {
    let input = ArticleInput {
        title: Some(unique("Live article")),
        description: Some("d".into()),
        body: Some("b".into()),
        tag_list: Some(tags.iter().map(|t| t.to_string()).collect()),
    };
    let created = services.articles.create(author, &input).await.unwrap();
    created.slug().unwrap().to_string()
}

#[tokio::test]
#[ignore = "needs a Neo4j server"]
async fn favorite_is_idempotent() {
    let services = services().await;
    let author = user(&services).await;
    let reader = user(&services).await;
    let slug = article(&services, &author, &[]).await;

    services.articles.favorite(&slug, &reader).await.unwrap();
    let twice = services.articles.favorite(&slug, &reader).await.unwrap();
    assert_eq!(twice.favorites_count(), 1);
    assert!(twice.favorited());

    services.articles.unfavorite(&slug, &reader).await.unwrap();
    let gone = services.articles.unfavorite(&slug, &reader).await.unwrap();
    assert_eq!(gone.favorites_count(), 0);
    assert!(!gone.favorited());
}

#[tokio::test]
#[ignore = "needs a Neo4j server"]
async fn repeated_tag_names_share_one_node() {
    let services = services().await;
    let author = user(&services).await;
    let tag = unique("tag");
    article(&services, &author, &[&tag]).await;
    article(&services, &author, &[&tag]).await;

    let tags = services.tags.list().await.unwrap();
    assert_eq!(tags.iter().filter(|t| **t == tag).count(), 1);
}

#[tokio::test]
#[ignore = "needs a Neo4j server"]
async fn feed_filters_are_conjunctive() {
    let services = services().await;
    let alice = user(&services).await;
    let bob = user(&services).await;
    let tag = unique("tag");
    let wanted = article(&services, &alice, &[&tag]).await;
    article(&services, &alice, &[]).await;
    article(&services, &bob, &[&tag]).await;

    let filter = FeedFilter {
        author: Some(alice.username().to_string()),
        tag: Some(tag),
        ..Default::default()
    };
    let page = services.articles.list(&Identity::Anonymous, &filter).await.unwrap();
    assert_eq!(page.articles_count, 1);
    assert_eq!(page.articles[0].slug(), Some(wanted.as_str()));
}

#[tokio::test]
#[ignore = "needs a Neo4j server"]
async fn personal_feed_only_shows_followed_authors() {
    let services = services().await;
    let reader = user(&services).await;
    let followed = user(&services).await;
    let stranger = user(&services).await;
    let slug = article(&services, &followed, &[]).await;
    article(&services, &stranger, &[]).await;

    let profile = services.profiles.follow(followed.username(), &reader).await.unwrap();
    assert!(profile.following());

    let page = services
        .articles
        .personal_feed(&reader, &FeedFilter::default())
        .await
        .unwrap();
    assert_eq!(page.articles_count, 1);
    assert_eq!(page.articles[0].slug(), Some(slug.as_str()));
}

#[tokio::test]
#[ignore = "needs a Neo4j server"]
async fn only_the_author_may_delete() {
    let services = services().await;
    let author = user(&services).await;
    let other = user(&services).await;
    let slug = article(&services, &author, &[]).await;

    let err = services.articles.delete(&slug, &other).await.unwrap_err();
    assert!(matches!(err, DomainError::NotFound { .. }));

    services.articles.delete(&slug, &author).await.unwrap();
    let err = services.articles.get(&slug, &Identity::Anonymous).await.unwrap_err();
    assert!(matches!(err, DomainError::NotFound { .. }));
}

#[tokio::test]
#[ignore = "needs a Neo4j server"]
async fn update_replaces_tags_only_when_supplied() {
    let services = services().await;
    let author = user(&services).await;
    let (first, second) = (unique("tag"), unique("tag"));
    let slug = article(&services, &author, &[&first]).await;
    let tag_names = |article: &domains::Article| -> Vec<String> {
        article.tags().iter().filter_map(|t| t.name()).map(str::to_string).collect()
    };

    let retagged = ArticleInput {
        tag_list: Some(vec![second.clone()]),
        ..Default::default()
    };
    let updated = services.articles.update(&slug, &author, &retagged).await.unwrap();
    assert_eq!(tag_names(&updated), [second.clone()]);

    let untouched = ArticleInput {
        description: Some("new description".into()),
        ..Default::default()
    };
    let updated = services.articles.update(&slug, &author, &untouched).await.unwrap();
    assert_eq!(tag_names(&updated), [second]);
}

#[tokio::test]
#[ignore = "needs a Neo4j server"]
async fn only_the_comment_author_may_delete_it() {
    let services = services().await;
    let author = user(&services).await;
    let other = user(&services).await;
    let slug = article(&services, &author, &[]).await;

    let input = CommentInput {
        body: Some("first!".into()),
    };
    let comment = services.comments.add(&slug, &author, &input).await.unwrap();
    let id = comment.id().unwrap().to_string();

    let err = services.comments.delete(&slug, &id, &other).await.unwrap_err();
    assert!(matches!(err, DomainError::NotFound { .. }));
    let remaining = services.comments.list(&slug, &Identity::Anonymous).await.unwrap();
    assert_eq!(remaining.len(), 1);

    services.comments.delete(&slug, &id, &author).await.unwrap();
    let remaining = services.comments.list(&slug, &Identity::Anonymous).await.unwrap();
    assert!(remaining.is_empty());
}

#[tokio::test]
#[ignore = "needs a Neo4j server"]
async fn offset_past_the_end_keeps_the_count() {
    let services = services().await;
    let author = user(&services).await;
    article(&services, &author, &[]).await;

    let filter = FeedFilter {
        author: Some(author.username().to_string()),
        offset: Some(5),
        ..Default::default()
    };
    let page = services.articles.list(&Identity::Anonymous, &filter).await.unwrap();
    assert_eq!(page.articles_count, 1);
    assert!(page.articles.is_empty());
}

#[tokio::test]
#[ignore = "needs a Neo4j server"]
async fn statement_database_is_honoured() {
    let graph = graph().await;
    let statement = Statement::new("CALL db.info() YIELD name RETURN name").database("system");
    let result = graph.read(statement).await.unwrap();
    let name = result.into_first().map(|mut row| row.take("name"));
    assert_eq!(name, Some(GraphValue::String("system".into())));
}
