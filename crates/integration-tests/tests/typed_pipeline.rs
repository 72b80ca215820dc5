//! Driver rows through decoder, services, marshal hook and router.

use axum::http::StatusCode;
use domains::{Disclosure, GraphValue, MockPasswordHasher, MockTokenIssuer};
use integration_tests::bolt::{self, boolean, datetime, integer, list, map, string, zoned};
use integration_tests::{app, no_rows, request, send, Replay, ReplayGraph};
use neo4rs::BoltType;
use serde_json::json;

const ARTICLE_FIELDS: [&str; 5] = ["a", "author", "tagList", "favorited", "favoritesCount"];

fn article_values(id: i64, slug: &str, author: &str, tags: &[&str]) -> Vec<BoltType> {
    let article = bolt::node(
        id,
        "Article",
        vec![
            ("id", string(&format!("id-{slug}"))),
            ("slug", string(slug)),
            ("title", string("Graphs")),
            ("createdAt", datetime("2024-03-01T10:00:00.250Z")),
        ],
    );
    let tags = tags
        .iter()
        .zip(100..)
        .map(|(name, tag_id)| bolt::node(tag_id, "Tag", vec![("name", string(name))]))
        .collect();
    vec![
        article,
        bolt::user(id + 50, author, "$argon2id$secret"),
        list(tags),
        boolean(false),
        integer(2),
    ]
}

fn anonymous_app(graph: ReplayGraph) -> axum::Router {
    app(graph, MockPasswordHasher::new(), MockTokenIssuer::new(), Disclosure::HIDDEN)
}

#[tokio::test]
async fn single_article_is_plain_json() {
    let graph = ReplayGraph::new(|st| {
        assert!(st.text.starts_with("MATCH (a:Article {slug: $slug})"));
        let row = article_values(1, "graphs", "alice", &["neo4j", "rust"]);
        Replay::new(&ARTICLE_FIELDS, vec![row])
    });
    let app = anonymous_app(graph);
    let (status, body) = send(&app, request("GET", "/api/articles/graphs", None, None)).await;

    assert_eq!(status, StatusCode::OK);
    let article = &body["article"];
    assert_eq!(article["slug"], json!("graphs"));
    assert_eq!(article["favoritesCount"], json!(2));
    assert!(article["createdAt"].as_str().unwrap().starts_with("2024-03-01T10:00:00.25"));
    assert_eq!(article["tagList"], json!([{"name": "neo4j"}, {"name": "rust"}]));
    assert_eq!(article["author"]["username"], json!("alice"));
    assert!(article["author"]["createdAt"].is_string());
    assert!(article["author"].get("password").is_none());
    assert!(article.get("_id").is_none());
    assert!(article.get("_labels").is_none());
}

#[tokio::test]
async fn global_feed_reports_whole_set_size() {
    let graph = ReplayGraph::new(|st| {
        assert_eq!(st.params.get("limit"), Some(&GraphValue::Integer(1)));
        let entry = ARTICLE_FIELDS
            .into_iter()
            .zip(article_values(1, "first", "bob", &[]))
            .collect();
        Replay::new(&["articlesCount", "articles"], vec![vec![integer(7), list(vec![map(entry)])]])
    });
    let app = anonymous_app(graph);
    let (status, body) = send(&app, request("GET", "/api/articles?limit=1", None, None)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["articlesCount"], json!(7));
    assert_eq!(body["articles"].as_array().map(Vec::len), Some(1));
    assert_eq!(body["articles"][0]["slug"], json!("first"));
    assert_eq!(body["articles"][0]["tagList"], json!([]));
}

#[tokio::test]
async fn feed_past_the_last_page_still_counts() {
    let graph = ReplayGraph::new(|st| {
        assert_eq!(st.params.get("skip"), Some(&GraphValue::Integer(40)));
        Replay::new(&["articlesCount", "articles"], vec![vec![integer(3), list(vec![])]])
    });
    let app = anonymous_app(graph);
    let (status, body) = send(&app, request("GET", "/api/articles?offset=40", None, None)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["articlesCount"], json!(3));
    assert_eq!(body["articles"], json!([]));
}

#[tokio::test]
async fn missing_profile_is_404() {
    let graph = ReplayGraph::new(|_| no_rows());
    let app = anonymous_app(graph);
    let (status, body) = send(&app, request("GET", "/api/profiles/ghost", None, None)).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"code": 404, "message": "Not Found"}));
}

#[tokio::test]
async fn undecodable_value_is_a_server_error() {
    let graph = ReplayGraph::new(|_| {
        Replay::new(&["name"], vec![vec![zoned("2024-01-01T00:00:00", "Mars/Olympus_Mons")]])
    });
    let app = anonymous_app(graph);
    let (status, body) = send(&app, request("GET", "/api/tags", None, None)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], json!(500));
}
