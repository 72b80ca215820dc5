//! # Feed composition
//!
//! Global and personal feeds share one statement shape. Each supplied
//! filter appends one conjunctive predicate; absent filters add nothing.
//! The statement always yields exactly one row: the size of the whole
//! filtered set as `articlesCount`, and the requested page of it as
//! `articles`. An offset past the end still reports the full count.

use domains::{
    Article, ArticlePage, DomainError, GraphValue, Record, ResultSet, Result, Statement, Tag, User,
};
use serde::Deserialize;

use crate::cypher::ARTICLE_PROJECTION;

pub const DEFAULT_LIMIT: u32 = 10;
pub const MAX_LIMIT: u32 = 100;

/// Which articles a feed draws from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedScope<'a> {
    /// Every article.
    Global,
    /// Articles posted by users the given user follows.
    Following { user_id: &'a str },
}

/// Optional feed filters as they arrive in a query string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct FeedFilter {
    /// Username of the author.
    pub author: Option<String>,
    /// Username of a user who favorited the article.
    pub favorited: Option<String>,
    /// Comma-separated tag names; all of them must be attached.
    pub tag: Option<String>,
    pub offset: Option<u32>,
    pub limit: Option<u32>,
}

impl FeedFilter {
    fn author(&self) -> Option<&str> {
        self.author.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    fn favorited(&self) -> Option<&str> {
        self.favorited.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    /// Tag names from the comma list, blanks dropped.
    pub fn tags(&self) -> Vec<String> {
        self.tag
            .as_deref()
            .map(|list| {
                list.split(',')
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn skip(&self) -> u32 {
        self.offset.unwrap_or(0)
    }

    /// Clamped to `1..=MAX_LIMIT`.
    pub fn limit(&self) -> u32 {
        self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
    }
}

/// Builds the feed statement for `scope`, `filter` and the optional viewer.
pub fn compose(scope: &FeedScope<'_>, filter: &FeedFilter, viewer_id: Option<&str>) -> Statement {
    let mut statement = Statement::new(String::new())
        .param("userId", viewer_id)
        .param("skip", filter.skip())
        .param("limit", filter.limit());

    let source = match scope {
        FeedScope::Global => "MATCH (a:Article)",
        FeedScope::Following { user_id } => {
            statement.set_param("followerId", *user_id);
            "MATCH (:User {id: $followerId})-[:FOLLOWS]->(:User)-[:POSTED]->(a:Article)"
        }
    };

    let mut predicates: Vec<&str> = Vec::new();
    if let Some(author) = filter.author() {
        predicates.push("(a)<-[:POSTED]-(:User {username: $author})");
        statement.set_param("author", author);
    }
    if let Some(favorited) = filter.favorited() {
        predicates.push("(a)<-[:FAVORITED]-(:User {username: $favorited})");
        statement.set_param("favorited", favorited);
    }
    let tags = filter.tags();
    if !tags.is_empty() {
        predicates.push("ALL(tag IN $tags WHERE (a)-[:HAS_TAG]->(:Tag {name: tag}))");
        statement.set_param("tags", tags);
    }

    let mut text = String::with_capacity(640);
    text.push_str(source);
    text.push_str("\nWITH DISTINCT a\n");
    if !predicates.is_empty() {
        text.push_str("WHERE ");
        text.push_str(&predicates.join("\n  AND "));
        text.push('\n');
    }
    text.push_str(
        "WITH a
ORDER BY a.createdAt DESC
WITH collect(a) AS matched
RETURN size(matched) AS articlesCount,
    [a IN matched[$skip..($skip + $limit)] | ",
    );
    text.push_str(ARTICLE_PROJECTION);
    text.push_str("] AS articles");

    statement.text = text;
    statement
}

/// Builds an [`Article`] from a row (or a projected map) carrying the
/// article columns.
pub fn decode_article(record: &mut Record) -> Result<Article> {
    let node = record
        .take("a")
        .into_node()
        .ok_or_else(|| DomainError::internal("row without article node"))?;
    let author = match record.take("author") {
        GraphValue::Null => return Err(DomainError::internal("article without author")),
        value => User::from_value(value)?,
    };
    let tags = record
        .take("tagList")
        .into_list()
        .unwrap_or_default()
        .into_iter()
        .map(Tag::from_value)
        .collect::<Result<Vec<_>>>()?;
    let favorites_count = record
        .get("favoritesCount")
        .and_then(GraphValue::as_i64)
        .unwrap_or(0);
    let favorited = record
        .get("favorited")
        .and_then(GraphValue::as_bool)
        .unwrap_or(false);

    Ok(Article::new(node, author, tags, favorites_count, favorited))
}

/// Decodes the single feed row. No row at all reads as an empty page.
pub fn decode_page(rows: ResultSet) -> Result<ArticlePage> {
    let Some(mut record) = rows.into_first() else {
        return Ok(ArticlePage::default());
    };
    let articles_count = record
        .get("articlesCount")
        .and_then(GraphValue::as_i64)
        .unwrap_or(0);
    let articles = record
        .take("articles")
        .into_list()
        .unwrap_or_default()
        .into_iter()
        .map(|entry| match entry {
            GraphValue::Map(fields) => decode_article(&mut Record::from(fields)),
            _ => Err(DomainError::internal("feed entry is not a map")),
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(ArticlePage {
        articles,
        articles_count,
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use domains::{Node, Params};

    pub fn user_node(username: &str) -> Node {
        Node::new(format!("4:db:{username}"), &["User"])
            .with_property("id", format!("id-{username}"))
            .with_property("username", username)
            .with_property("email", format!("{username}@example.com"))
            .with_property("password", "hash")
    }

    pub fn article_row(
        slug: &str,
        author: &str,
        tags: &[&str],
        count: i64,
        favorited: bool,
    ) -> Vec<GraphValue> {
        let article = Node::new(format!("4:db:{slug}"), &["Article"])
            .with_property("slug", slug)
            .with_property("title", slug);
        let tags = tags
            .iter()
            .map(|name| {
                let tag = Node::new(format!("4:db:{name}"), &["Tag"]).with_property("name", *name);
                GraphValue::Node(tag)
            })
            .collect();
        vec![
            GraphValue::Node(article),
            GraphValue::Node(user_node(author)),
            GraphValue::List(tags),
            GraphValue::Boolean(favorited),
            GraphValue::Integer(count),
        ]
    }

    pub fn article_columns() -> Vec<String> {
        ["a", "author", "tagList", "favorited", "favoritesCount"]
            .iter()
            .map(|c| c.to_string())
            .collect()
    }

    /// One projected feed entry, as the list comprehension yields it.
    pub fn article_entry(slug: &str, author: &str, tags: &[&str], count: i64) -> GraphValue {
        let row = article_row(slug, author, tags, count, false);
        GraphValue::Map(article_columns().into_iter().zip(row).collect())
    }

    /// The single row a feed statement returns.
    pub fn feed_result(count: i64, entries: Vec<GraphValue>) -> ResultSet {
        ResultSet::new(
            vec!["articles".into(), "articlesCount".into()],
            vec![vec![GraphValue::List(entries), GraphValue::Integer(count)]],
        )
    }

    fn params(statement: &Statement) -> &Params {
        &statement.params
    }

    #[test]
    fn unfiltered_feed_has_no_where_clause() {
        let st = compose(&FeedScope::Global, &FeedFilter::default(), None);
        assert!(st.text.starts_with("MATCH (a:Article)"));
        assert!(!st.text.contains("WHERE "));
        assert_eq!(params(&st).get("userId"), Some(&GraphValue::Null));
        assert_eq!(params(&st).get("skip"), Some(&GraphValue::Integer(0)));
        assert_eq!(params(&st).get("limit"), Some(&GraphValue::Integer(10)));
        assert!(params(&st).get("author").is_none());
    }

    #[test]
    fn count_covers_the_sorted_set_and_page_slices_it() {
        let st = compose(&FeedScope::Global, &FeedFilter::default(), None);
        let order = st.text.find("ORDER BY a.createdAt DESC").unwrap();
        let collect = st.text.find("collect(a) AS matched").unwrap();
        let count = st.text.find("size(matched) AS articlesCount").unwrap();
        let page = st.text.find("[a IN matched[$skip..($skip + $limit)] | {").unwrap();
        assert!(order < collect && collect < count && count < page);
        assert!(st.text.ends_with("] AS articles"));
        assert!(!st.text.contains("UNWIND"));
    }

    #[test]
    fn supplied_filters_are_conjoined() {
        let filter = FeedFilter {
            author: Some("alice".into()),
            tag: Some("go, rust,".into()),
            ..Default::default()
        };
        let st = compose(&FeedScope::Global, &filter, Some("id-bob"));

        assert!(st.text.contains(
            "WHERE (a)<-[:POSTED]-(:User {username: $author})\n  AND ALL(tag IN $tags"
        ));
        assert!(!st.text.contains("$favorited"));
        assert_eq!(params(&st).get("author"), Some(&GraphValue::from("alice")));
        assert_eq!(
            params(&st).get("tags"),
            Some(&GraphValue::from(vec!["go".to_string(), "rust".to_string()]))
        );
        assert_eq!(params(&st).get("userId"), Some(&GraphValue::from("id-bob")));
    }

    #[test]
    fn blank_filters_impose_nothing() {
        let filter = FeedFilter {
            author: Some("  ".into()),
            tag: Some(",".into()),
            ..Default::default()
        };
        let st = compose(&FeedScope::Global, &filter, None);
        assert!(!st.text.contains("WHERE "));
    }

    #[test]
    fn personal_feed_is_bound_to_the_follower() {
        let st = compose(
            &FeedScope::Following { user_id: "id-bob" },
            &FeedFilter {
                favorited: Some("carol".into()),
                ..Default::default()
            },
            Some("id-bob"),
        );
        assert!(st.text.starts_with("MATCH (:User {id: $followerId})-[:FOLLOWS]->"));
        assert!(st.text.contains("WHERE (a)<-[:FAVORITED]-(:User {username: $favorited})"));
        assert_eq!(params(&st).get("followerId"), Some(&GraphValue::from("id-bob")));
    }

    #[test]
    fn limit_is_clamped() {
        let filter = FeedFilter {
            offset: Some(20),
            limit: Some(10_000),
            ..Default::default()
        };
        assert_eq!(filter.limit(), MAX_LIMIT);
        assert_eq!(filter.skip(), 20);
        let zero = FeedFilter {
            limit: Some(0),
            ..Default::default()
        };
        assert_eq!(zero.limit(), 1);
    }

    #[test]
    fn page_entries_decode_in_order() {
        let mut first = article_entry("one", "alice", &["rust"], 2);
        if let GraphValue::Map(fields) = &mut first {
            fields.insert("favorited".into(), GraphValue::Boolean(true));
        }
        let second = article_entry("two", "bob", &[], 0);

        let page = decode_page(feed_result(42, vec![first, second])).unwrap();
        assert_eq!(page.articles_count, 42);
        assert_eq!(page.articles.len(), 2);
        assert_eq!(page.articles[0].slug(), Some("one"));
        assert_eq!(page.articles[0].author().username(), "alice");
        assert_eq!(page.articles[0].favorites_count(), 2);
        assert!(page.articles[0].favorited());
        assert_eq!(page.articles[0].tags()[0].name(), Some("rust"));
        assert!(!page.articles[1].favorited());
    }

    #[test]
    fn offset_past_the_end_keeps_the_count() {
        let page = decode_page(feed_result(3, vec![])).unwrap();
        assert_eq!(page.articles_count, 3);
        assert!(page.articles.is_empty());
    }

    #[test]
    fn non_map_entry_is_a_defect() {
        let result = feed_result(1, vec![GraphValue::from("a")]);
        assert!(matches!(decode_page(result), Err(DomainError::Internal(_))));
    }

    #[test]
    fn empty_result_is_an_empty_page() {
        let page = decode_page(ResultSet::default()).unwrap();
        assert_eq!(page.articles_count, 0);
        assert!(page.articles.is_empty());
    }

    #[test]
    fn article_without_author_is_a_defect() {
        let mut row = article_row("x", "alice", &[], 0, false);
        row[1] = GraphValue::Null;
        let mut record = ResultSet::new(article_columns(), vec![row]).into_first().unwrap();
        assert!(matches!(decode_article(&mut record), Err(DomainError::Internal(_))));
    }
}
