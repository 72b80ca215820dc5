//! # Cypher building blocks
//!
//! Fragments shared by more than one statement. Every value that comes
//! from a caller is bound as a parameter; the only text spliced into a
//! statement is the constant fragments below.

/// Columns every article-returning statement yields for the article bound
/// to `a`. Needs `$userId` (may be null).
pub const ARTICLE_COLUMNS: &str = "
    a,
    [ (a)<-[:POSTED]-(author:User) | author ][0] AS author,
    [ (a)-[:HAS_TAG]->(t:Tag) | t ] AS tagList,
    CASE
        WHEN $userId IS NULL THEN false
        ELSE EXISTS { (a)<-[:FAVORITED]-(:User {id: $userId}) }
    END AS favorited,
    COUNT { (a)<-[:FAVORITED]-(:User) } AS favoritesCount";

/// The same columns as a map over the article bound to `a`, for use
/// inside a list comprehension. Needs `$userId` (may be null).
pub const ARTICLE_PROJECTION: &str = "{
        a: a,
        author: [ (a)<-[:POSTED]-(author:User) | author ][0],
        tagList: [ (a)-[:HAS_TAG]->(t:Tag) | t ],
        favorited: CASE
            WHEN $userId IS NULL THEN false
            ELSE EXISTS { (a)<-[:FAVORITED]-(:User {id: $userId}) }
        END,
        favoritesCount: COUNT { (a)<-[:FAVORITED]-(:User) }
    }";

/// Merges every entry of `$tags` (maps of `name` and `slug`) as a `Tag`
/// and attaches it to `a`. Repeated names reuse the existing node.
pub fn attach_tags() -> String {
    format!(
        "FOREACH (tag IN $tags |
            MERGE (t:Tag {{name: tag.name}})
            ON CREATE SET t.id = randomUUID(), t.slug = tag.slug
            {}
        )",
        HAS_TAG.upsert()
    )
}

/// A relationship kind between two bound variables, with the
/// merge-if-absent / delete-if-present pair every toggle uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    pub from: &'static str,
    pub rel_type: &'static str,
    pub to: &'static str,
    /// Whether creation records `createdAt` on the relationship.
    pub stamped: bool,
}

impl Edge {
    pub const fn new(
        from: &'static str,
        rel_type: &'static str,
        to: &'static str,
        stamped: bool,
    ) -> Self {
        Self {
            from,
            rel_type,
            to,
            stamped,
        }
    }

    /// Creates the relationship unless one already exists. Idempotent.
    pub fn upsert(&self) -> String {
        let mut out = format!("MERGE ({})-[r:{}]->({})", self.from, self.rel_type, self.to);
        if self.stamped {
            out.push_str(" ON CREATE SET r.createdAt = datetime()");
        }
        out
    }

    /// Deletes the relationship if present; absent is a no-op.
    pub fn remove(&self) -> String {
        format!(
            "OPTIONAL MATCH ({})-[r:{}]->({}) DELETE r",
            self.from, self.rel_type, self.to
        )
    }
}

/// `(u:User)` favorites `(a:Article)`.
pub const FAVORITED: Edge = Edge::new("u", "FAVORITED", "a", true);

/// `(current:User)` follows `(target:User)`.
pub const FOLLOWS: Edge = Edge::new("current", "FOLLOWS", "target", true);

/// `(a:Article)` is tagged `(t:Tag)`.
pub const HAS_TAG: Edge = Edge::new("a", "HAS_TAG", "t", false);
