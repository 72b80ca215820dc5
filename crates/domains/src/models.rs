//! # Domain View-Models
//!
//! Each view-model owns the raw node(s) a query returned for one request
//! and exposes a stable projection. Projections are still graph values;
//! the response layer runs them through [`crate::convert::to_native`].
//!
//! Users carry two representations: [`UserRecord`] holds the password
//! hash, the projection is built only from the public half of it, so a
//! hash cannot end up in a response.

use std::fmt;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, Result};
use crate::graph::{GraphValue, Node, Properties};

/// Avatar used when a user has not set one.
pub const DEFAULT_IMAGE: &str = "https://picsum.photos/200";

/// Stored password hash. Deliberately not convertible into a graph value.
#[derive(Clone)]
pub struct PasswordHash(SecretString);

impl PasswordHash {
    pub fn new(hash: impl Into<String>) -> Self {
        Self(SecretString::from(hash.into()))
    }

    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordHash([REDACTED])")
    }
}

fn required_str(node: &Node, key: &'static str, label: &str) -> Result<String> {
    node.str_property(key)
        .map(str::to_string)
        .ok_or_else(|| DomainError::internal(format!("{label} node without `{key}`")))
}

/// Internal representation of a user, as stored.
#[derive(Debug, Clone)]
pub struct UserRecord {
    id: String,
    username: String,
    email: String,
    password: PasswordHash,
    bio: Option<String>,
    image: Option<String>,
    /// Every stored property except `password`, `bio` and `image`.
    public: Properties,
}

impl TryFrom<Node> for UserRecord {
    type Error = DomainError;

    fn try_from(mut node: Node) -> Result<Self> {
        let id = required_str(&node, "id", "User")?;
        let username = required_str(&node, "username", "User")?;
        let email = required_str(&node, "email", "User")?;
        let password = node
            .properties
            .remove("password")
            .and_then(GraphValue::into_string)
            .map(PasswordHash::new)
            .ok_or_else(|| DomainError::internal("User node without `password`"))?;
        let bio = node.properties.remove("bio").and_then(GraphValue::into_string);
        let image = node.properties.remove("image").and_then(GraphValue::into_string);

        Ok(Self {
            id,
            username,
            email,
            password,
            bio,
            image,
            public: node.properties,
        })
    }
}

/// Token claims for an authenticated user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub username: String,
    pub email: String,
    pub bio: Option<String>,
    pub image: String,
}

/// A user as seen by a particular viewer.
#[derive(Debug, Clone)]
pub struct User {
    record: UserRecord,
    following: bool,
}

impl User {
    pub fn new(record: UserRecord, following: bool) -> Self {
        Self { record, following }
    }

    /// Wraps a raw `User` node; `following` defaults to false.
    pub fn from_node(node: Node) -> Result<Self> {
        Ok(Self::new(UserRecord::try_from(node)?, false))
    }

    pub fn from_value(value: GraphValue) -> Result<Self> {
        let node = value
            .into_node()
            .ok_or_else(|| DomainError::internal("expected a User node"))?;
        Self::from_node(node)
    }

    pub fn with_following(mut self, following: bool) -> Self {
        self.following = following;
        self
    }

    /// Stable primary key.
    pub fn id(&self) -> &str {
        &self.record.id
    }

    pub fn username(&self) -> &str {
        &self.record.username
    }

    pub fn email(&self) -> &str {
        &self.record.email
    }

    pub fn following(&self) -> bool {
        self.following
    }

    pub fn image(&self) -> &str {
        self.record.image.as_deref().unwrap_or(DEFAULT_IMAGE)
    }

    /// For credential checks only.
    pub fn password_hash(&self) -> &PasswordHash {
        &self.record.password
    }

    pub fn claims(&self) -> Claims {
        Claims {
            sub: self.record.username.clone(),
            username: self.record.username.clone(),
            email: self.record.email.clone(),
            bio: self.record.bio.clone(),
            image: self.image().to_string(),
        }
    }

    /// The profile shape: public properties plus `image`, `bio` and
    /// `following`.
    pub fn projection(&self) -> GraphValue {
        let mut out = self.record.public.clone();
        out.insert("image".into(), GraphValue::from(self.image()));
        out.insert("bio".into(), GraphValue::from(self.record.bio.clone()));
        out.insert("following".into(), GraphValue::Boolean(self.following));
        GraphValue::Map(out)
    }
}

/// Partial update of a user's own properties.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UserPatch {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub bio: Option<String>,
    pub image: Option<String>,
}

impl UserPatch {
    pub fn is_empty(&self) -> bool {
        self.username.is_none()
            && self.email.is_none()
            && self.password.is_none()
            && self.bio.is_none()
            && self.image.is_none()
    }
}

#[derive(Debug, Clone)]
pub struct Tag {
    node: Node,
}

impl Tag {
    pub fn from_value(value: GraphValue) -> Result<Self> {
        value
            .into_node()
            .map(|node| Self { node })
            .ok_or_else(|| DomainError::internal("expected a Tag node"))
    }

    pub fn name(&self) -> Option<&str> {
        self.node.str_property("name")
    }

    pub fn projection(&self) -> GraphValue {
        GraphValue::Map(self.node.properties.clone())
    }
}

/// An article with its author, tags and the favorite state derived for
/// the current viewer.
#[derive(Debug, Clone)]
pub struct Article {
    node: Node,
    author: User,
    tags: Vec<Tag>,
    favorites_count: i64,
    favorited: bool,
}

impl Article {
    pub fn new(
        node: Node,
        author: User,
        tags: Vec<Tag>,
        favorites_count: i64,
        favorited: bool,
    ) -> Self {
        Self {
            node,
            author,
            tags,
            favorites_count,
            favorited,
        }
    }

    pub fn slug(&self) -> Option<&str> {
        self.node.str_property("slug")
    }

    pub fn author(&self) -> &User {
        &self.author
    }

    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    pub fn favorites_count(&self) -> i64 {
        self.favorites_count
    }

    pub fn favorited(&self) -> bool {
        self.favorited
    }

    pub fn projection(&self) -> GraphValue {
        let mut out = self.node.properties.clone();
        out.insert("favoritesCount".into(), GraphValue::Integer(self.favorites_count));
        out.insert("favorited".into(), GraphValue::Boolean(self.favorited));
        out.insert("author".into(), self.author.projection());
        out.insert(
            "tagList".into(),
            GraphValue::List(self.tags.iter().map(Tag::projection).collect()),
        );
        GraphValue::Map(out)
    }
}

/// One page of a feed together with the size of the whole filtered set.
#[derive(Debug, Clone, Default)]
pub struct ArticlePage {
    pub articles: Vec<Article>,
    pub articles_count: i64,
}

impl ArticlePage {
    pub fn projection(&self) -> GraphValue {
        GraphValue::map([
            (
                "articles",
                GraphValue::List(self.articles.iter().map(Article::projection).collect()),
            ),
            ("articlesCount", GraphValue::Integer(self.articles_count)),
        ])
    }
}

#[derive(Debug, Clone)]
pub struct Comment {
    node: Node,
    author: User,
}

impl Comment {
    pub fn new(node: Node, author: User) -> Self {
        Self { node, author }
    }

    pub fn id(&self) -> Option<&str> {
        self.node.str_property("id")
    }

    pub fn author(&self) -> &User {
        &self.author
    }

    pub fn projection(&self) -> GraphValue {
        let mut out = self.node.properties.clone();
        out.insert("author".into(), self.author.projection());
        GraphValue::Map(out)
    }
}

/// Who is asking. Anonymous callers see no favorite/following state and
/// may not perform author-only operations.
#[derive(Debug, Clone, Default)]
pub enum Identity {
    #[default]
    Anonymous,
    Authenticated(User),
}

impl Identity {
    pub fn user(&self) -> Option<&User> {
        match self {
            Identity::Anonymous => None,
            Identity::Authenticated(user) => Some(user),
        }
    }

    pub fn id(&self) -> Option<&str> {
        self.user().map(User::id)
    }

}

impl From<Option<User>> for Identity {
    fn from(user: Option<User>) -> Self {
        user.map_or(Identity::Anonymous, Identity::Authenticated)
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn user_node(username: &str) -> Node {
        Node::new(format!("4:db:{username}"), &["User"])
            .with_property("id", format!("id-{username}"))
            .with_property("username", username)
            .with_property("email", format!("{username}@example.com"))
            .with_property("password", "$argon2id$secret")
            .with_property("bio", GraphValue::Null)
    }

    pub fn tag_node(name: &str) -> Node {
        Node::new(format!("4:db:tag-{name}"), &["Tag"])
            .with_property("name", name)
            .with_property("slug", name)
    }
}
