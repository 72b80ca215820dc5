//! # Payload validation
//!
//! Shape checks that run before any statement is composed. A failing
//! payload never reaches the database.

use domains::{DomainError, FieldError, Result, UserPatch};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

static EMAIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern is valid")
});

/// Collects field errors and turns them into one `Validation` error.
#[derive(Debug, Default)]
struct Checks(Vec<FieldError>);

impl Checks {
    fn required(&mut self, field: &str, value: Option<&str>) {
        if value.map_or(true, |v| v.trim().is_empty()) {
            self.0.push(FieldError::new(field, "should not be empty"));
        }
    }

    /// Absent is fine, present-but-blank is not.
    fn not_blank(&mut self, field: &str, value: Option<&str>) {
        if value.is_some_and(|v| v.trim().is_empty()) {
            self.0.push(FieldError::new(field, "should not be empty"));
        }
    }

    fn email(&mut self, field: &str, value: Option<&str>) {
        if let Some(v) = value {
            if !EMAIL.is_match(v) {
                self.0.push(FieldError::new(field, "must be a valid email"));
            }
        }
    }

    fn finish(self) -> Result<()> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(DomainError::Validation(self.0))
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Registration {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub bio: Option<String>,
    pub image: Option<String>,
}

impl Registration {
    pub fn validate(&self) -> Result<()> {
        let mut checks = Checks::default();
        checks.required("user.username", self.username.as_deref());
        checks.required("user.email", self.email.as_deref());
        checks.email("user.email", self.email.as_deref());
        checks.required("user.password", self.password.as_deref());
        checks.finish()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Login {
    pub email: Option<String>,
    pub password: Option<String>,
}

impl Login {
    pub fn validate(&self) -> Result<()> {
        let mut checks = Checks::default();
        checks.required("user.email", self.email.as_deref());
        checks.required("user.password", self.password.as_deref());
        checks.finish()
    }
}

pub fn validate_user_patch(patch: &UserPatch) -> Result<()> {
    let mut checks = Checks::default();
    checks.not_blank("user.username", patch.username.as_deref());
    checks.not_blank("user.email", patch.email.as_deref());
    checks.email("user.email", patch.email.as_deref());
    checks.not_blank("user.password", patch.password.as_deref());
    checks.finish()
}

/// Body of article create and update requests.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub body: Option<String>,
    pub tag_list: Option<Vec<String>>,
}

impl ArticleInput {
    fn common(&self, checks: &mut Checks) {
        checks.not_blank("article.description", self.description.as_deref());
        checks.not_blank("article.body", self.body.as_deref());
        if let Some(tags) = &self.tag_list {
            if tags.iter().any(|t| t.trim().is_empty()) {
                checks
                    .0
                    .push(FieldError::new("article.tagList", "tags should not be empty"));
            }
        }
    }

    pub fn validate_create(&self) -> Result<()> {
        let mut checks = Checks::default();
        checks.required("article.title", self.title.as_deref());
        self.common(&mut checks);
        checks.finish()
    }

    pub fn validate_update(&self) -> Result<()> {
        let mut checks = Checks::default();
        checks.not_blank("article.title", self.title.as_deref());
        self.common(&mut checks);
        checks.finish()
    }

    /// Tag names, trimmed, first occurrence kept.
    pub fn tags(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for tag in self.tag_list.iter().flatten() {
            let tag = tag.trim();
            if !tag.is_empty() && !out.iter().any(|t| t == tag) {
                out.push(tag.to_string());
            }
        }
        out
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CommentInput {
    pub body: Option<String>,
}

impl CommentInput {
    pub fn validate(&self) -> Result<()> {
        let mut checks = Checks::default();
        checks.required("comment.body", self.body.as_deref());
        checks.finish()
    }
}
