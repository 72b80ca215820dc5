//! # UserService
//!
//! Registration, login, token resolution and self-service updates.
//! Passwords are hashed through the [`PasswordHasher`] port before any
//! statement is composed; tokens come from the [`TokenIssuer`] port.

use std::sync::Arc;

use domains::{
    DomainError, GraphExecutor, GraphValue, PasswordHasher, Properties, Result, Statement,
    TokenIssuer, User, UserPatch,
};
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::validation::{validate_user_patch, Login, Registration};

/// A user together with a freshly issued bearer token.
#[derive(Debug, Clone)]
pub struct UserSession {
    pub user: User,
    pub token: String,
}

impl UserSession {
    /// The user projection with `token` added.
    pub fn projection(&self) -> GraphValue {
        let mut out = match self.user.projection() {
            GraphValue::Map(props) => props,
            _ => Properties::new(),
        };
        out.insert("token".into(), GraphValue::from(self.token.as_str()));
        GraphValue::Map(out)
    }
}

pub struct UserService {
    graph: Arc<dyn GraphExecutor>,
    hasher: Arc<dyn PasswordHasher>,
    tokens: Arc<dyn TokenIssuer>,
}

impl UserService {
    pub fn new(
        graph: Arc<dyn GraphExecutor>,
        hasher: Arc<dyn PasswordHasher>,
        tokens: Arc<dyn TokenIssuer>,
    ) -> Self {
        Self {
            graph,
            hasher,
            tokens,
        }
    }

    fn session(&self, user: User) -> Result<UserSession> {
        let token = self.tokens.issue(&user.claims())?;
        Ok(UserSession { user, token })
    }

    #[instrument(skip(self, input), fields(username = input.username.as_deref()))]
    pub async fn register(&self, input: &Registration) -> Result<UserSession> {
        input.validate()?;
        let password = self.hasher.hash(input.password.as_deref().unwrap_or_default())?;

        let statement = Statement::new(
            "CREATE (u:User {
    id: $id,
    username: $username,
    email: $email,
    password: $password,
    bio: $bio,
    image: $image,
    createdAt: datetime(),
    updatedAt: datetime()
})
RETURN u",
        )
        .param("id", Uuid::new_v4().to_string())
        .param("username", input.username.as_deref().map(str::trim))
        .param("email", input.email.as_deref().map(str::trim))
        .param("password", password)
        .param("bio", input.bio.as_deref())
        .param("image", input.image.as_deref());

        let record = self
            .graph
            .write(statement)
            .await?
            .into_first()
            .ok_or_else(|| DomainError::internal("CREATE returned no row"))?;
        let user = User::from_value(record.into_value("u"))?;
        debug!(id = user.id(), "user registered");
        self.session(user)
    }

    /// Unknown email and wrong password fail the same way.
    #[instrument(skip(self, input))]
    pub async fn login(&self, input: &Login) -> Result<UserSession> {
        input.validate()?;
        let email = input.email.as_deref().unwrap_or_default().trim();
        let password = input.password.as_deref().unwrap_or_default();

        let user = self
            .find_by_email(email)
            .await?
            .ok_or(DomainError::Unauthorized)?;
        if !self.hasher.verify(password, user.password_hash().expose()) {
            return Err(DomainError::Unauthorized);
        }
        self.session(user)
    }

    /// Re-issues a token for an already resolved user.
    pub fn current(&self, user: User) -> Result<UserSession> {
        self.session(user)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let statement =
            Statement::new("MATCH (u:User {email: $email}) RETURN u").param("email", email);
        self.graph
            .read(statement)
            .await?
            .into_first()
            .map(|record| User::from_value(record.into_value("u")))
            .transpose()
    }

    /// Maps a bearer token to its user. An invalid token, or one for a
    /// user that no longer exists, resolves to `None`.
    #[instrument(skip_all)]
    pub async fn resolve(&self, token: &str) -> Result<Option<User>> {
        let Ok(claims) = self.tokens.verify(token) else {
            debug!("rejected bearer token");
            return Ok(None);
        };
        self.find_by_email(&claims.email).await
    }

    /// Writes the supplied fields only and returns the stored result.
    #[instrument(skip(self, user, patch), fields(id = user.id()))]
    pub async fn update(&self, user: &User, patch: &UserPatch) -> Result<UserSession> {
        validate_user_patch(patch)?;

        let mut properties = Properties::new();
        let fields = [
            ("username", patch.username.as_deref().map(str::trim)),
            ("email", patch.email.as_deref().map(str::trim)),
            ("bio", patch.bio.as_deref()),
            ("image", patch.image.as_deref()),
        ];
        for (key, value) in fields {
            if let Some(value) = value {
                properties.insert(key.into(), GraphValue::from(value));
            }
        }
        if let Some(plain) = patch.password.as_deref() {
            properties.insert("password".into(), GraphValue::from(self.hasher.hash(plain)?));
        }

        let statement = Statement::new(
            "MATCH (u:User {id: $userId})
SET u += $properties, u.updatedAt = datetime()
RETURN u",
        )
        .param("userId", user.id())
        .param("properties", properties);

        let record = self
            .graph
            .write(statement)
            .await?
            .into_first()
            .ok_or_else(|| DomainError::not_found("user"))?;
        self.session(User::from_value(record.into_value("u"))?)
    }
}
