//! HS256 bearer tokens.

use chrono::Utc;
use domains::{Claims, DomainError, TokenIssuer};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Wire form: the domain claims plus the registered time claims.
#[derive(Debug, Serialize, Deserialize)]
struct TokenClaims {
    #[serde(flatten)]
    claims: Claims,
    iat: i64,
    exp: i64,
}

pub struct JwtTokens {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl_secs: i64,
}

impl JwtTokens {
    pub fn new(secret: &SecretString, ttl_secs: u64) -> Self {
        let key = secret.expose_secret().as_bytes();
        Self {
            encoding: EncodingKey::from_secret(key),
            decoding: DecodingKey::from_secret(key),
            validation: Validation::new(Algorithm::HS256),
            ttl_secs: i64::try_from(ttl_secs).unwrap_or(i64::MAX),
        }
    }

    fn issue_at(&self, claims: &Claims, issued_at: i64) -> Result<String, DomainError> {
        let body = TokenClaims {
            claims: claims.clone(),
            iat: issued_at,
            exp: issued_at.saturating_add(self.ttl_secs),
        };
        encode(&Header::new(Algorithm::HS256), &body, &self.encoding)
            .map_err(|e| DomainError::internal(format!("token encoding failed: {e}")))
    }
}

impl TokenIssuer for JwtTokens {
    fn issue(&self, claims: &Claims) -> Result<String, DomainError> {
        self.issue_at(claims, Utc::now().timestamp())
    }

    fn verify(&self, token: &str) -> Result<Claims, DomainError> {
        decode::<TokenClaims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims.claims)
            .map_err(|e| {
                debug!(error = %e, "token rejected");
                DomainError::Unauthorized
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims() -> Claims {
        Claims {
            sub: "alice".into(),
            username: "alice".into(),
            email: "alice@example.com".into(),
            bio: None,
            image: domains::DEFAULT_IMAGE.into(),
        }
    }

    fn tokens(secret: &str) -> JwtTokens {
        JwtTokens::new(&SecretString::from(secret.to_string()), 3600)
    }

    #[test]
    fn issued_token_verifies() {
        let issuer = tokens("s3cret");
        let token = issuer.issue(&claims()).unwrap();
        assert_eq!(issuer.verify(&token).unwrap(), claims());
    }

    #[test]
    fn other_secret_is_rejected() {
        let token = tokens("one").issue(&claims()).unwrap();
        assert_eq!(tokens("two").verify(&token).unwrap_err(), DomainError::Unauthorized);
    }

    #[test]
    fn expired_token_is_rejected() {
        let issuer = tokens("s3cret");
        let token = issuer.issue_at(&claims(), Utc::now().timestamp() - 7200).unwrap();
        assert_eq!(issuer.verify(&token).unwrap_err(), DomainError::Unauthorized);
    }

    #[test]
    fn garbage_is_rejected() {
        assert_eq!(tokens("s3cret").verify("a.b.c").unwrap_err(), DomainError::Unauthorized);
    }
}
