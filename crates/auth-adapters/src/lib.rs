//! conduit/crates/auth-adapters/src/lib.rs
//!
//! Implementations of the `PasswordHasher` and `TokenIssuer` ports.

pub mod password;

#[cfg(feature = "auth-jwt")]
pub mod jwt;

pub use password::Argon2Hasher;

#[cfg(feature = "auth-jwt")]
pub use jwt::JwtTokens;
