//! Authentication primitives
//!
//! - **jwt**: HS256 access/refresh tokens with rotation metadata
//! - **password**: Argon2id hashing and verification
//!
//! The axum extractor that turns a bearer header into a user lives in
//! `api::extract`, next to the application state it reads the secret from.

pub mod jwt;
pub mod password;

pub use jwt::{Claims, JwtError, TokenIssuer, TokenType};
pub use password::{hash_password, verify_password, PasswordError};
