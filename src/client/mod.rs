//! Dashboard REST client
//!
//! [`DashboardApi`] is the set of calls the pages make. [`GoProjectClient`]
//! implements it over HTTP with `reqwest`, reading bearer tokens from a
//! [`TokenStore`].

pub mod api;
pub mod error;
pub mod http;
pub mod tokens;

pub use api::{DashboardApi, Upload};
pub use error::ClientError;
pub use http::GoProjectClient;
pub use tokens::{FileTokenStore, MemoryTokenStore, StoredTokens, TokenStore};
