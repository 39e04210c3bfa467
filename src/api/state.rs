//! Application State
//!
//! Shared state accessible by all API handlers.
//! Wrapped in Arc for thread-safe sharing across async tasks.

use std::sync::Arc;
use std::time::Instant;

use crate::api::media::MediaStore;
use crate::auth::TokenIssuer;
use crate::config::{Config, ServerConfig};
use crate::storage::Database;

/// Shared application state for all handlers
#[derive(Clone)]
pub struct AppState {
    /// SQLite repositories
    pub db: Database,
    /// Signs and validates bearer tokens
    pub tokens: TokenIssuer,
    /// Uploaded files
    pub media: MediaStore,
    /// Server configuration
    pub config: Arc<ServerConfig>,
    /// Server start time for uptime tracking
    pub start_time: Instant,
}

impl AppState {
    pub fn new(db: Database, media: MediaStore, config: &Config) -> Self {
        Self {
            db,
            tokens: TokenIssuer::new(&config.auth),
            media,
            config: Arc::new(config.server.clone()),
            start_time: Instant::now(),
        }
    }

    /// Open the database and media directory named by the configuration
    pub fn open(config: &Config) -> Result<Self, crate::storage::StorageError> {
        let db = Database::open(&config.storage.database_path())?;
        let media = MediaStore::open(config.storage.media_path())?;
        Ok(Self::new(db, media, config))
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
