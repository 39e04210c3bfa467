//! Token storage
//!
//! The dashboard keeps exactly two pieces of local state: the access token
//! and the refresh token. The browser keeps them in local storage; natively
//! they live in memory or in a session file.

use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use crate::models::TokenPair;

/// Stored tokens, either of which may be missing
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredTokens {
    #[serde(default)]
    pub access: Option<String>,
    #[serde(default)]
    pub refresh: Option<String>,
}

impl From<TokenPair> for StoredTokens {
    fn from(pair: TokenPair) -> Self {
        Self {
            access: Some(pair.access),
            refresh: Some(pair.refresh),
        }
    }
}

/// Where the access/refresh pair is kept between requests
pub trait TokenStore: Send + Sync {
    fn load(&self) -> StoredTokens;

    fn save(&self, tokens: &StoredTokens) -> io::Result<()>;

    fn clear(&self) -> io::Result<()> {
        self.save(&StoredTokens::default())
    }

    fn access_token(&self) -> Option<String> {
        self.load().access
    }

    fn refresh_token(&self) -> Option<String> {
        self.load().refresh
    }
}

/// Tokens held for the life of the process
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    tokens: RwLock<StoredTokens>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tokens(tokens: StoredTokens) -> Self {
        Self {
            tokens: RwLock::new(tokens),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> StoredTokens {
        match self.tokens.read() {
            Ok(tokens) => tokens.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn save(&self, tokens: &StoredTokens) -> io::Result<()> {
        match self.tokens.write() {
            Ok(mut slot) => *slot = tokens.clone(),
            Err(poisoned) => *poisoned.into_inner() = tokens.clone(),
        }
        Ok(())
    }
}

/// Tokens persisted as JSON in a session file
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TokenStore for FileTokenStore {
    /// A missing or unreadable file reads as "no tokens"
    fn load(&self) -> StoredTokens {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!(path = %self.path.display(), "Ignoring corrupt session file: {}", e);
                StoredTokens::default()
            }),
            Err(_) => StoredTokens::default(),
        }
    }

    fn save(&self, tokens: &StoredTokens) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(tokens)?;
        std::fs::write(&self.path, json)
    }

    fn clear(&self) -> io::Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn pair() -> StoredTokens {
        StoredTokens {
            access: Some("a".into()),
            refresh: Some("r".into()),
        }
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryTokenStore::new();
        assert_eq!(store.access_token(), None);

        store.save(&pair()).unwrap();
        assert_eq!(store.access_token().as_deref(), Some("a"));
        assert_eq!(store.refresh_token().as_deref(), Some("r"));

        store.clear().unwrap();
        assert_eq!(store.load(), StoredTokens::default());
    }

    #[test]
    fn test_file_store_persists() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("session.json");

        FileTokenStore::new(&path).save(&pair()).unwrap();
        let reopened = FileTokenStore::new(&path);
        assert_eq!(reopened.load(), pair());

        reopened.clear().unwrap();
        assert!(!path.exists());
        reopened.clear().unwrap();
        assert_eq!(reopened.load(), StoredTokens::default());
    }

    #[test]
    fn test_file_store_corrupt_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "{not json").unwrap();
        assert_eq!(FileTokenStore::new(&path).load(), StoredTokens::default());
    }
}
