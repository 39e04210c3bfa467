//! Revoked refresh tokens
//!
//! Rotated refresh tokens are remembered by `jti` until they would have
//! expired anyway.

use rusqlite::{params, Connection};
use std::sync::Arc;
use tokio::sync::Mutex;

use super::StorageResult;

pub struct TokenRepository {
    conn: Arc<Mutex<Connection>>,
}

impl TokenRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// Revoke `jti`; returns false when it was already revoked
    pub async fn revoke(&self, jti: &str, expires_at: i64) -> StorageResult<bool> {
        let conn = self.conn.lock().await;
        let inserted = conn.execute(
            "INSERT OR IGNORE INTO revoked_tokens (jti, expires_at) VALUES (?1, ?2)",
            params![jti, expires_at],
        )?;
        Ok(inserted == 1)
    }

    pub async fn is_revoked(&self, jti: &str) -> StorageResult<bool> {
        let conn = self.conn.lock().await;
        let revoked = conn.query_row(
            "SELECT EXISTS (SELECT 1 FROM revoked_tokens WHERE jti = ?1)",
            [jti],
            |row| row.get(0),
        )?;
        Ok(revoked)
    }

    /// Forget revocations whose token expired before `now` (unix seconds)
    pub async fn purge_expired(&self, now: i64) -> StorageResult<usize> {
        let conn = self.conn.lock().await;
        let removed = conn.execute("DELETE FROM revoked_tokens WHERE expires_at < ?1", [now])?;
        Ok(removed)
    }
}
