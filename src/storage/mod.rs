//! GoProject Storage
//!
//! SQLite persistence for the REST service:
//!
//! - **users**: accounts, password hashes and profiles
//! - **projects**: projects, visibility and access checks, dashboard counters
//! - **team**: project memberships
//! - **tasks** / **attachments**: task board rows and uploaded files
//! - **expenses**: expense rows
//! - **activity**: the audit trail shown in the dashboard feed
//! - **tokens**: revoked refresh-token identifiers
//!
//! # Architecture
//!
//! ```text
//! Handler → Repository → Mutex<Connection> → SQLite file
//! ```
//!
//! One connection is shared by every repository behind an async mutex.
//! Each repository method takes the lock for the duration of its statements.

pub mod activity;
pub mod attachments;
mod codec;
pub mod error;
pub mod expenses;
pub mod projects;
mod schema;
pub mod tasks;
pub mod team;
pub mod tokens;
pub mod users;

use rusqlite::{Connection, OpenFlags};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

pub use activity::ActivityRepository;
pub use attachments::AttachmentRepository;
pub use error::{StorageError, StorageResult};
pub use expenses::ExpenseRepository;
pub use projects::{progress_percent, ProjectAccess, ProjectRepository};
pub use tasks::TaskRepository;
pub use team::TeamRepository;
pub use tokens::TokenRepository;
pub use users::{Credentials, UserRepository};

/// Shared handle to the SQLite database
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
    path: Option<PathBuf>,
}

impl Database {
    /// Create or open the database file, applying the schema
    pub fn open(path: &Path) -> StorageResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            ",
        )?;

        Self::init(conn, Some(path.to_path_buf()))
    }

    /// Fresh database that lives only as long as the handle
    pub fn open_in_memory() -> StorageResult<Self> {
        Self::init(Connection::open_in_memory()?, None)
    }

    fn init(conn: Connection, path: Option<PathBuf>) -> StorageResult<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.execute_batch(schema::SCHEMA)?;
        tracing::debug!(path = ?path, "Database schema ready");

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            path,
        })
    }

    /// File backing the database, `None` for in-memory databases
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Round trip used by the readiness endpoint
    pub async fn ping(&self) -> StorageResult<()> {
        let conn = self.conn.lock().await;
        conn.query_row("SELECT 1", [], |_| Ok(()))?;
        Ok(())
    }

    pub fn users(&self) -> UserRepository {
        UserRepository::new(self.conn.clone())
    }

    pub fn projects(&self) -> ProjectRepository {
        ProjectRepository::new(self.conn.clone())
    }

    pub fn team(&self) -> TeamRepository {
        TeamRepository::new(self.conn.clone())
    }

    pub fn tasks(&self) -> TaskRepository {
        TaskRepository::new(self.conn.clone())
    }

    pub fn attachments(&self) -> AttachmentRepository {
        AttachmentRepository::new(self.conn.clone())
    }

    pub fn expenses(&self) -> ExpenseRepository {
        ExpenseRepository::new(self.conn.clone())
    }

    pub fn activity(&self) -> ActivityRepository {
        ActivityRepository::new(self.conn.clone())
    }

    pub fn tokens(&self) -> TokenRepository {
        TokenRepository::new(self.conn.clone())
    }
}

/// SQL fragment selecting projects visible to user `?1`, aliased as `p`
pub(crate) const VISIBLE_PROJECT: &str = "(p.owner_id = ?1 OR EXISTS (
    SELECT 1 FROM team_members tm WHERE tm.project_id = p.id AND tm.user_id = ?1))";
