//! User Repository
//!
//! Accounts, password hashes and the profile created alongside every user.

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::Arc;
use tokio::sync::Mutex;

use super::{StorageError, StorageResult};
use crate::models::{Profile, ProfileRole, ProfileUpdate, User};

const SELECT_USER: &str = "SELECT u.id, u.username, u.email, p.role, p.course, p.bio, p.picture
     FROM users u LEFT JOIN profiles p ON p.user_id = u.id";

/// Stored login material for a username
#[derive(Debug, Clone)]
pub struct Credentials {
    pub user_id: i64,
    pub password_hash: String,
}

pub struct UserRepository {
    conn: Arc<Mutex<Connection>>,
}

fn map_user(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        email: row.get(2)?,
        profile: Profile {
            role: row.get::<_, Option<ProfileRole>>(3)?.unwrap_or_default(),
            course: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
            bio: row.get::<_, Option<String>>(5)?.unwrap_or_default(),
            profile_picture: row.get(6)?,
        },
    })
}

pub(crate) fn load_user(conn: &Connection, id: i64) -> StorageResult<User> {
    conn.query_row(&format!("{SELECT_USER} WHERE u.id = ?1"), [id], map_user)
        .optional()?
        .ok_or_else(|| StorageError::not_found("User", id))
}

impl UserRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// Create a user together with an empty Student profile
    pub async fn create(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> StorageResult<User> {
        let mut conn = self.conn.lock().await;
        let tx = conn.transaction()?;

        tx.execute(
            "INSERT INTO users (username, email, password_hash, date_joined) VALUES (?1, ?2, ?3, ?4)",
            params![username, email, password_hash, Utc::now()],
        )
        .map_err(|e| StorageError::from_insert(e, "A user with that username already exists."))?;
        let id = tx.last_insert_rowid();
        tx.execute(
            "INSERT INTO profiles (user_id, role) VALUES (?1, ?2)",
            params![id, ProfileRole::default()],
        )?;
        tx.commit()?;

        tracing::info!(user_id = id, username, "User registered");
        load_user(&conn, id)
    }

    pub async fn get(&self, id: i64) -> StorageResult<User> {
        let conn = self.conn.lock().await;
        load_user(&conn, id)
    }

    /// All users, ordered by id
    pub async fn list(&self) -> StorageResult<Vec<User>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(&format!("{SELECT_USER} ORDER BY u.id"))?;
        let users = stmt
            .query_map([], map_user)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(users)
    }

    /// Login material for a username (case-insensitive)
    pub async fn credentials(&self, username: &str) -> StorageResult<Option<Credentials>> {
        let conn = self.conn.lock().await;
        let creds = conn
            .query_row(
                "SELECT id, password_hash FROM users WHERE username = ?1",
                [username],
                |row| {
                    Ok(Credentials {
                        user_id: row.get(0)?,
                        password_hash: row.get(1)?,
                    })
                },
            )
            .optional()?;
        Ok(creds)
    }

    pub async fn password_hash(&self, id: i64) -> StorageResult<String> {
        let conn = self.conn.lock().await;
        conn.query_row(
            "SELECT password_hash FROM users WHERE id = ?1",
            [id],
            |row| row.get(0),
        )
        .optional()?
        .ok_or_else(|| StorageError::not_found("User", id))
    }

    pub async fn set_password(&self, id: i64, password_hash: &str) -> StorageResult<()> {
        let conn = self.conn.lock().await;
        let changed = conn.execute(
            "UPDATE users SET password_hash = ?1 WHERE id = ?2",
            params![password_hash, id],
        )?;
        if changed == 0 {
            return Err(StorageError::not_found("User", id));
        }
        Ok(())
    }

    /// Whether another user already uses this username
    pub async fn username_taken(&self, username: &str, except: i64) -> StorageResult<bool> {
        let conn = self.conn.lock().await;
        let taken = conn.query_row(
            "SELECT EXISTS (SELECT 1 FROM users WHERE username = ?1 AND id != ?2)",
            params![username, except],
            |row| row.get(0),
        )?;
        Ok(taken)
    }

    /// Whether another user already uses this email
    pub async fn email_taken(&self, email: &str, except: i64) -> StorageResult<bool> {
        let conn = self.conn.lock().await;
        let taken = conn.query_row(
            "SELECT EXISTS (SELECT 1 FROM users WHERE lower(email) = lower(?1) AND id != ?2)",
            params![email, except],
            |row| row.get(0),
        )?;
        Ok(taken)
    }

    /// Apply a profile update; `picture` replaces the stored media path when set
    pub async fn update_profile(
        &self,
        id: i64,
        update: &ProfileUpdate,
        picture: Option<&str>,
    ) -> StorageResult<User> {
        let mut conn = self.conn.lock().await;
        let tx = conn.transaction()?;

        if let Some(username) = update.username.as_deref().filter(|s| !s.is_empty()) {
            tx.execute(
                "UPDATE users SET username = ?1 WHERE id = ?2",
                params![username, id],
            )
            .map_err(|e| StorageError::from_insert(e, "This username is already taken."))?;
        }
        if let Some(email) = update.email.as_deref().filter(|s| !s.is_empty()) {
            tx.execute("UPDATE users SET email = ?1 WHERE id = ?2", params![email, id])?;
        }

        tx.execute(
            "INSERT OR IGNORE INTO profiles (user_id, role) VALUES (?1, ?2)",
            params![id, ProfileRole::default()],
        )?;
        tx.execute(
            "UPDATE profiles SET
                role = COALESCE(?2, role),
                course = COALESCE(?3, course),
                bio = COALESCE(?4, bio),
                picture = COALESCE(?5, picture)
             WHERE user_id = ?1",
            params![id, update.role, update.course, update.bio, picture],
        )?;
        tx.commit()?;

        load_user(&conn, id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Database;

    #[tokio::test]
    async fn test_create_user_with_default_profile() {
        let db = Database::open_in_memory().unwrap();
        let user = db.users().create("maria", "maria@example.com", "h").await.unwrap();

        assert_eq!(user.username, "maria");
        assert_eq!(user.profile.role, ProfileRole::Student);
        assert_eq!(user.profile.profile_picture, None);
    }

    #[tokio::test]
    async fn test_duplicate_username_conflicts() {
        let db = Database::open_in_memory().unwrap();
        db.users().create("maria", "a@example.com", "h").await.unwrap();

        let err = db
            .users()
            .create("Maria", "b@example.com", "h")
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_credentials_lookup() {
        let db = Database::open_in_memory().unwrap();
        let user = db.users().create("maria", "a@example.com", "secret-hash").await.unwrap();

        let creds = db.users().credentials("maria").await.unwrap().unwrap();
        assert_eq!(creds.user_id, user.id);
        assert_eq!(creds.password_hash, "secret-hash");
        assert!(db.users().credentials("nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_profile_partial() {
        let db = Database::open_in_memory().unwrap();
        let user = db.users().create("maria", "a@example.com", "h").await.unwrap();

        let update = ProfileUpdate {
            role: Some(ProfileRole::Teacher),
            bio: Some("Teaches databases".to_string()),
            ..Default::default()
        };
        let updated = db
            .users()
            .update_profile(user.id, &update, Some("profile_pics/maria.png"))
            .await
            .unwrap();

        assert_eq!(updated.username, "maria");
        assert_eq!(updated.profile.role, ProfileRole::Teacher);
        assert_eq!(updated.profile.bio, "Teaches databases");
        assert_eq!(updated.profile.course, "");
        assert_eq!(
            updated.profile.profile_picture.as_deref(),
            Some("profile_pics/maria.png")
        );
    }

    #[tokio::test]
    async fn test_taken_checks_exclude_self() {
        let db = Database::open_in_memory().unwrap();
        let a = db.users().create("alice", "alice@example.com", "h").await.unwrap();
        let b = db.users().create("bob", "bob@example.com", "h").await.unwrap();

        assert!(!db.users().username_taken("alice", a.id).await.unwrap());
        assert!(db.users().username_taken("alice", b.id).await.unwrap());
        assert!(db.users().email_taken("ALICE@example.com", b.id).await.unwrap());
    }
}
