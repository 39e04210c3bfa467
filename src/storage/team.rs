//! Team Repository
//!
//! Memberships of users in collaborative projects.

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::Arc;
use tokio::sync::Mutex;

use super::{StorageError, StorageResult, VISIBLE_PROJECT};
use crate::models::{MemberRole, MemberUser, TeamMember};

const SELECT_MEMBER: &str = "SELECT m.id, m.project_id, u.id, u.username, u.email, m.role, m.joined_at
     FROM team_members m JOIN users u ON u.id = m.user_id";

pub struct TeamRepository {
    conn: Arc<Mutex<Connection>>,
}

fn map_member(row: &Row<'_>) -> rusqlite::Result<TeamMember> {
    Ok(TeamMember {
        id: row.get(0)?,
        project: row.get(1)?,
        user: MemberUser {
            id: row.get(2)?,
            username: row.get(3)?,
            email: row.get(4)?,
        },
        role: row.get(5)?,
        joined_at: row.get(6)?,
    })
}

fn load_member(conn: &Connection, id: i64) -> StorageResult<TeamMember> {
    conn.query_row(&format!("{SELECT_MEMBER} WHERE m.id = ?1"), [id], map_member)
        .optional()?
        .ok_or_else(|| StorageError::not_found("Team member", id))
}

impl TeamRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    pub async fn add(&self, project_id: i64, user_id: i64, role: MemberRole) -> StorageResult<TeamMember> {
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO team_members (project_id, user_id, role, joined_at) VALUES (?1, ?2, ?3, ?4)",
            params![project_id, user_id, role, Utc::now()],
        )
        .map_err(|e| StorageError::from_insert(e, "This user is already a member of the project."))?;
        load_member(&conn, conn.last_insert_rowid())
    }

    pub async fn get(&self, id: i64) -> StorageResult<TeamMember> {
        let conn = self.conn.lock().await;
        load_member(&conn, id)
    }

    /// Memberships of projects the user can see, optionally of one project
    pub async fn list_visible(
        &self,
        user_id: i64,
        project: Option<i64>,
    ) -> StorageResult<Vec<TeamMember>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(&format!(
            "{SELECT_MEMBER} JOIN projects p ON p.id = m.project_id
             WHERE {VISIBLE_PROJECT} AND (?2 IS NULL OR m.project_id = ?2)
             ORDER BY m.id"
        ))?;
        let rows = stmt
            .query_map(params![user_id, project], map_member)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    pub async fn set_role(&self, id: i64, role: MemberRole) -> StorageResult<TeamMember> {
        let conn = self.conn.lock().await;
        let changed = conn.execute(
            "UPDATE team_members SET role = ?2 WHERE id = ?1",
            params![id, role],
        )?;
        if changed == 0 {
            return Err(StorageError::not_found("Team member", id));
        }
        load_member(&conn, id)
    }

    pub async fn remove(&self, id: i64) -> StorageResult<TeamMember> {
        let conn = self.conn.lock().await;
        let member = load_member(&conn, id)?;
        conn.execute("DELETE FROM team_members WHERE id = ?1", [id])?;
        Ok(member)
    }
}
