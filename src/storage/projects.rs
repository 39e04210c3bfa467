//! Project Repository
//!
//! Projects, their derived progress, who may see them and the home-page
//! counters. A project is visible to its owner and to its team members.

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::Arc;
use tokio::sync::Mutex;

use super::{StorageError, StorageResult, VISIBLE_PROJECT};
use crate::models::{
    DashboardStats, MemberRole, Project, ProjectInput, ProjectPatch, ProjectStatus, ProjectSummary,
    ProjectType,
};

const SELECT_PROJECT: &str = "SELECT p.id, p.title, p.description, p.project_type, p.status,
        p.priority, p.start_date, p.end_date, u.username,
        (SELECT COUNT(*) FROM tasks t WHERE t.project_id = p.id),
        (SELECT COUNT(*) FROM tasks t WHERE t.project_id = p.id AND t.status = 'Done')
     FROM projects p JOIN users u ON u.id = p.owner_id";

/// How a user relates to a project
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectAccess {
    Owner,
    Member,
    Outsider,
}

impl ProjectAccess {
    /// Owner or team member
    pub fn can_view(&self) -> bool {
        !matches!(self, ProjectAccess::Outsider)
    }

    pub fn is_owner(&self) -> bool {
        matches!(self, ProjectAccess::Owner)
    }
}

/// Share of done tasks, rounded to the nearest percent; 0 with no tasks
pub fn progress_percent(done: u64, total: u64) -> u8 {
    if total == 0 {
        return 0;
    }
    ((done as f64 / total as f64) * 100.0).round() as u8
}

pub struct ProjectRepository {
    conn: Arc<Mutex<Connection>>,
}

fn map_project(row: &Row<'_>) -> rusqlite::Result<Project> {
    let total: i64 = row.get(9)?;
    let done: i64 = row.get(10)?;
    Ok(Project {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        project_type: row.get(3)?,
        status: row.get(4)?,
        priority: row.get(5)?,
        progress: progress_percent(done.max(0) as u64, total.max(0) as u64),
        start_date: row.get(6)?,
        end_date: row.get(7)?,
        owner_username: row.get(8)?,
        members: Vec::new(),
    })
}

fn member_ids(conn: &Connection, project_id: i64) -> StorageResult<Vec<i64>> {
    let mut stmt =
        conn.prepare_cached("SELECT user_id FROM team_members WHERE project_id = ?1 ORDER BY id")?;
    let ids = stmt
        .query_map([project_id], |row| row.get(0))?
        .collect::<rusqlite::Result<Vec<i64>>>()?;
    Ok(ids)
}

pub(crate) fn load_project(conn: &Connection, id: i64) -> StorageResult<Project> {
    let mut project = conn
        .query_row(&format!("{SELECT_PROJECT} WHERE p.id = ?1"), [id], map_project)
        .optional()?
        .ok_or_else(|| StorageError::not_found("Project", id))?;
    project.members = member_ids(conn, id)?;
    Ok(project)
}

pub(crate) fn project_access(
    conn: &Connection,
    project_id: i64,
    user_id: i64,
) -> StorageResult<ProjectAccess> {
    let row: Option<(i64, bool)> = conn
        .query_row(
            "SELECT p.owner_id, EXISTS (
                SELECT 1 FROM team_members tm WHERE tm.project_id = p.id AND tm.user_id = ?2)
             FROM projects p WHERE p.id = ?1",
            params![project_id, user_id],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()?;

    match row {
        None => Err(StorageError::not_found("Project", project_id)),
        Some((owner, _)) if owner == user_id => Ok(ProjectAccess::Owner),
        Some((_, true)) => Ok(ProjectAccess::Member),
        Some(_) => Ok(ProjectAccess::Outsider),
    }
}

impl ProjectRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// Create a project owned by `owner_id`; listed members other than the
    /// owner join as plain members, unknown user ids are skipped
    pub async fn create(&self, owner_id: i64, input: &ProjectInput) -> StorageResult<Project> {
        let mut conn = self.conn.lock().await;
        let tx = conn.transaction()?;
        let now = Utc::now();

        tx.execute(
            "INSERT INTO projects
                (title, description, project_type, status, priority, start_date, end_date, owner_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                input.title,
                input.description,
                input.project_type,
                input.status,
                input.priority,
                now,
                input.end_date,
                owner_id
            ],
        )?;
        let id = tx.last_insert_rowid();

        {
            let mut add = tx.prepare_cached(
                "INSERT OR IGNORE INTO team_members (project_id, user_id, role, joined_at)
                 SELECT ?1, u.id, ?3, ?4 FROM users u WHERE u.id = ?2",
            )?;
            for member in input.members.iter().filter(|m| **m != owner_id) {
                add.execute(params![id, member, MemberRole::Member, now])?;
            }
        }
        tx.commit()?;

        tracing::debug!(project_id = id, owner_id, "Project created");
        load_project(&conn, id)
    }

    pub async fn get(&self, id: i64) -> StorageResult<Project> {
        let conn = self.conn.lock().await;
        load_project(&conn, id)
    }

    /// Projects the user owns or belongs to, optionally of one type
    pub async fn list_visible(
        &self,
        user_id: i64,
        project_type: Option<ProjectType>,
    ) -> StorageResult<Vec<Project>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(&format!(
            "{SELECT_PROJECT} WHERE {VISIBLE_PROJECT} AND (?2 IS NULL OR p.project_type = ?2)
             ORDER BY p.id"
        ))?;
        let mut projects = stmt
            .query_map(params![user_id, project_type], map_project)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        for project in &mut projects {
            project.members = member_ids(&conn, project.id)?;
        }
        Ok(projects)
    }

    pub async fn access(&self, project_id: i64, user_id: i64) -> StorageResult<ProjectAccess> {
        let conn = self.conn.lock().await;
        project_access(&conn, project_id, user_id)
    }

    pub async fn update(&self, id: i64, patch: &ProjectPatch) -> StorageResult<Project> {
        let conn = self.conn.lock().await;
        let (set_end, end_date) = match patch.end_date {
            Some(value) => (true, value),
            None => (false, None),
        };
        let changed = conn.execute(
            "UPDATE projects SET
                title = COALESCE(?2, title),
                description = COALESCE(?3, description),
                status = COALESCE(?4, status),
                priority = COALESCE(?5, priority),
                end_date = CASE WHEN ?6 THEN ?7 ELSE end_date END
             WHERE id = ?1",
            params![
                id,
                patch.title,
                patch.description,
                patch.status,
                patch.priority,
                set_end,
                end_date
            ],
        )?;
        if changed == 0 {
            return Err(StorageError::not_found("Project", id));
        }
        load_project(&conn, id)
    }

    /// Delete a project with everything attached to it; returns the removed row
    pub async fn delete(&self, id: i64) -> StorageResult<Project> {
        let mut conn = self.conn.lock().await;
        let project = load_project(&conn, id)?;

        let tx = conn.transaction()?;
        tx.execute("DELETE FROM activity_logs WHERE project_id = ?1", [id])?;
        tx.execute("DELETE FROM projects WHERE id = ?1", [id])?;
        tx.commit()?;

        Ok(project)
    }

    /// Counters for the home page of `user_id`
    pub async fn dashboard_stats(&self, user_id: i64) -> StorageResult<DashboardStats> {
        let conn = self.conn.lock().await;

        let (total_projects, active_projects): (i64, i64) = conn.query_row(
            &format!(
                "SELECT COUNT(*), COALESCE(SUM(p.status = ?2), 0) FROM projects p
                 WHERE {VISIBLE_PROJECT}"
            ),
            params![user_id, ProjectStatus::InProgress],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;

        let (total_tasks, pending_tasks, completed_tasks): (i64, i64, i64) = conn.query_row(
            "SELECT COUNT(*),
                    COALESCE(SUM(status IN ('Pending', 'In Progress')), 0),
                    COALESCE(SUM(status = 'Done'), 0)
             FROM tasks WHERE assigned_to = ?1",
            [user_id],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )?;

        let mut stmt = conn.prepare(&format!(
            "SELECT p.id, p.title, p.status, p.priority, p.end_date FROM projects p
             WHERE {VISIBLE_PROJECT} ORDER BY p.start_date DESC, p.id DESC LIMIT 5"
        ))?;
        let recent_projects = stmt
            .query_map([user_id], |row| {
                Ok(ProjectSummary {
                    id: row.get(0)?,
                    title: row.get(1)?,
                    status: row.get(2)?,
                    priority: row.get(3)?,
                    end_date: row.get(4)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(DashboardStats {
            total_projects: total_projects as usize,
            active_projects: active_projects as usize,
            total_tasks: total_tasks as usize,
            pending_tasks: pending_tasks as usize,
            completed_tasks: completed_tasks as usize,
            recent_projects,
        })
    }
}
