//! Task Repository

use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::Arc;
use tokio::sync::Mutex;

use super::attachments::attachments_for_task;
use super::{StorageError, StorageResult, VISIBLE_PROJECT};
use crate::models::{Task, TaskInput, TaskPatch};

const SELECT_TASK: &str = "SELECT t.id, t.title, t.description, t.project_id, t.status,
        t.priority, t.due_date, t.assigned_to
     FROM tasks t";

pub struct TaskRepository {
    conn: Arc<Mutex<Connection>>,
}

fn map_task(row: &Row<'_>) -> rusqlite::Result<Task> {
    Ok(Task {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        project: row.get(3)?,
        status: row.get(4)?,
        priority: row.get(5)?,
        due_date: row.get(6)?,
        assigned_to: row.get(7)?,
        attachments: Vec::new(),
    })
}

fn load_task(conn: &Connection, id: i64) -> StorageResult<Task> {
    let mut task = conn
        .query_row(&format!("{SELECT_TASK} WHERE t.id = ?1"), [id], map_task)
        .optional()?
        .ok_or_else(|| StorageError::not_found("Task", id))?;
    task.attachments = attachments_for_task(conn, id)?;
    Ok(task)
}

impl TaskRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    pub async fn create(&self, input: &TaskInput) -> StorageResult<Task> {
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO tasks
                (title, description, project_id, status, priority, due_date, assigned_to)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                input.title,
                input.description,
                input.project,
                input.status,
                input.priority,
                input.due_date,
                input.assigned_to
            ],
        )?;
        load_task(&conn, conn.last_insert_rowid())
    }

    pub async fn get(&self, id: i64) -> StorageResult<Task> {
        let conn = self.conn.lock().await;
        load_task(&conn, id)
    }

    /// Tasks of every project the user can see, optionally of one project
    pub async fn list_visible(&self, user_id: i64, project: Option<i64>) -> StorageResult<Vec<Task>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(&format!(
            "{SELECT_TASK} JOIN projects p ON p.id = t.project_id
             WHERE {VISIBLE_PROJECT} AND (?2 IS NULL OR t.project_id = ?2)
             ORDER BY t.id"
        ))?;
        let mut tasks = stmt
            .query_map(params![user_id, project], map_task)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        for task in &mut tasks {
            task.attachments = attachments_for_task(&conn, task.id)?;
        }
        Ok(tasks)
    }

    /// Apply a partial update; returns the task before and after
    pub async fn update(&self, id: i64, patch: &TaskPatch) -> StorageResult<(Task, Task)> {
        let conn = self.conn.lock().await;
        let before = load_task(&conn, id)?;

        let (set_due, due_date) = match patch.due_date {
            Some(value) => (true, value),
            None => (false, None),
        };
        let (set_assignee, assigned_to) = match patch.assigned_to {
            Some(value) => (true, value),
            None => (false, None),
        };
        conn.execute(
            "UPDATE tasks SET
                title = COALESCE(?2, title),
                description = COALESCE(?3, description),
                status = COALESCE(?4, status),
                priority = COALESCE(?5, priority),
                due_date = CASE WHEN ?6 THEN ?7 ELSE due_date END,
                assigned_to = CASE WHEN ?8 THEN ?9 ELSE assigned_to END
             WHERE id = ?1",
            params![
                id,
                patch.title,
                patch.description,
                patch.status,
                patch.priority,
                set_due,
                due_date,
                set_assignee,
                assigned_to
            ],
        )?;

        let after = load_task(&conn, id)?;
        Ok((before, after))
    }

    /// Delete a task and its attachment rows; returns the removed task
    pub async fn delete(&self, id: i64) -> StorageResult<Task> {
        let conn = self.conn.lock().await;
        let task = load_task(&conn, id)?;
        conn.execute("DELETE FROM tasks WHERE id = ?1", [id])?;
        Ok(task)
    }
}
