//! Attachment Repository
//!
//! Rows for files uploaded to tasks. `file` holds the path relative to the
//! media root; the API turns it into a download URL.

use chrono::Utc;
use rusqlite::{params, Connection, Row};
use std::sync::Arc;
use tokio::sync::Mutex;

use super::{StorageResult, VISIBLE_PROJECT};
use crate::models::Attachment;

pub struct AttachmentRepository {
    conn: Arc<Mutex<Connection>>,
}

fn map_attachment(row: &Row<'_>) -> rusqlite::Result<Attachment> {
    Ok(Attachment {
        id: row.get(0)?,
        task: row.get(1)?,
        file: row.get(2)?,
        uploaded_at: row.get(3)?,
    })
}

pub(crate) fn attachments_for_task(conn: &Connection, task_id: i64) -> StorageResult<Vec<Attachment>> {
    let mut stmt = conn.prepare_cached(
        "SELECT id, task_id, file, uploaded_at FROM attachments WHERE task_id = ?1 ORDER BY id",
    )?;
    let rows = stmt
        .query_map([task_id], map_attachment)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
}

impl AttachmentRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    pub async fn create(&self, task_id: i64, uploaded_by: i64, file: &str) -> StorageResult<Attachment> {
        let conn = self.conn.lock().await;
        let uploaded_at = Utc::now();
        conn.execute(
            "INSERT INTO attachments (task_id, uploaded_by, file, uploaded_at) VALUES (?1, ?2, ?3, ?4)",
            params![task_id, uploaded_by, file, uploaded_at],
        )?;
        Ok(Attachment {
            id: conn.last_insert_rowid(),
            task: task_id,
            file: file.to_string(),
            uploaded_at,
        })
    }

    /// Attachments on tasks of projects the user can see
    pub async fn list_visible(&self, user_id: i64, task: Option<i64>) -> StorageResult<Vec<Attachment>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(&format!(
            "SELECT a.id, a.task_id, a.file, a.uploaded_at FROM attachments a
             JOIN tasks t ON t.id = a.task_id
             JOIN projects p ON p.id = t.project_id
             WHERE {VISIBLE_PROJECT} AND (?2 IS NULL OR a.task_id = ?2)
             ORDER BY a.id"
        ))?;
        let rows = stmt
            .query_map(params![user_id, task], map_attachment)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use crate::models::{Priority, ProjectInput, ProjectStatus, ProjectType, TaskInput, TaskStatus};
    use crate::storage::test_support::seeded;

    #[tokio::test]
    async fn test_attachments_show_on_task_and_respect_visibility() {
        let db = seeded().await;
        let project = db
            .projects()
            .create(
                1,
                &ProjectInput {
                    title: "Lab".to_string(),
                    description: String::new(),
                    project_type: ProjectType::Personal,
                    status: ProjectStatus::InProgress,
                    priority: Priority::Low,
                    end_date: None,
                    members: vec![],
                },
            )
            .await
            .unwrap();
        let task = db
            .tasks()
            .create(&TaskInput {
                title: "Report".to_string(),
                description: String::new(),
                project: project.id,
                status: TaskStatus::InProgress,
                priority: Priority::Low,
                due_date: None,
                assigned_to: None,
            })
            .await
            .unwrap();

        let attachment = db
            .attachments()
            .create(task.id, 1, "attachments/report.pdf")
            .await
            .unwrap();

        let task = db.tasks().get(task.id).await.unwrap();
        assert_eq!(task.attachments.len(), 1);
        assert_eq!(task.attachments[0].id, attachment.id);
        assert_eq!(task.attachments[0].file, "attachments/report.pdf");

        let mine = db.attachments().list_visible(1, Some(task.id)).await.unwrap();
        assert_eq!(mine.len(), 1);
        assert!(db.attachments().list_visible(2, None).await.unwrap().is_empty());
    }
}
