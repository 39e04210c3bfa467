//! Activity Repository
//!
//! Append-only audit trail. Entries keep the project title so that the
//! "Deleted project" entry still reads correctly once the project is gone.

use chrono::Utc;
use rusqlite::{params, Connection};
use std::sync::Arc;
use tokio::sync::Mutex;

use super::{StorageResult, VISIBLE_PROJECT};
use crate::models::ActivityLog;

pub struct ActivityRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ActivityRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    pub async fn record(
        &self,
        user_id: i64,
        project_id: Option<i64>,
        project_title: &str,
        action: &str,
    ) -> StorageResult<()> {
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO activity_logs (user_id, action, project_id, project_title, timestamp)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![user_id, action, project_id, project_title, Utc::now()],
        )?;
        tracing::debug!(user_id, ?project_id, action, "Activity recorded");
        Ok(())
    }

    /// Entries on projects the user can see plus the user's own entries
    /// on deleted projects, newest first
    pub async fn list_visible(&self, user_id: i64) -> StorageResult<Vec<ActivityLog>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(&format!(
            "SELECT a.id, u.username, a.action, a.project_id, a.project_title, a.timestamp
             FROM activity_logs a
             JOIN users u ON u.id = a.user_id
             LEFT JOIN projects p ON p.id = a.project_id
             WHERE (p.id IS NOT NULL AND {VISIBLE_PROJECT})
                OR (a.project_id IS NULL AND a.user_id = ?1)
             ORDER BY a.timestamp DESC, a.id DESC"
        ))?;
        let rows = stmt
            .query_map([user_id], |row| {
                Ok(ActivityLog {
                    id: row.get(0)?,
                    user_name: row.get(1)?,
                    action: row.get(2)?,
                    project: row.get(3)?,
                    project_title: row.get(4)?,
                    timestamp: row.get(5)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use crate::models::{Priority, ProjectInput, ProjectStatus, ProjectType};
    use crate::storage::test_support::seeded;

    #[tokio::test]
    async fn test_feed_is_newest_first_and_scoped() {
        let db = seeded().await;
        let project = db
            .projects()
            .create(
                1,
                &ProjectInput {
                    title: "Garden".to_string(),
                    description: String::new(),
                    project_type: ProjectType::Collaborative,
                    status: ProjectStatus::InProgress,
                    priority: Priority::Low,
                    end_date: None,
                    members: vec![2],
                },
            )
            .await
            .unwrap();

        let log = db.activity();
        log.record(1, Some(project.id), "Garden", "Created project 'Garden'")
            .await
            .unwrap();
        log.record(2, Some(project.id), "Garden", "Completed task 'Dig'")
            .await
            .unwrap();
        log.record(1, None, "Old", "Deleted project 'Old'")
            .await
            .unwrap();

        let alice = log.list_visible(1).await.unwrap();
        assert_eq!(alice.len(), 3);
        assert_eq!(alice[0].action, "Deleted project 'Old'");
        assert_eq!(alice[1].user_name, "bob");

        let bob = log.list_visible(2).await.unwrap();
        assert_eq!(bob.len(), 2);
        assert!(log.list_visible(3).await.unwrap().is_empty());
    }
}
