//! Expense Repository

use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::Arc;
use tokio::sync::Mutex;

use super::{StorageError, StorageResult, VISIBLE_PROJECT};
use crate::models::{Expense, ExpenseInput, ExpensePatch};

const SELECT_EXPENSE: &str =
    "SELECT e.id, e.description, e.amount_cents, e.category, e.project_id, e.date FROM expenses e";

pub struct ExpenseRepository {
    conn: Arc<Mutex<Connection>>,
}

fn map_expense(row: &Row<'_>) -> rusqlite::Result<Expense> {
    Ok(Expense {
        id: row.get(0)?,
        description: row.get(1)?,
        amount: row.get(2)?,
        category: row.get(3)?,
        project: row.get(4)?,
        date: row.get(5)?,
    })
}

fn load_expense(conn: &Connection, id: i64) -> StorageResult<Expense> {
    conn.query_row(&format!("{SELECT_EXPENSE} WHERE e.id = ?1"), [id], map_expense)
        .optional()?
        .ok_or_else(|| StorageError::not_found("Expense", id))
}

impl ExpenseRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// Insert an expense dated `date` when the input carries none
    pub async fn create(&self, input: &ExpenseInput, date: NaiveDate) -> StorageResult<Expense> {
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO expenses (description, amount_cents, category, project_id, date)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                input.description,
                input.amount,
                input.category,
                input.project,
                input.date.unwrap_or(date)
            ],
        )?;
        load_expense(&conn, conn.last_insert_rowid())
    }

    pub async fn get(&self, id: i64) -> StorageResult<Expense> {
        let conn = self.conn.lock().await;
        load_expense(&conn, id)
    }

    /// Expenses of projects the user can see, newest date first
    pub async fn list_visible(
        &self,
        user_id: i64,
        project: Option<i64>,
    ) -> StorageResult<Vec<Expense>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(&format!(
            "{SELECT_EXPENSE} JOIN projects p ON p.id = e.project_id
             WHERE {VISIBLE_PROJECT} AND (?2 IS NULL OR e.project_id = ?2)
             ORDER BY e.date DESC, e.id DESC"
        ))?;
        let rows = stmt
            .query_map(params![user_id, project], map_expense)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    pub async fn update(&self, id: i64, patch: &ExpensePatch) -> StorageResult<Expense> {
        let conn = self.conn.lock().await;
        let changed = conn.execute(
            "UPDATE expenses SET
                description = COALESCE(?2, description),
                amount_cents = COALESCE(?3, amount_cents),
                category = COALESCE(?4, category),
                date = COALESCE(?5, date)
             WHERE id = ?1",
            params![id, patch.description, patch.amount, patch.category, patch.date],
        )?;
        if changed == 0 {
            return Err(StorageError::not_found("Expense", id));
        }
        load_expense(&conn, id)
    }

    pub async fn delete(&self, id: i64) -> StorageResult<Expense> {
        let conn = self.conn.lock().await;
        let expense = load_expense(&conn, id)?;
        conn.execute("DELETE FROM expenses WHERE id = ?1", [id])?;
        Ok(expense)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        ExpenseCategory, Money, Priority, ProjectInput, ProjectStatus, ProjectType,
    };
    use crate::storage::test_support::seeded;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 11, d).unwrap()
    }

    #[tokio::test]
    async fn test_expense_lifecycle() {
        let db = seeded().await;
        let project = db
            .projects()
            .create(
                1,
                &ProjectInput {
                    title: "Robotics".to_string(),
                    description: String::new(),
                    project_type: ProjectType::Personal,
                    status: ProjectStatus::InProgress,
                    priority: Priority::Medium,
                    end_date: None,
                    members: vec![],
                },
            )
            .await
            .unwrap();

        let input = ExpenseInput {
            description: "Servo motors".to_string(),
            amount: "42.50".parse().unwrap(),
            category: ExpenseCategory::Equipment,
            project: project.id,
            date: None,
        };
        let created = db.expenses().create(&input, day(5)).await.unwrap();
        assert_eq!(created.date, day(5));
        assert_eq!(created.amount, Money::from_cents(4250));

        let dated = ExpenseInput {
            date: Some(day(7)),
            ..input.clone()
        };
        db.expenses().create(&dated, day(5)).await.unwrap();

        let listed = db.expenses().list_visible(1, Some(project.id)).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].date, day(7));
        assert!(db.expenses().list_visible(2, None).await.unwrap().is_empty());

        let updated = db
            .expenses()
            .update(
                created.id,
                &ExpensePatch {
                    amount: Some(Money::from_cents(100)),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.amount.to_string(), "1.00");
        assert_eq!(updated.description, "Servo motors");

        db.expenses().delete(created.id).await.unwrap();
        assert!(db.expenses().get(created.id).await.is_err());
    }
}
