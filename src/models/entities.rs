//! Records exchanged between the API and the dashboards

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::enums::{
    ExpenseCategory, MemberRole, Priority, ProfileRole, ProjectStatus, ProjectType, TaskStatus,
};
use super::money::Money;

/// Profile attached to every user
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub role: ProfileRole,
    #[serde(default)]
    pub course: String,
    #[serde(default)]
    pub bio: String,
    /// Absolute URL of the uploaded picture
    #[serde(default)]
    pub profile_picture: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub profile: Profile,
}

impl User {
    /// Two-letter avatar initials ("U" when the name is empty)
    pub fn initials(&self) -> String {
        initials(&self.username)
    }
}

/// Uppercased first two characters of a name
pub fn initials(name: &str) -> String {
    if name.is_empty() {
        return "U".to_string();
    }
    name.chars().take(2).collect::<String>().to_uppercase()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub project_type: ProjectType,
    #[serde(default)]
    pub status: ProjectStatus,
    #[serde(default)]
    pub priority: Priority,
    /// Percentage of tasks marked Done, 0 when there are none
    #[serde(default)]
    pub progress: u8,
    pub start_date: DateTime<Utc>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    pub owner_username: String,
    /// User ids of the team members
    #[serde(default)]
    pub members: Vec<i64>,
}

impl Project {
    pub fn is_collaborative(&self) -> bool {
        self.project_type == ProjectType::Collaborative
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    pub id: i64,
    pub task: i64,
    /// Download URL
    pub file: String,
    pub uploaded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub project: i64,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub assigned_to: Option<i64>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

impl Task {
    /// Done tasks cannot be edited from the board
    pub fn is_locked(&self) -> bool {
        self.status.is_done()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub id: i64,
    #[serde(default)]
    pub description: String,
    pub amount: Money,
    pub category: ExpenseCategory,
    pub project: i64,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityLog {
    pub id: i64,
    pub user_name: String,
    pub action: String,
    #[serde(default)]
    pub project: Option<i64>,
    pub project_title: String,
    pub timestamp: DateTime<Utc>,
}

/// User as embedded in a team membership
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberUser {
    pub id: i64,
    pub username: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamMember {
    pub id: i64,
    pub project: i64,
    pub user: MemberUser,
    #[serde(default)]
    pub role: MemberRole,
    pub joined_at: DateTime<Utc>,
}

/// Counters shown on the home page header
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total_projects: usize,
    pub active_projects: usize,
    pub total_tasks: usize,
    pub pending_tasks: usize,
    pub completed_tasks: usize,
    pub recent_projects: Vec<ProjectSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectSummary {
    pub id: i64,
    pub title: String,
    pub status: ProjectStatus,
    pub priority: Priority,
    pub end_date: Option<NaiveDate>,
}

/// Access/refresh pair issued by the token endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initials() {
        assert_eq!(initials("maria"), "MA");
        assert_eq!(initials("j"), "J");
        assert_eq!(initials(""), "U");
    }

    #[test]
    fn test_task_from_minimal_json() {
        let task: Task = serde_json::from_str(
            r#"{"id": 3, "title": "Draft docs", "project": 1, "status": "To Do"}"#,
        )
        .unwrap();
        assert_eq!(task.status, TaskStatus::Pending);
        assert_eq!(task.priority, Priority::Medium);
        assert!(task.attachments.is_empty());
        assert!(!task.is_locked());
    }

    #[test]
    fn test_expense_amount_string() {
        let expense: Expense = serde_json::from_str(
            r#"{"id": 1, "amount": "150.00", "category": "Software", "project": 2, "date": "2024-11-05"}"#,
        )
        .unwrap();
        assert_eq!(expense.amount, Money::from_cents(15000));
        assert_eq!(expense.category, ExpenseCategory::Software);
    }
}
