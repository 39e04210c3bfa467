//! Wire types exchanged with the GoProject API
//!
//! Enumerated fields stay as their wire labels (`"In Progress"`, `"Food"`);
//! the option lists below feed the form selects.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

pub const PROJECT_STATUSES: &[&str] = &["In Progress", "Complete"];
pub const PRIORITIES: &[&str] = &["High", "Medium", "Low"];
pub const EXPENSE_CATEGORIES: &[&str] = &[
    "Transportation",
    "Materials",
    "Equipment",
    "Food",
    "Software",
    "Supplies",
    "Travel",
    "Other",
];
pub const PROFILE_ROLES: &[&str] = &["Student", "Teacher"];

pub const PERSONAL: &str = "Personal";
pub const COLLABORATIVE: &str = "Collaborative";

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub course: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub profile_picture: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub profile: Profile,
}

impl User {
    pub fn initials(&self) -> String {
        if self.username.is_empty() {
            return "U".to_string();
        }
        self.username.chars().take(2).collect::<String>().to_uppercase()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub project_type: String,
    pub status: String,
    pub priority: String,
    pub progress: u8,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<NaiveDate>,
    pub owner_username: String,
    #[serde(default)]
    pub members: Vec<i64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    pub id: i64,
    pub task: i64,
    pub file: String,
    pub uploaded_at: DateTime<Utc>,
}

impl Attachment {
    pub fn file_name(&self) -> &str {
        self.file.rsplit('/').next().unwrap_or(&self.file)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub project: i64,
    pub status: String,
    pub priority: String,
    pub due_date: Option<NaiveDate>,
    pub assigned_to: Option<i64>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

impl Task {
    pub fn is_done(&self) -> bool {
        self.status == "Done"
    }
}

/// Status the board's status button moves a task to; Done is final
pub fn next_status(status: &str) -> Option<&'static str> {
    match status {
        "Pending" | "To Do" => Some("In Progress"),
        "In Progress" => Some("Done"),
        "Missed" => Some("In Progress"),
        _ => None,
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub id: i64,
    #[serde(default)]
    pub description: String,
    /// Decimal string with two places
    pub amount: String,
    pub category: String,
    pub project: i64,
    pub date: NaiveDate,
}

impl Expense {
    pub fn amount_value(&self) -> f64 {
        self.amount.parse().unwrap_or(0.0)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActivityLog {
    pub id: i64,
    pub user_name: String,
    pub action: String,
    pub project: Option<i64>,
    #[serde(default)]
    pub project_title: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MemberUser {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub email: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TeamMember {
    pub id: i64,
    pub project: i64,
    pub user: MemberUser,
    pub role: String,
    pub joined_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

// ============ Request bodies ============

#[derive(Debug, Serialize)]
pub struct Credentials<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
pub struct RegisterBody<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Clone, Debug, Serialize)]
pub struct ProjectBody {
    pub title: String,
    pub description: String,
    pub project_type: String,
    pub status: String,
    pub priority: String,
    pub end_date: Option<NaiveDate>,
    pub members: Vec<i64>,
}

#[derive(Clone, Debug, Serialize)]
pub struct TaskBody {
    pub title: String,
    pub description: String,
    pub project: i64,
    pub status: String,
    pub priority: String,
    pub due_date: Option<NaiveDate>,
    pub assigned_to: Option<i64>,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct TaskPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<Option<NaiveDate>>,
}

#[derive(Clone, Debug, Serialize)]
pub struct ExpenseBody {
    pub description: String,
    pub amount: String,
    pub category: String,
    pub project: i64,
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub struct PasswordBody<'a> {
    pub current_password: &'a str,
    pub new_password: &'a str,
}
