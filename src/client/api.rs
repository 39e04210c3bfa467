//! The calls the dashboard pages make

use async_trait::async_trait;

use super::ClientError;
use crate::models::{
    ActivityLog, Attachment, ChangePasswordRequest, DashboardStats, Expense, ExpenseInput,
    LoginRequest, ProfileUpdate, Project, ProjectInput, ProjectType, RegisterRequest, Task,
    TaskInput, TaskPatch, TeamMember, TeamMemberInput, TeamMemberPatch, TokenPair, User,
};

/// File picked for upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes: bytes.into(),
        }
    }

    /// Read a file from disk, keeping only its name
    pub async fn from_path(path: &std::path::Path) -> std::io::Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        Ok(Self { file_name, bytes })
    }
}

/// REST surface used by the page controllers
///
/// Implemented by [`GoProjectClient`](super::GoProjectClient) over HTTP and by
/// in-memory fakes in tests.
#[async_trait]
pub trait DashboardApi: Send + Sync {
    // Accounts
    async fn register(&self, req: &RegisterRequest) -> Result<User, ClientError>;
    async fn obtain_tokens(&self, req: &LoginRequest) -> Result<TokenPair, ClientError>;
    async fn refresh_tokens(&self, refresh: &str) -> Result<TokenPair, ClientError>;
    async fn current_user(&self) -> Result<User, ClientError>;
    async fn list_users(&self) -> Result<Vec<User>, ClientError>;
    async fn update_profile(
        &self,
        update: &ProfileUpdate,
        picture: Option<Upload>,
    ) -> Result<User, ClientError>;
    async fn change_password(&self, req: &ChangePasswordRequest) -> Result<String, ClientError>;

    // Projects
    async fn list_projects(&self, project_type: Option<ProjectType>)
        -> Result<Vec<Project>, ClientError>;
    async fn get_project(&self, id: i64) -> Result<Project, ClientError>;
    async fn create_project(&self, input: &ProjectInput) -> Result<Project, ClientError>;
    async fn update_project(&self, id: i64, input: &ProjectInput) -> Result<Project, ClientError>;
    async fn delete_project(&self, id: i64) -> Result<(), ClientError>;

    // Tasks
    async fn list_tasks(&self, project: Option<i64>) -> Result<Vec<Task>, ClientError>;
    async fn create_task(&self, input: &TaskInput) -> Result<Task, ClientError>;
    async fn update_task(&self, id: i64, patch: &TaskPatch) -> Result<Task, ClientError>;
    async fn delete_task(&self, id: i64) -> Result<(), ClientError>;

    // Expenses
    async fn list_expenses(&self, project: Option<i64>) -> Result<Vec<Expense>, ClientError>;
    async fn create_expense(&self, input: &ExpenseInput) -> Result<Expense, ClientError>;
    async fn delete_expense(&self, id: i64) -> Result<(), ClientError>;

    // Teams
    async fn list_team_members(&self, project: Option<i64>)
        -> Result<Vec<TeamMember>, ClientError>;
    async fn add_team_member(&self, input: &TeamMemberInput) -> Result<TeamMember, ClientError>;
    async fn update_team_member(
        &self,
        id: i64,
        patch: &TeamMemberPatch,
    ) -> Result<TeamMember, ClientError>;
    async fn remove_team_member(&self, id: i64) -> Result<(), ClientError>;

    // Feed, files and counters
    async fn list_activity(&self) -> Result<Vec<ActivityLog>, ClientError>;
    async fn list_attachments(&self, task: Option<i64>) -> Result<Vec<Attachment>, ClientError>;
    async fn upload_attachment(&self, task: i64, file: Upload) -> Result<Attachment, ClientError>;
    async fn dashboard_stats(&self) -> Result<DashboardStats, ClientError>;
}
