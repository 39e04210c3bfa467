//! In-memory [`DashboardApi`] for controller tests

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use crate::client::{ClientError, DashboardApi, Upload};
use crate::models::{
    ActivityLog, Attachment, ChangePasswordRequest, DashboardStats, Expense, ExpenseInput,
    LoginRequest, MemberUser, Profile, ProfileUpdate, Project, ProjectInput, ProjectType,
    RegisterRequest, Task, TaskInput, TaskPatch, TeamMember, TeamMemberInput, TeamMemberPatch,
    TokenPair, User,
};

/// Failure injected into the next call
pub enum Failure {
    Status(u16, Vec<(&'static str, &'static str)>),
    NoResponse,
}

pub struct FakeState {
    pub user: User,
    pub projects: Vec<Project>,
    pub tasks: Vec<Task>,
    pub expenses: Vec<Expense>,
    pub members: Vec<TeamMember>,
    pub activity: Vec<ActivityLog>,
    pub refresh: Option<TokenPair>,
    pub fail: Option<Failure>,
    pub calls: Vec<String>,
    next_id: i64,
}

pub struct FakeApi {
    state: Mutex<FakeState>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(FakeState {
                user: User {
                    id: 1,
                    username: "maria".into(),
                    email: "maria@example.com".into(),
                    profile: Profile::default(),
                },
                projects: Vec::new(),
                tasks: Vec::new(),
                expenses: Vec::new(),
                members: Vec::new(),
                activity: Vec::new(),
                refresh: Some(TokenPair {
                    access: "access".into(),
                    refresh: "refresh".into(),
                }),
                fail: None,
                calls: Vec::new(),
                next_id: 100,
            }),
        }
    }

    pub fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }

    pub fn calls(&self) -> Vec<String> {
        self.state().calls.clone()
    }

    pub fn set_refresh(&self, pair: Option<TokenPair>) {
        self.state().refresh = pair;
    }

    pub fn fail_next(&self, failure: Failure) {
        self.state().fail = Some(failure);
    }

    pub fn add_project(&self, title: &str, project_type: ProjectType) -> Project {
        let mut state = self.state();
        let id = state.next_id();
        let project = sample_project(id, title, project_type);
        state.projects.push(project.clone());
        project
    }

    pub fn add_task(&self, project: i64, title: &str) -> Task {
        let mut state = self.state();
        let id = state.next_id();
        let task = Task {
            id,
            title: title.into(),
            description: String::new(),
            project,
            status: Default::default(),
            priority: Default::default(),
            due_date: None,
            assigned_to: None,
            attachments: Vec::new(),
        };
        state.tasks.push(task.clone());
        task
    }

    /// Record a call and return the injected failure, if any
    fn enter(&self, call: impl Into<String>) -> Result<MutexGuard<'_, FakeState>, ClientError> {
        let mut state = self.state();
        state.calls.push(call.into());
        match state.fail.take() {
            None => Ok(state),
            Some(Failure::NoResponse) => Err(ClientError::NoResponse),
            Some(Failure::Status(status, fields)) => Err(ClientError::Api {
                status,
                message: "Request failed".into(),
                fields: fields
                    .into_iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect::<BTreeMap<_, _>>(),
            }),
        }
    }
}

impl FakeState {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

fn not_found() -> ClientError {
    ClientError::Api {
        status: 404,
        message: "Not found.".into(),
        fields: BTreeMap::new(),
    }
}

pub fn sample_project(id: i64, title: &str, project_type: ProjectType) -> Project {
    Project {
        id,
        title: title.into(),
        description: String::new(),
        project_type,
        status: Default::default(),
        priority: Default::default(),
        progress: 0,
        start_date: Utc::now(),
        end_date: None,
        owner_username: "maria".into(),
        members: Vec::new(),
    }
}

fn apply_input(project: &mut Project, input: &ProjectInput) {
    project.title = input.title.clone();
    project.description = input.description.clone();
    project.project_type = input.project_type;
    project.status = input.status;
    project.priority = input.priority;
    project.end_date = input.end_date;
    project.members = input.members.clone();
}

#[async_trait]
impl DashboardApi for FakeApi {
    async fn register(&self, req: &RegisterRequest) -> Result<User, ClientError> {
        let mut state = self.enter("POST /api/register/")?;
        let id = state.next_id();
        Ok(User {
            id,
            username: req.username.clone(),
            email: req.email.clone(),
            profile: Profile::default(),
        })
    }

    async fn obtain_tokens(&self, _req: &LoginRequest) -> Result<TokenPair, ClientError> {
        self.enter("POST /api/token/")?;
        Ok(TokenPair {
            access: "access".into(),
            refresh: "refresh".into(),
        })
    }

    async fn refresh_tokens(&self, _refresh: &str) -> Result<TokenPair, ClientError> {
        let state = self.enter("POST /api/token/refresh/")?;
        state.refresh.clone().ok_or_else(|| ClientError::Api {
            status: 401,
            message: "Token is blacklisted".into(),
            fields: BTreeMap::new(),
        })
    }

    async fn current_user(&self) -> Result<User, ClientError> {
        Ok(self.enter("GET /api/user/")?.user.clone())
    }

    async fn list_users(&self) -> Result<Vec<User>, ClientError> {
        Ok(vec![self.enter("GET /api/users/")?.user.clone()])
    }

    async fn update_profile(
        &self,
        update: &ProfileUpdate,
        picture: Option<Upload>,
    ) -> Result<User, ClientError> {
        let mut state = self.enter("PUT /api/user/update/")?;
        if let Some(username) = &update.username {
            state.user.username = username.clone();
        }
        if let Some(email) = &update.email {
            state.user.email = email.clone();
        }
        if let Some(role) = update.role {
            state.user.profile.role = role;
        }
        if let Some(course) = &update.course {
            state.user.profile.course = course.clone();
        }
        if let Some(bio) = &update.bio {
            state.user.profile.bio = bio.clone();
        }
        if let Some(picture) = picture {
            state.user.profile.profile_picture =
                Some(format!("http://testserver/media/profile_pics/{}", picture.file_name));
        }
        Ok(state.user.clone())
    }

    async fn change_password(&self, _req: &ChangePasswordRequest) -> Result<String, ClientError> {
        self.enter("POST /api/change-password/")?;
        Ok("Password updated successfully".into())
    }

    async fn list_projects(
        &self,
        project_type: Option<ProjectType>,
    ) -> Result<Vec<Project>, ClientError> {
        let state = self.enter("GET /api/projects/")?;
        Ok(state
            .projects
            .iter()
            .filter(|p| project_type.map_or(true, |t| p.project_type == t))
            .cloned()
            .collect())
    }

    async fn get_project(&self, id: i64) -> Result<Project, ClientError> {
        let state = self.enter(format!("GET /api/projects/{id}/"))?;
        state
            .projects
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or_else(not_found)
    }

    async fn create_project(&self, input: &ProjectInput) -> Result<Project, ClientError> {
        let mut state = self.enter("POST /api/projects/")?;
        let id = state.next_id();
        let mut project = sample_project(id, &input.title, input.project_type);
        apply_input(&mut project, input);
        state.projects.push(project.clone());
        Ok(project)
    }

    async fn update_project(&self, id: i64, input: &ProjectInput) -> Result<Project, ClientError> {
        let mut state = self.enter(format!("PUT /api/projects/{id}/"))?;
        let project = state
            .projects
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(not_found)?;
        apply_input(project, input);
        Ok(project.clone())
    }

    async fn delete_project(&self, id: i64) -> Result<(), ClientError> {
        let mut state = self.enter(format!("DELETE /api/projects/{id}/"))?;
        state.projects.retain(|p| p.id != id);
        state.tasks.retain(|t| t.project != id);
        Ok(())
    }

    async fn list_tasks(&self, project: Option<i64>) -> Result<Vec<Task>, ClientError> {
        let state = self.enter("GET /api/tasks/")?;
        Ok(state
            .tasks
            .iter()
            .filter(|t| project.map_or(true, |p| t.project == p))
            .cloned()
            .collect())
    }

    async fn create_task(&self, input: &TaskInput) -> Result<Task, ClientError> {
        let mut state = self.enter("POST /api/tasks/")?;
        let id = state.next_id();
        let task = Task {
            id,
            title: input.title.clone(),
            description: input.description.clone(),
            project: input.project,
            status: input.status,
            priority: input.priority,
            due_date: input.due_date,
            assigned_to: input.assigned_to,
            attachments: Vec::new(),
        };
        state.tasks.push(task.clone());
        Ok(task)
    }

    async fn update_task(&self, id: i64, patch: &TaskPatch) -> Result<Task, ClientError> {
        let mut state = self.enter(format!("PATCH /api/tasks/{id}/"))?;
        let task = state
            .tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(not_found)?;
        super::apply_task_patch(task, patch);
        Ok(task.clone())
    }

    async fn delete_task(&self, id: i64) -> Result<(), ClientError> {
        let mut state = self.enter(format!("DELETE /api/tasks/{id}/"))?;
        state.tasks.retain(|t| t.id != id);
        Ok(())
    }

    async fn list_expenses(&self, project: Option<i64>) -> Result<Vec<Expense>, ClientError> {
        let state = self.enter("GET /api/expenses/")?;
        Ok(state
            .expenses
            .iter()
            .filter(|e| project.map_or(true, |p| e.project == p))
            .cloned()
            .collect())
    }

    async fn create_expense(&self, input: &ExpenseInput) -> Result<Expense, ClientError> {
        let mut state = self.enter("POST /api/expenses/")?;
        let id = state.next_id();
        let expense = Expense {
            id,
            description: input.description.clone(),
            amount: input.amount,
            category: input.category,
            project: input.project,
            date: input
                .date
                .unwrap_or_else(|| NaiveDate::from_ymd_opt(2024, 3, 10).unwrap()),
        };
        state.expenses.insert(0, expense.clone());
        Ok(expense)
    }

    async fn delete_expense(&self, id: i64) -> Result<(), ClientError> {
        let mut state = self.enter(format!("DELETE /api/expenses/{id}/"))?;
        state.expenses.retain(|e| e.id != id);
        Ok(())
    }

    async fn list_team_members(
        &self,
        project: Option<i64>,
    ) -> Result<Vec<TeamMember>, ClientError> {
        let state = self.enter(match project {
            Some(p) => format!("GET /api/team-members/?project={p}"),
            None => "GET /api/team-members/".to_string(),
        })?;
        Ok(state
            .members
            .iter()
            .filter(|m| project.map_or(true, |p| m.project == p))
            .cloned()
            .collect())
    }

    async fn add_team_member(&self, input: &TeamMemberInput) -> Result<TeamMember, ClientError> {
        let mut state = self.enter("POST /api/team-members/")?;
        let id = state.next_id();
        let member = TeamMember {
            id,
            project: input.project,
            user: MemberUser {
                id: input.user,
                username: format!("user{}", input.user),
                email: format!("user{}@example.com", input.user),
            },
            role: input.role,
            joined_at: Utc::now(),
        };
        state.members.push(member.clone());
        Ok(member)
    }

    async fn update_team_member(
        &self,
        id: i64,
        patch: &TeamMemberPatch,
    ) -> Result<TeamMember, ClientError> {
        let mut state = self.enter(format!("PATCH /api/team-members/{id}/"))?;
        let member = state
            .members
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or_else(not_found)?;
        member.role = patch.role;
        Ok(member.clone())
    }

    async fn remove_team_member(&self, id: i64) -> Result<(), ClientError> {
        let mut state = self.enter(format!("DELETE /api/team-members/{id}/"))?;
        state.members.retain(|m| m.id != id);
        Ok(())
    }

    async fn list_activity(&self) -> Result<Vec<ActivityLog>, ClientError> {
        Ok(self.enter("GET /api/activity-logs/")?.activity.clone())
    }

    async fn list_attachments(&self, task: Option<i64>) -> Result<Vec<Attachment>, ClientError> {
        let state = self.enter("GET /api/attachments/")?;
        Ok(state
            .tasks
            .iter()
            .filter(|t| task.map_or(true, |id| t.id == id))
            .flat_map(|t| t.attachments.clone())
            .collect())
    }

    async fn upload_attachment(&self, task: i64, file: Upload) -> Result<Attachment, ClientError> {
        let mut state = self.enter("POST /api/attachments/")?;
        let id = state.next_id();
        let attachment = Attachment {
            id,
            task,
            file: format!("http://testserver/media/attachments/{}", file.file_name),
            uploaded_at: Utc::now(),
        };
        let task = state
            .tasks
            .iter_mut()
            .find(|t| t.id == task)
            .ok_or_else(not_found)?;
        task.attachments.push(attachment.clone());
        Ok(attachment)
    }

    async fn dashboard_stats(&self) -> Result<DashboardStats, ClientError> {
        let state = self.enter("GET /api/dashboard-stats/")?;
        Ok(DashboardStats {
            total_projects: state.projects.len(),
            ..Default::default()
        })
    }
}
