//! HTTP implementation of [`DashboardApi`]

use async_trait::async_trait;
use reqwest::{multipart, Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::sync::Arc;

use super::{ClientError, DashboardApi, TokenStore, Upload};
use crate::api::dto::{MessageResponse, ProfileUpdateResponse};
use crate::config::ClientConfig;
use crate::models::{
    ActivityLog, Attachment, ChangePasswordRequest, DashboardStats, Expense, ExpenseInput,
    LoginRequest, ProfileUpdate, Project, ProjectInput, ProjectType, RefreshRequest,
    RegisterRequest, Task, TaskInput, TaskPatch, TeamMember, TeamMemberInput, TeamMemberPatch,
    TokenPair, User,
};

/// REST client for the GoProject API
///
/// Every request carries the access token currently in the token store, so
/// a refresh performed elsewhere is picked up by the next call.
#[derive(Clone)]
pub struct GoProjectClient {
    http: Client,
    base_url: String,
    tokens: Arc<dyn TokenStore>,
}

impl GoProjectClient {
    pub fn new(base_url: impl Into<String>, tokens: Arc<dyn TokenStore>) -> Result<Self, ClientError> {
        let http = Client::builder().build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            tokens,
        })
    }

    pub fn from_config(config: &ClientConfig, tokens: Arc<dyn TokenStore>) -> Result<Self, ClientError> {
        Self::new(config.api_url.clone(), tokens)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn tokens(&self) -> &Arc<dyn TokenStore> {
        &self.tokens
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Request without credentials
    fn public(&self, method: Method, path: &str) -> RequestBuilder {
        self.http.request(method, self.url(path))
    }

    /// Request with the stored bearer token
    fn authed(&self, method: Method, path: &str) -> Result<RequestBuilder, ClientError> {
        let token = self.tokens.access_token().ok_or(ClientError::NotLoggedIn)?;
        Ok(self.public(method, path).bearer_auth(token))
    }

    async fn execute(&self, builder: RequestBuilder) -> Result<Response, ClientError> {
        let response = builder.send().await.map_err(ClientError::from_reqwest)?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let err = ClientError::from_body(status.as_u16(), &body);
        tracing::debug!(status = status.as_u16(), "API request failed: {}", err);
        Err(err)
    }

    async fn fetch<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ClientError> {
        let response = self.execute(builder).await?;
        Ok(response.json().await?)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        self.fetch(self.authed(Method::GET, path)?).await
    }

    async fn delete(&self, path: &str) -> Result<(), ClientError> {
        self.execute(self.authed(Method::DELETE, path)?).await?;
        Ok(())
    }
}

fn with_filter(path: &str, key: &str, value: Option<impl ToString>) -> String {
    match value {
        Some(value) => format!("{path}?{key}={}", value.to_string()),
        None => path.to_string(),
    }
}

fn file_part(upload: Upload) -> Result<multipart::Part, ClientError> {
    let mime = mime_guess::from_path(&upload.file_name).first_or_octet_stream();
    Ok(multipart::Part::bytes(upload.bytes)
        .file_name(upload.file_name)
        .mime_str(mime.as_ref())?)
}

#[async_trait]
impl DashboardApi for GoProjectClient {
    async fn register(&self, req: &RegisterRequest) -> Result<User, ClientError> {
        self.fetch(self.public(Method::POST, "/api/register/").json(req))
            .await
    }

    async fn obtain_tokens(&self, req: &LoginRequest) -> Result<TokenPair, ClientError> {
        self.fetch(self.public(Method::POST, "/api/token/").json(req))
            .await
    }

    async fn refresh_tokens(&self, refresh: &str) -> Result<TokenPair, ClientError> {
        let body = RefreshRequest {
            refresh: refresh.to_string(),
        };
        self.fetch(self.public(Method::POST, "/api/token/refresh/").json(&body))
            .await
    }

    async fn current_user(&self) -> Result<User, ClientError> {
        self.get("/api/user/").await
    }

    async fn list_users(&self) -> Result<Vec<User>, ClientError> {
        self.get("/api/users/").await
    }

    async fn update_profile(
        &self,
        update: &ProfileUpdate,
        picture: Option<Upload>,
    ) -> Result<User, ClientError> {
        let mut form = multipart::Form::new();
        if let Some(username) = &update.username {
            form = form.text("username", username.clone());
        }
        if let Some(email) = &update.email {
            form = form.text("email", email.clone());
        }
        if let Some(role) = update.role {
            form = form.text("role", role.as_str());
        }
        if let Some(course) = &update.course {
            form = form.text("course", course.clone());
        }
        if let Some(bio) = &update.bio {
            form = form.text("bio", bio.clone());
        }
        if let Some(picture) = picture {
            form = form.part("profile_picture", file_part(picture)?);
        }

        let response: ProfileUpdateResponse = self
            .fetch(self.authed(Method::PUT, "/api/user/update/")?.multipart(form))
            .await?;
        Ok(User {
            id: response.id,
            username: response.username,
            email: response.email,
            profile: response.profile,
        })
    }

    async fn change_password(&self, req: &ChangePasswordRequest) -> Result<String, ClientError> {
        let response: MessageResponse = self
            .fetch(self.authed(Method::POST, "/api/change-password/")?.json(req))
            .await?;
        Ok(response.message)
    }

    async fn list_projects(
        &self,
        project_type: Option<ProjectType>,
    ) -> Result<Vec<Project>, ClientError> {
        self.get(&with_filter("/api/projects/", "type", project_type))
            .await
    }

    async fn get_project(&self, id: i64) -> Result<Project, ClientError> {
        self.get(&format!("/api/projects/{id}/")).await
    }

    async fn create_project(&self, input: &ProjectInput) -> Result<Project, ClientError> {
        self.fetch(self.authed(Method::POST, "/api/projects/")?.json(input))
            .await
    }

    async fn update_project(&self, id: i64, input: &ProjectInput) -> Result<Project, ClientError> {
        self.fetch(
            self.authed(Method::PUT, &format!("/api/projects/{id}/"))?
                .json(input),
        )
        .await
    }

    async fn delete_project(&self, id: i64) -> Result<(), ClientError> {
        self.delete(&format!("/api/projects/{id}/")).await
    }

    async fn list_tasks(&self, project: Option<i64>) -> Result<Vec<Task>, ClientError> {
        self.get(&with_filter("/api/tasks/", "project", project))
            .await
    }

    async fn create_task(&self, input: &TaskInput) -> Result<Task, ClientError> {
        self.fetch(self.authed(Method::POST, "/api/tasks/")?.json(input))
            .await
    }

    async fn update_task(&self, id: i64, patch: &TaskPatch) -> Result<Task, ClientError> {
        self.fetch(
            self.authed(Method::PATCH, &format!("/api/tasks/{id}/"))?
                .json(patch),
        )
        .await
    }

    async fn delete_task(&self, id: i64) -> Result<(), ClientError> {
        self.delete(&format!("/api/tasks/{id}/")).await
    }

    async fn list_expenses(&self, project: Option<i64>) -> Result<Vec<Expense>, ClientError> {
        self.get(&with_filter("/api/expenses/", "project", project))
            .await
    }

    async fn create_expense(&self, input: &ExpenseInput) -> Result<Expense, ClientError> {
        self.fetch(self.authed(Method::POST, "/api/expenses/")?.json(input))
            .await
    }

    async fn delete_expense(&self, id: i64) -> Result<(), ClientError> {
        self.delete(&format!("/api/expenses/{id}/")).await
    }

    async fn list_team_members(
        &self,
        project: Option<i64>,
    ) -> Result<Vec<TeamMember>, ClientError> {
        self.get(&with_filter("/api/team-members/", "project", project))
            .await
    }

    async fn add_team_member(&self, input: &TeamMemberInput) -> Result<TeamMember, ClientError> {
        self.fetch(self.authed(Method::POST, "/api/team-members/")?.json(input))
            .await
    }

    async fn update_team_member(
        &self,
        id: i64,
        patch: &TeamMemberPatch,
    ) -> Result<TeamMember, ClientError> {
        self.fetch(
            self.authed(Method::PATCH, &format!("/api/team-members/{id}/"))?
                .json(patch),
        )
        .await
    }

    async fn remove_team_member(&self, id: i64) -> Result<(), ClientError> {
        self.delete(&format!("/api/team-members/{id}/")).await
    }

    async fn list_activity(&self) -> Result<Vec<ActivityLog>, ClientError> {
        self.get("/api/activity-logs/").await
    }

    async fn list_attachments(&self, task: Option<i64>) -> Result<Vec<Attachment>, ClientError> {
        self.get(&with_filter("/api/attachments/", "task", task))
            .await
    }

    async fn upload_attachment(&self, task: i64, file: Upload) -> Result<Attachment, ClientError> {
        let form = multipart::Form::new()
            .text("task", task.to_string())
            .part("file", file_part(file)?);
        self.fetch(self.authed(Method::POST, "/api/attachments/")?.multipart(form))
            .await
    }

    async fn dashboard_stats(&self) -> Result<DashboardStats, ClientError> {
        self.get("/api/dashboard-stats/").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::MemoryTokenStore;

    #[test]
    fn test_base_url_trimmed() {
        let client =
            GoProjectClient::new("http://localhost:8000/", Arc::new(MemoryTokenStore::new()))
                .unwrap();
        assert_eq!(client.base_url(), "http://localhost:8000");
        assert_eq!(client.url("/api/user/"), "http://localhost:8000/api/user/");
    }

    #[test]
    fn test_with_filter() {
        assert_eq!(with_filter("/api/tasks/", "project", Some(4)), "/api/tasks/?project=4");
        assert_eq!(with_filter("/api/tasks/", "project", None::<i64>), "/api/tasks/");
        assert_eq!(
            with_filter("/api/projects/", "type", Some(ProjectType::Personal)),
            "/api/projects/?type=Personal"
        );
    }

    #[tokio::test]
    async fn test_requires_login() {
        let client =
            GoProjectClient::new("http://localhost:1", Arc::new(MemoryTokenStore::new())).unwrap();
        let err = client.current_user().await.unwrap_err();
        assert!(matches!(err, ClientError::NotLoggedIn));
    }

    #[tokio::test]
    async fn test_unreachable_server() {
        let client =
            GoProjectClient::new("http://127.0.0.1:9", Arc::new(MemoryTokenStore::new())).unwrap();
        let err = client
            .obtain_tokens(&LoginRequest {
                username: "maria".into(),
                password: "pw".into(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::NoResponse), "{err:?}");
    }
}
