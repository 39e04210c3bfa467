//! HTTP API Client
//!
//! Thin wrappers over the GoProject REST API. Every request except sign-up,
//! login and refresh carries the stored access token.

use gloo_net::http::{Request, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::BTreeMap;

use super::tokens;
use super::types::*;

/// Default API base URL
pub const DEFAULT_API_BASE: &str = "http://localhost:8000";

pub const NOT_AUTHORIZED: &str = "You are not authorized to perform this action. Please log in again.";

/// Get the API base URL from local storage or use default
pub fn get_api_base() -> String {
    tokens::get("goproject_api_url")
        .unwrap_or_else(|| DEFAULT_API_BASE.to_string())
        .trim_end_matches('/')
        .to_string()
}

/// Why a request failed
#[derive(Clone, Debug, PartialEq)]
pub enum ApiFailure {
    NoResponse,
    Status {
        status: u16,
        message: String,
        fields: BTreeMap<String, String>,
    },
    Parse(String),
}

impl ApiFailure {
    /// Banner text for a failed action, in the dashboard's wording
    pub fn describe(&self, action: &str) -> String {
        match self {
            ApiFailure::Status { status: 403, .. } => NOT_AUTHORIZED.to_string(),
            ApiFailure::Status { fields, .. } if !fields.is_empty() => {
                let parts: Vec<String> = fields.iter().map(|(k, v)| format!("{}: {}", k, v)).collect();
                format!("Validation failed: {}", parts.join("; "))
            }
            ApiFailure::Status { message, .. } => format!("{}: {}", action, message),
            ApiFailure::NoResponse => format!(
                "{}: No response from server. Please check your internet connection or server status.",
                action
            ),
            ApiFailure::Parse(e) => format!("{}: {}", action, e),
        }
    }

    /// Field messages joined the way the task dialog shows them
    pub fn field_messages(&self) -> Option<String> {
        match self {
            ApiFailure::Status { fields, .. } if !fields.is_empty() => {
                Some(fields.values().cloned().collect::<Vec<_>>().join(" "))
            }
            _ => None,
        }
    }
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
    #[serde(default)]
    fields: BTreeMap<String, String>,
}

type ApiResult<T> = Result<T, ApiFailure>;

fn url(path: &str) -> String {
    format!("{}{}", get_api_base(), path)
}

fn authed(builder: RequestBuilder) -> RequestBuilder {
    match tokens::get(tokens::ACCESS_TOKEN) {
        Some(token) => builder.header("Authorization", &format!("Bearer {}", token)),
        None => builder,
    }
}

async fn failure(response: Response) -> ApiFailure {
    let status = response.status();
    let text = response.text().await.unwrap_or_default();
    match serde_json::from_str::<ErrorEnvelope>(&text) {
        Ok(envelope) => ApiFailure::Status {
            status,
            message: envelope.error.message,
            fields: envelope.error.fields,
        },
        Err(_) => ApiFailure::Status {
            status,
            message: if text.is_empty() {
                format!("HTTP {}", status)
            } else {
                text
            },
            fields: BTreeMap::new(),
        },
    }
}

async fn send(request: Result<Request, gloo_net::Error>) -> ApiResult<Response> {
    let request = request.map_err(|e| ApiFailure::Parse(e.to_string()))?;
    let response = request.send().await.map_err(|_| ApiFailure::NoResponse)?;
    if response.ok() {
        Ok(response)
    } else {
        Err(failure(response).await)
    }
}

async fn parse<T: DeserializeOwned>(response: Response) -> ApiResult<T> {
    response
        .json()
        .await
        .map_err(|e| ApiFailure::Parse(format!("Parse error: {}", e)))
}

async fn get<T: DeserializeOwned>(path: &str) -> ApiResult<T> {
    parse(send(authed(Request::get(&url(path))).build()).await?).await
}

async fn post<B: serde::Serialize, T: DeserializeOwned>(path: &str, body: &B) -> ApiResult<T> {
    parse(send(authed(Request::post(&url(path))).json(body)).await?).await
}

async fn put<B: serde::Serialize, T: DeserializeOwned>(path: &str, body: &B) -> ApiResult<T> {
    parse(send(authed(Request::put(&url(path))).json(body)).await?).await
}

async fn patch<B: serde::Serialize, T: DeserializeOwned>(path: &str, body: &B) -> ApiResult<T> {
    parse(send(authed(Request::patch(&url(path))).json(body)).await?).await
}

async fn delete(path: &str) -> ApiResult<()> {
    send(authed(Request::delete(&url(path))).build()).await?;
    Ok(())
}

fn filtered(path: &str, key: &str, value: Option<impl ToString>) -> String {
    match value {
        Some(v) => format!("{}?{}={}", path, key, v.to_string()),
        None => path.to_string(),
    }
}

// ============ Session ============

pub async fn login(username: &str, password: &str) -> ApiResult<TokenPair> {
    let request = Request::post(&url("/api/token/")).json(&Credentials { username, password });
    parse(send(request).await?).await
}

pub async fn refresh(refresh: &str) -> ApiResult<TokenPair> {
    #[derive(serde::Serialize)]
    struct RefreshBody<'a> {
        refresh: &'a str,
    }
    let request = Request::post(&url("/api/token/refresh/")).json(&RefreshBody { refresh });
    parse(send(request).await?).await
}

pub async fn register(username: &str, email: &str, password: &str) -> ApiResult<User> {
    let request = Request::post(&url("/api/register/")).json(&RegisterBody {
        username,
        email,
        password,
    });
    parse(send(request).await?).await
}

// ============ Users ============

pub async fn current_user() -> ApiResult<User> {
    get("/api/user/").await
}

pub async fn list_users() -> ApiResult<Vec<User>> {
    get("/api/users/").await
}

pub async fn update_profile(form: web_sys::FormData) -> ApiResult<()> {
    send(authed(Request::put(&url("/api/user/update/"))).body(form)).await?;
    Ok(())
}

pub async fn change_password(current: &str, new: &str) -> ApiResult<()> {
    let _: serde_json::Value = post(
        "/api/change-password/",
        &PasswordBody {
            current_password: current,
            new_password: new,
        },
    )
    .await?;
    Ok(())
}

// ============ Projects ============

pub async fn list_projects(project_type: Option<&str>) -> ApiResult<Vec<Project>> {
    get(&filtered("/api/projects/", "type", project_type)).await
}

pub async fn get_project(id: i64) -> ApiResult<Project> {
    get(&format!("/api/projects/{}/", id)).await
}

pub async fn create_project(body: &ProjectBody) -> ApiResult<Project> {
    post("/api/projects/", body).await
}

pub async fn update_project(id: i64, body: &ProjectBody) -> ApiResult<Project> {
    put(&format!("/api/projects/{}/", id), body).await
}

pub async fn delete_project(id: i64) -> ApiResult<()> {
    delete(&format!("/api/projects/{}/", id)).await
}

// ============ Tasks ============

pub async fn list_tasks(project: Option<i64>) -> ApiResult<Vec<Task>> {
    get(&filtered("/api/tasks/", "project", project)).await
}

pub async fn create_task(body: &TaskBody) -> ApiResult<Task> {
    post("/api/tasks/", body).await
}

pub async fn update_task(id: i64, body: &TaskPatch) -> ApiResult<Task> {
    patch(&format!("/api/tasks/{}/", id), body).await
}

pub async fn delete_task(id: i64) -> ApiResult<()> {
    delete(&format!("/api/tasks/{}/", id)).await
}

pub async fn upload_attachment(form: web_sys::FormData) -> ApiResult<Attachment> {
    parse(send(authed(Request::post(&url("/api/attachments/"))).body(form)).await?).await
}

// ============ Expenses, team, activity ============

pub async fn list_expenses() -> ApiResult<Vec<Expense>> {
    get("/api/expenses/").await
}

pub async fn create_expense(body: &ExpenseBody) -> ApiResult<Expense> {
    post("/api/expenses/", body).await
}

pub async fn delete_expense(id: i64) -> ApiResult<()> {
    delete(&format!("/api/expenses/{}/", id)).await
}

pub async fn list_team_members(project: i64) -> ApiResult<Vec<TeamMember>> {
    get(&filtered("/api/team-members/", "project", Some(project))).await
}

pub async fn list_activity() -> ApiResult<Vec<ActivityLog>> {
    get("/api/activity-logs/").await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(code: u16, message: &str, fields: &[(&str, &str)]) -> ApiFailure {
        ApiFailure::Status {
            status: code,
            message: message.to_string(),
            fields: fields
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    #[test]
    fn test_describe_forbidden() {
        assert_eq!(status(403, "nope", &[]).describe("Failed to delete project"), NOT_AUTHORIZED);
    }

    #[test]
    fn test_describe_fields() {
        let failure = status(400, "Validation failed", &[("title", "This field may not be blank.")]);
        assert_eq!(
            failure.describe("Failed to save project"),
            "Validation failed: title: This field may not be blank."
        );
        assert_eq!(failure.field_messages().as_deref(), Some("This field may not be blank."));
    }

    #[test]
    fn test_describe_no_response() {
        assert!(ApiFailure::NoResponse
            .describe("Failed to load projects")
            .starts_with("Failed to load projects: No response from server."));
    }

    #[test]
    fn test_filtered_path() {
        assert_eq!(filtered("/api/tasks/", "project", Some(4)), "/api/tasks/?project=4");
        assert_eq!(filtered("/api/tasks/", "project", None::<i64>), "/api/tasks/");
    }
}
