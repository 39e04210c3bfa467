//! Data Transfer Objects
//!
//! Query strings and response bodies specific to the HTTP layer. Records and
//! request bodies shared with the client live in `crate::models`.

use serde::{Deserialize, Serialize};

use crate::api::media::media_url;
use crate::models::{Attachment, Profile, ProjectType, Task, User};

// ============================================
// QUERY STRINGS
// ============================================

/// `?type=Personal|Collaborative`
#[derive(Debug, Default, Deserialize)]
pub struct ProjectListQuery {
    #[serde(rename = "type")]
    pub project_type: Option<ProjectType>,
}

/// `?project=<id>`
#[derive(Debug, Default, Deserialize)]
pub struct ProjectFilter {
    pub project: Option<i64>,
}

/// `?task=<id>`
#[derive(Debug, Default, Deserialize)]
pub struct TaskFilter {
    pub task: Option<i64>,
}

// ============================================
// RESPONSES
// ============================================

/// Plain acknowledgement
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Body returned by the profile update endpoint
#[derive(Debug, Serialize, Deserialize)]
pub struct ProfileUpdateResponse {
    pub message: String,
    pub id: i64,
    pub username: String,
    pub email: String,
    pub profile: Profile,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall status: "healthy" or "unhealthy"
    pub status: String,
    /// Database status
    pub database: String,
    pub uptime_seconds: u64,
    pub version: String,
}

// ============================================
// MEDIA URLS
// ============================================

/// Replace the stored picture path with its absolute URL
pub fn user_with_urls(mut user: User, base: &str) -> User {
    user.profile.profile_picture = user
        .profile
        .profile_picture
        .filter(|p| !p.is_empty())
        .map(|p| media_url(base, &p));
    user
}

pub fn attachment_with_url(mut attachment: Attachment, base: &str) -> Attachment {
    attachment.file = media_url(base, &attachment.file);
    attachment
}

pub fn task_with_urls(mut task: Task, base: &str) -> Task {
    task.attachments = task
        .attachments
        .into_iter()
        .map(|a| attachment_with_url(a, base))
        .collect();
    task
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_list_query_type() {
        let query: ProjectListQuery =
            serde_json::from_str(r#"{"type": "Personal"}"#).unwrap();
        assert_eq!(query.project_type, Some(ProjectType::Personal));
    }

    #[test]
    fn test_user_picture_url() {
        let user = User {
            id: 1,
            username: "maria".into(),
            email: "m@example.com".into(),
            profile: Profile {
                profile_picture: Some("profile_pics/m.png".into()),
                ..Default::default()
            },
        };
        let user = user_with_urls(user, "http://localhost:8000");
        assert_eq!(
            user.profile.profile_picture.as_deref(),
            Some("http://localhost:8000/media/profile_pics/m.png")
        );
    }
}
