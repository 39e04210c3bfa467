//! Banners shown after a mutation

use serde::Serialize;

use crate::client::ClientError;
use crate::forms::FormError;

pub const NOT_AUTHORIZED: &str =
    "You are not authorized to perform this action. Please log in again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NoticeKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            message: message.into(),
        }
    }

    /// Error banner for a failed call; `action` names what failed, e.g.
    /// "Failed to save project"
    pub fn from_client_error(action: &str, err: &ClientError) -> Self {
        tracing::warn!("{}: {}", action, err);
        let message = match err {
            ClientError::Api { status: 403, .. } => NOT_AUTHORIZED.to_string(),
            ClientError::Api { fields, .. } if !fields.is_empty() => {
                let details = fields
                    .iter()
                    .map(|(k, v)| format!("{k}: {v}"))
                    .collect::<Vec<_>>()
                    .join("; ");
                format!("Validation failed: {details}")
            }
            ClientError::Api { message, .. } => format!("{action}: {message}"),
            ClientError::NoResponse => format!(
                "{action}: No response from server. Please check your internet connection or server status."
            ),
            ClientError::NotLoggedIn => NOT_AUTHORIZED.to_string(),
            other => format!("{action}: {other}"),
        };
        Self::error(message)
    }

    pub fn from_form_error(err: &FormError) -> Self {
        Self::error(err.to_string())
    }

    pub fn is_error(&self) -> bool {
        self.kind == NoticeKind::Error
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn api(status: u16, fields: &[(&str, &str)]) -> ClientError {
        ClientError::Api {
            status,
            message: "Not found.".into(),
            fields: fields
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<BTreeMap<_, _>>(),
        }
    }

    #[test]
    fn test_forbidden() {
        let notice = Notice::from_client_error("Failed to save project", &api(403, &[]));
        assert_eq!(notice.message, NOT_AUTHORIZED);
        assert!(notice.is_error());
    }

    #[test]
    fn test_field_errors() {
        let err = api(400, &[("title", "required"), ("end_date", "bad date")]);
        let notice = Notice::from_client_error("Failed to save project", &err);
        assert_eq!(
            notice.message,
            "Validation failed: end_date: bad date; title: required"
        );
    }

    #[test]
    fn test_no_response() {
        let notice = Notice::from_client_error("Failed to save project", &ClientError::NoResponse);
        assert!(notice.message.starts_with("Failed to save project: No response from server"));
    }

    #[test]
    fn test_plain_api_error() {
        let notice = Notice::from_client_error("Failed to delete project", &api(404, &[]));
        assert_eq!(notice.message, "Failed to delete project: Not found.");
    }
}
