//! Client error type

use serde::Deserialize;
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors returned by [`DashboardApi`](super::DashboardApi) calls
#[derive(Error, Debug)]
pub enum ClientError {
    /// The request never got an HTTP response
    #[error("No response from server")]
    NoResponse,

    /// The server answered with a non-2xx status
    #[error("API error {status}: {message}")]
    Api {
        status: u16,
        message: String,
        fields: BTreeMap<String, String>,
    },

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// No access token stored
    #[error("Not logged in")]
    NotLoggedIn,

    #[error("Token store error: {0}")]
    TokenStore(#[from] std::io::Error),
}

impl ClientError {
    /// HTTP status for API errors
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self.status(), Some(401)) || matches!(self, ClientError::NotLoggedIn)
    }

    /// Build an API error from a response body in the server's error format,
    /// falling back to the raw text
    pub fn from_body(status: u16, body: &str) -> Self {
        match serde_json::from_str::<ErrorEnvelope>(body) {
            Ok(envelope) => ClientError::Api {
                status,
                message: envelope.error.message,
                fields: envelope.error.fields.unwrap_or_default(),
            },
            Err(_) => ClientError::Api {
                status,
                message: if body.trim().is_empty() {
                    format!("HTTP {status}")
                } else {
                    body.trim().to_string()
                },
                fields: BTreeMap::new(),
            },
        }
    }

    pub(crate) fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() {
            ClientError::NoResponse
        } else {
            ClientError::Request(err)
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
    #[serde(default)]
    fields: Option<BTreeMap<String, String>>,
}
