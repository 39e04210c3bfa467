//! # GoProject
//!
//! Project, task and expense management: personal and collaborative
//! workspaces, a task board, expense tracking and analytics, behind a REST
//! API.
//!
//! ## Modules
//!
//! - [`api`]: REST API server with Axum
//! - [`storage`]: SQLite schema and repositories
//! - [`auth`]: JWT issuance and password hashing
//! - [`client`]: REST client used by the dashboards
//! - [`session`]: Token checks before protected pages
//! - [`dashboard`]: Page controllers
//! - [`forms`]: Form validation
//! - [`analytics`]: Figures derived from fetched collections
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use goproject::client::{DashboardApi, GoProjectClient, MemoryTokenStore};
//! use goproject::models::{LoginRequest, ProjectType};
//! use goproject::session;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let tokens = Arc::new(MemoryTokenStore::new());
//!     let client = GoProjectClient::new("http://localhost:8000", tokens.clone())?;
//!
//!     let login = LoginRequest {
//!         username: "maria".into(),
//!         password: "correct horse battery".into(),
//!     };
//!     session::login(&client, tokens.as_ref(), &login).await?;
//!
//!     for project in client.list_projects(Some(ProjectType::Personal)).await? {
//!         println!("{} ({}%)", project.title, project.progress);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod analytics;
pub mod api;
pub mod auth;
pub mod client;
pub mod config;
pub mod dashboard;
pub mod forms;
pub mod logging;
pub mod models;
pub mod session;
pub mod storage;

// Re-export top-level types for convenience
pub use api::{build_router, serve, ApiError, AppState};

pub use client::{ClientError, DashboardApi, GoProjectClient, TokenStore};

pub use config::{Config, ConfigError};

pub use session::{AuthGuard, AuthStatus, SessionError};

pub use storage::{Database, StorageError, StorageResult};
