//! GoProject REST API
//!
//! HTTP API layer for GoProject, built with Axum. Every `/api` route except
//! registration and token issuance requires an `Authorization: Bearer` access
//! token.
//!
//! # Endpoints
//!
//! ## Accounts
//! - `POST /api/register/` - Create an account
//! - `POST /api/token/` - Obtain an access/refresh pair
//! - `POST /api/token/refresh/` - Rotate a refresh token
//! - `GET /api/users/` - All users
//! - `GET /api/user/` - Current user
//! - `PUT /api/user/update/` - Multipart profile update
//! - `POST /api/change-password/` - Change password
//!
//! ## Workspaces
//! - `GET|POST /api/projects/`, `GET|PUT|PATCH|DELETE /api/projects/:id/`
//! - `GET|POST /api/tasks/`, `GET|PUT|PATCH|DELETE /api/tasks/:id/`
//! - `GET|POST /api/expenses/`, `GET|PUT|PATCH|DELETE /api/expenses/:id/`
//! - `GET|POST /api/team-members/`, `PATCH|DELETE /api/team-members/:id/`
//! - `GET|POST /api/attachments/`
//! - `GET /api/activity-logs/`
//! - `GET /api/dashboard-stats/`
//!
//! ## Media
//! - `GET /media/*` - Uploaded profile pictures and attachments
//!
//! ## Health
//! - `GET /health/live` - Liveness check
//! - `GET /health/ready` - Readiness check
//! - `GET /health` - Full health status
//!
//! # Example
//!
//! ```rust,ignore
//! use goproject::api::{serve, AppState};
//! use goproject::config::Config;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load_default();
//!     let state = AppState::open(&config)?;
//!     serve(state).await?;
//!     Ok(())
//! }
//! ```

pub mod dto;
pub mod error;
pub mod extract;
pub mod media;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use media::MediaStore;
pub use state::AppState;

use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::{get, patch, post, put},
    Router,
};
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use crate::config::ServerConfig;

/// Build the API router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        // Account routes
        .route("/register/", post(routes::auth::register))
        .route("/token/", post(routes::auth::obtain_token))
        .route("/token/refresh/", post(routes::auth::refresh_token))
        .route("/users/", get(routes::users::list_users))
        .route("/user/", get(routes::users::current_user))
        .route("/user/update/", put(routes::users::update_profile))
        .route("/change-password/", post(routes::users::change_password))
        // Project routes
        .route(
            "/projects/",
            get(routes::projects::list_projects).post(routes::projects::create_project),
        )
        .route(
            "/projects/:id/",
            get(routes::projects::get_project)
                .put(routes::projects::replace_project)
                .patch(routes::projects::patch_project)
                .delete(routes::projects::delete_project),
        )
        // Task routes
        .route(
            "/tasks/",
            get(routes::tasks::list_tasks).post(routes::tasks::create_task),
        )
        .route(
            "/tasks/:id/",
            get(routes::tasks::get_task)
                .put(routes::tasks::replace_task)
                .patch(routes::tasks::patch_task)
                .delete(routes::tasks::delete_task),
        )
        // Expense routes
        .route(
            "/expenses/",
            get(routes::expenses::list_expenses).post(routes::expenses::create_expense),
        )
        .route(
            "/expenses/:id/",
            get(routes::expenses::get_expense)
                .put(routes::expenses::replace_expense)
                .patch(routes::expenses::patch_expense)
                .delete(routes::expenses::delete_expense),
        )
        // Team routes
        .route(
            "/team-members/",
            get(routes::team::list_members).post(routes::team::add_member),
        )
        .route(
            "/team-members/:id/",
            patch(routes::team::update_member).delete(routes::team::remove_member),
        )
        // Attachment, activity and dashboard routes
        .route(
            "/attachments/",
            get(routes::attachments::list_attachments).post(routes::attachments::upload_attachment),
        )
        .route("/activity-logs/", get(routes::activity::list_activity))
        .route("/dashboard-stats/", get(routes::dashboard::dashboard_stats))
        .layer(DefaultBodyLimit::max(state.config.max_upload_bytes));

    let health_routes = Router::new()
        .route("/live", get(routes::health::liveness))
        .route("/ready", get(routes::health::readiness))
        .route("/", get(routes::health::full_health));

    let media = ServeDir::new(state.media.root());
    let cors = cors_layer(&state.config);
    let shared_state = Arc::new(state);

    Router::new()
        .nest("/api", api_routes)
        .nest("/health", health_routes)
        .nest_service("/media", media)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(shared_state)
}

/// CORS for the configured web dashboard origins
fn cors_layer(config: &ServerConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any)
}

/// Start the API server on the configured address
pub async fn serve(state: AppState) -> Result<(), ApiError> {
    let addr = state.config.addr();
    let listener = TcpListener::bind(&addr).await?;
    serve_on(listener, state, shutdown_signal()).await
}

/// Serve on an already bound listener until `shutdown` resolves
pub async fn serve_on(
    listener: TcpListener,
    state: AppState,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<(), ApiError> {
    let router = build_router(state);
    tracing::info!("GoProject API listening on {}", listener.local_addr()?);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| ApiError::Internal(format!("Server error: {}", e)))?;

    tracing::info!("GoProject API shut down gracefully");
    Ok(())
}

/// Wait for Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
