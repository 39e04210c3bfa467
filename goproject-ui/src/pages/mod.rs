//! Pages
//!
//! Top-level page components for each route.

pub mod analytics;
pub mod auth;
pub mod expenses;
pub mod home;
pub mod profile;
pub mod project_detail;
pub mod workspace;

pub use analytics::Analytics;
pub use auth::{Login, Register};
pub use expenses::Expenses;
pub use home::Home;
pub use profile::Profile;
pub use project_detail::ProjectDetail;
pub use workspace::{CollaborativeWorkspace, PersonalWorkspace};
