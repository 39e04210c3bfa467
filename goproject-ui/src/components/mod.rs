//! UI Components
//!
//! Reusable Leptos components for the dashboard.

pub mod loading;
pub mod nav;
pub mod project_dialog;
pub mod toast;

pub use loading::{Loading, RowSkeleton, StatSkeleton, TaskSkeleton};
pub use nav::Nav;
pub use project_dialog::ProjectDialog;
pub use toast::Toast;
