//! Page controllers
//!
//! Each page fetches its collections through a [`DashboardApi`], keeps them
//! as local state and derives what it shows from them. Mutations go to the
//! API; the page then refetches, except on the task board where edits are
//! applied optimistically and rolled back by refetching on failure.
//!
//! [`DashboardApi`]: crate::client::DashboardApi

pub mod analytics;
pub mod expenses;
pub mod home;
pub mod notice;
pub mod profile;
pub mod project_detail;
pub mod workspace;

#[cfg(test)]
pub(crate) mod fake;

pub use analytics::{AnalyticsPage, AnalyticsView};
pub use expenses::ExpensesPage;
pub use home::{HomePage, HomeView};
pub use notice::{Notice, NoticeKind};
pub use profile::ProfilePage;
pub use project_detail::ProjectDetailPage;
pub use workspace::{ProjectDialog, WorkspacePage};

use crate::models::{Task, TaskPatch};

/// Apply a PATCH body to a local copy of the task
pub(crate) fn apply_task_patch(task: &mut Task, patch: &TaskPatch) {
    if let Some(title) = &patch.title {
        task.title = title.clone();
    }
    if let Some(description) = &patch.description {
        task.description = description.clone();
    }
    if let Some(status) = patch.status {
        task.status = status;
    }
    if let Some(priority) = patch.priority {
        task.priority = priority;
    }
    if let Some(due_date) = patch.due_date {
        task.due_date = due_date;
    }
    if let Some(assigned_to) = patch.assigned_to {
        task.assigned_to = assigned_to;
    }
}
