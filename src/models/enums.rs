//! Enumerated fields of the GoProject records
//!
//! Every enum serializes to the exact label the API and dashboard exchange
//! (`"In Progress"`, `"Collaborative"`, ...) and round-trips through the
//! same label in SQLite.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Error returned when a label does not name any variant
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{value}' is not a valid {kind}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

macro_rules! labelled_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal {
            $( $(#[$vmeta:meta])* $variant:ident => $label:literal $(| $alias:literal)* ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                $(#[$vmeta])*
                #[serde(rename = $label $(, alias = $alias)*)]
                $variant,
            )+
        }

        impl $name {
            /// Every variant, in display order
            pub fn all() -> &'static [$name] {
                &[$($name::$variant),+]
            }

            /// Wire and storage label
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $label,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let trimmed = s.trim();
                $(
                    if trimmed.eq_ignore_ascii_case($label) $(|| trimmed.eq_ignore_ascii_case($alias))* {
                        return Ok($name::$variant);
                    }
                )+
                Err(UnknownVariant {
                    kind: $kind,
                    value: s.to_string(),
                })
            }
        }
    };
}

labelled_enum! {
    /// Workspace a project belongs to
    ProjectType, "project type" {
        Personal => "Personal",
        Collaborative => "Collaborative",
    }
}

labelled_enum! {
    /// Lifecycle label of a project
    ProjectStatus, "project status" {
        InProgress => "In Progress",
        Complete => "Complete",
    }
}

labelled_enum! {
    /// Priority shared by projects and tasks
    Priority, "priority" {
        High => "High",
        Medium => "Medium",
        Low => "Low",
    }
}

labelled_enum! {
    /// Status of a task on the task board
    ///
    /// Older clients send `"To Do"` for a task that has not been started.
    TaskStatus, "task status" {
        Pending => "Pending" | "To Do",
        InProgress => "In Progress",
        Done => "Done",
        /// Deadline passed before completion
        Missed => "Missed",
    }
}

labelled_enum! {
    /// Expense classification used by the breakdown chart
    ExpenseCategory, "expense category" {
        Transportation => "Transportation",
        Materials => "Materials",
        Equipment => "Equipment",
        Food => "Food",
        Software => "Software",
        Supplies => "Supplies",
        Travel => "Travel",
        Other => "Other",
    }
}

labelled_enum! {
    /// Role of a user inside a collaborative project
    MemberRole, "member role" {
        Admin => "Admin",
        Member => "Member",
    }
}

labelled_enum! {
    /// Role shown on a user's profile
    ProfileRole, "profile role" {
        Student => "Student",
        Teacher => "Teacher",
    }
}

impl Default for ProjectStatus {
    fn default() -> Self {
        ProjectStatus::InProgress
    }
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Medium
    }
}

impl Default for TaskStatus {
    fn default() -> Self {
        TaskStatus::Pending
    }
}

impl Default for ExpenseCategory {
    fn default() -> Self {
        ExpenseCategory::Other
    }
}

impl Default for MemberRole {
    fn default() -> Self {
        MemberRole::Member
    }
}

impl Default for ProfileRole {
    fn default() -> Self {
        ProfileRole::Student
    }
}

impl TaskStatus {
    /// Status a click on the task board moves to
    ///
    /// Pending → In Progress → Done; a missed task is picked back up as
    /// In Progress. Done tasks are locked and return `None`.
    pub fn next_on_click(&self) -> Option<TaskStatus> {
        match self {
            TaskStatus::Pending => Some(TaskStatus::InProgress),
            TaskStatus::InProgress => Some(TaskStatus::Done),
            TaskStatus::Missed => Some(TaskStatus::InProgress),
            TaskStatus::Done => None,
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self, TaskStatus::Done)
    }

    /// Counted as outstanding work on the dashboard
    pub fn is_open(&self) -> bool {
        matches!(self, TaskStatus::Pending | TaskStatus::InProgress)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_round_trip_through_from_str() {
        for status in TaskStatus::all() {
            assert_eq!(status.as_str().parse::<TaskStatus>().unwrap(), *status);
        }
        assert_eq!(
            "in progress".parse::<ProjectStatus>().unwrap(),
            ProjectStatus::InProgress
        );
    }

    #[test]
    fn test_to_do_is_accepted_as_pending() {
        let status: TaskStatus = serde_json::from_str(r#""To Do""#).unwrap();
        assert_eq!(status, TaskStatus::Pending);
        assert_eq!("To Do".parse::<TaskStatus>().unwrap(), TaskStatus::Pending);
        assert_eq!(serde_json::to_string(&status).unwrap(), r#""Pending""#);
    }

    #[test]
    fn test_unknown_label() {
        let err = "Urgent".parse::<Priority>().unwrap_err();
        assert_eq!(err.to_string(), "'Urgent' is not a valid priority");
    }

    #[test]
    fn test_status_cycle() {
        assert_eq!(TaskStatus::Pending.next_on_click(), Some(TaskStatus::InProgress));
        assert_eq!(TaskStatus::InProgress.next_on_click(), Some(TaskStatus::Done));
        assert_eq!(TaskStatus::Missed.next_on_click(), Some(TaskStatus::InProgress));
        assert_eq!(TaskStatus::Done.next_on_click(), None);
    }
}
