//! GoProject data model
//!
//! Records owned by the API (users, projects, tasks, expenses, activity,
//! team memberships, attachments) and the request bodies that mutate them.
//! Both the server and the dashboard client use these types, so the JSON
//! shape lives in exactly one place.

pub mod entities;
pub mod enums;
pub mod money;
pub mod payloads;

pub use entities::{
    initials, ActivityLog, Attachment, DashboardStats, Expense, MemberUser, Profile, Project,
    ProjectSummary, Task, TeamMember, TokenPair, User,
};
pub use enums::{
    ExpenseCategory, MemberRole, Priority, ProfileRole, ProjectStatus, ProjectType, TaskStatus,
    UnknownVariant,
};
pub use money::{Money, MoneyError};
pub use payloads::{
    ChangePasswordRequest, ExpenseInput, ExpensePatch, LoginRequest, ProfileUpdate,
    ProjectInput, ProjectPatch, RefreshRequest, RegisterRequest, TaskInput, TaskPatch,
    TeamMemberInput, TeamMemberPatch,
};
