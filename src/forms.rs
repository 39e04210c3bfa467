//! Form validation
//!
//! Each form holds the raw values a dialog collects and turns them into a
//! request body. A form that fails validation never produces a body, so the
//! caller never issues a request for it.

use chrono::NaiveDate;
use regex::Regex;
use std::sync::OnceLock;

use crate::models::{
    ExpenseCategory, ExpenseInput, Money, Priority, ProfileRole, ProfileUpdate, ProjectInput,
    ProjectStatus, ProjectType, RegisterRequest, TaskInput, TaskPatch, TaskStatus,
};

pub const MAX_TITLE_LEN: usize = 100;
pub const MAX_DESCRIPTION_LEN: usize = 500;
pub const MIN_PASSWORD_LEN: usize = 8;
pub const MIN_USERNAME_LEN: usize = 3;

/// Validation failures, displayed verbatim to the user
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    #[error("Project title is required")]
    ProjectTitleRequired,

    #[error("Title must be at most 100 characters")]
    TitleTooLong,

    #[error("Description must be at most 500 characters")]
    DescriptionTooLong,

    #[error("Task title cannot be empty.")]
    TaskTitleRequired,

    #[error("Please fill in all required fields.")]
    MissingRequired,

    #[error("Please select a project.")]
    ProjectRequired,

    #[error("Amount must be a number with at most two decimal places.")]
    InvalidAmount,

    #[error("Amount cannot be negative.")]
    NegativeAmount,

    #[error("Amount must be at most 99999999.99.")]
    AmountTooLarge,

    #[error("Invalid date '{0}', expected YYYY-MM-DD.")]
    InvalidDate(String),

    #[error("Please fill in all fields.")]
    MissingCredentials,

    #[error("Passwords do not match.")]
    PasswordMismatch,

    #[error("New password and confirmation do not match.")]
    NewPasswordMismatch,

    #[error("New password must be at least 8 characters long.")]
    PasswordTooShort,

    #[error("Username must be at least 3 characters long.")]
    UsernameTooShort,

    #[error("Invalid email format.")]
    InvalidEmail,
}

fn email_regex() -> Option<&'static Regex> {
    static EMAIL: OnceLock<Option<Regex>> = OnceLock::new();
    EMAIL
        .get_or_init(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").ok())
        .as_ref()
}

pub fn is_valid_email(email: &str) -> bool {
    email_regex().is_some_and(|re| re.is_match(email.trim()))
}

/// Empty input means "no date"
pub fn parse_optional_date(raw: &str) -> Result<Option<NaiveDate>, FormError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map(Some)
        .map_err(|_| FormError::InvalidDate(raw.to_string()))
}

fn check_lengths(title: &str, description: &str) -> Result<(), FormError> {
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(FormError::TitleTooLong);
    }
    if description.chars().count() > MAX_DESCRIPTION_LEN {
        return Err(FormError::DescriptionTooLong);
    }
    Ok(())
}

/// New/edit project dialog
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectForm {
    pub title: String,
    pub description: String,
    pub project_type: Option<ProjectType>,
    pub status: Option<ProjectStatus>,
    pub priority: Option<Priority>,
    /// `YYYY-MM-DD`, empty for none
    pub end_date: String,
    /// Collaborators picked in the dialog
    pub members: Vec<i64>,
}

impl ProjectForm {
    /// Dialog pre-filled from an existing project
    pub fn from_project(project: &crate::models::Project) -> Self {
        Self {
            title: project.title.clone(),
            description: project.description.clone(),
            project_type: Some(project.project_type),
            status: Some(project.status),
            priority: Some(project.priority),
            end_date: project
                .end_date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            members: project.members.clone(),
        }
    }

    pub fn validate(&self, workspace: ProjectType) -> Result<ProjectInput, FormError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(FormError::ProjectTitleRequired);
        }
        check_lengths(title, &self.description)?;

        let project_type = self.project_type.unwrap_or(workspace);
        Ok(ProjectInput {
            title: title.to_string(),
            description: self.description.trim().to_string(),
            project_type,
            status: self.status.unwrap_or_default(),
            priority: self.priority.unwrap_or_default(),
            end_date: parse_optional_date(&self.end_date)?,
            members: if project_type == ProjectType::Collaborative {
                self.members.clone()
            } else {
                Vec::new()
            },
        })
    }
}

/// New/edit task dialog
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskForm {
    pub title: String,
    pub description: String,
    pub priority: Option<Priority>,
    pub due_date: String,
    pub assigned_to: Option<i64>,
}

impl TaskForm {
    /// Body for a new task; new tasks always start Pending
    pub fn validate(&self, project: i64) -> Result<TaskInput, FormError> {
        let title = self.checked_title()?;
        Ok(TaskInput {
            title,
            description: self.description.trim().to_string(),
            project,
            status: TaskStatus::Pending,
            priority: self.priority.unwrap_or_default(),
            due_date: parse_optional_date(&self.due_date)?,
            assigned_to: self.assigned_to,
        })
    }

    /// Body for editing an existing task; status is left untouched
    pub fn validate_patch(&self) -> Result<TaskPatch, FormError> {
        let title = self.checked_title()?;
        Ok(TaskPatch {
            title: Some(title),
            description: Some(self.description.trim().to_string()),
            priority: Some(self.priority.unwrap_or_default()),
            due_date: Some(parse_optional_date(&self.due_date)?),
            assigned_to: Some(self.assigned_to),
            status: None,
        })
    }

    fn checked_title(&self) -> Result<String, FormError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(FormError::TaskTitleRequired);
        }
        check_lengths(title, &self.description)?;
        Ok(title.to_string())
    }
}

/// Add-expense form
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseForm {
    pub description: String,
    pub amount: String,
    pub category: ExpenseCategory,
    pub project: Option<i64>,
    /// `YYYY-MM-DD`, empty for today
    pub date: String,
}

impl Default for ExpenseForm {
    fn default() -> Self {
        Self {
            description: String::new(),
            amount: String::new(),
            category: ExpenseCategory::Food,
            project: None,
            date: String::new(),
        }
    }
}

impl ExpenseForm {
    pub fn validate(&self, today: NaiveDate) -> Result<ExpenseInput, FormError> {
        let description = self.description.trim();
        let amount = self.amount.trim();
        if description.is_empty() || amount.is_empty() {
            return Err(FormError::MissingRequired);
        }
        let amount: Money = amount.parse().map_err(|_| FormError::InvalidAmount)?;
        if amount.is_negative() {
            return Err(FormError::NegativeAmount);
        }
        if amount > Money::MAX_EXPENSE {
            return Err(FormError::AmountTooLarge);
        }
        let project = self.project.ok_or(FormError::ProjectRequired)?;

        Ok(ExpenseInput {
            description: description.to_string(),
            amount,
            category: self.category,
            project,
            date: Some(parse_optional_date(&self.date)?.unwrap_or(today)),
        })
    }
}

/// Sign-up form
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegisterForm {
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl RegisterForm {
    pub fn validate(&self) -> Result<RegisterRequest, FormError> {
        let username = self.username.trim();
        let email = self.email.trim();
        if username.is_empty() || email.is_empty() || self.password.is_empty() {
            return Err(FormError::MissingCredentials);
        }
        if !is_valid_email(email) {
            return Err(FormError::InvalidEmail);
        }
        if self.password != self.confirm_password {
            return Err(FormError::PasswordMismatch);
        }
        Ok(RegisterRequest {
            username: username.to_string(),
            email: email.to_string(),
            password: self.password.clone(),
        })
    }
}

/// Change-password dialog
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangePasswordForm {
    pub current_password: String,
    pub new_password: String,
    pub confirm_new_password: String,
}

impl ChangePasswordForm {
    pub fn validate(&self) -> Result<crate::models::ChangePasswordRequest, FormError> {
        if self.current_password.is_empty() || self.new_password.is_empty() {
            return Err(FormError::MissingCredentials);
        }
        if self.new_password != self.confirm_new_password {
            return Err(FormError::NewPasswordMismatch);
        }
        if self.new_password.chars().count() < MIN_PASSWORD_LEN {
            return Err(FormError::PasswordTooShort);
        }
        Ok(crate::models::ChangePasswordRequest {
            current_password: self.current_password.clone(),
            new_password: self.new_password.clone(),
        })
    }
}

/// Profile settings form
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileForm {
    pub username: String,
    pub email: String,
    pub role: Option<ProfileRole>,
    pub course: String,
    pub bio: String,
}

impl ProfileForm {
    pub fn from_user(user: &crate::models::User) -> Self {
        Self {
            username: user.username.clone(),
            email: user.email.clone(),
            role: Some(user.profile.role),
            course: user.profile.course.clone(),
            bio: user.profile.bio.clone(),
        }
    }

    pub fn validate(&self) -> Result<ProfileUpdate, FormError> {
        let username = self.username.trim();
        let email = self.email.trim();
        if username.chars().count() < MIN_USERNAME_LEN {
            return Err(FormError::UsernameTooShort);
        }
        if !is_valid_email(email) {
            return Err(FormError::InvalidEmail);
        }
        Ok(ProfileUpdate {
            username: Some(username.to_string()),
            email: Some(email.to_string()),
            role: self.role,
            course: Some(self.course.trim().to_string()),
            bio: Some(self.bio.trim().to_string()),
        })
    }
}
