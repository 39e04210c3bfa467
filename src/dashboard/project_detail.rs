//! Project detail page and its task board

use crate::analytics::completion_percentage;
use crate::client::{ClientError, DashboardApi, Upload};
use crate::forms::TaskForm;
use crate::models::{Project, Task, TaskPatch, TeamMember};

use super::{apply_task_patch, Notice};

#[derive(Debug, Clone)]
pub struct ProjectDetailPage {
    pub project_id: i64,
    pub project: Option<Project>,
    pub tasks: Vec<Task>,
    /// Loaded for collaborative projects only
    pub members: Vec<TeamMember>,
    pub notice: Option<Notice>,
    /// Message shown inside the add/edit task dialog
    pub task_error: Option<String>,
}

impl ProjectDetailPage {
    pub fn new(project_id: i64) -> Self {
        Self {
            project_id,
            project: None,
            tasks: Vec::new(),
            members: Vec::new(),
            notice: None,
            task_error: None,
        }
    }

    pub async fn load<A>(&mut self, api: &A) -> Result<(), ClientError>
    where
        A: DashboardApi + ?Sized,
    {
        let (project, tasks) = tokio::try_join!(
            api.get_project(self.project_id),
            api.list_tasks(Some(self.project_id)),
        )?;

        self.members = if project.is_collaborative() {
            api.list_team_members(Some(self.project_id)).await?
        } else {
            Vec::new()
        };
        self.tasks = tasks
            .into_iter()
            .filter(|t| t.project == self.project_id)
            .collect();
        self.project = Some(project);
        Ok(())
    }

    /// Share of this project's tasks that are done
    pub fn progress(&self) -> u8 {
        completion_percentage(&self.tasks)
    }

    pub fn task(&self, id: i64) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Validate and create a task; returns whether it was created
    pub async fn add_task<A>(&mut self, api: &A, form: &TaskForm) -> bool
    where
        A: DashboardApi + ?Sized,
    {
        let input = match form.validate(self.project_id) {
            Ok(input) => input,
            Err(e) => {
                self.task_error = Some(e.to_string());
                return false;
            }
        };
        self.task_error = None;

        match api.create_task(&input).await {
            Ok(_) => {
                self.refetch(api).await;
                true
            }
            Err(e) => {
                self.task_error = Some(task_error_message(&e));
                false
            }
        }
    }

    /// Apply an edit locally, then PATCH it; on failure the board is
    /// reloaded from the server. Done tasks are locked.
    pub async fn update_task<A>(&mut self, api: &A, id: i64, patch: TaskPatch) -> bool
    where
        A: DashboardApi + ?Sized,
    {
        let Some(task) = self.tasks.iter_mut().find(|t| t.id == id) else {
            return false;
        };
        if task.is_locked() {
            return false;
        }
        apply_task_patch(task, &patch);

        match api.update_task(id, &patch).await {
            Ok(saved) => {
                if let Some(slot) = self.tasks.iter_mut().find(|t| t.id == id) {
                    *slot = saved;
                }
                true
            }
            Err(e) => {
                tracing::warn!(task_id = id, "Failed to update task: {}", e);
                self.refetch(api).await;
                false
            }
        }
    }

    /// Status button: Pending, In Progress, Done; Missed goes back to In
    /// Progress
    pub async fn cycle_status<A>(&mut self, api: &A, id: i64) -> bool
    where
        A: DashboardApi + ?Sized,
    {
        let Some(next) = self.task(id).and_then(|t| t.status.next_on_click()) else {
            return false;
        };
        self.update_task(api, id, TaskPatch::status(next)).await
    }

    pub async fn edit_task<A>(&mut self, api: &A, id: i64, form: &TaskForm) -> bool
    where
        A: DashboardApi + ?Sized,
    {
        match form.validate_patch() {
            Ok(patch) => {
                self.task_error = None;
                self.update_task(api, id, patch).await
            }
            Err(e) => {
                self.task_error = Some(e.to_string());
                false
            }
        }
    }

    /// Attach a file; a successful upload marks the task Done
    pub async fn upload<A>(&mut self, api: &A, id: i64, file: Upload) -> bool
    where
        A: DashboardApi + ?Sized,
    {
        if self.is_locked(id) {
            return false;
        }
        match api.upload_attachment(id, file).await {
            Ok(attachment) => {
                if let Some(task) = self.tasks.iter_mut().find(|t| t.id == id) {
                    task.attachments.push(attachment);
                }
                self.update_task(api, id, TaskPatch::status(crate::models::TaskStatus::Done))
                    .await;
                self.notice = Some(Notice::success("File successfully uploaded: Task Done"));
                true
            }
            Err(e) => {
                self.notice = Some(Notice::from_client_error("Failed to upload file", &e));
                false
            }
        }
    }

    /// Done tasks stay on the board
    pub async fn delete_task<A>(&mut self, api: &A, id: i64) -> bool
    where
        A: DashboardApi + ?Sized,
    {
        if self.is_locked(id) {
            return false;
        }
        match api.delete_task(id).await {
            Ok(()) => {
                self.tasks.retain(|t| t.id != id);
                self.notice = Some(Notice::success("Task deleted"));
                true
            }
            Err(e) => {
                self.notice = Some(Notice::from_client_error("Failed to delete task", &e));
                false
            }
        }
    }

    fn is_locked(&self, id: i64) -> bool {
        self.task(id).is_some_and(|t| t.is_locked())
    }

    async fn refetch<A>(&mut self, api: &A)
    where
        A: DashboardApi + ?Sized,
    {
        if let Err(e) = self.load(api).await {
            tracing::error!(project_id = self.project_id, "Failed to reload project: {}", e);
            self.notice = Some(Notice::from_client_error("Failed to load project", &e));
        }
    }
}

/// Field messages joined with spaces, as shown in the task dialog
fn task_error_message(err: &ClientError) -> String {
    match err {
        ClientError::Api { fields, .. } if !fields.is_empty() => {
            fields.values().cloned().collect::<Vec<_>>().join(" ")
        }
        ClientError::Api { message, .. } => message.clone(),
        _ => "An unexpected error occurred. Please try again.".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::fake::{FakeApi, Failure};
    use crate::models::{ProjectType, TaskStatus};

    async fn loaded(api: &FakeApi, project_type: ProjectType) -> (ProjectDetailPage, i64) {
        let project = api.add_project("Thesis", project_type);
        let task = api.add_task(project.id, "Outline");
        api.add_task(project.id + 1000, "Elsewhere");
        let mut page = ProjectDetailPage::new(project.id);
        page.load(api).await.unwrap();
        (page, task.id)
    }

    #[tokio::test]
    async fn test_load_filters_tasks_and_skips_members_for_personal() {
        let api = FakeApi::new();
        let (page, _) = loaded(&api, ProjectType::Personal).await;
        assert_eq!(page.tasks.len(), 1);
        assert!(!api.calls().iter().any(|c| c.contains("team-members")));
    }

    #[tokio::test]
    async fn test_load_fetches_members_for_collaborative() {
        let api = FakeApi::new();
        let (page, _) = loaded(&api, ProjectType::Collaborative).await;
        assert!(api.calls().iter().any(|c| c.contains("team-members")));
        assert!(page.members.is_empty());
    }

    #[tokio::test]
    async fn test_status_cycle_and_done_lock() {
        let api = FakeApi::new();
        let (mut page, id) = loaded(&api, ProjectType::Personal).await;

        assert!(page.cycle_status(&api, id).await);
        assert_eq!(page.task(id).unwrap().status, TaskStatus::InProgress);
        assert!(page.cycle_status(&api, id).await);
        assert_eq!(page.task(id).unwrap().status, TaskStatus::Done);
        assert_eq!(page.progress(), 100);

        let calls = api.calls().len();
        assert!(!page.cycle_status(&api, id).await);
        let edit = TaskForm {
            title: "Renamed".into(),
            ..Default::default()
        };
        assert!(!page.edit_task(&api, id, &edit).await);
        assert_eq!(api.calls().len(), calls);
        assert_eq!(page.task(id).unwrap().title, "Outline");
    }

    #[tokio::test]
    async fn test_done_task_rejects_upload_and_delete() {
        let api = FakeApi::new();
        let (mut page, id) = loaded(&api, ProjectType::Personal).await;
        assert!(page.cycle_status(&api, id).await);
        assert!(page.cycle_status(&api, id).await);
        assert_eq!(page.task(id).unwrap().status, TaskStatus::Done);

        let calls = api.calls().len();
        assert!(!page.upload(&api, id, Upload::new("late.txt", b"late".to_vec())).await);
        assert!(!page.delete_task(&api, id).await);
        assert_eq!(api.calls().len(), calls);
        assert!(page.task(id).is_some());
        assert!(page.task(id).unwrap().attachments.is_empty());
    }

    #[tokio::test]
    async fn test_missed_goes_back_to_in_progress() {
        let api = FakeApi::new();
        let (mut page, id) = loaded(&api, ProjectType::Personal).await;
        api.state().tasks.iter_mut().for_each(|t| t.status = TaskStatus::Missed);
        page.load(&api).await.unwrap();

        assert!(page.cycle_status(&api, id).await);
        assert_eq!(page.task(id).unwrap().status, TaskStatus::InProgress);
    }

    #[tokio::test]
    async fn test_failed_patch_restores_server_state() {
        let api = FakeApi::new();
        let (mut page, id) = loaded(&api, ProjectType::Personal).await;
        api.fail_next(Failure::Status(500, vec![]));

        assert!(!page.cycle_status(&api, id).await);
        assert_eq!(page.task(id).unwrap().status, TaskStatus::Pending);
        assert_eq!(api.calls().last().map(String::as_str), Some("GET /api/tasks/"));
    }

    #[tokio::test]
    async fn test_add_task_validation() {
        let api = FakeApi::new();
        let (mut page, _) = loaded(&api, ProjectType::Personal).await;
        let calls = api.calls().len();

        assert!(!page.add_task(&api, &TaskForm::default()).await);
        assert_eq!(page.task_error.as_deref(), Some("Task title cannot be empty."));
        assert_eq!(api.calls().len(), calls);

        let form = TaskForm {
            title: "Draft".into(),
            ..Default::default()
        };
        assert!(page.add_task(&api, &form).await);
        assert_eq!(page.tasks.len(), 2);
        assert_eq!(page.tasks[1].status, TaskStatus::Pending);
    }

    #[tokio::test]
    async fn test_upload_marks_done() {
        let api = FakeApi::new();
        let (mut page, id) = loaded(&api, ProjectType::Personal).await;

        assert!(page.upload(&api, id, Upload::new("notes.txt", b"hi".to_vec())).await);
        let task = page.task(id).unwrap();
        assert_eq!(task.status, TaskStatus::Done);
        assert_eq!(task.attachments.len(), 1);
        assert_eq!(
            page.notice.as_ref().unwrap().message,
            "File successfully uploaded: Task Done"
        );
    }

    #[tokio::test]
    async fn test_delete_task() {
        let api = FakeApi::new();
        let (mut page, id) = loaded(&api, ProjectType::Personal).await;
        assert!(page.delete_task(&api, id).await);
        assert!(page.tasks.is_empty());
        assert!(api.calls().contains(&format!("DELETE /api/tasks/{id}/")));
    }
}
