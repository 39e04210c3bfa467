//! Personal and collaborative workspace pages

use crate::client::{ClientError, DashboardApi};
use crate::forms::ProjectForm;
use crate::models::{Project, ProjectType, TeamMember};

use super::Notice;

/// New/edit project dialog
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectDialog {
    /// Project being edited, `None` when creating
    pub editing: Option<i64>,
    pub form: ProjectForm,
    /// Validation message shown inside the dialog
    pub error: Option<String>,
}

#[derive(Debug, Clone)]
pub struct WorkspacePage {
    pub workspace: ProjectType,
    pub projects: Vec<Project>,
    pub dialog: Option<ProjectDialog>,
    pub notice: Option<Notice>,
    /// Members of the project whose team is being viewed
    pub members: Option<(i64, Vec<TeamMember>)>,
}

impl WorkspacePage {
    pub fn new(workspace: ProjectType) -> Self {
        Self {
            workspace,
            projects: Vec::new(),
            dialog: None,
            notice: None,
            members: None,
        }
    }

    pub async fn load<A>(&mut self, api: &A) -> Result<(), ClientError>
    where
        A: DashboardApi + ?Sized,
    {
        self.projects = api.list_projects(Some(self.workspace)).await?;
        Ok(())
    }

    pub fn open_new(&mut self) {
        self.dialog = Some(ProjectDialog::default());
    }

    /// Open the dialog pre-filled from a listed project
    pub fn open_edit(&mut self, id: i64) -> bool {
        match self.projects.iter().find(|p| p.id == id) {
            Some(project) => {
                self.dialog = Some(ProjectDialog {
                    editing: Some(id),
                    form: ProjectForm::from_project(project),
                    error: None,
                });
                true
            }
            None => false,
        }
    }

    pub fn close_dialog(&mut self) {
        self.dialog = None;
    }

    /// Validate and save the dialog; returns whether the project was saved
    ///
    /// A form that fails validation keeps the dialog open with its message
    /// and sends nothing.
    pub async fn submit<A>(&mut self, api: &A, form: ProjectForm) -> bool
    where
        A: DashboardApi + ?Sized,
    {
        let dialog = self.dialog.get_or_insert_with(ProjectDialog::default);
        dialog.form = form;
        let mut input = match dialog.form.validate(self.workspace) {
            Ok(input) => input,
            Err(e) => {
                dialog.error = Some(e.to_string());
                return false;
            }
        };
        dialog.error = None;
        let editing = dialog.editing;

        let saved = match editing {
            Some(id) => api
                .update_project(id, &input)
                .await
                .map(|_| "Project updated successfully!"),
            None => {
                input.project_type = self.workspace;
                api.create_project(&input)
                    .await
                    .map(|_| "New project successfully added!")
            }
        };

        match saved {
            Ok(message) => {
                self.dialog = None;
                if let Err(e) = self.load(api).await {
                    tracing::warn!("Failed to refresh projects: {}", e);
                }
                self.notice = Some(Notice::success(message));
                true
            }
            Err(e) => {
                self.notice = Some(Notice::from_client_error("Failed to save project", &e));
                false
            }
        }
    }

    pub async fn delete<A>(&mut self, api: &A, id: i64) -> bool
    where
        A: DashboardApi + ?Sized,
    {
        match api.delete_project(id).await {
            Ok(()) => {
                self.projects.retain(|p| p.id != id);
                self.notice = Some(Notice::success("Deleted a project"));
                true
            }
            Err(e) => {
                self.notice = Some(Notice::from_client_error("Failed to delete project", &e));
                false
            }
        }
    }

    pub async fn view_members<A>(&mut self, api: &A, id: i64) -> Result<&[TeamMember], ClientError>
    where
        A: DashboardApi + ?Sized,
    {
        let members = api.list_team_members(Some(id)).await?;
        Ok(&self.members.insert((id, members)).1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::fake::{FakeApi, Failure};
    use crate::dashboard::notice::NOT_AUTHORIZED;
    use crate::dashboard::NoticeKind;

    fn form(title: &str) -> ProjectForm {
        ProjectForm {
            title: title.into(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_empty_title_sends_nothing() {
        let api = FakeApi::new();
        let mut page = WorkspacePage::new(ProjectType::Personal);
        page.open_new();

        assert!(!page.submit(&api, form("   ")).await);
        assert_eq!(
            page.dialog.as_ref().unwrap().error.as_deref(),
            Some("Project title is required")
        );
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_create_then_refetch() {
        let api = FakeApi::new();
        let mut page = WorkspacePage::new(ProjectType::Collaborative);
        page.open_new();

        assert!(page.submit(&api, form("Capstone")).await);
        assert!(page.dialog.is_none());
        assert_eq!(page.projects.len(), 1);
        assert_eq!(page.projects[0].project_type, ProjectType::Collaborative);
        assert_eq!(
            page.notice,
            Some(Notice::success("New project successfully added!"))
        );
        assert_eq!(
            api.calls(),
            vec!["POST /api/projects/".to_string(), "GET /api/projects/".to_string()]
        );
    }

    #[tokio::test]
    async fn test_edit_uses_put() {
        let api = FakeApi::new();
        let project = api.add_project("Thesis", ProjectType::Personal);
        let mut page = WorkspacePage::new(ProjectType::Personal);
        page.load(&api).await.unwrap();

        assert!(page.open_edit(project.id));
        let mut edited = page.dialog.as_ref().unwrap().form.clone();
        edited.title = "Thesis v2".into();
        assert!(page.submit(&api, edited).await);

        assert_eq!(page.projects[0].title, "Thesis v2");
        assert_eq!(page.notice.as_ref().unwrap().message, "Project updated successfully!");
        assert!(api.calls().contains(&format!("PUT /api/projects/{}/", project.id)));
    }

    #[tokio::test]
    async fn test_forbidden_save() {
        let api = FakeApi::new();
        let mut page = WorkspacePage::new(ProjectType::Personal);
        api.fail_next(Failure::Status(403, vec![]));

        assert!(!page.submit(&api, form("Thesis")).await);
        let notice = page.notice.unwrap();
        assert_eq!(notice.kind, NoticeKind::Error);
        assert_eq!(notice.message, NOT_AUTHORIZED);
    }

    #[tokio::test]
    async fn test_validation_failure_from_server() {
        let api = FakeApi::new();
        let mut page = WorkspacePage::new(ProjectType::Personal);
        api.fail_next(Failure::Status(400, vec![("end_date", "Date has wrong format.")]));

        assert!(!page.submit(&api, form("Thesis")).await);
        assert_eq!(
            page.notice.unwrap().message,
            "Validation failed: end_date: Date has wrong format."
        );
    }

    #[tokio::test]
    async fn test_delete_removes_locally() {
        let api = FakeApi::new();
        let keep = api.add_project("Keep", ProjectType::Personal);
        let gone = api.add_project("Gone", ProjectType::Personal);
        let mut page = WorkspacePage::new(ProjectType::Personal);
        page.load(&api).await.unwrap();

        assert!(page.delete(&api, gone.id).await);
        assert_eq!(page.projects.len(), 1);
        assert_eq!(page.projects[0].id, keep.id);
        assert_eq!(page.notice.unwrap().message, "Deleted a project");
    }

    #[tokio::test]
    async fn test_view_members() {
        let api = FakeApi::new();
        let project = api.add_project("Capstone", ProjectType::Collaborative);
        let mut page = WorkspacePage::new(ProjectType::Collaborative);

        let members = page.view_members(&api, project.id).await.unwrap();
        assert!(members.is_empty());
        assert_eq!(
            api.calls(),
            vec![format!("GET /api/team-members/?project={}", project.id)]
        );
    }
}
