//! Drives the HTTP client and page controllers against a live server bound to
//! an ephemeral port.

use chrono::Utc;
use std::sync::Arc;
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

use goproject::api::{serve_on, AppState};
use goproject::client::{
    ClientError, DashboardApi, GoProjectClient, MemoryTokenStore, TokenStore, Upload,
};
use goproject::config::StorageConfig;
use goproject::dashboard::{AnalyticsPage, ExpensesPage, ProjectDetailPage, WorkspacePage};
use goproject::forms::{ExpenseForm, ProjectForm, RegisterForm, TaskForm};
use goproject::models::{ExpenseCategory, LoginRequest, ProjectType, TaskStatus};
use goproject::{session, AuthGuard, AuthStatus, Config};

struct Server {
    base_url: String,
    shutdown: Option<oneshot::Sender<()>>,
    handle: tokio::task::JoinHandle<()>,
    _data: TempDir,
}

impl Server {
    async fn start() -> Self {
        let data = TempDir::new().unwrap();
        let config = Config {
            storage: StorageConfig::new(data.path().to_string_lossy().to_string()),
            ..Config::default()
        };
        let state = AppState::open(&config).unwrap();

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        let (tx, rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(async move {
            serve_on(listener, state, async {
                let _ = rx.await;
            })
            .await
            .unwrap();
        });

        Self {
            base_url,
            shutdown: Some(tx),
            handle,
            _data: data,
        }
    }

    fn client(&self) -> (GoProjectClient, Arc<dyn TokenStore>) {
        let tokens: Arc<dyn TokenStore> = Arc::new(MemoryTokenStore::new());
        let client = GoProjectClient::new(&self.base_url, Arc::clone(&tokens)).unwrap();
        (client, tokens)
    }

    async fn stop(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        self.handle.await.unwrap();
    }
}

async fn sign_up(client: &GoProjectClient, tokens: &dyn TokenStore, username: &str) -> i64 {
    let form = RegisterForm {
        username: username.to_string(),
        email: format!("{}@example.com", username),
        password: "correct horse battery".to_string(),
        confirm_password: "correct horse battery".to_string(),
    };
    let user = session::register(client, tokens, &form).await.unwrap();
    session::login(
        client,
        tokens,
        &LoginRequest {
            username: username.to_string(),
            password: "correct horse battery".to_string(),
        },
    )
    .await
    .unwrap();
    user.id
}

#[tokio::test]
async fn test_personal_project_workflow() {
    let server = Server::start().await;
    let (client, tokens) = server.client();

    assert_eq!(
        AuthGuard::new(Arc::clone(&tokens)).check(&client).await,
        AuthStatus::Unauthorized
    );
    sign_up(&client, tokens.as_ref(), "maria").await;
    assert_eq!(
        AuthGuard::new(Arc::clone(&tokens)).check(&client).await,
        AuthStatus::Authorized
    );
    assert_eq!(client.current_user().await.unwrap().username, "maria");

    // Workspace: create a project through the dialog
    let mut workspace = WorkspacePage::new(ProjectType::Personal);
    workspace.load(&client).await.unwrap();
    assert!(workspace.projects.is_empty());
    workspace.open_new();
    let created = workspace
        .submit(
            &client,
            ProjectForm {
                title: "  Thesis ".to_string(),
                end_date: "2030-06-01".to_string(),
                ..ProjectForm::default()
            },
        )
        .await;
    assert!(created);
    assert_eq!(workspace.projects.len(), 1);
    assert_eq!(workspace.projects[0].title, "Thesis");
    let project_id = workspace.projects[0].id;

    // Board: two tasks, one completed by uploading a file
    let mut board = ProjectDetailPage::new(project_id);
    board.load(&client).await.unwrap();
    for title in ["Outline", "Draft"] {
        let form = TaskForm {
            title: title.to_string(),
            ..TaskForm::default()
        };
        assert!(board.add_task(&client, &form).await);
    }
    assert_eq!(board.tasks.len(), 2);
    assert_eq!(board.progress(), 0);

    let outline = board.tasks.iter().find(|t| t.title == "Outline").unwrap().id;
    assert!(board.cycle_status(&client, outline).await);
    assert_eq!(board.task(outline).unwrap().status, TaskStatus::InProgress);

    let uploaded = board
        .upload(&client, outline, Upload::new("outline.txt", b"chapter one".to_vec()))
        .await;
    assert!(uploaded);
    assert_eq!(board.task(outline).unwrap().status, TaskStatus::Done);

    board.load(&client).await.unwrap();
    assert_eq!(board.progress(), 50);
    let attachment = &board.task(outline).unwrap().attachments[0];
    assert!(attachment.file.starts_with(&server.base_url));
    let body = reqwest::get(&attachment.file).await.unwrap().text().await.unwrap();
    assert_eq!(body, "chapter one");

    // Done tasks are locked
    assert!(!board.cycle_status(&client, outline).await);

    // Expenses
    let mut expenses = ExpensesPage::new();
    expenses.load(&client).await.unwrap();
    let today = Utc::now().date_naive();
    let form = ExpenseForm {
        description: "Printing".to_string(),
        amount: "12.5".to_string(),
        category: ExpenseCategory::Supplies,
        project: Some(project_id),
        date: String::new(),
    };
    assert!(expenses.add(&client, &form, today).await);
    assert_eq!(expenses.expenses.len(), 1);
    assert_eq!(expenses.expenses[0].amount.to_string(), "12.50");

    // Analytics over what the server recorded
    let view = AnalyticsPage::load(&client, today).await.unwrap();
    assert_eq!(view.quick.completed_tasks, 1);
    assert_eq!(view.quick.pending_tasks, 1);
    assert_eq!(view.breakdown.len(), 1);
    assert_eq!(view.weekly.last().unwrap().completed, 1);

    let stats = client.dashboard_stats().await.unwrap();
    assert_eq!(stats.total_projects, 1);
    assert_eq!(stats.completed_tasks, 1);

    server.stop().await;
}

#[tokio::test]
async fn test_outsider_cannot_see_project() {
    let server = Server::start().await;
    let (owner, owner_tokens) = server.client();
    let (outsider, outsider_tokens) = server.client();

    sign_up(&owner, owner_tokens.as_ref(), "owner").await;
    sign_up(&outsider, outsider_tokens.as_ref(), "stranger").await;

    let mut workspace = WorkspacePage::new(ProjectType::Collaborative);
    let form = ProjectForm {
        title: "Lab".to_string(),
        project_type: Some(ProjectType::Collaborative),
        ..ProjectForm::default()
    };
    assert!(workspace.submit(&owner, form).await);
    let project_id = workspace.projects[0].id;

    let err = outsider.get_project(project_id).await.unwrap_err();
    assert_eq!(err.status(), Some(404));
    assert!(outsider.list_projects(None).await.unwrap().is_empty());

    let mut stranger_view = WorkspacePage::new(ProjectType::Collaborative);
    assert!(!stranger_view.delete(&outsider, project_id).await);
    assert!(stranger_view.notice.as_ref().unwrap().is_error());

    server.stop().await;
}

#[tokio::test]
async fn test_rejected_credentials_surface_server_message() {
    let server = Server::start().await;
    let (client, tokens) = server.client();
    sign_up(&client, tokens.as_ref(), "maria").await;

    let err = session::login(
        &client,
        tokens.as_ref(),
        &LoginRequest {
            username: "maria".to_string(),
            password: "wrong password".to_string(),
        },
    )
    .await
    .unwrap_err();
    match err {
        session::SessionError::Client(ClientError::Api { status, .. }) => assert_eq!(status, 401),
        other => panic!("unexpected error: {other}"),
    }

    session::logout(tokens.as_ref()).unwrap();
    assert!(matches!(
        client.current_user().await,
        Err(ClientError::NotLoggedIn)
    ));

    server.stop().await;
}
