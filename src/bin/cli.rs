//! GoProject CLI
//!
//! Terminal dashboard for a GoProject server:
//! - Sign up, log in and manage the stored session
//! - Personal and collaborative workspaces
//! - Task board with status cycling and attachments
//! - Expenses, with CSV export
//! - Analytics and profile settings

use anyhow::{bail, Context};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use goproject::analytics::Deadline;
use goproject::client::{DashboardApi, FileTokenStore, GoProjectClient, TokenStore, Upload};
use goproject::dashboard::{
    AnalyticsPage, ExpensesPage, HomePage, Notice, ProfilePage, ProjectDetailPage, WorkspacePage,
};
use goproject::forms::{ChangePasswordForm, ExpenseForm, ProfileForm, RegisterForm, TaskForm};
use goproject::models::{
    ExpenseCategory, LoginRequest, Priority, ProfileRole, ProjectStatus, ProjectType, Task,
};
use goproject::{logging, session, AuthGuard, AuthStatus, Config};

#[derive(Parser)]
#[command(name = "goproject")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Projects, tasks and expenses from the terminal")]
#[command(long_about = "GoProject keeps personal and collaborative projects, their task boards and their expenses in one place.\nThis CLI talks to a running goproject-api server.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// API server URL (default: from config)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table", global = true)]
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create an account
    Register {
        username: String,
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        confirm_password: String,
    },

    /// Log in and store the session
    Login {
        username: String,
        #[arg(long)]
        password: String,
    },

    /// Forget the stored session
    Logout,

    /// Show the logged-in user
    Whoami,

    /// Workspaces, recent activity and deadlines
    Home,

    /// Manage projects in a workspace
    Projects {
        #[command(subcommand)]
        command: ProjectCommands,
    },

    /// Task board of one project
    Project {
        /// Project ID
        id: i64,
        #[command(subcommand)]
        command: Option<TaskCommands>,
    },

    /// Track expenses
    Expenses {
        #[command(subcommand)]
        command: ExpenseCommands,
    },

    /// Spending per category and completed tasks over the last week
    Analytics,

    /// Update profile settings
    Profile {
        #[arg(long)]
        username: Option<String>,
        #[arg(long)]
        email: Option<String>,
        /// Student or Teacher
        #[arg(long)]
        role: Option<ProfileRole>,
        #[arg(long)]
        course: Option<String>,
        #[arg(long)]
        bio: Option<String>,
        /// Profile picture to upload
        #[arg(long)]
        picture: Option<PathBuf>,
    },

    /// Change the account password
    Password {
        #[arg(long)]
        current: String,
        #[arg(long)]
        new: String,
        #[arg(long)]
        confirm: String,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum ProjectCommands {
    /// List projects
    List {
        /// Personal or Collaborative (default: both)
        #[arg(short = 't', long = "type")]
        project_type: Option<ProjectType>,
    },

    /// Create a project
    Add {
        title: String,
        #[arg(short = 't', long = "type", default_value = "Personal")]
        project_type: ProjectType,
        #[arg(short, long, default_value = "")]
        description: String,
        #[arg(short, long)]
        priority: Option<Priority>,
        #[arg(short, long)]
        status: Option<ProjectStatus>,
        /// YYYY-MM-DD
        #[arg(short, long)]
        end_date: Option<String>,
        /// User IDs to add as collaborators
        #[arg(short, long)]
        member: Vec<i64>,
    },

    /// Edit a project
    Edit {
        id: i64,
        #[arg(long)]
        title: Option<String>,
        #[arg(short, long)]
        description: Option<String>,
        #[arg(short, long)]
        priority: Option<Priority>,
        #[arg(short, long)]
        status: Option<ProjectStatus>,
        /// YYYY-MM-DD, or an empty string to clear
        #[arg(short, long)]
        end_date: Option<String>,
    },

    /// Delete a project with its tasks and expenses
    Delete { id: i64 },

    /// List the team of a project
    Members { id: i64 },
}

#[derive(Subcommand)]
pub enum TaskCommands {
    /// Show the board (default)
    Show,

    /// Add a task
    Add {
        title: String,
        #[arg(short, long, default_value = "")]
        description: String,
        #[arg(short, long)]
        priority: Option<Priority>,
        /// YYYY-MM-DD
        #[arg(long)]
        due: Option<String>,
        /// User ID
        #[arg(long)]
        assign: Option<i64>,
    },

    /// Advance a task to its next status
    Status { task: i64 },

    /// Edit a task
    Edit {
        task: i64,
        #[arg(long)]
        title: Option<String>,
        #[arg(short, long)]
        description: Option<String>,
        #[arg(short, long)]
        priority: Option<Priority>,
        /// YYYY-MM-DD, or an empty string to clear
        #[arg(long)]
        due: Option<String>,
        #[arg(long)]
        assign: Option<i64>,
    },

    /// Delete a task
    Delete { task: i64 },

    /// Attach a file; the task is marked Done
    Upload { task: i64, path: PathBuf },
}

#[derive(Subcommand)]
pub enum ExpenseCommands {
    /// List expenses with a summary
    List,

    /// Record an expense
    Add {
        /// Amount, e.g. 12.50
        amount: String,
        #[arg(short, long)]
        description: String,
        #[arg(short, long, default_value = "Food")]
        category: ExpenseCategory,
        /// Project ID
        #[arg(short, long)]
        project: i64,
        /// YYYY-MM-DD (default: today)
        #[arg(long)]
        date: Option<String>,
    },

    /// Delete an expense
    Delete { id: i64 },

    /// Write all expenses as CSV
    Export {
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load_default();
    logging::init(&config.logging);
    if let Some(url) = &cli.api_url {
        config.client.api_url = url.clone();
    }

    let tokens: Arc<dyn TokenStore> = Arc::new(FileTokenStore::new(&config.client.session_file));
    let client = GoProjectClient::from_config(&config.client, Arc::clone(&tokens))?;
    let format = cli.format;
    let today = Local::now().date_naive();

    match cli.command {
        Commands::Register {
            username,
            email,
            password,
            confirm_password,
        } => {
            let form = RegisterForm {
                username,
                email,
                password,
                confirm_password,
            };
            let user = session::register(&client, tokens.as_ref(), &form).await?;
            println!("Registration successful! Log in as '{}'.", user.username);
        }

        Commands::Login { username, password } => {
            let req = LoginRequest { username, password };
            session::login(&client, tokens.as_ref(), &req).await?;
            println!("Logged in as {}", req.username);
        }

        Commands::Logout => {
            session::logout(tokens.as_ref())?;
            println!("Logged out");
        }

        Commands::Config { output } => {
            let config = goproject::config::generate_default_config();

            match output {
                Some(path) => {
                    if let Some(parent) = path.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(&path, &config)?;
                    println!("Config written to {:?}", path);
                }
                None => {
                    print!("{}", config);
                }
            }
        }

        command => {
            require_session(&client, &tokens).await?;
            run_protected(command, &client, format, today).await?;
        }
    }

    Ok(())
}

async fn require_session(client: &GoProjectClient, tokens: &Arc<dyn TokenStore>) -> anyhow::Result<()> {
    match AuthGuard::new(Arc::clone(tokens)).check(client).await {
        AuthStatus::Authorized => Ok(()),
        AuthStatus::Unauthorized => bail!("Not logged in. Run `goproject login <username>` first."),
    }
}

async fn run_protected(
    command: Commands,
    client: &GoProjectClient,
    format: OutputFormat,
    today: NaiveDate,
) -> anyhow::Result<()> {
    match command {
        Commands::Whoami => {
            let user = client.current_user().await?;
            if format == OutputFormat::Json {
                return print_json(&user);
            }
            println!("[{}] {} <{}>", user.initials(), user.username, user.email);
            println!("Role: {}", user.profile.role);
            if !user.profile.course.is_empty() {
                println!("Course: {}", user.profile.course);
            }
            if !user.profile.bio.is_empty() {
                println!("Bio: {}", user.profile.bio);
            }
        }

        Commands::Home => {
            let view = HomePage::load(client, today).await?;
            if format == OutputFormat::Json {
                return print_json(&view);
            }
            println!("Personal projects:      {}", view.stats.personal_projects);
            println!("Collaborative projects: {}", view.stats.collaborative_projects);
            println!("Total expenses:         {}", view.stats.total_expenses);
            println!();
            println!("Upcoming deadlines:");
            if view.stats.upcoming_deadlines.is_empty() {
                println!("  none this week");
            }
            for deadline in &view.stats.upcoming_deadlines {
                println!("  {}", describe_deadline(deadline));
            }
            println!();
            println!("Recent activity:");
            if view.activity.is_empty() {
                println!("  nothing yet");
            }
            for log in view.activity.iter().take(10) {
                println!(
                    "  {} {}: {}",
                    log.timestamp.with_timezone(&Local).format("%b %d %H:%M"),
                    log.user_name,
                    log.action
                );
            }
        }

        Commands::Projects { command } => run_projects(command, client, format).await?,

        Commands::Project { id, command } => {
            run_board(id, command.unwrap_or(TaskCommands::Show), client, format).await?
        }

        Commands::Expenses { command } => run_expenses(command, client, format, today).await?,

        Commands::Analytics => {
            let view = AnalyticsPage::load(client, today).await?;
            if format == OutputFormat::Json {
                return print_json(&view);
            }
            println!("Total spent:     {}", view.quick.total_spent);
            println!("Completed tasks: {}", view.quick.completed_tasks);
            println!("Pending tasks:   {}", view.quick.pending_tasks);
            println!();
            println!("{:<16} {:>12}", "Category", "Total");
            println!("{}", "-".repeat(29));
            for entry in &view.breakdown {
                println!("{:<16} {:>12}", entry.category, entry.total.to_string());
            }
            println!();
            println!("Tasks completed, last 7 days:");
            for day in &view.weekly {
                println!("  {}  {:<3} {}", day.label, day.completed, "#".repeat(day.completed));
            }
        }

        Commands::Profile {
            username,
            email,
            role,
            course,
            bio,
            picture,
        } => {
            let mut page = ProfilePage::new();
            page.load(client).await?;
            let Some(user) = &page.user else {
                bail!("Profile not available");
            };
            let mut form = ProfileForm::from_user(user);
            if let Some(username) = username {
                form.username = username;
            }
            if let Some(email) = email {
                form.email = email;
            }
            if role.is_some() {
                form.role = role;
            }
            if let Some(course) = course {
                form.course = course;
            }
            if let Some(bio) = bio {
                form.bio = bio;
            }
            let picture = match picture {
                Some(path) => Some(read_upload(&path).await?),
                None => None,
            };
            page.save(client, &form, picture).await;
            report(page.notice.as_ref())?;
        }

        Commands::Password {
            current,
            new,
            confirm,
        } => {
            let form = ChangePasswordForm {
                current_password: current,
                new_password: new,
                confirm_new_password: confirm,
            };
            let mut page = ProfilePage::new();
            if !page.change_password(client, &form).await {
                if let Some(error) = page.password_error {
                    bail!(error);
                }
            }
            report(page.notice.as_ref())?;
        }

        Commands::Register { .. } | Commands::Login { .. } | Commands::Logout | Commands::Config { .. } => {
            bail!("command does not need a session")
        }
    }

    Ok(())
}

async fn run_projects(
    command: ProjectCommands,
    client: &GoProjectClient,
    format: OutputFormat,
) -> anyhow::Result<()> {
    match command {
        ProjectCommands::List { project_type } => {
            let projects = client.list_projects(project_type).await?;
            if format == OutputFormat::Json {
                return print_json(&projects);
            }
            if projects.is_empty() {
                println!("No projects yet.");
                println!();
                println!("Create your first project with:");
                println!("  goproject projects add \"My project\"");
                return Ok(());
            }
            println!(
                "{:<6} {:<30} {:<14} {:<12} {:<8} {:>8} {:<12}",
                "ID", "Title", "Type", "Status", "Priority", "Progress", "Due"
            );
            println!("{}", "-".repeat(96));
            for project in projects {
                println!(
                    "{:<6} {:<30} {:<14} {:<12} {:<8} {:>7}% {:<12}",
                    project.id,
                    truncate(&project.title, 30),
                    project.project_type,
                    project.status,
                    project.priority,
                    project.progress,
                    project
                        .end_date
                        .map(|d| d.to_string())
                        .unwrap_or_else(|| "-".to_string())
                );
            }
        }

        ProjectCommands::Add {
            title,
            project_type,
            description,
            priority,
            status,
            end_date,
            member,
        } => {
            let mut page = WorkspacePage::new(project_type);
            page.open_new();
            let form = goproject::forms::ProjectForm {
                title,
                description,
                project_type: Some(project_type),
                status,
                priority,
                end_date: end_date.unwrap_or_default(),
                members: member,
            };
            submit_project(&mut page, client, form).await?;
        }

        ProjectCommands::Edit {
            id,
            title,
            description,
            priority,
            status,
            end_date,
        } => {
            let project = client.get_project(id).await?;
            let mut page = WorkspacePage::new(project.project_type);
            page.load(client).await?;
            if !page.open_edit(id) {
                bail!("Project {} not found", id);
            }
            let Some(dialog) = &page.dialog else {
                bail!("Project {} not found", id);
            };
            let mut form = dialog.form.clone();
            if let Some(title) = title {
                form.title = title;
            }
            if let Some(description) = description {
                form.description = description;
            }
            if priority.is_some() {
                form.priority = priority;
            }
            if status.is_some() {
                form.status = status;
            }
            if let Some(end_date) = end_date {
                form.end_date = end_date;
            }
            submit_project(&mut page, client, form).await?;
        }

        ProjectCommands::Delete { id } => {
            let project = client.get_project(id).await?;
            let mut page = WorkspacePage::new(project.project_type);
            page.delete(client, id).await;
            report(page.notice.as_ref())?;
        }

        ProjectCommands::Members { id } => {
            let project = client.get_project(id).await?;
            let mut page = WorkspacePage::new(project.project_type);
            let members = page.view_members(client, id).await?;
            if format == OutputFormat::Json {
                return print_json(&members);
            }
            println!("Team of '{}' (owner: {})", project.title, project.owner_username);
            if members.is_empty() {
                println!("  no members");
            }
            for member in members {
                println!(
                    "  {:<6} {:<20} {:<8} {}",
                    member.user.id, member.user.username, member.role, member.user.email
                );
            }
        }
    }

    Ok(())
}

async fn submit_project(
    page: &mut WorkspacePage,
    client: &GoProjectClient,
    form: goproject::forms::ProjectForm,
) -> anyhow::Result<()> {
    if !page.submit(client, form).await {
        if let Some(error) = page.dialog.as_ref().and_then(|d| d.error.clone()) {
            bail!(error);
        }
    }
    report(page.notice.as_ref())
}

async fn run_board(
    id: i64,
    command: TaskCommands,
    client: &GoProjectClient,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let mut page = ProjectDetailPage::new(id);
    page.load(client).await?;

    match command {
        TaskCommands::Show => {
            if format == OutputFormat::Json {
                return print_json(&page.tasks);
            }
            print_board(&page);
            return Ok(());
        }

        TaskCommands::Add {
            title,
            description,
            priority,
            due,
            assign,
        } => {
            let form = TaskForm {
                title,
                description,
                priority,
                due_date: due.unwrap_or_default(),
                assigned_to: assign,
            };
            if !page.add_task(client, &form).await {
                bail!(page
                    .task_error
                    .unwrap_or_else(|| "Failed to add task".to_string()));
            }
            println!("Task added");
        }

        TaskCommands::Status { task } => {
            let current = board_task(&page, task)?.status;
            if !page.cycle_status(client, task).await {
                bail!("Task {} is {} and cannot change status", task, current);
            }
            if let Some(updated) = page.task(task) {
                println!("'{}' is now {}", updated.title, updated.status);
            }
        }

        TaskCommands::Edit {
            task,
            title,
            description,
            priority,
            due,
            assign,
        } => {
            let existing = board_task(&page, task)?;
            let form = TaskForm {
                title: title.unwrap_or_else(|| existing.title.clone()),
                description: description.unwrap_or_else(|| existing.description.clone()),
                priority: priority.or(Some(existing.priority)),
                due_date: due.unwrap_or_else(|| {
                    existing
                        .due_date
                        .map(|d| d.format("%Y-%m-%d").to_string())
                        .unwrap_or_default()
                }),
                assigned_to: assign.or(existing.assigned_to),
            };
            if !page.edit_task(client, task, &form).await {
                bail!(page
                    .task_error
                    .unwrap_or_else(|| format!("Task {} could not be updated", task)));
            }
            println!("Task updated");
        }

        TaskCommands::Delete { task } => {
            board_task(&page, task)?;
            page.delete_task(client, task).await;
            report(page.notice.as_ref())?;
        }

        TaskCommands::Upload { task, path } => {
            board_task(&page, task)?;
            let file = read_upload(&path).await?;
            page.upload(client, task, file).await;
            report(page.notice.as_ref())?;
        }
    }

    Ok(())
}

fn board_task(page: &ProjectDetailPage, id: i64) -> anyhow::Result<&Task> {
    page.task(id)
        .with_context(|| format!("Task {} is not on this board", id))
}

fn print_board(page: &ProjectDetailPage) {
    let Some(project) = &page.project else {
        return;
    };
    println!("{} [{}] {}%", project.title, project.project_type, page.progress());
    if !project.description.is_empty() {
        println!("{}", project.description);
    }
    println!();

    if page.tasks.is_empty() {
        println!("No tasks yet.");
        return;
    }
    println!(
        "{:<6} {:<30} {:<12} {:<8} {:<12} {}",
        "ID", "Title", "Status", "Priority", "Due", "Files"
    );
    println!("{}", "-".repeat(80));
    for task in &page.tasks {
        println!(
            "{:<6} {:<30} {:<12} {:<8} {:<12} {}",
            task.id,
            truncate(&task.title, 30),
            task.status,
            task.priority,
            task.due_date
                .map(|d| d.to_string())
                .unwrap_or_else(|| "-".to_string()),
            task.attachments.len()
        );
    }

    if !page.members.is_empty() {
        println!();
        let names: Vec<&str> = page.members.iter().map(|m| m.user.username.as_str()).collect();
        println!("Team: {}", names.join(", "));
    }
}

async fn run_expenses(
    command: ExpenseCommands,
    client: &GoProjectClient,
    format: OutputFormat,
    today: NaiveDate,
) -> anyhow::Result<()> {
    let mut page = ExpensesPage::new();
    page.load(client).await?;

    match command {
        ExpenseCommands::List => {
            if format == OutputFormat::Json {
                return print_json(&page.expenses);
            }
            let summary = page.summary(today);
            println!("Total:      {}", summary.total);
            println!(
                "This month: {} ({} expenses)",
                summary.this_month, summary.this_month_count
            );
            println!("Average:    {}", summary.average);
            println!();
            println!(
                "{:<6} {:<12} {:<28} {:<16} {:<20} {:>10}",
                "ID", "Date", "Description", "Category", "Project", "Amount"
            );
            println!("{}", "-".repeat(97));
            for expense in &page.expenses {
                println!(
                    "{:<6} {:<12} {:<28} {:<16} {:<20} {:>10}",
                    expense.id,
                    expense.date,
                    truncate(&expense.description, 28),
                    expense.category,
                    truncate(&project_title(&page, expense.project), 20),
                    expense.amount.to_string()
                );
            }
        }

        ExpenseCommands::Add {
            amount,
            description,
            category,
            project,
            date,
        } => {
            let form = ExpenseForm {
                description,
                amount,
                category,
                project: Some(project),
                date: date.unwrap_or_default(),
            };
            page.add(client, &form, today).await;
            report(page.notice.as_ref())?;
        }

        ExpenseCommands::Delete { id } => {
            page.delete(client, id).await;
            report(page.notice.as_ref())?;
        }

        ExpenseCommands::Export { output } => match output {
            Some(path) => {
                let file = std::fs::File::create(&path)
                    .with_context(|| format!("cannot create {:?}", path))?;
                write_expenses_csv(&page, file)?;
                println!("Exported {} expenses to {:?}", page.expenses.len(), path);
            }
            None => write_expenses_csv(&page, std::io::stdout().lock())?,
        },
    }

    Ok(())
}

#[derive(Serialize)]
struct ExpenseRow<'a> {
    id: i64,
    date: NaiveDate,
    description: &'a str,
    category: ExpenseCategory,
    project: String,
    amount: String,
}

fn write_expenses_csv(page: &ExpensesPage, out: impl std::io::Write) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    for expense in &page.expenses {
        writer.serialize(ExpenseRow {
            id: expense.id,
            date: expense.date,
            description: &expense.description,
            category: expense.category,
            project: project_title(page, expense.project),
            amount: expense.amount.to_string(),
        })?;
    }
    writer.flush()?;
    Ok(())
}

fn project_title(page: &ExpensesPage, id: i64) -> String {
    page.projects
        .iter()
        .find(|p| p.id == id)
        .map(|p| p.title.clone())
        .unwrap_or_else(|| format!("#{}", id))
}

fn describe_deadline(deadline: &Deadline) -> String {
    let when = match deadline.days_left {
        Some(0) => "due today".to_string(),
        Some(1) => "due tomorrow".to_string(),
        Some(days) => format!("due in {} days", days),
        None => "no deadline".to_string(),
    };
    let marker = if deadline.is_urgent() { "!" } else { " " };
    format!("{} {} ({})", marker, deadline.title, when)
}

async fn read_upload(path: &Path) -> anyhow::Result<Upload> {
    Upload::from_path(path)
        .await
        .with_context(|| format!("cannot read {:?}", path))
}

/// Print a page notice; error notices become the command's error
fn report(notice: Option<&Notice>) -> anyhow::Result<()> {
    match notice {
        Some(notice) if notice.is_error() => bail!(notice.message.clone()),
        Some(notice) => {
            println!("{}", notice.message);
            Ok(())
        }
        None => Ok(()),
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(width.saturating_sub(1)).collect();
        out.push('…');
        out
    }
}
