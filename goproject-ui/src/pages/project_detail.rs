//! Project Detail Page
//!
//! Task board of one project: progress, status cycling, attachments and the
//! add-task form. Status edits apply locally first; a failed PATCH reloads
//! the board from the server.

use chrono::NaiveDate;
use leptos::*;
use leptos_router::*;

use crate::api::{
    self,
    types::{next_status, Project, Task, TaskBody, TaskPatch, TeamMember, COLLABORATIVE, PRIORITIES},
};
use crate::components::{Loading, TaskSkeleton};
use crate::state::global::GlobalState;
use crate::stats;

/// Check the add-task form and build the request body
pub fn validate_task(
    project: i64,
    title: &str,
    description: &str,
    priority: &str,
    due_date: &str,
) -> Result<TaskBody, String> {
    let title = title.trim();
    if title.is_empty() {
        return Err("Task title cannot be empty.".to_string());
    }
    let due_date = match due_date.trim() {
        "" => None,
        raw => Some(
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .map_err(|_| format!("Invalid date '{}', expected YYYY-MM-DD.", raw))?,
        ),
    };
    Ok(TaskBody {
        title: title.to_string(),
        description: description.trim().to_string(),
        project,
        status: "Pending".to_string(),
        priority: priority.to_string(),
        due_date,
        assigned_to: None,
    })
}

#[derive(Clone, Copy)]
struct Board {
    project_id: i64,
    project: RwSignal<Option<Project>>,
    tasks: RwSignal<Vec<Task>>,
    members: RwSignal<Vec<TeamMember>>,
}

impl Board {
    fn reload(self, state: GlobalState) {
        spawn_local(async move {
            let (project, tasks) = futures_util::join!(
                api::get_project(self.project_id),
                api::list_tasks(Some(self.project_id)),
            );
            match (project, tasks) {
                (Ok(project), Ok(tasks)) => {
                    let collaborative = project.project_type == COLLABORATIVE;
                    self.project.set(Some(project));
                    self.tasks.set(tasks);
                    if collaborative {
                        if let Ok(members) = api::list_team_members(self.project_id).await {
                            self.members.set(members);
                        }
                    }
                }
                (Err(e), _) | (_, Err(e)) => state.show_error(&e.describe("Failed to load project")),
            }
        });
    }

    /// Optimistic PATCH; Done tasks are locked
    fn update(self, state: GlobalState, id: i64, patch: TaskPatch) {
        let locked = self
            .tasks
            .with_untracked(|tasks| tasks.iter().find(|t| t.id == id).map(Task::is_done));
        if locked != Some(false) {
            return;
        }
        if let Some(status) = &patch.status {
            let status = status.clone();
            self.tasks.update(|tasks| {
                if let Some(task) = tasks.iter_mut().find(|t| t.id == id) {
                    task.status = status;
                }
            });
        }
        spawn_local(async move {
            match api::update_task(id, &patch).await {
                Ok(saved) => self.tasks.update(|tasks| {
                    if let Some(slot) = tasks.iter_mut().find(|t| t.id == id) {
                        *slot = saved;
                    }
                }),
                Err(e) => {
                    web_sys::console::warn_1(&format!("Failed to update task {}: {:?}", id, e).into());
                    self.reload(state);
                }
            }
        });
    }
}

#[component]
pub fn ProjectDetail() -> impl IntoView {
    let state = use_context::<GlobalState>().expect("GlobalState not found");
    let params = use_params_map();
    let project_id = params.with_untracked(|p| p.get("id").and_then(|id| id.parse::<i64>().ok()));

    let Some(project_id) = project_id else {
        return view! { <p class="text-gray-400">"Unknown project."</p> }.into_view();
    };

    let board = Board {
        project_id,
        project: create_rw_signal(None),
        tasks: create_rw_signal(Vec::new()),
        members: create_rw_signal(Vec::new()),
    };
    board.reload(state.clone());

    view! {
        <div class="space-y-8">
            {move || match board.project.get() {
                None => view! { <Loading label="Loading project..." /> }.into_view(),
                Some(project) => view! {
                    <div>
                        <A href="/home" class="text-sm text-gray-400">"← Back"</A>
                        <h1 class="text-3xl font-bold mt-2">{project.title}</h1>
                        <p class="text-gray-400 mt-1">{project.description}</p>
                    </div>
                }.into_view(),
            }}

            <div>
                <div class="flex justify-between text-sm text-gray-400 mb-1">
                    <span>"Progress"</span>
                    <span>{move || format!("{}%", board.tasks.with(|t| stats::completion_percentage(t)))}</span>
                </div>
                <div class="h-3 bg-gray-700 rounded-full">
                    <div
                        class="h-3 bg-primary-500 rounded-full"
                        style=move || format!("width: {}%", board.tasks.with(|t| stats::completion_percentage(t)))
                    />
                </div>
            </div>

            <AddTaskForm board=board />

            <section class="space-y-3">
                {
                    let state = state.clone();
                    move || {
                        if board.project.with(Option::is_none) {
                            return view! { <TaskSkeleton /> }.into_view();
                        }
                        let state = state.clone();
                        board.tasks.get().into_iter().map(|task| {
                            view! { <TaskRow task=task board=board state=state.clone() /> }
                        }).collect_view().into_view()
                    }
                }
            </section>

            {move || {
                let members = board.members.get();
                (!members.is_empty()).then(|| view! {
                    <section class="bg-gray-800 rounded-xl p-6">
                        <h2 class="text-lg font-semibold mb-3">"Team"</h2>
                        {members.into_iter().map(|m| view! {
                            <div class="flex justify-between text-sm py-1">
                                <span>{m.user.username}</span>
                                <span class="text-gray-400">{m.role}</span>
                            </div>
                        }).collect_view()}
                    </section>
                })
            }}
        </div>
    }
    .into_view()
}

#[component]
fn TaskRow(task: Task, board: Board, state: GlobalState) -> impl IntoView {
    let id = task.id;
    let done = task.is_done();
    let next = next_status(&task.status);

    let state_for_status = state.clone();
    let advance = move |_| {
        if let Some(next) = next {
            board.update(
                state_for_status.clone(),
                id,
                TaskPatch {
                    status: Some(next.to_string()),
                    ..TaskPatch::default()
                },
            );
        }
    };

    let state_for_upload = state.clone();
    let upload = move |ev: leptos::ev::Event| {
        let input = event_target::<web_sys::HtmlInputElement>(&ev);
        let Some(file) = input.files().and_then(|files| files.get(0)) else {
            return;
        };
        let Ok(form) = web_sys::FormData::new() else {
            return;
        };
        let _ = form.append_with_blob_and_filename("file", &file, &file.name());
        let _ = form.append_with_str("task", &id.to_string());

        let state = state_for_upload.clone();
        spawn_local(async move {
            match api::upload_attachment(form).await {
                Ok(attachment) => {
                    board.tasks.update(|tasks| {
                        if let Some(task) = tasks.iter_mut().find(|t| t.id == id) {
                            task.attachments.push(attachment);
                        }
                    });
                    board.update(
                        state.clone(),
                        id,
                        TaskPatch {
                            status: Some("Done".to_string()),
                            ..TaskPatch::default()
                        },
                    );
                    state.show_success("File successfully uploaded: Task Done");
                }
                Err(e) => state.show_error(&e.describe("Failed to upload file")),
            }
        });
    };

    let state_for_delete = state;
    let delete = move |_| {
        let state = state_for_delete.clone();
        spawn_local(async move {
            match api::delete_task(id).await {
                Ok(()) => {
                    board.tasks.update(|tasks| tasks.retain(|t| t.id != id));
                    state.show_success("Task deleted");
                }
                Err(e) => state.show_error(&e.describe("Failed to delete task")),
            }
        });
    };

    let status_color = match task.status.as_str() {
        "Done" => "bg-green-600",
        "In Progress" => "bg-blue-600",
        "Missed" => "bg-red-600",
        _ => "bg-gray-600",
    };

    view! {
        <div class="bg-gray-800 rounded-xl p-4 border border-gray-700">
            <div class="flex items-start justify-between">
                <div>
                    <h3 class="font-semibold">{task.title.clone()}</h3>
                    <p class="text-gray-400 text-sm">{task.description.clone()}</p>
                    <p class="text-gray-500 text-xs mt-1">
                        {task.priority.clone()} " · "
                        {task.due_date.map(|d| format!("Due {}", d)).unwrap_or_else(|| "No due date".to_string())}
                    </p>
                </div>
                <button
                    on:click=advance
                    disabled=done
                    class=format!("{} text-xs px-3 py-1 rounded-full text-white", status_color)
                >
                    {task.status.clone()}
                </button>
            </div>

            <div class="flex items-center justify-between mt-3 text-sm">
                <div class="space-x-2">
                    {task.attachments.iter().map(|a| view! {
                        <a href=a.file.clone() target="_blank" class="text-primary-400 underline">
                            {a.file_name().to_string()}
                        </a>
                    }).collect_view()}
                </div>
                <div class="flex items-center space-x-3">
                    {(!done).then(|| view! {
                        <label class="cursor-pointer text-gray-300 hover:text-white">
                            "Upload"
                            <input type="file" class="hidden" on:change=upload />
                        </label>
                        <button on:click=delete class="text-red-400 hover:text-red-300">"Delete"</button>
                    })}
                </div>
            </div>
        </div>
    }
}

#[component]
fn AddTaskForm(board: Board) -> impl IntoView {
    let state = use_context::<GlobalState>().expect("GlobalState not found");

    let (title, set_title) = create_signal(String::new());
    let (description, set_description) = create_signal(String::new());
    let (priority, set_priority) = create_signal("Medium".to_string());
    let (due, set_due) = create_signal(String::new());
    let (error, set_error) = create_signal(None::<String>);

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        let body = match validate_task(board.project_id, &title.get(), &description.get(), &priority.get(), &due.get()) {
            Ok(body) => body,
            Err(message) => {
                set_error.set(Some(message));
                return;
            }
        };
        set_error.set(None);

        let state = state.clone();
        spawn_local(async move {
            match api::create_task(&body).await {
                Ok(_) => {
                    set_title.set(String::new());
                    set_description.set(String::new());
                    set_due.set(String::new());
                    board.reload(state);
                }
                Err(e) => set_error.set(Some(
                    e.field_messages()
                        .unwrap_or_else(|| e.describe("Failed to add task")),
                )),
            }
        });
    };

    view! {
        <form on:submit=on_submit class="bg-gray-800 rounded-xl p-4 space-y-3">
            <h2 class="font-semibold">"Add Task"</h2>
            {move || error.get().map(|e| view! { <p class="text-red-400 text-sm">{e}</p> })}
            <div class="grid md:grid-cols-4 gap-3">
                <input type="text" placeholder="Title" class="bg-gray-700 rounded-lg px-3 py-2 md:col-span-2"
                    prop:value=title on:input=move |ev| set_title.set(event_target_value(&ev)) />
                <select class="bg-gray-700 rounded-lg px-3 py-2"
                    on:change=move |ev| set_priority.set(event_target_value(&ev))>
                    {PRIORITIES.iter().map(|p| view! {
                        <option value=*p selected=move || priority.get() == *p>{*p}</option>
                    }).collect_view()}
                </select>
                <input type="date" class="bg-gray-700 rounded-lg px-3 py-2"
                    prop:value=due on:input=move |ev| set_due.set(event_target_value(&ev)) />
            </div>
            <textarea placeholder="Description" class="w-full bg-gray-700 rounded-lg px-3 py-2"
                prop:value=description on:input=move |ev| set_description.set(event_target_value(&ev)) />
            <button type="submit" class="px-4 py-2 rounded-lg bg-primary-600 hover:bg-primary-700 font-medium">
                "Add"
            </button>
        </form>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_task_title() {
        assert_eq!(
            validate_task(1, "  ", "", "Medium", "").unwrap_err(),
            "Task title cannot be empty."
        );
    }

    #[test]
    fn test_new_tasks_start_pending() {
        let body = validate_task(7, " Outline ", "", "High", "2024-03-12").unwrap();
        assert_eq!(body.title, "Outline");
        assert_eq!(body.project, 7);
        assert_eq!(body.status, "Pending");
        assert_eq!(body.due_date, NaiveDate::from_ymd_opt(2024, 3, 12));
    }
}
