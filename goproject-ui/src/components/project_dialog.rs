//! New / edit project dialog

use chrono::NaiveDate;
use leptos::*;

use crate::api::{
    self,
    types::{Project, ProjectBody, User, COLLABORATIVE, PRIORITIES, PROJECT_STATUSES},
};
use crate::state::global::GlobalState;

/// Check the dialog fields and build the request body
pub fn validate_project(
    title: &str,
    description: &str,
    project_type: &str,
    status: &str,
    priority: &str,
    end_date: &str,
    members: Vec<i64>,
) -> Result<ProjectBody, String> {
    let title = title.trim();
    if title.is_empty() {
        return Err("Project title is required".to_string());
    }
    if title.chars().count() > 100 {
        return Err("Title must be at most 100 characters".to_string());
    }
    if description.chars().count() > 500 {
        return Err("Description must be at most 500 characters".to_string());
    }
    let end_date = match end_date.trim() {
        "" => None,
        raw => Some(
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .map_err(|_| format!("Invalid date '{}', expected YYYY-MM-DD.", raw))?,
        ),
    };
    Ok(ProjectBody {
        title: title.to_string(),
        description: description.trim().to_string(),
        project_type: project_type.to_string(),
        status: status.to_string(),
        priority: priority.to_string(),
        end_date,
        members: if project_type == COLLABORATIVE { members } else { Vec::new() },
    })
}

/// Modal used by both workspaces
#[component]
pub fn ProjectDialog(
    project_type: &'static str,
    editing: Option<Project>,
    on_close: impl Fn() + 'static + Clone,
    on_saved: impl Fn() + 'static + Clone,
) -> impl IntoView {
    let state = use_context::<GlobalState>().expect("GlobalState not found");

    let editing_id = editing.as_ref().map(|p| p.id);
    let initial = editing.clone();
    let (title, set_title) = create_signal(initial.as_ref().map(|p| p.title.clone()).unwrap_or_default());
    let (description, set_description) =
        create_signal(initial.as_ref().map(|p| p.description.clone()).unwrap_or_default());
    let (status, set_status) = create_signal(
        initial.as_ref().map(|p| p.status.clone()).unwrap_or_else(|| "In Progress".to_string()),
    );
    let (priority, set_priority) = create_signal(
        initial.as_ref().map(|p| p.priority.clone()).unwrap_or_else(|| "Medium".to_string()),
    );
    let (end_date, set_end_date) = create_signal(
        initial
            .as_ref()
            .and_then(|p| p.end_date)
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default(),
    );
    let members = create_rw_signal(initial.map(|p| p.members).unwrap_or_default());
    let (error, set_error) = create_signal(None::<String>);
    let (submitting, set_submitting) = create_signal(false);

    // Collaborators to pick from
    let users = create_rw_signal(Vec::<User>::new());
    if project_type == COLLABORATIVE {
        spawn_local(async move {
            if let Ok(list) = api::list_users().await {
                users.set(list);
            }
        });
    }

    let on_close_for_cancel = on_close.clone();
    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();

        let body = match validate_project(
            &title.get(),
            &description.get(),
            project_type,
            &status.get(),
            &priority.get(),
            &end_date.get(),
            members.get(),
        ) {
            Ok(body) => body,
            Err(message) => {
                set_error.set(Some(message));
                return;
            }
        };
        set_error.set(None);
        set_submitting.set(true);

        let state = state.clone();
        let on_close = on_close.clone();
        let on_saved = on_saved.clone();
        spawn_local(async move {
            let result = match editing_id {
                Some(id) => api::update_project(id, &body)
                    .await
                    .map(|_| "Project updated successfully!"),
                None => api::create_project(&body)
                    .await
                    .map(|_| "New project successfully added!"),
            };
            set_submitting.set(false);
            match result {
                Ok(message) => {
                    state.show_success(message);
                    on_saved();
                    on_close();
                }
                Err(e) => state.show_error(&e.describe("Failed to save project")),
            }
        });
    };

    view! {
        <div class="fixed inset-0 bg-black/60 flex items-center justify-center z-40">
            <form on:submit=on_submit class="bg-gray-800 rounded-xl p-6 w-full max-w-lg space-y-4">
                <h2 class="text-xl font-semibold">
                    {if editing_id.is_some() { "Edit Project" } else { "New Project" }}
                </h2>

                {move || error.get().map(|e| view! {
                    <p class="text-red-400 text-sm">{e}</p>
                })}

                <input
                    type="text"
                    placeholder="Title"
                    class="w-full bg-gray-700 rounded-lg px-3 py-2"
                    prop:value=title
                    on:input=move |ev| set_title.set(event_target_value(&ev))
                />
                <textarea
                    placeholder="Description"
                    class="w-full bg-gray-700 rounded-lg px-3 py-2"
                    prop:value=description
                    on:input=move |ev| set_description.set(event_target_value(&ev))
                />

                <div class="grid grid-cols-3 gap-3">
                    <select
                        class="bg-gray-700 rounded-lg px-3 py-2"
                        on:change=move |ev| set_status.set(event_target_value(&ev))
                    >
                        {PROJECT_STATUSES.iter().map(|s| view! {
                            <option value=*s selected=move || status.get() == *s>{*s}</option>
                        }).collect_view()}
                    </select>
                    <select
                        class="bg-gray-700 rounded-lg px-3 py-2"
                        on:change=move |ev| set_priority.set(event_target_value(&ev))
                    >
                        {PRIORITIES.iter().map(|p| view! {
                            <option value=*p selected=move || priority.get() == *p>{*p}</option>
                        }).collect_view()}
                    </select>
                    <input
                        type="date"
                        class="bg-gray-700 rounded-lg px-3 py-2"
                        prop:value=end_date
                        on:input=move |ev| set_end_date.set(event_target_value(&ev))
                    />
                </div>

                {move || (project_type == COLLABORATIVE).then(|| view! {
                    <div class="space-y-1 max-h-40 overflow-y-auto">
                        <p class="text-sm text-gray-400">"Team members"</p>
                        {users.get().into_iter().map(|user| {
                            let id = user.id;
                            view! {
                                <label class="flex items-center space-x-2 text-sm">
                                    <input
                                        type="checkbox"
                                        prop:checked=move || members.get().contains(&id)
                                        on:change=move |_| members.update(|m| {
                                            if let Some(pos) = m.iter().position(|x| *x == id) {
                                                m.remove(pos);
                                            } else {
                                                m.push(id);
                                            }
                                        })
                                    />
                                    <span>{user.username}</span>
                                </label>
                            }
                        }).collect_view()}
                    </div>
                })}

                <div class="flex justify-end space-x-3">
                    <button
                        type="button"
                        on:click=move |_| on_close_for_cancel()
                        class="px-4 py-2 rounded-lg bg-gray-700 hover:bg-gray-600"
                    >
                        "Cancel"
                    </button>
                    <button
                        type="submit"
                        disabled=submitting
                        class="px-4 py-2 rounded-lg bg-primary-600 hover:bg-primary-700 font-medium"
                    >
                        {move || if submitting.get() { "Saving..." } else { "Save" }}
                    </button>
                </div>
            </form>
        </div>
    }
}
