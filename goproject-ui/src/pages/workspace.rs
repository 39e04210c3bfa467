//! Workspace Pages
//!
//! Personal and collaborative project lists with the project dialog.

use leptos::*;
use leptos_router::*;

use crate::api::{self, types::{Project, TeamMember, COLLABORATIVE, PERSONAL}};
use crate::components::{ProjectDialog, RowSkeleton};
use crate::state::global::GlobalState;

#[component]
pub fn PersonalWorkspace() -> impl IntoView {
    view! { <Workspace project_type=PERSONAL /> }
}

#[component]
pub fn CollaborativeWorkspace() -> impl IntoView {
    view! { <Workspace project_type=COLLABORATIVE /> }
}

/// What the dialog is open for
#[derive(Clone, PartialEq)]
enum Dialog {
    Closed,
    New,
    Edit(Project),
}

#[component]
fn Workspace(project_type: &'static str) -> impl IntoView {
    let state = use_context::<GlobalState>().expect("GlobalState not found");

    let projects = create_rw_signal(Vec::<Project>::new());
    let (loaded, set_loaded) = create_signal(false);
    let (dialog, set_dialog) = create_signal(Dialog::Closed);
    let members = create_rw_signal(None::<(i64, Vec<TeamMember>)>);

    let state_for_load = state.clone();
    let reload = move || {
        let state = state_for_load.clone();
        spawn_local(async move {
            match api::list_projects(Some(project_type)).await {
                Ok(list) => projects.set(list),
                Err(e) => state.show_error(&e.describe("Failed to load projects")),
            }
            set_loaded.set(true);
        });
    };
    reload();

    let state_for_delete = state.clone();
    let delete = move |id: i64| {
        let state = state_for_delete.clone();
        spawn_local(async move {
            match api::delete_project(id).await {
                Ok(()) => {
                    projects.update(|list| list.retain(|p| p.id != id));
                    state.show_success("Deleted a project");
                }
                Err(e) => state.show_error(&e.describe("Failed to delete project")),
            }
        });
    };

    let state_for_members = state;
    let view_members = move |id: i64| {
        let state = state_for_members.clone();
        spawn_local(async move {
            match api::list_team_members(id).await {
                Ok(list) => members.set(Some((id, list))),
                Err(e) => state.show_error(&e.describe("Failed to load team members")),
            }
        });
    };

    let title = if project_type == PERSONAL { "Personal Workspace" } else { "Collaborative Workspace" };

    view! {
        <div class="space-y-8">
            <div class="flex items-center justify-between">
                <h1 class="text-3xl font-bold">{title}</h1>
                <button
                    on:click=move |_| set_dialog.set(Dialog::New)
                    class="px-4 py-2 bg-primary-600 hover:bg-primary-700 rounded-lg font-medium transition-colors"
                >
                    "+ New Project"
                </button>
            </div>

            {move || {
                let editing = match dialog.get() {
                    Dialog::Closed => return view! {}.into_view(),
                    Dialog::New => None,
                    Dialog::Edit(project) => Some(project),
                };
                view! {
                    <ProjectDialog
                        project_type=project_type
                        editing=editing
                        on_close=move || set_dialog.set(Dialog::Closed)
                        on_saved=reload.clone()
                    />
                }.into_view()
            }}

            {move || members.get().map(|(id, list)| view! {
                <section class="bg-gray-800 rounded-xl p-6">
                    <div class="flex justify-between mb-3">
                        <h2 class="text-lg font-semibold">{format!("Team of project #{}", id)}</h2>
                        <button on:click=move |_| members.set(None) class="text-gray-400">"✕"</button>
                    </div>
                    {list.into_iter().map(|m| view! {
                        <div class="flex justify-between text-sm py-1">
                            <span>{m.user.username}</span>
                            <span class="text-gray-400">{m.role}</span>
                        </div>
                    }).collect_view()}
                </section>
            })}

            {move || {
                if !loaded.get() {
                    return view! { <RowSkeleton count=4 /> }.into_view();
                }
                let list = projects.get();
                if list.is_empty() {
                    return view! {
                        <div class="text-center py-12">
                            <p class="text-gray-400">"No projects yet. Create your first one!"</p>
                        </div>
                    }.into_view();
                }
                view! {
                    <div class="grid md:grid-cols-2 lg:grid-cols-3 gap-4">
                        {list.into_iter().map(|project| {
                            let id = project.id;
                            let for_edit = project.clone();
                            let delete = delete.clone();
                            let view_members = view_members.clone();
                            view! {
                                <ProjectCard project=project>
                                    <button
                                        on:click=move |_| set_dialog.set(Dialog::Edit(for_edit.clone()))
                                        class="text-sm text-gray-300 hover:text-white"
                                    >"Edit"</button>
                                    {(project_type == COLLABORATIVE).then(|| view! {
                                        <button
                                            on:click=move |_| view_members(id)
                                            class="text-sm text-gray-300 hover:text-white"
                                        >"Members"</button>
                                    })}
                                    <button
                                        on:click=move |_| delete(id)
                                        class="text-sm text-red-400 hover:text-red-300"
                                    >"Delete"</button>
                                </ProjectCard>
                            }
                        }).collect_view()}
                    </div>
                }.into_view()
            }}
        </div>
    }
}

#[component]
fn ProjectCard(project: Project, children: Children) -> impl IntoView {
    let priority_color = match project.priority.as_str() {
        "High" => "bg-red-500",
        "Medium" => "bg-yellow-500",
        _ => "bg-green-500",
    };

    view! {
        <div class="bg-gray-800 rounded-xl p-4 border border-gray-700 hover:border-gray-600 transition-colors">
            <div class="flex items-start justify-between">
                <A href=format!("/projects/{}", project.id) class="font-semibold hover:underline">
                    {project.title.clone()}
                </A>
                <span class=format!("{} text-xs px-2 py-0.5 rounded-full text-white", priority_color)>
                    {project.priority.clone()}
                </span>
            </div>
            <p class="text-gray-400 text-sm mt-1">{project.description.clone()}</p>

            <div class="mt-4">
                <div class="flex justify-between text-xs text-gray-400 mb-1">
                    <span>{project.status.clone()}</span>
                    <span>{format!("{}%", project.progress)}</span>
                </div>
                <div class="h-2 bg-gray-700 rounded-full">
                    <div class="h-2 bg-primary-500 rounded-full" style=format!("width: {}%", project.progress) />
                </div>
            </div>

            <div class="flex items-center justify-between mt-4 text-sm text-gray-400">
                <span>
                    {project.end_date.map(|d| format!("Due {}", d)).unwrap_or_else(|| "No deadline".to_string())}
                </span>
                <div class="flex space-x-3">{children()}</div>
            </div>
        </div>
    }
}
