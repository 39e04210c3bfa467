//! Home Page
//!
//! Both workspaces at a glance, the activity feed and upcoming deadlines.

use leptos::*;
use leptos_router::*;

use crate::api::{self, types::{ActivityLog, Expense, Project, COLLABORATIVE, PERSONAL}};
use crate::components::{RowSkeleton, StatSkeleton};
use crate::state::global::GlobalState;
use crate::stats;

#[derive(Clone, Default)]
struct HomeData {
    personal: Vec<Project>,
    collaborative: Vec<Project>,
    activity: Vec<ActivityLog>,
    expenses: Vec<Expense>,
}

async fn load_home() -> Result<HomeData, api::ApiFailure> {
    let (personal, collaborative, activity, expenses) = futures_util::join!(
        api::list_projects(Some(PERSONAL)),
        api::list_projects(Some(COLLABORATIVE)),
        api::list_activity(),
        api::list_expenses(),
    );
    Ok(HomeData {
        personal: personal?,
        collaborative: collaborative?,
        activity: activity?,
        expenses: expenses?,
    })
}

#[component]
pub fn Home() -> impl IntoView {
    let state = use_context::<GlobalState>().expect("GlobalState not found");
    let data = create_resource(|| (), |_| load_home());

    create_effect(move |_| {
        if let Some(Err(e)) = data.get() {
            state.show_error(&e.describe("Failed to load dashboard"));
        }
    });

    view! {
        <div class="space-y-8">
            <h1 class="text-3xl font-bold">"Home"</h1>

            <Suspense fallback=move || view! {
                <div class="grid md:grid-cols-3 gap-4">
                    <StatSkeleton /><StatSkeleton /><StatSkeleton />
                </div>
                <RowSkeleton count=5 />
            }>
                {move || data.get().and_then(Result::ok).map(|home| {
                    let today = chrono::Local::now().date_naive();
                    let total: f64 = home.expenses.iter().map(Expense::amount_value).sum();
                    let all: Vec<Project> = home.personal.iter().chain(&home.collaborative).cloned().collect();
                    let upcoming = stats::upcoming_deadlines(&all, today);

                    view! {
                        <div class="grid md:grid-cols-3 gap-4">
                            <StatCard label="Personal projects" value=home.personal.len().to_string() />
                            <StatCard label="Collaborative projects" value=home.collaborative.len().to_string() />
                            <StatCard label="Total expenses" value=format!("{:.2}", total) />
                        </div>

                        <div class="grid md:grid-cols-2 gap-6">
                            <section class="bg-gray-800 rounded-xl p-6">
                                <h2 class="text-xl font-semibold mb-4">"Upcoming Deadlines"</h2>
                                {if upcoming.is_empty() {
                                    view! { <p class="text-gray-400">"Nothing due this week."</p> }.into_view()
                                } else {
                                    upcoming.into_iter().map(|(project, days)| {
                                        let class = if stats::is_urgent(days) { "text-red-400" } else { "text-gray-300" };
                                        view! {
                                            <A href=format!("/projects/{}", project.id) class="flex justify-between py-2 border-b border-gray-700">
                                                <span>{project.title}</span>
                                                <span class=class>{format!("{} days left", days)}</span>
                                            </A>
                                        }
                                    }).collect_view()
                                }}
                            </section>

                            <section class="bg-gray-800 rounded-xl p-6">
                                <h2 class="text-xl font-semibold mb-4">"Recent Activity"</h2>
                                {if home.activity.is_empty() {
                                    view! { <p class="text-gray-400">"No activity yet."</p> }.into_view()
                                } else {
                                    home.activity.into_iter().take(10).map(|log| view! {
                                        <div class="py-2 border-b border-gray-700 text-sm">
                                            <span class="font-medium">{log.user_name}</span>
                                            " " {log.action}
                                            <span class="block text-gray-500">
                                                {log.timestamp.with_timezone(&chrono::Local).format("%b %d, %H:%M").to_string()}
                                            </span>
                                        </div>
                                    }).collect_view()
                                }}
                            </section>
                        </div>
                    }
                })}
            </Suspense>
        </div>
    }
}

#[component]
pub(crate) fn StatCard(label: &'static str, value: String) -> impl IntoView {
    view! {
        <div class="bg-gray-800 rounded-xl p-5">
            <p class="text-gray-400 text-sm">{label}</p>
            <p class="text-2xl font-bold mt-1">{value}</p>
        </div>
    }
}
