//! Analytics Page
//!
//! Spending by category, tasks completed over the last week and task counts.

use leptos::*;

use crate::api::{self, types::{ActivityLog, Expense, Task}};
use crate::components::StatSkeleton;
use crate::pages::home::StatCard;
use crate::state::global::GlobalState;
use crate::stats;

#[derive(Clone, Default)]
struct AnalyticsData {
    expenses: Vec<Expense>,
    tasks: Vec<Task>,
    activity: Vec<ActivityLog>,
}

async fn load_analytics() -> Result<AnalyticsData, api::ApiFailure> {
    let (expenses, tasks, activity) = futures_util::join!(
        api::list_expenses(),
        api::list_tasks(None),
        api::list_activity(),
    );
    Ok(AnalyticsData {
        expenses: expenses?,
        tasks: tasks?,
        activity: activity?,
    })
}

/// Bar width as a share of the largest value
fn bar_width(value: f64, max: f64) -> f64 {
    if max <= 0.0 {
        0.0
    } else {
        (value / max * 100.0).clamp(0.0, 100.0)
    }
}

#[component]
pub fn Analytics() -> impl IntoView {
    let state = use_context::<GlobalState>().expect("GlobalState not found");
    let data = create_resource(|| (), |_| load_analytics());

    create_effect(move |_| {
        if let Some(Err(e)) = data.get() {
            state.show_error(&e.describe("Failed to load analytics"));
        }
    });

    view! {
        <div class="space-y-8">
            <h1 class="text-3xl font-bold">"Analytics"</h1>

            <Suspense fallback=move || view! {
                <div class="grid md:grid-cols-3 gap-4">
                    <StatSkeleton /><StatSkeleton /><StatSkeleton />
                </div>
            }>
                {move || data.get().and_then(Result::ok).map(|data| {
                    let breakdown = stats::expense_breakdown(&data.expenses);
                    let max_category = breakdown.iter().map(|(_, v)| *v).fold(0.0, f64::max);
                    let weekly = stats::weekly_completions(&data.activity, chrono::Utc::now().date_naive());
                    let max_day = weekly.iter().map(|(_, c)| *c).max().unwrap_or(0) as f64;
                    let completed = data.tasks.iter().filter(|t| t.is_done()).count();
                    let pending = data.tasks.len() - completed;

                    view! {
                        <div class="grid md:grid-cols-3 gap-4">
                            <StatCard label="Total tasks" value=data.tasks.len().to_string() />
                            <StatCard label="Completed" value=completed.to_string() />
                            <StatCard label="Pending" value=pending.to_string() />
                        </div>

                        <div class="grid md:grid-cols-2 gap-6">
                            <section class="bg-gray-800 rounded-xl p-6">
                                <h2 class="text-xl font-semibold mb-4">"Expenses by Category"</h2>
                                {if breakdown.is_empty() {
                                    view! { <p class="text-gray-400">"No expenses recorded yet."</p> }.into_view()
                                } else {
                                    breakdown.into_iter().map(|(category, total)| view! {
                                        <div class="mb-3">
                                            <div class="flex justify-between text-sm mb-1">
                                                <span>{category}</span>
                                                <span class="text-gray-400">{format!("{:.2}", total)}</span>
                                            </div>
                                            <div class="h-2 bg-gray-700 rounded-full">
                                                <div
                                                    class="h-2 bg-primary-500 rounded-full"
                                                    style=format!("width: {:.1}%", bar_width(total, max_category))
                                                />
                                            </div>
                                        </div>
                                    }).collect_view()
                                }}
                            </section>

                            <section class="bg-gray-800 rounded-xl p-6">
                                <h2 class="text-xl font-semibold mb-4">"Tasks Completed This Week"</h2>
                                <div class="flex items-end justify-between h-40 space-x-2">
                                    {weekly.into_iter().map(|(label, count)| view! {
                                        <div class="flex flex-col items-center flex-1 h-full justify-end">
                                            <span class="text-xs text-gray-400 mb-1">{count}</span>
                                            <div
                                                class="w-full bg-green-500 rounded-t"
                                                style=format!("height: {:.1}%", bar_width(count as f64, max_day))
                                            />
                                            <span class="text-xs text-gray-500 mt-1">{label}</span>
                                        </div>
                                    }).collect_view()}
                                </div>
                            </section>
                        </div>
                    }
                })}
            </Suspense>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bar_width() {
        assert_eq!(bar_width(5.0, 10.0), 50.0);
        assert_eq!(bar_width(3.0, 0.0), 0.0);
        assert_eq!(bar_width(12.0, 10.0), 100.0);
    }
}
