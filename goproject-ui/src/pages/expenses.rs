//! Expense Tracker Page

use chrono::{NaiveDate, Utc};
use leptos::*;

use crate::api::{
    self,
    types::{Expense, ExpenseBody, Project, EXPENSE_CATEGORIES},
};
use crate::components::RowSkeleton;
use crate::pages::home::StatCard;
use crate::state::global::GlobalState;
use crate::stats;

const MAX_AMOUNT: f64 = 99_999_999.99;

/// Check the add-expense form and build the request body; an empty date
/// means `today`
pub fn validate_expense(
    amount: &str,
    description: &str,
    category: &str,
    project: Option<i64>,
    date: &str,
    today: NaiveDate,
) -> Result<ExpenseBody, String> {
    let amount = amount.trim();
    let description = description.trim();
    if amount.is_empty() || description.is_empty() {
        return Err("Please fill in all required fields.".to_string());
    }
    let invalid = || "Amount must be a number with at most two decimal places.".to_string();
    let value: f64 = amount.parse().map_err(|_| invalid())?;
    if !value.is_finite() || amount.split_once('.').is_some_and(|(_, cents)| cents.len() > 2) {
        return Err(invalid());
    }
    if value < 0.0 {
        return Err("Amount cannot be negative.".to_string());
    }
    if value > MAX_AMOUNT {
        return Err("Amount must be at most 99999999.99.".to_string());
    }
    let project = project.ok_or_else(|| "Please select a project.".to_string())?;
    let date = match date.trim() {
        "" => today,
        raw => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map_err(|_| format!("Invalid date '{}', expected YYYY-MM-DD.", raw))?,
    };
    Ok(ExpenseBody {
        description: description.to_string(),
        amount: amount.to_string(),
        category: category.to_string(),
        project,
        date: Some(date),
    })
}

#[component]
pub fn Expenses() -> impl IntoView {
    let state = use_context::<GlobalState>().expect("GlobalState not found");

    let expenses = create_rw_signal(Vec::<Expense>::new());
    let projects = create_rw_signal(Vec::<Project>::new());
    let (loaded, set_loaded) = create_signal(false);

    let state_for_load = state.clone();
    spawn_local(async move {
        let (list, owned) = futures_util::join!(api::list_expenses(), api::list_projects(None));
        match list {
            Ok(list) => expenses.set(list),
            Err(e) => state_for_load.show_error(&e.describe("Failed to load expenses")),
        }
        if let Ok(owned) = owned {
            projects.set(owned);
        }
        set_loaded.set(true);
    });

    let summary = create_memo(move |_| {
        expenses.with(|list| stats::expense_summary(list, Utc::now().date_naive()))
    });

    let delete = move |id: i64| {
        let state = state.clone();
        spawn_local(async move {
            match api::delete_expense(id).await {
                Ok(()) => {
                    expenses.update(|list| list.retain(|e| e.id != id));
                    state.show_success("Expense deleted");
                }
                Err(e) => state.show_error(&e.describe("Failed to delete expense")),
            }
        });
    };

    let project_title = move |id: i64| {
        projects.with(|list| {
            list.iter()
                .find(|p| p.id == id)
                .map(|p| p.title.clone())
                .unwrap_or_else(|| format!("#{}", id))
        })
    };

    view! {
        <div class="space-y-8">
            <h1 class="text-3xl font-bold">"Expense Tracker"</h1>

            <div class="grid md:grid-cols-3 gap-4">
                {move || {
                    let s = summary.get();
                    view! {
                        <StatCard label="Total Spent" value=format!("{:.2}", s.total) />
                        <StatCard label="This Month" value=format!("{:.2} ({})", s.this_month, s.this_month_count) />
                        <StatCard label="Average" value=format!("{:.2}", s.average) />
                    }
                }}
            </div>

            <AddExpenseForm expenses=expenses projects=projects />

            <section class="bg-gray-800 rounded-xl p-6">
                <h2 class="text-lg font-semibold mb-4">"Expenses"</h2>
                {move || {
                    if !loaded.get() {
                        return view! { <RowSkeleton count=3 /> }.into_view();
                    }
                    let list = expenses.get();
                    if list.is_empty() {
                        return view! { <p class="text-gray-400">"No expenses recorded yet."</p> }.into_view();
                    }
                    let delete = delete.clone();
                    list.into_iter().map(|expense| {
                        let id = expense.id;
                        let delete = delete.clone();
                        view! {
                            <div class="flex items-center justify-between py-2 border-b border-gray-700 text-sm">
                                <div>
                                    <p class="font-medium">
                                        {if expense.description.is_empty() { expense.category.clone() } else { expense.description.clone() }}
                                    </p>
                                    <p class="text-gray-400 text-xs">
                                        {expense.category.clone()} " · " {project_title(expense.project)} " · " {expense.date.to_string()}
                                    </p>
                                </div>
                                <div class="flex items-center space-x-4">
                                    <span class="font-semibold">{expense.amount.clone()}</span>
                                    <button on:click=move |_| delete(id) class="text-red-400 hover:text-red-300">"Delete"</button>
                                </div>
                            </div>
                        }
                    }).collect_view()
                }}
            </section>
        </div>
    }
}

#[component]
fn AddExpenseForm(expenses: RwSignal<Vec<Expense>>, projects: RwSignal<Vec<Project>>) -> impl IntoView {
    let state = use_context::<GlobalState>().expect("GlobalState not found");

    let (amount, set_amount) = create_signal(String::new());
    let (description, set_description) = create_signal(String::new());
    let (category, set_category) = create_signal("Food".to_string());
    let (project, set_project) = create_signal(None::<i64>);
    let (date, set_date) = create_signal(String::new());

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        let body = match validate_expense(
            &amount.get(),
            &description.get(),
            &category.get(),
            project.get(),
            &date.get(),
            Utc::now().date_naive(),
        ) {
            Ok(body) => body,
            Err(message) => {
                state.show_error(&message);
                return;
            }
        };

        let state = state.clone();
        spawn_local(async move {
            match api::create_expense(&body).await {
                Ok(saved) => {
                    expenses.update(|list| list.insert(0, saved));
                    set_amount.set(String::new());
                    set_description.set(String::new());
                    set_date.set(String::new());
                    state.show_success("Expense added");
                }
                Err(e) => state.show_error(&e.describe("Failed to add expense")),
            }
        });
    };

    view! {
        <form on:submit=on_submit class="bg-gray-800 rounded-xl p-6 space-y-3">
            <h2 class="text-lg font-semibold">"Add Expense"</h2>
            <div class="grid md:grid-cols-5 gap-3">
                <input type="text" inputmode="decimal" placeholder="Amount" class="bg-gray-700 rounded-lg px-3 py-2"
                    prop:value=amount on:input=move |ev| set_amount.set(event_target_value(&ev)) />
                <input type="text" placeholder="Description" class="bg-gray-700 rounded-lg px-3 py-2 md:col-span-2"
                    prop:value=description on:input=move |ev| set_description.set(event_target_value(&ev)) />
                <select class="bg-gray-700 rounded-lg px-3 py-2"
                    on:change=move |ev| set_category.set(event_target_value(&ev))>
                    {EXPENSE_CATEGORIES.iter().map(|c| view! {
                        <option value=*c selected=move || category.get() == *c>{*c}</option>
                    }).collect_view()}
                </select>
                <input type="date" class="bg-gray-700 rounded-lg px-3 py-2"
                    prop:value=date on:input=move |ev| set_date.set(event_target_value(&ev)) />
            </div>
            <select class="w-full bg-gray-700 rounded-lg px-3 py-2"
                on:change=move |ev| set_project.set(event_target_value(&ev).parse().ok())>
                <option value="">"Select a project"</option>
                {move || projects.get().into_iter().map(|p| view! {
                    <option value=p.id.to_string()>{p.title}</option>
                }).collect_view()}
            </select>
            <button type="submit" class="px-4 py-2 rounded-lg bg-primary-600 hover:bg-primary-700 font-medium">
                "Add Expense"
            </button>
        </form>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 10).unwrap()
    }

    #[test]
    fn test_required_fields() {
        assert_eq!(
            validate_expense("", "Lunch", "Food", Some(1), "", today()).unwrap_err(),
            "Please fill in all required fields."
        );
        assert_eq!(
            validate_expense("12", "  ", "Food", Some(1), "", today()).unwrap_err(),
            "Please fill in all required fields."
        );
    }

    #[test]
    fn test_amount_rules() {
        let invalid = "Amount must be a number with at most two decimal places.";
        assert_eq!(validate_expense("abc", "Lunch", "Food", Some(1), "", today()).unwrap_err(), invalid);
        assert_eq!(validate_expense("1.005", "Lunch", "Food", Some(1), "", today()).unwrap_err(), invalid);
        assert_eq!(
            validate_expense("-3", "Lunch", "Food", Some(1), "", today()).unwrap_err(),
            "Amount cannot be negative."
        );
        assert!(validate_expense("0", "Lunch", "Food", Some(1), "", today()).is_ok());
        assert_eq!(
            validate_expense("100000000", "Lunch", "Food", Some(1), "", today()).unwrap_err(),
            "Amount must be at most 99999999.99."
        );
        assert!(validate_expense("99999999.99", "Lunch", "Food", Some(1), "", today()).is_ok());
    }

    #[test]
    fn test_project_is_required() {
        assert_eq!(
            validate_expense("12.5", "Lunch", "Food", None, "", today()).unwrap_err(),
            "Please select a project."
        );
    }

    #[test]
    fn test_date_defaults_to_today() {
        let body = validate_expense(" 12.5 ", " Lunch ", "Food", Some(3), "", today()).unwrap();
        assert_eq!(body.amount, "12.5");
        assert_eq!(body.description, "Lunch");
        assert_eq!(body.project, 3);
        assert_eq!(body.date, Some(today()));

        let dated = validate_expense("4", "Bus", "Transportation", Some(3), "2024-03-01", today()).unwrap();
        assert_eq!(dated.date, NaiveDate::from_ymd_opt(2024, 3, 1));
    }
}
