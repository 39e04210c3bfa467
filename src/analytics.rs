//! Derived dashboard figures
//!
//! Pure functions over collections fetched from the API. Everything that
//! depends on the calendar takes `today` explicitly.

use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;

use crate::models::{ActivityLog, Expense, ExpenseCategory, Money, Project, Task, TaskStatus};
use crate::storage::progress_percent;

/// Days ahead that count as an upcoming deadline
pub const UPCOMING_WINDOW_DAYS: i64 = 7;
/// Days ahead that count as urgent
pub const URGENT_WINDOW_DAYS: i64 = 3;

/// Spending in one category
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    pub category: ExpenseCategory,
    pub total: Money,
}

/// Completed-task count for one calendar day
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayCount {
    pub date: NaiveDate,
    /// `"MMM dd"`, e.g. `"Mar 04"`
    pub label: String,
    pub completed: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QuickStats {
    pub total_spent: Money,
    pub completed_tasks: usize,
    pub pending_tasks: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExpenseSummary {
    pub total: Money,
    pub this_month: Money,
    pub this_month_count: usize,
    pub average: Money,
}

/// A project end date as shown in the deadline lists
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Deadline {
    pub project_id: i64,
    pub title: String,
    pub end_date: Option<NaiveDate>,
    /// Negative once the date has passed
    pub days_left: Option<i64>,
}

impl Deadline {
    fn new(project: &Project, today: NaiveDate) -> Self {
        Self {
            project_id: project.id,
            title: project.title.clone(),
            end_date: project.end_date,
            days_left: project.end_date.map(|end| (end - today).num_days()),
        }
    }

    pub fn is_upcoming(&self) -> bool {
        matches!(self.days_left, Some(d) if (0..=UPCOMING_WINDOW_DAYS).contains(&d))
    }

    pub fn is_urgent(&self) -> bool {
        matches!(self.days_left, Some(d) if (0..=URGENT_WINDOW_DAYS).contains(&d))
    }
}

/// Home page figures
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HomeStats {
    pub personal_projects: usize,
    pub collaborative_projects: usize,
    pub total_expenses: Money,
    /// Due within the next week, soonest first
    pub upcoming_deadlines: Vec<Deadline>,
    /// Every project, by end date; undated last
    pub deadlines: Vec<Deadline>,
}

/// Sum per category, in order of first appearance
pub fn expense_breakdown(expenses: &[Expense]) -> Vec<CategoryTotal> {
    let mut totals: Vec<CategoryTotal> = Vec::new();
    for expense in expenses {
        match totals.iter_mut().find(|t| t.category == expense.category) {
            Some(entry) => entry.total = entry.total + expense.amount,
            None => totals.push(CategoryTotal {
                category: expense.category,
                total: expense.amount,
            }),
        }
    }
    totals
}

/// Completions per day over the last seven days, oldest first
///
/// An entry counts when its action mentions "completed" in any case. Days are
/// UTC calendar days.
pub fn weekly_completions(logs: &[ActivityLog], today: NaiveDate) -> Vec<DayCount> {
    (0..7)
        .rev()
        .map(|back| {
            let date = today - Duration::days(back);
            let completed = logs
                .iter()
                .filter(|log| {
                    log.timestamp.date_naive() == date
                        && log.action.to_lowercase().contains("completed")
                })
                .count();
            DayCount {
                date,
                label: date.format("%b %d").to_string(),
                completed,
            }
        })
        .collect()
}

pub fn quick_stats(expenses: &[Expense], tasks: &[Task]) -> QuickStats {
    let completed_tasks = tasks.iter().filter(|t| t.status == TaskStatus::Done).count();
    QuickStats {
        total_spent: expenses.iter().map(|e| e.amount).sum(),
        completed_tasks,
        pending_tasks: tasks.len() - completed_tasks,
    }
}

/// Share of tasks that are Done, 0 for an empty list
pub fn completion_percentage(tasks: &[Task]) -> u8 {
    let done = tasks.iter().filter(|t| t.status.is_done()).count();
    progress_percent(done as u64, tasks.len() as u64)
}

pub fn expense_summary(expenses: &[Expense], today: NaiveDate) -> ExpenseSummary {
    let total: Money = expenses.iter().map(|e| e.amount).sum();
    let month: Vec<&Expense> = expenses
        .iter()
        .filter(|e| e.date.year() == today.year() && e.date.month() == today.month())
        .collect();

    let average = if expenses.is_empty() {
        Money::ZERO
    } else {
        let count = expenses.len() as i64;
        // round half away from zero
        let cents = total.cents();
        let rounded = (cents.abs() * 2 + count) / (count * 2);
        Money::from_cents(if cents < 0 { -rounded } else { rounded })
    };

    ExpenseSummary {
        total,
        this_month: month.iter().map(|e| e.amount).sum(),
        this_month_count: month.len(),
        average,
    }
}

pub fn home_stats(
    personal: &[Project],
    collaborative: &[Project],
    expenses: &[Expense],
    today: NaiveDate,
) -> HomeStats {
    let mut deadlines: Vec<Deadline> = personal
        .iter()
        .chain(collaborative)
        .map(|p| Deadline::new(p, today))
        .collect();
    // stable: equal dates keep fetch order
    deadlines.sort_by_key(|d| (d.end_date.is_none(), d.end_date));

    let upcoming_deadlines = deadlines.iter().filter(|d| d.is_upcoming()).cloned().collect();

    HomeStats {
        personal_projects: personal.len(),
        collaborative_projects: collaborative.len(),
        total_expenses: expenses.iter().map(|e| e.amount).sum(),
        upcoming_deadlines,
        deadlines,
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use crate::models::{Priority, ProjectStatus, ProjectType};
    use chrono::{TimeZone, Utc};

    pub fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 10).unwrap()
    }

    pub fn expense(id: i64, category: ExpenseCategory, amount: &str, date: NaiveDate) -> Expense {
        Expense {
            id,
            description: format!("expense {id}"),
            amount: amount.parse().unwrap(),
            category,
            project: 1,
            date,
        }
    }

    pub fn task(id: i64, status: TaskStatus) -> Task {
        Task {
            id,
            title: format!("task {id}"),
            description: String::new(),
            project: 1,
            status,
            priority: Priority::Medium,
            due_date: None,
            assigned_to: None,
            attachments: Vec::new(),
        }
    }

    pub fn log(id: i64, action: &str, day: NaiveDate, hour: u32) -> ActivityLog {
        ActivityLog {
            id,
            user_name: "maria".into(),
            action: action.into(),
            project: Some(1),
            project_title: "Thesis".into(),
            timestamp: Utc
                .from_utc_datetime(&day.and_hms_opt(hour, 0, 0).unwrap()),
        }
    }

    pub fn project(id: i64, project_type: ProjectType, end_date: Option<NaiveDate>) -> Project {
        Project {
            id,
            title: format!("project {id}"),
            description: String::new(),
            project_type,
            status: ProjectStatus::InProgress,
            priority: Priority::Medium,
            progress: 0,
            start_date: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            end_date,
            owner_username: "maria".into(),
            members: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;
    use crate::models::ProjectType;

    fn day(offset: i64) -> NaiveDate {
        today() + Duration::days(offset)
    }

    #[test]
    fn test_expense_breakdown_keeps_first_appearance_order() {
        let expenses = vec![
            expense(1, ExpenseCategory::Software, "20.00", day(0)),
            expense(2, ExpenseCategory::Food, "5.50", day(0)),
            expense(3, ExpenseCategory::Software, "9.99", day(-3)),
        ];
        let breakdown = expense_breakdown(&expenses);
        assert_eq!(breakdown.len(), 2);
        assert_eq!(breakdown[0].category, ExpenseCategory::Software);
        assert_eq!(breakdown[0].total, Money::from_cents(2999));
        assert_eq!(breakdown[1].category, ExpenseCategory::Food);
        assert_eq!(breakdown[1].total, Money::from_cents(550));
    }

    #[test]
    fn test_weekly_completions() {
        let logs = vec![
            log(1, "Completed task 'Outline'", day(0), 9),
            log(2, "completed task 'Draft'", day(0), 23),
            log(3, "Created task 'Review'", day(0), 10),
            log(4, "Completed task 'Notes'", day(-6), 8),
            log(5, "Completed task 'Old'", day(-7), 8),
        ];
        let week = weekly_completions(&logs, today());

        assert_eq!(week.len(), 7);
        assert_eq!(week[0].date, day(-6));
        assert_eq!(week[0].label, "Mar 04");
        assert_eq!(week[0].completed, 1);
        assert_eq!(week[6].label, "Mar 10");
        assert_eq!(week[6].completed, 2);
        assert_eq!(week.iter().map(|d| d.completed).sum::<usize>(), 3);
    }

    #[test]
    fn test_quick_stats() {
        let expenses = vec![
            expense(1, ExpenseCategory::Food, "10.25", day(0)),
            expense(2, ExpenseCategory::Travel, "4.75", day(0)),
        ];
        let tasks = vec![
            task(1, TaskStatus::Done),
            task(2, TaskStatus::Pending),
            task(3, TaskStatus::Missed),
            task(4, TaskStatus::InProgress),
        ];
        let stats = quick_stats(&expenses, &tasks);
        assert_eq!(stats.total_spent, Money::from_cents(1500));
        assert_eq!(stats.completed_tasks, 1);
        assert_eq!(stats.pending_tasks, 3);
    }

    #[test]
    fn test_completion_percentage() {
        assert_eq!(completion_percentage(&[]), 0);
        let tasks = vec![
            task(1, TaskStatus::Done),
            task(2, TaskStatus::Done),
            task(3, TaskStatus::Pending),
        ];
        assert_eq!(completion_percentage(&tasks), 67);
    }

    #[test]
    fn test_expense_summary() {
        let expenses = vec![
            expense(1, ExpenseCategory::Food, "10.00", day(0)),
            expense(2, ExpenseCategory::Food, "5.00", day(-9)),
            expense(3, ExpenseCategory::Food, "0.01", day(-20)),
        ];
        let summary = expense_summary(&expenses, today());
        assert_eq!(summary.total, Money::from_cents(1501));
        assert_eq!(summary.this_month, Money::from_cents(1500));
        assert_eq!(summary.this_month_count, 2);
        assert_eq!(summary.average, Money::from_cents(500));

        assert_eq!(expense_summary(&[], today()), ExpenseSummary::default());
    }

    #[test]
    fn test_home_stats() {
        let personal = vec![
            project(1, ProjectType::Personal, Some(day(10))),
            project(2, ProjectType::Personal, None),
        ];
        let collaborative = vec![
            project(3, ProjectType::Collaborative, Some(day(2))),
            project(4, ProjectType::Collaborative, Some(day(-1))),
            project(5, ProjectType::Collaborative, Some(day(7))),
        ];
        let expenses = vec![expense(1, ExpenseCategory::Food, "12.00", day(0))];

        let stats = home_stats(&personal, &collaborative, &expenses, today());
        assert_eq!(stats.personal_projects, 2);
        assert_eq!(stats.collaborative_projects, 3);
        assert_eq!(stats.total_expenses, Money::from_cents(1200));

        let upcoming: Vec<i64> = stats.upcoming_deadlines.iter().map(|d| d.project_id).collect();
        assert_eq!(upcoming, vec![3, 5]);
        assert!(stats.upcoming_deadlines[0].is_urgent());
        assert!(!stats.upcoming_deadlines[1].is_urgent());

        let all: Vec<i64> = stats.deadlines.iter().map(|d| d.project_id).collect();
        assert_eq!(all, vec![4, 3, 5, 1, 2]);
    }
}
