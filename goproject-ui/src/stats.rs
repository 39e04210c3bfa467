//! Figures the pages derive from fetched collections

use chrono::{Datelike, Duration, NaiveDate};

use crate::api::types::{ActivityLog, Expense, Project, Task};

pub const UPCOMING_WINDOW_DAYS: i64 = 7;
pub const URGENT_WINDOW_DAYS: i64 = 3;

/// Sum per category, in order of first appearance
pub fn expense_breakdown(expenses: &[Expense]) -> Vec<(String, f64)> {
    let mut totals: Vec<(String, f64)> = Vec::new();
    for expense in expenses {
        match totals.iter_mut().find(|(c, _)| *c == expense.category) {
            Some(entry) => entry.1 += expense.amount_value(),
            None => totals.push((expense.category.clone(), expense.amount_value())),
        }
    }
    totals
}

/// `(label, completed)` for the seven days ending `today`, oldest first
pub fn weekly_completions(logs: &[ActivityLog], today: NaiveDate) -> Vec<(String, usize)> {
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
            (date.format("%b %d").to_string(), completed)
        })
        .collect()
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ExpenseSummary {
    pub total: f64,
    pub this_month: f64,
    pub this_month_count: usize,
    pub average: f64,
}

pub fn expense_summary(expenses: &[Expense], today: NaiveDate) -> ExpenseSummary {
    let total: f64 = expenses.iter().map(Expense::amount_value).sum();
    let month: Vec<&Expense> = expenses
        .iter()
        .filter(|e| e.date.year() == today.year() && e.date.month() == today.month())
        .collect();
    ExpenseSummary {
        total,
        this_month: month.iter().map(|e| e.amount_value()).sum(),
        this_month_count: month.len(),
        average: if expenses.is_empty() {
            0.0
        } else {
            total / expenses.len() as f64
        },
    }
}

/// Percentage of Done tasks, rounded
pub fn completion_percentage(tasks: &[Task]) -> u8 {
    if tasks.is_empty() {
        return 0;
    }
    let done = tasks.iter().filter(|t| t.is_done()).count();
    ((done as f64 / tasks.len() as f64) * 100.0).round() as u8
}

pub fn days_left(project: &Project, today: NaiveDate) -> Option<i64> {
    project.end_date.map(|end| (end - today).num_days())
}

/// Projects due within the next week, soonest first
pub fn upcoming_deadlines(projects: &[Project], today: NaiveDate) -> Vec<(Project, i64)> {
    let mut upcoming: Vec<(Project, i64)> = projects
        .iter()
        .filter_map(|p| {
            days_left(p, today)
                .filter(|d| (0..=UPCOMING_WINDOW_DAYS).contains(d))
                .map(|d| (p.clone(), d))
        })
        .collect();
    upcoming.sort_by_key(|(_, d)| *d);
    upcoming
}

pub fn is_urgent(days_left: i64) -> bool {
    (0..=URGENT_WINDOW_DAYS).contains(&days_left)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 10).unwrap()
    }

    fn expense(category: &str, amount: &str, date: NaiveDate) -> Expense {
        Expense {
            id: 1,
            description: String::new(),
            amount: amount.to_string(),
            category: category.to_string(),
            project: 1,
            date,
        }
    }

    fn project(id: i64, end_date: Option<NaiveDate>) -> Project {
        Project {
            id,
            title: format!("project {}", id),
            description: String::new(),
            project_type: "Personal".to_string(),
            status: "In Progress".to_string(),
            priority: "Medium".to_string(),
            progress: 0,
            start_date: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            end_date,
            owner_username: "maria".to_string(),
            members: Vec::new(),
        }
    }

    #[test]
    fn test_breakdown_keeps_first_seen_order() {
        let expenses = vec![
            expense("Food", "10.00", today()),
            expense("Travel", "5.50", today()),
            expense("Food", "2.25", today()),
        ];
        assert_eq!(
            expense_breakdown(&expenses),
            vec![("Food".to_string(), 12.25), ("Travel".to_string(), 5.5)]
        );
    }

    #[test]
    fn test_summary_counts_current_month() {
        let expenses = vec![
            expense("Food", "10.00", today()),
            expense("Food", "20.00", NaiveDate::from_ymd_opt(2024, 2, 28).unwrap()),
        ];
        let summary = expense_summary(&expenses, today());
        assert_eq!(summary.total, 30.0);
        assert_eq!(summary.this_month, 10.0);
        assert_eq!(summary.this_month_count, 1);
        assert_eq!(summary.average, 15.0);
        assert_eq!(expense_summary(&[], today()), ExpenseSummary::default());
    }

    #[test]
    fn test_weekly_completions_window() {
        let at = |day: NaiveDate| Utc.from_utc_datetime(&day.and_hms_opt(12, 0, 0).unwrap());
        let logs = vec![
            ActivityLog {
                id: 1,
                user_name: "maria".to_string(),
                action: "Completed task 'Outline'".to_string(),
                project: Some(1),
                project_title: "Thesis".to_string(),
                timestamp: at(today()),
            },
            ActivityLog {
                id: 2,
                user_name: "maria".to_string(),
                action: "Completed task 'Old'".to_string(),
                project: Some(1),
                project_title: "Thesis".to_string(),
                timestamp: at(today() - Duration::days(7)),
            },
        ];
        let weekly = weekly_completions(&logs, today());
        assert_eq!(weekly.len(), 7);
        assert_eq!(weekly[0].0, "Mar 04");
        assert_eq!(weekly[6], ("Mar 10".to_string(), 1));
        assert_eq!(weekly.iter().map(|(_, c)| c).sum::<usize>(), 1);
    }

    #[test]
    fn test_upcoming_deadlines_window() {
        let projects = vec![
            project(1, Some(today() + Duration::days(5))),
            project(2, Some(today() + Duration::days(1))),
            project(3, Some(today() + Duration::days(8))),
            project(4, Some(today() - Duration::days(1))),
            project(5, None),
        ];
        let upcoming = upcoming_deadlines(&projects, today());
        let ids: Vec<i64> = upcoming.iter().map(|(p, _)| p.id).collect();
        assert_eq!(ids, vec![2, 1]);
        assert!(is_urgent(upcoming[0].1));
        assert!(!is_urgent(upcoming[1].1));
    }
}
