//! Analytics page

use chrono::NaiveDate;
use serde::Serialize;

use crate::analytics::{
    expense_breakdown, quick_stats, weekly_completions, CategoryTotal, DayCount, QuickStats,
};
use crate::client::{ClientError, DashboardApi};

#[derive(Debug, Clone, Default, Serialize)]
pub struct AnalyticsView {
    pub breakdown: Vec<CategoryTotal>,
    pub weekly: Vec<DayCount>,
    pub quick: QuickStats,
}

pub struct AnalyticsPage;

impl AnalyticsPage {
    pub async fn load<A>(api: &A, today: NaiveDate) -> Result<AnalyticsView, ClientError>
    where
        A: DashboardApi + ?Sized,
    {
        let (expenses, activity, tasks) = tokio::try_join!(
            api.list_expenses(None),
            api.list_activity(),
            api.list_tasks(None),
        )?;

        Ok(AnalyticsView {
            breakdown: expense_breakdown(&expenses),
            weekly: weekly_completions(&activity, today),
            quick: quick_stats(&expenses, &tasks),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::fixtures::{expense, log, today};
    use crate::dashboard::fake::FakeApi;
    use crate::models::{ExpenseCategory, Money, ProjectType};

    #[tokio::test]
    async fn test_load() {
        let api = FakeApi::new();
        let project = api.add_project("Thesis", ProjectType::Personal);
        api.add_task(project.id, "Outline");
        {
            let mut state = api.state();
            state
                .expenses
                .push(expense(1, ExpenseCategory::Food, "3.50", today()));
            state
                .activity
                .push(log(1, "Completed task 'Outline'", today(), 12));
        }

        let view = AnalyticsPage::load(&api, today()).await.unwrap();
        assert_eq!(view.breakdown.len(), 1);
        assert_eq!(view.quick.total_spent, Money::from_cents(350));
        assert_eq!(view.quick.pending_tasks, 1);
        assert_eq!(view.weekly[6].completed, 1);
    }
}
