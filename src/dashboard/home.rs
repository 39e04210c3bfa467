//! Home page: both workspaces, the activity feed and spending at a glance

use chrono::NaiveDate;
use serde::Serialize;

use crate::analytics::{home_stats, HomeStats};
use crate::client::{ClientError, DashboardApi};
use crate::models::{ActivityLog, Expense, Project, ProjectType};

#[derive(Debug, Clone, Default, Serialize)]
pub struct HomeView {
    pub personal: Vec<Project>,
    pub collaborative: Vec<Project>,
    pub activity: Vec<ActivityLog>,
    pub expenses: Vec<Expense>,
    pub stats: HomeStats,
}

pub struct HomePage;

impl HomePage {
    pub async fn load<A>(api: &A, today: NaiveDate) -> Result<HomeView, ClientError>
    where
        A: DashboardApi + ?Sized,
    {
        let (personal, collaborative, activity, expenses) = tokio::try_join!(
            api.list_projects(Some(ProjectType::Personal)),
            api.list_projects(Some(ProjectType::Collaborative)),
            api.list_activity(),
            api.list_expenses(None),
        )?;

        let stats = home_stats(&personal, &collaborative, &expenses, today);
        Ok(HomeView {
            personal,
            collaborative,
            activity,
            expenses,
            stats,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::fake::FakeApi;

    #[tokio::test]
    async fn test_load_splits_workspaces() {
        let api = FakeApi::new();
        api.add_project("Thesis", ProjectType::Personal);
        api.add_project("Capstone", ProjectType::Collaborative);
        api.add_project("Hackathon", ProjectType::Collaborative);

        let today = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let view = HomePage::load(&api, today).await.unwrap();
        assert_eq!(view.stats.personal_projects, 1);
        assert_eq!(view.stats.collaborative_projects, 2);
        assert_eq!(view.stats.deadlines.len(), 3);
        assert_eq!(api.calls().len(), 4);
    }
}
