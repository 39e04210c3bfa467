//! Expenses page

use chrono::NaiveDate;

use crate::analytics::{expense_summary, ExpenseSummary};
use crate::client::{ClientError, DashboardApi};
use crate::forms::ExpenseForm;
use crate::models::{Expense, Project};

use super::Notice;

#[derive(Debug, Clone, Default)]
pub struct ExpensesPage {
    pub expenses: Vec<Expense>,
    /// Projects offered in the add form
    pub projects: Vec<Project>,
    pub notice: Option<Notice>,
}

impl ExpensesPage {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn load<A>(&mut self, api: &A) -> Result<(), ClientError>
    where
        A: DashboardApi + ?Sized,
    {
        let (expenses, projects) = tokio::try_join!(api.list_expenses(None), api.list_projects(None))?;
        self.expenses = expenses;
        self.projects = projects;
        Ok(())
    }

    pub fn summary(&self, today: NaiveDate) -> ExpenseSummary {
        expense_summary(&self.expenses, today)
    }

    /// Validate and record an expense; invalid forms send nothing
    pub async fn add<A>(&mut self, api: &A, form: &ExpenseForm, today: NaiveDate) -> bool
    where
        A: DashboardApi + ?Sized,
    {
        let input = match form.validate(today) {
            Ok(input) => input,
            Err(e) => {
                self.notice = Some(Notice::from_form_error(&e));
                return false;
            }
        };

        match api.create_expense(&input).await {
            Ok(expense) => {
                self.expenses.insert(0, expense);
                self.notice = Some(Notice::success("Expense added"));
                true
            }
            Err(e) => {
                self.notice = Some(Notice::from_client_error("Failed to add expense", &e));
                false
            }
        }
    }

    pub async fn delete<A>(&mut self, api: &A, id: i64) -> bool
    where
        A: DashboardApi + ?Sized,
    {
        match api.delete_expense(id).await {
            Ok(()) => {
                self.expenses.retain(|e| e.id != id);
                true
            }
            Err(e) => {
                self.notice = Some(Notice::from_client_error("Failed to delete expense", &e));
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::fixtures::today;
    use crate::dashboard::fake::FakeApi;
    use crate::models::{ExpenseCategory, Money, ProjectType};

    #[tokio::test]
    async fn test_add_requires_fields() {
        let api = FakeApi::new();
        let mut page = ExpensesPage::new();

        assert!(!page.add(&api, &ExpenseForm::default(), today()).await);
        assert_eq!(
            page.notice.as_ref().unwrap().message,
            "Please fill in all required fields."
        );
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_add_and_delete() {
        let api = FakeApi::new();
        let project = api.add_project("Thesis", ProjectType::Personal);
        let mut page = ExpensesPage::new();
        page.load(&api).await.unwrap();

        let form = ExpenseForm {
            description: "Printing".into(),
            amount: "12.5".into(),
            category: ExpenseCategory::Supplies,
            project: Some(project.id),
            date: String::new(),
        };
        assert!(page.add(&api, &form, today()).await);
        assert_eq!(page.expenses[0].amount, Money::from_cents(1250));
        assert_eq!(page.expenses[0].date, today());
        assert_eq!(page.summary(today()).this_month_count, 1);

        let id = page.expenses[0].id;
        assert!(page.delete(&api, id).await);
        assert!(page.expenses.is_empty());
    }
}
