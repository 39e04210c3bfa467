//! Profile and settings page

use crate::client::{ClientError, DashboardApi, Upload};
use crate::forms::{ChangePasswordForm, ProfileForm};
use crate::models::User;

use super::Notice;

#[derive(Debug, Clone, Default)]
pub struct ProfilePage {
    pub user: Option<User>,
    pub notice: Option<Notice>,
    /// Message shown inside the change-password dialog
    pub password_error: Option<String>,
}

impl ProfilePage {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn load<A>(&mut self, api: &A) -> Result<(), ClientError>
    where
        A: DashboardApi + ?Sized,
    {
        self.user = Some(api.current_user().await?);
        Ok(())
    }

    pub async fn save<A>(&mut self, api: &A, form: &ProfileForm, picture: Option<Upload>) -> bool
    where
        A: DashboardApi + ?Sized,
    {
        let update = match form.validate() {
            Ok(update) => update,
            Err(e) => {
                self.notice = Some(Notice::from_form_error(&e));
                return false;
            }
        };

        match api.update_profile(&update, picture).await {
            Ok(user) => {
                self.user = Some(user);
                self.notice = Some(Notice::success("Profile updated successfully!"));
                true
            }
            Err(e) => {
                self.notice = Some(Notice::from_client_error("Failed to update profile", &e));
                false
            }
        }
    }

    pub async fn change_password<A>(&mut self, api: &A, form: &ChangePasswordForm) -> bool
    where
        A: DashboardApi + ?Sized,
    {
        let req = match form.validate() {
            Ok(req) => req,
            Err(e) => {
                self.password_error = Some(e.to_string());
                return false;
            }
        };

        match api.change_password(&req).await {
            Ok(_) => {
                self.password_error = None;
                self.notice = Some(Notice::success("Password changed successfully!"));
                true
            }
            Err(ClientError::Api { fields, message, .. }) => {
                self.password_error = Some(
                    fields
                        .into_values()
                        .next()
                        .unwrap_or(message),
                );
                false
            }
            Err(e) => {
                self.password_error = Some(format!("Failed to change password: {e}"));
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::fake::{FakeApi, Failure};

    #[tokio::test]
    async fn test_save_profile() {
        let api = FakeApi::new();
        let mut page = ProfilePage::new();
        page.load(&api).await.unwrap();

        let mut form = ProfileForm::from_user(page.user.as_ref().unwrap());
        form.course = "BSIT".into();
        let picture = Upload::new("me.png", vec![1, 2, 3]);
        assert!(page.save(&api, &form, Some(picture)).await);

        let user = page.user.unwrap();
        assert_eq!(user.profile.course, "BSIT");
        assert!(user.profile.profile_picture.unwrap().ends_with("me.png"));
    }

    #[tokio::test]
    async fn test_short_username_sends_nothing() {
        let api = FakeApi::new();
        let mut page = ProfilePage::new();
        let form = ProfileForm {
            username: "ab".into(),
            email: "ab@example.com".into(),
            ..Default::default()
        };
        assert!(!page.save(&api, &form, None).await);
        assert_eq!(
            page.notice.unwrap().message,
            "Username must be at least 3 characters long."
        );
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_change_password() {
        let api = FakeApi::new();
        let mut page = ProfilePage::new();
        let mut form = ChangePasswordForm {
            current_password: "old-password".into(),
            new_password: "short".into(),
            confirm_new_password: "short".into(),
        };
        assert!(!page.change_password(&api, &form).await);
        assert_eq!(
            page.password_error.as_deref(),
            Some("New password must be at least 8 characters long.")
        );

        form.new_password = "long-enough".into();
        form.confirm_new_password = "long-enough".into();
        api.fail_next(Failure::Status(400, vec![("current_password", "Current password is incorrect.")]));
        assert!(!page.change_password(&api, &form).await);
        assert_eq!(page.password_error.as_deref(), Some("Current password is incorrect."));

        assert!(page.change_password(&api, &form).await);
        assert_eq!(page.notice.unwrap().message, "Password changed successfully!");
    }
}
