//! Profile Page
//!
//! Edits the account and profile fields as one multipart form, and changes
//! the password.

use leptos::*;

use crate::api::{self, types::PROFILE_ROLES};
use crate::components::Loading;
use crate::pages::auth::looks_like_email;
use crate::state::global::GlobalState;

const MIN_PASSWORD_LEN: usize = 8;

pub fn validate_profile(username: &str, email: &str) -> Result<(), &'static str> {
    if username.trim().chars().count() < 3 {
        return Err("Username must be at least 3 characters long.");
    }
    if !looks_like_email(email.trim()) {
        return Err("Invalid email format.");
    }
    Ok(())
}

pub fn validate_password_change(current: &str, new: &str, confirm: &str) -> Result<(), &'static str> {
    if current.is_empty() || new.is_empty() {
        return Err("Please fill in all fields.");
    }
    if new != confirm {
        return Err("New password and confirmation do not match.");
    }
    if new.chars().count() < MIN_PASSWORD_LEN {
        return Err("New password must be at least 8 characters long.");
    }
    Ok(())
}

#[component]
pub fn Profile() -> impl IntoView {
    let state = use_context::<GlobalState>().expect("GlobalState not found");

    let (loaded, set_loaded) = create_signal(false);
    let (username, set_username) = create_signal(String::new());
    let (email, set_email) = create_signal(String::new());
    let (role, set_role) = create_signal("Student".to_string());
    let (course, set_course) = create_signal(String::new());
    let (bio, set_bio) = create_signal(String::new());
    let (picture, set_picture) = create_signal(None::<String>);
    let picture_file = store_value(None::<web_sys::File>);

    let fill = move |user: api::types::User| {
        set_username.set(user.username.clone());
        set_email.set(user.email.clone());
        if !user.profile.role.is_empty() {
            set_role.set(user.profile.role.clone());
        }
        set_course.set(user.profile.course.clone());
        set_bio.set(user.profile.bio.clone());
        set_picture.set(user.profile.profile_picture.clone());
    };

    let state_for_load = state.clone();
    spawn_local(async move {
        match api::current_user().await {
            Ok(user) => {
                fill(user.clone());
                state_for_load.user.set(Some(user));
            }
            Err(e) => state_for_load.show_error(&e.describe("Failed to load profile")),
        }
        set_loaded.set(true);
    });

    let on_save = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        if let Err(message) = validate_profile(&username.get(), &email.get()) {
            state.show_error(message);
            return;
        }
        let Ok(form) = web_sys::FormData::new() else {
            return;
        };
        let _ = form.append_with_str("username", username.get().trim());
        let _ = form.append_with_str("email", email.get().trim());
        let _ = form.append_with_str("role", &role.get());
        let _ = form.append_with_str("course", &course.get());
        let _ = form.append_with_str("bio", &bio.get());
        if let Some(file) = picture_file.get_value() {
            let _ = form.append_with_blob_and_filename("profile_picture", &file, &file.name());
        }

        let state = state.clone();
        spawn_local(async move {
            match api::update_profile(form).await {
                Ok(()) => {
                    picture_file.set_value(None);
                    if let Ok(user) = api::current_user().await {
                        fill(user.clone());
                        state.user.set(Some(user));
                    }
                    state.show_success("Profile updated successfully!");
                }
                Err(e) => state.show_error(&e.describe("Failed to update profile")),
            }
        });
    };

    view! {
        <div class="space-y-8 max-w-2xl">
            <h1 class="text-3xl font-bold">"Profile"</h1>

            {move || if !loaded.get() {
                view! { <Loading label="Loading profile..." /> }.into_view()
            } else {
                view! {
                    <form on:submit=on_save.clone() class="bg-gray-800 rounded-xl p-6 space-y-4">
                        <div class="flex items-center space-x-4">
                            {move || match picture.get() {
                                Some(url) => view! {
                                    <img src=url class="w-16 h-16 rounded-full object-cover" />
                                }.into_view(),
                                None => view! {
                                    <div class="w-16 h-16 rounded-full bg-primary-600 flex items-center justify-center text-xl font-bold">
                                        {username.get().chars().take(2).collect::<String>().to_uppercase()}
                                    </div>
                                }.into_view(),
                            }}
                            <input type="file" accept="image/*"
                                on:change=move |ev| {
                                    let input = event_target::<web_sys::HtmlInputElement>(&ev);
                                    picture_file.set_value(input.files().and_then(|files| files.get(0)));
                                } />
                        </div>
                        <input type="text" placeholder="Username" class="w-full bg-gray-700 rounded-lg px-3 py-2"
                            prop:value=username on:input=move |ev| set_username.set(event_target_value(&ev)) />
                        <input type="email" placeholder="Email" class="w-full bg-gray-700 rounded-lg px-3 py-2"
                            prop:value=email on:input=move |ev| set_email.set(event_target_value(&ev)) />
                        <div class="grid grid-cols-2 gap-3">
                            <select class="bg-gray-700 rounded-lg px-3 py-2"
                                on:change=move |ev| set_role.set(event_target_value(&ev))>
                                {PROFILE_ROLES.iter().map(|r| view! {
                                    <option value=*r selected=move || role.get() == *r>{*r}</option>
                                }).collect_view()}
                            </select>
                            <input type="text" placeholder="Course" class="bg-gray-700 rounded-lg px-3 py-2"
                                prop:value=course on:input=move |ev| set_course.set(event_target_value(&ev)) />
                        </div>
                        <textarea placeholder="Bio" class="w-full bg-gray-700 rounded-lg px-3 py-2"
                            prop:value=bio on:input=move |ev| set_bio.set(event_target_value(&ev)) />
                        <button type="submit" class="px-4 py-2 rounded-lg bg-primary-600 hover:bg-primary-700 font-medium">
                            "Save Profile"
                        </button>
                    </form>
                }.into_view()
            }}

            <ChangePassword />
        </div>
    }
}

#[component]
fn ChangePassword() -> impl IntoView {
    let state = use_context::<GlobalState>().expect("GlobalState not found");

    let (current, set_current) = create_signal(String::new());
    let (new, set_new) = create_signal(String::new());
    let (confirm, set_confirm) = create_signal(String::new());
    let (error, set_error) = create_signal(None::<String>);

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        let (c, n) = (current.get(), new.get());
        if let Err(message) = validate_password_change(&c, &n, &confirm.get()) {
            set_error.set(Some(message.to_string()));
            return;
        }
        set_error.set(None);

        let state = state.clone();
        spawn_local(async move {
            match api::change_password(&c, &n).await {
                Ok(()) => {
                    set_current.set(String::new());
                    set_new.set(String::new());
                    set_confirm.set(String::new());
                    state.show_success("Password changed successfully!");
                }
                Err(e) => set_error.set(Some(
                    e.field_messages()
                        .unwrap_or_else(|| e.describe("Failed to change password")),
                )),
            }
        });
    };

    view! {
        <form on:submit=on_submit class="bg-gray-800 rounded-xl p-6 space-y-4">
            <h2 class="text-lg font-semibold">"Change Password"</h2>
            {move || error.get().map(|e| view! { <p class="text-red-400 text-sm">{e}</p> })}
            <input type="password" placeholder="Current password" class="w-full bg-gray-700 rounded-lg px-3 py-2"
                prop:value=current on:input=move |ev| set_current.set(event_target_value(&ev)) />
            <input type="password" placeholder="New password" class="w-full bg-gray-700 rounded-lg px-3 py-2"
                prop:value=new on:input=move |ev| set_new.set(event_target_value(&ev)) />
            <input type="password" placeholder="Confirm new password" class="w-full bg-gray-700 rounded-lg px-3 py-2"
                prop:value=confirm on:input=move |ev| set_confirm.set(event_target_value(&ev)) />
            <button type="submit" class="px-4 py-2 rounded-lg bg-primary-600 hover:bg-primary-700 font-medium">
                "Change Password"
            </button>
        </form>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_checks() {
        assert_eq!(validate_profile("jo", "jo@school.edu"), Err("Username must be at least 3 characters long."));
        assert_eq!(validate_profile("joan", "joan"), Err("Invalid email format."));
        assert_eq!(validate_profile("joan", "joan@school.edu"), Ok(()));
    }

    #[test]
    fn test_password_change_checks() {
        assert_eq!(validate_password_change("", "x", "x"), Err("Please fill in all fields."));
        assert_eq!(
            validate_password_change("old", "newpassword", "newpassw0rd"),
            Err("New password and confirmation do not match.")
        );
        assert_eq!(
            validate_password_change("old", "short", "short"),
            Err("New password must be at least 8 characters long.")
        );
        assert_eq!(validate_password_change("old", "newpassword", "newpassword"), Ok(()));
    }
}
