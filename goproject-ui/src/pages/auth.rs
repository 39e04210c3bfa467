//! Login and sign-up forms

use leptos::*;
use leptos_router::*;

use crate::api::{self, tokens};
use crate::state::global::GlobalState;

/// `local@domain.tld` with no whitespace
pub(crate) fn looks_like_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    let clean = |part: &str| !part.is_empty() && !part.contains('@') && !part.contains(char::is_whitespace);
    match domain.rsplit_once('.') {
        Some((host, tld)) => clean(local) && clean(host) && clean(tld),
        None => false,
    }
}

pub fn validate_registration(
    username: &str,
    email: &str,
    password: &str,
    confirm: &str,
) -> Result<(), &'static str> {
    if username.trim().is_empty() || email.trim().is_empty() || password.is_empty() {
        return Err("Please fill in all fields.");
    }
    if !looks_like_email(email.trim()) {
        return Err("Invalid email format.");
    }
    if password != confirm {
        return Err("Passwords do not match.");
    }
    Ok(())
}

#[component]
pub fn Login() -> impl IntoView {
    let state = use_context::<GlobalState>().expect("GlobalState not found");
    let navigate = use_navigate();

    let (username, set_username) = create_signal(String::new());
    let (password, set_password) = create_signal(String::new());
    let (loading, set_loading) = create_signal(false);

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        let u = username.get();
        let p = password.get();
        if u.trim().is_empty() || p.is_empty() {
            state.show_error("Please fill in all fields.");
            return;
        }

        set_loading.set(true);
        let state = state.clone();
        let navigate = navigate.clone();
        spawn_local(async move {
            match api::login(&u, &p).await {
                Ok(pair) => {
                    tokens::save_pair(&pair.access, &pair.refresh);
                    navigate("/home", NavigateOptions::default());
                }
                Err(e) => state.show_error(&e.describe("Login failed")),
            }
            set_loading.set(false);
        });
    };

    view! {
        <AuthCard title="Login">
            <form on:submit=on_submit class="space-y-4">
                <input
                    type="text"
                    placeholder="Username"
                    class="w-full bg-gray-700 rounded-lg px-3 py-2"
                    on:input=move |ev| set_username.set(event_target_value(&ev))
                />
                <input
                    type="password"
                    placeholder="Password"
                    class="w-full bg-gray-700 rounded-lg px-3 py-2"
                    on:input=move |ev| set_password.set(event_target_value(&ev))
                />
                <button
                    type="submit"
                    disabled=loading
                    class="w-full py-2 rounded-lg bg-primary-600 hover:bg-primary-700 font-medium"
                >
                    {move || if loading.get() { "Logging in..." } else { "Login" }}
                </button>
                <p class="text-sm text-gray-400 text-center">
                    "No account? " <A href="/register" class="text-primary-400">"Register"</A>
                </p>
            </form>
        </AuthCard>
    }
}

/// Sign-up form; any stored session is dropped when it opens
#[component]
pub fn Register() -> impl IntoView {
    tokens::clear();

    let state = use_context::<GlobalState>().expect("GlobalState not found");
    let navigate = use_navigate();

    let (username, set_username) = create_signal(String::new());
    let (email, set_email) = create_signal(String::new());
    let (password, set_password) = create_signal(String::new());
    let (confirm, set_confirm) = create_signal(String::new());
    let (loading, set_loading) = create_signal(false);

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        let (u, e, p) = (username.get(), email.get(), password.get());
        if let Err(message) = validate_registration(&u, &e, &p, &confirm.get()) {
            state.show_error(message);
            return;
        }

        set_loading.set(true);
        let state = state.clone();
        let navigate = navigate.clone();
        spawn_local(async move {
            match api::register(u.trim(), e.trim(), &p).await {
                Ok(_) => {
                    state.show_success("Registration successful! Please log in.");
                    navigate("/login", NavigateOptions::default());
                }
                Err(err) => state.show_error(&err.describe("Registration failed")),
            }
            set_loading.set(false);
        });
    };

    view! {
        <AuthCard title="Register">
            <form on:submit=on_submit class="space-y-4">
                <input type="text" placeholder="Username" class="w-full bg-gray-700 rounded-lg px-3 py-2"
                    on:input=move |ev| set_username.set(event_target_value(&ev)) />
                <input type="email" placeholder="Email" class="w-full bg-gray-700 rounded-lg px-3 py-2"
                    on:input=move |ev| set_email.set(event_target_value(&ev)) />
                <input type="password" placeholder="Password" class="w-full bg-gray-700 rounded-lg px-3 py-2"
                    on:input=move |ev| set_password.set(event_target_value(&ev)) />
                <input type="password" placeholder="Confirm password" class="w-full bg-gray-700 rounded-lg px-3 py-2"
                    on:input=move |ev| set_confirm.set(event_target_value(&ev)) />
                <button
                    type="submit"
                    disabled=loading
                    class="w-full py-2 rounded-lg bg-primary-600 hover:bg-primary-700 font-medium"
                >
                    {move || if loading.get() { "Registering..." } else { "Register" }}
                </button>
                <p class="text-sm text-gray-400 text-center">
                    "Already registered? " <A href="/login" class="text-primary-400">"Login"</A>
                </p>
            </form>
        </AuthCard>
    }
}

#[component]
fn AuthCard(title: &'static str, children: Children) -> impl IntoView {
    view! {
        <div class="min-h-screen flex items-center justify-center">
            <div class="bg-gray-800 rounded-xl p-8 w-full max-w-sm">
                <h1 class="text-2xl font-bold mb-6 text-center">{title}</h1>
                {children()}
            </div>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registration_checks() {
        assert_eq!(validate_registration("", "a@b.c", "pw", "pw"), Err("Please fill in all fields."));
        assert_eq!(validate_registration("maria", "a@b.c", "pw", "px"), Err("Passwords do not match."));
        assert_eq!(validate_registration("maria", "maria", "pw", "pw"), Err("Invalid email format."));
        assert_eq!(validate_registration("maria", "a@b.c", "pw", "pw"), Ok(()));
    }

    #[test]
    fn test_email_shape() {
        assert!(looks_like_email("maria@school.edu"));
        assert!(!looks_like_email("maria@school"));
        assert!(!looks_like_email("ma ria@school.edu"));
        assert!(!looks_like_email("@school.edu"));
    }
}
