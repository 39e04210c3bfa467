//! Navigation Component
//!
//! Header navigation bar with the workspaces, the user badge and logout.

use leptos::*;
use leptos_router::*;

use crate::api::tokens;
use crate::state::global::GlobalState;

/// Navigation header component
#[component]
pub fn Nav() -> impl IntoView {
    let state = use_context::<GlobalState>().expect("GlobalState not found");
    let user = state.user;
    let navigate = use_navigate();

    let logout = move |_| {
        tokens::clear();
        user.set(None);
        navigate("/login", NavigateOptions::default());
    };

    view! {
        <nav class="bg-gray-800 border-b border-gray-700">
            <div class="container mx-auto px-4">
                <div class="flex items-center justify-between h-16">
                    <A href="/home" class="flex items-center space-x-3">
                        <span class="text-2xl">"🗂"</span>
                        <span class="text-xl font-bold text-white">"GoProject"</span>
                    </A>

                    <div class="flex items-center space-x-1">
                        <NavLink href="/home" label="Home" />
                        <NavLink href="/personalworkspace" label="Personal" />
                        <NavLink href="/collaborativeworkspace" label="Collaborative" />
                        <NavLink href="/expensetrack" label="Expenses" />
                        <NavLink href="/analytics" label="Analytics" />
                    </div>

                    <div class="flex items-center space-x-3">
                        <A href="/profile" class="w-9 h-9 rounded-full bg-primary-600 flex items-center justify-center font-semibold">
                            {move || user.get().map(|u| u.initials()).unwrap_or_else(|| "U".to_string())}
                        </A>
                        <button
                            on:click=logout
                            class="px-3 py-2 rounded-lg text-gray-300 hover:text-white hover:bg-gray-700 transition-colors"
                        >
                            "Logout"
                        </button>
                    </div>
                </div>
            </div>
        </nav>
    }
}

/// Individual navigation link
#[component]
fn NavLink(
    href: &'static str,
    label: &'static str,
) -> impl IntoView {
    view! {
        <A
            href=href
            class="px-4 py-2 rounded-lg text-gray-300 hover:text-white hover:bg-gray-700 transition-colors"
            active_class="bg-gray-700 text-white"
        >
            {label}
        </A>
    }
}
