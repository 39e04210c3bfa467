//! App Root Component
//!
//! Main application component with routing and global providers.

use leptos::*;
use leptos_router::*;

use crate::api;
use crate::components::{Loading, Nav, Toast};
use crate::pages::{
    Analytics, CollaborativeWorkspace, Expenses, Home, Login, PersonalWorkspace, Profile,
    ProjectDetail, Register,
};
use crate::state::global::{provide_global_state, GlobalState};
use crate::state::session;

/// Root application component
#[component]
pub fn App() -> impl IntoView {
    provide_global_state();

    view! {
        <Router>
            <div class="min-h-screen bg-gray-900 text-white">
                <Routes>
                    <Route path="/login" view=Login />
                    <Route path="/register" view=Register />
                    <Route path="/" view=Shell>
                        <Route path="" view=|| view! { <Redirect path="/home" /> } />
                        <Route path="home" view=Home />
                        <Route path="personalworkspace" view=PersonalWorkspace />
                        <Route path="collaborativeworkspace" view=CollaborativeWorkspace />
                        <Route path="expensetrack" view=Expenses />
                        <Route path="analytics" view=Analytics />
                        <Route path="projects/:id" view=ProjectDetail />
                        <Route path="profile" view=Profile />
                        <Route path="*any" view=NotFound />
                    </Route>
                </Routes>

                <Toast />
            </div>
        </Router>
    }
}

/// Layout for signed-in pages; sends visitors without a session to /login
#[component]
fn Shell() -> impl IntoView {
    let state = use_context::<GlobalState>().expect("GlobalState not found");
    let authorized = create_resource(|| (), |_| session::is_authorized());

    create_effect(move |_| {
        if authorized.get() == Some(true) && state.user.get_untracked().is_none() {
            let user = state.user;
            spawn_local(async move {
                if let Ok(me) = api::current_user().await {
                    user.set(Some(me));
                }
            });
        }
    });

    view! {
        <Suspense fallback=|| view! { <Loading /> }>
            {move || authorized.get().map(|ok| if ok {
                view! {
                    <div class="flex flex-col min-h-screen">
                        <Nav />
                        <main class="flex-1 container mx-auto px-4 py-8">
                            <Outlet />
                        </main>
                    </div>
                }.into_view()
            } else {
                view! { <Redirect path="/login" /> }.into_view()
            })}
        </Suspense>
    }
}

/// 404 Not Found page
#[component]
fn NotFound() -> impl IntoView {
    view! {
        <div class="flex flex-col items-center justify-center min-h-[60vh] text-center">
            <h1 class="text-3xl font-bold mb-2">"Page Not Found"</h1>
            <p class="text-gray-400 mb-6">"The page you're looking for doesn't exist."</p>
            <A
                href="/home"
                class="px-6 py-3 bg-primary-600 hover:bg-primary-700 rounded-lg font-medium transition-colors"
            >
                "Go to Home"
            </A>
        </div>
    }
}
