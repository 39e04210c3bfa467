//! Notice stack
//!
//! Renders [`GlobalState::notices`] bottom-right. A rejected session gets a
//! link back to the login page.

use leptos::*;
use leptos_router::*;

use crate::api::NOT_AUTHORIZED;
use crate::state::global::{GlobalState, Notice, NoticeKind};

#[component]
pub fn Toast() -> impl IntoView {
    let state = use_context::<GlobalState>().expect("GlobalState not found");
    let notices = state.notices;

    view! {
        <div class="fixed bottom-6 right-4 z-50 space-y-2 w-80">
            <For
                each=move || notices.get()
                key=|notice| notice.id
                children=move |notice| view! { <NoticeCard notice=notice state=state.clone() /> }
            />
        </div>
    }
}

#[component]
fn NoticeCard(notice: Notice, state: GlobalState) -> impl IntoView {
    let id = notice.id;
    let bg_class = match notice.kind {
        NoticeKind::Success => "bg-green-600",
        NoticeKind::Error => "bg-red-600",
    };
    let relogin = notice.is_error() && notice.message == NOT_AUTHORIZED;

    view! {
        <div class=format!("{} text-white px-4 py-3 rounded-lg shadow-lg animate-slide-in", bg_class)>
            <div class="flex items-start justify-between space-x-3">
                <p class="text-sm font-medium">{notice.message}</p>
                <button on:click=move |_| state.dismiss(id) class="text-white/70 hover:text-white">"✕"</button>
            </div>
            {relogin.then(|| view! {
                <A href="/login" class="text-sm underline mt-1 inline-block">"Log in again"</A>
            })}
        </div>
    }
}
