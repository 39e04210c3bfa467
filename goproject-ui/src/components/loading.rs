//! Placeholders shown while a page's collections load

use leptos::*;

/// Spinner with a caption, for single-record pages
#[component]
pub fn Loading(#[prop(default = "Loading...")] label: &'static str) -> impl IntoView {
    view! {
        <div class="flex flex-col items-center justify-center py-12 text-gray-400">
            <div class="loading-spinner w-8 h-8 mb-3" />
            <span class="text-sm">{label}</span>
        </div>
    }
}

/// Stand-in for a `StatCard`
#[component]
pub fn StatSkeleton() -> impl IntoView {
    view! {
        <div class="bg-gray-800 rounded-xl p-5 animate-pulse">
            <div class="h-3 bg-gray-700 rounded w-1/2 mb-3" />
            <div class="h-7 bg-gray-700 rounded w-1/3" />
        </div>
    }
}

/// Project cards or expense rows: a title bar over a meta line and a
/// progress track
#[component]
pub fn RowSkeleton(#[prop(default = 3)] count: usize) -> impl IntoView {
    view! {
        <div class="space-y-3 animate-pulse">
            {(0..count).map(|_| view! {
                <div class="bg-gray-800 rounded-xl p-4 border border-gray-700">
                    <div class="flex justify-between mb-3">
                        <div class="h-4 bg-gray-700 rounded w-2/5" />
                        <div class="h-4 bg-gray-700 rounded-full w-12" />
                    </div>
                    <div class="h-3 bg-gray-700 rounded w-3/5 mb-3" />
                    <div class="h-2 bg-gray-700 rounded-full" />
                </div>
            }).collect_view()}
        </div>
    }
}

/// Task board rows with their status pill
#[component]
pub fn TaskSkeleton(#[prop(default = 4)] count: usize) -> impl IntoView {
    view! {
        <div class="space-y-3 animate-pulse">
            {(0..count).map(|_| view! {
                <div class="bg-gray-800 rounded-xl p-4 flex items-start justify-between">
                    <div class="w-2/3 space-y-2">
                        <div class="h-4 bg-gray-700 rounded w-1/2" />
                        <div class="h-3 bg-gray-700 rounded w-4/5" />
                        <div class="h-3 bg-gray-700 rounded w-1/4" />
                    </div>
                    <div class="h-6 bg-gray-700 rounded-full w-20" />
                </div>
            }).collect_view()}
        </div>
    }
}
