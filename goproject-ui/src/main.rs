//! GoProject Dashboard
//!
//! Project, task and expense dashboard built with Leptos (WASM).
//!
//! # Features
//!
//! - Personal and collaborative workspaces
//! - Task board with attachments
//! - Expense tracking and analytics
//! - Profile settings
//!
//! # Architecture
//!
//! Client-side rendered (CSR) Leptos application compiled to WebAssembly. It
//! talks to the GoProject REST API over HTTP; the access and refresh tokens
//! live in the browser's local storage.

use leptos::*;

mod api;
mod app;
mod components;
mod pages;
mod state;
mod stats;

fn main() {
    // Set up panic hook for better error messages in WASM
    console_error_panic_hook::set_once();

    mount_to_body(|| view! { <app::App /> });
}
