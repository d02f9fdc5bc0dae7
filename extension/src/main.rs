//! hoard browser extension
//!
//! Popup UI for saving the current page to a hoard server, built with Leptos
//! (client-side rendered, compiled to WebAssembly).
//!
//! Routing is hash based (`#/`, `#/notconfigured`, `#/options`) because the
//! popup is served from a single static document.

use leptos::*;
use wasm_bindgen::JsCast;

mod api;
mod app;
mod config;
mod history;
mod pages;

fn main() {
    // Set up panic hook for better error messages in WASM
    console_error_panic_hook::set_once();

    let root = document()
        .get_element_by_id("app")
        .and_then(|el| el.dyn_into::<web_sys::HtmlElement>().ok());

    match root {
        Some(root) => mount_to(root, || view! { <app::App /> }),
        None => mount_to_body(|| view! { <app::App /> }),
    }
}
