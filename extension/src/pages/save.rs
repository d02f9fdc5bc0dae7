//! Save Page
//!
//! Posts a URL to the configured hoard server.

use leptos::*;
use leptos_router::{Redirect, A};

use crate::api;
use crate::config::{self, ExtensionConfig};

#[derive(Debug, Clone, PartialEq)]
enum SaveState {
    Idle,
    Saving,
    Saved(String),
    Failed(String),
}

#[component]
pub fn SavePage() -> impl IntoView {
    match config::load() {
        Some(cfg) => view! { <SaveForm config=cfg /> }.into_view(),
        None => view! { <Redirect path="/notconfigured" /> }.into_view(),
    }
}

#[component]
fn SaveForm(config: ExtensionConfig) -> impl IntoView {
    let (url, set_url) = create_signal(String::new());
    let (state, set_state) = create_signal(SaveState::Idle);
    let config = store_value(config);

    let submit = move |_| {
        let target = url.get().trim().to_string();
        if target.is_empty() {
            set_state.set(SaveState::Failed("Enter a URL to save".to_string()));
            return;
        }
        set_state.set(SaveState::Saving);
        let cfg = config.get_value();
        spawn_local(async move {
            match api::save_bookmark(&cfg, &target).await {
                Ok(created) => set_state.set(SaveState::Saved(created.id)),
                Err(e) => set_state.set(SaveState::Failed(e)),
            }
        });
    };

    view! {
        <div class="space-y-4">
            <h1 class="text-xl font-bold">"Save to hoard"</h1>
            <p class="text-xs text-gray-500">{config.with_value(|c| c.address.clone())}</p>

            <input
                type="url"
                placeholder="https://"
                prop:value=move || url.get()
                on:input=move |ev| set_url.set(event_target_value(&ev))
                class="w-full border rounded px-3 py-2"
            />
            <button
                on:click=submit
                disabled=move || state.get() == SaveState::Saving
                class="px-4 py-2 bg-blue-600 text-white rounded disabled:bg-gray-400"
            >
                {move || if state.get() == SaveState::Saving { "Saving..." } else { "Save" }}
            </button>

            {move || match state.get() {
                SaveState::Saved(id) => view! {
                    <p class="text-green-600">"Saved. Tags will be suggested shortly. (" {id} ")"</p>
                }.into_view(),
                SaveState::Failed(e) => view! { <p class="text-red-600">{e}</p> }.into_view(),
                _ => ().into_view(),
            }}

            <A href="/options" class="text-sm text-blue-600 underline">"Options"</A>
        </div>
    }
}
