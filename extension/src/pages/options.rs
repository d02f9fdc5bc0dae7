//! Options Page
//!
//! Server address and API key, persisted in local storage.

use leptos::*;
use leptos_router::A;

use crate::config::{self, ExtensionConfig};

#[component]
pub fn OptionsPage() -> impl IntoView {
    let (address, set_address) = create_signal(config::saved_address());
    let (api_key, set_api_key) = create_signal(String::new());
    let (status, set_status) = create_signal(None::<Result<&'static str, &'static str>>);

    let save = move |_| {
        let result = match ExtensionConfig::new(&address.get(), &api_key.get()) {
            Some(cfg) if config::save(&cfg) => {
                set_address.set(cfg.address);
                Ok("Saved")
            }
            Some(_) => Err("Local storage is unavailable"),
            None => Err("Address and API key are both required"),
        };
        set_status.set(Some(result));
    };

    let reset = move |_| {
        config::clear();
        set_address.set(String::new());
        set_api_key.set(String::new());
        set_status.set(Some(Ok("Cleared")));
    };

    view! {
        <div class="space-y-4">
            <h1 class="text-xl font-bold">"Options"</h1>

            <label class="block text-sm text-gray-600">"Server address"</label>
            <input
                type="url"
                placeholder="https://hoard.example.com"
                prop:value=move || address.get()
                on:input=move |ev| set_address.set(event_target_value(&ev))
                class="w-full border rounded px-3 py-2"
            />

            <label class="block text-sm text-gray-600">"API key"</label>
            <input
                type="password"
                prop:value=move || api_key.get()
                on:input=move |ev| set_api_key.set(event_target_value(&ev))
                class="w-full border rounded px-3 py-2"
            />

            <div class="flex space-x-2">
                <button on:click=save class="px-4 py-2 bg-blue-600 text-white rounded">"Save"</button>
                <button on:click=reset class="px-4 py-2 bg-gray-200 rounded">"Clear"</button>
            </div>

            {move || match status.get() {
                Some(Ok(msg)) => view! { <p class="text-green-600">{msg}</p> }.into_view(),
                Some(Err(msg)) => view! { <p class="text-red-600">{msg}</p> }.into_view(),
                None => ().into_view(),
            }}

            <A href="/" class="text-blue-600 underline">"Back"</A>
        </div>
    }
}
