use leptos::*;
use leptos_router::A;

/// Shown when no server address or API key has been saved.
#[component]
pub fn NotConfiguredPage() -> impl IntoView {
    view! {
        <div class="space-y-4">
            <h1 class="text-xl font-bold">"hoard is not configured"</h1>
            <p class="text-gray-600">
                "Set your server address and API key before saving bookmarks."
            </p>
            <A href="/options" class="text-blue-600 underline">"Open options"</A>
        </div>
    }
}
