//! App Root Component

use leptos::*;
use leptos_router::*;

use crate::history::HashIntegration;
use crate::pages::{NotConfiguredPage, OptionsPage, SavePage};

/// Root application component
#[component]
pub fn App() -> impl IntoView {
    // The router picks this up instead of the default path-based history.
    provide_context(RouterIntegrationContext::new(HashIntegration));

    view! {
        <Router>
            <main class="p-4 w-80">
                <Routes>
                    <Route path="/" view=SavePage />
                    <Route path="/notconfigured" view=NotConfiguredPage />
                    <Route path="/options" view=OptionsPage />
                </Routes>
            </main>
        </Router>
    }
}
