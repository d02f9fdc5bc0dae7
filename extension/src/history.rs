//! Hash-based router integration.
//!
//! The router sees `/options` while the address bar shows `index.html#/options`.

use leptos::*;
use leptos_router::{History, LocationChange, State};

/// `leptos_router::History` backed by `window.location.hash`.
#[derive(Debug, Clone, Copy, Default)]
pub struct HashIntegration;

/// Map a `location.hash` value to a router path. Empty hashes route to `/`.
pub fn hash_to_path(hash: &str) -> String {
    let path = hash.strip_prefix('#').unwrap_or(hash);
    if path.is_empty() {
        "/".to_string()
    } else if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{}", path)
    }
}

/// Replace the fragment of `href` with `#{path}`.
pub fn href_with_hash(href: &str, path: &str) -> String {
    let base = href.split('#').next().unwrap_or(href);
    format!("{}#{}", base, path)
}

fn current_path() -> String {
    hash_to_path(&window().location().hash().unwrap_or_default())
}

fn location_change(value: String) -> LocationChange {
    LocationChange {
        value,
        replace: true,
        scroll: true,
        state: State::default(),
    }
}

impl History for HashIntegration {
    fn location(&self) -> ReadSignal<LocationChange> {
        let (location, set_location) = create_signal(location_change(current_path()));

        window_event_listener_untyped("hashchange", move |_| {
            set_location.set(location_change(current_path()));
        });

        location
    }

    fn navigate(&self, loc: &LocationChange) {
        let location = window().location();
        // Both paths fire `hashchange`, which updates the location signal.
        if loc.replace {
            if let Ok(href) = location.href() {
                let _ = location.replace(&href_with_hash(&href, &loc.value));
            }
        } else {
            let _ = location.set_hash(&loc.value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_to_path() {
        assert_eq!(hash_to_path(""), "/");
        assert_eq!(hash_to_path("#"), "/");
        assert_eq!(hash_to_path("#/"), "/");
        assert_eq!(hash_to_path("#/options"), "/options");
        assert_eq!(hash_to_path("#notconfigured"), "/notconfigured");
    }

    #[test]
    fn test_href_with_hash() {
        assert_eq!(
            href_with_hash("chrome-extension://abc/index.html#/", "/options"),
            "chrome-extension://abc/index.html#/options"
        );
        assert_eq!(
            href_with_hash("moz-extension://abc/index.html", "/"),
            "moz-extension://abc/index.html#/"
        );
    }
}
