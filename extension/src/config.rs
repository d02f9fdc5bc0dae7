//! Extension settings persisted in `localStorage`.

const ADDRESS_KEY: &str = "hoard_address";
const API_KEY_KEY: &str = "hoard_api_key";

/// Server address and API key. Both are required to save bookmarks.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExtensionConfig {
    pub address: String,
    pub api_key: String,
}

impl ExtensionConfig {
    /// Build a config from user input, or `None` if either field is blank.
    pub fn new(address: &str, api_key: &str) -> Option<Self> {
        let address = normalize_address(address);
        let api_key = api_key.trim().to_string();
        (!address.is_empty() && !api_key.is_empty()).then_some(Self { address, api_key })
    }

    /// `POST` target for new bookmarks.
    pub fn bookmarks_endpoint(&self) -> String {
        format!("{}/api/v1/bookmarks", self.address)
    }
}

/// Trim whitespace and trailing slashes.
pub fn normalize_address(address: &str) -> String {
    address.trim().trim_end_matches('/').to_string()
}

fn storage() -> Option<web_sys::Storage> {
    web_sys::window()?.local_storage().ok().flatten()
}

/// Load the saved config, if complete.
pub fn load() -> Option<ExtensionConfig> {
    let storage = storage()?;
    let address = storage.get_item(ADDRESS_KEY).ok().flatten()?;
    let api_key = storage.get_item(API_KEY_KEY).ok().flatten()?;
    ExtensionConfig::new(&address, &api_key)
}

/// Persist the config. Returns false if storage is unavailable.
pub fn save(config: &ExtensionConfig) -> bool {
    let Some(storage) = storage() else {
        return false;
    };
    storage.set_item(ADDRESS_KEY, &config.address).is_ok()
        && storage.set_item(API_KEY_KEY, &config.api_key).is_ok()
}

/// Forget the saved config.
pub fn clear() {
    if let Some(storage) = storage() {
        let _ = storage.remove_item(ADDRESS_KEY);
        let _ = storage.remove_item(API_KEY_KEY);
    }
}

/// Saved address (possibly without a key), for pre-filling the options form.
pub fn saved_address() -> String {
    storage()
        .and_then(|s| s.get_item(ADDRESS_KEY).ok().flatten())
        .unwrap_or_default()
}
