//! HTTP client for the hoard server.

use gloo_net::http::Request;

use crate::config::ExtensionConfig;

#[derive(Debug, serde::Serialize)]
struct CreateBookmarkRequest<'a> {
    url: &'a str,
}

#[derive(Debug, serde::Deserialize)]
pub struct CreatedBookmark {
    pub id: String,
}

#[derive(Debug, serde::Deserialize)]
struct ApiError {
    error: String,
}

/// Save `url` as a link bookmark.
pub async fn save_bookmark(config: &ExtensionConfig, url: &str) -> Result<CreatedBookmark, String> {
    let response = Request::post(&config.bookmarks_endpoint())
        .header("Authorization", &format!("Bearer {}", config.api_key))
        .json(&CreateBookmarkRequest { url })
        .map_err(|e| format!("Request build error: {}", e))?
        .send()
        .await
        .map_err(|e| format!("Network error: {}", e))?;

    if !response.ok() {
        let status = response.status();
        let error = response
            .json::<ApiError>()
            .await
            .map(|e| e.error)
            .unwrap_or_else(|_| "Unknown error".to_string());
        return Err(format!("Server returned {}: {}", status, error));
    }

    response
        .json()
        .await
        .map_err(|e| format!("Parse error: {}", e))
}
