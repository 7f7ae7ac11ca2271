use thiserror::Error;
use tracing::debug;

use crate::dom::node::Document;

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Failed to read page '{path}': {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to fetch page '{url}': {source}")]
    Fetch { url: String, source: reqwest::Error },

    #[error("Fetching page '{url}' returned status {status}")]
    Status { url: String, status: u16 },
}

pub fn is_remote(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

/// Load a page from a local file path or an http(s) URL and parse it.
pub async fn load_page(source: &str) -> Result<Document, DocumentError> {
    let html = if is_remote(source) {
        fetch(source).await?
    } else {
        tokio::fs::read_to_string(source)
            .await
            .map_err(|e| DocumentError::Read {
                path: source.to_string(),
                source: e,
            })?
    };
    debug!(source, bytes = html.len(), "page loaded");
    Ok(Document::parse(&html))
}

async fn fetch(url: &str) -> Result<String, DocumentError> {
    let response = reqwest::get(url).await.map_err(|e| DocumentError::Fetch {
        url: url.to_string(),
        source: e,
    })?;

    if !response.status().is_success() {
        return Err(DocumentError::Status {
            url: url.to_string(),
            status: response.status().as_u16(),
        });
    }

    response.text().await.map_err(|e| DocumentError::Fetch {
        url: url.to_string(),
        source: e,
    })
}
