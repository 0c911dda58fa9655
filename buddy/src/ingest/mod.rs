mod splitter;

use std::time::Duration;

use anyhow::{anyhow, Result};
use dom_manipulator::{Html, Selector};
use reqwest::{
    header::{self, HeaderMap, HeaderValue},
    Client,
};
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::IngestConfig;
pub use splitter::{split, CHUNK_OVERLAP, CHUNK_SIZE};

/// A slice of an ingested page, the unit of retrieval.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Chunk {
    pub id: Uuid,
    pub position: usize,
    pub text: String,
    pub source: String,
}

/// Fetches a page and splits its text into overlapping chunks.
///
/// # Errors
///
/// Fails if the page cannot be fetched or returns a non-success status.
pub async fn ingest(url: &str, config: &IngestConfig) -> Result<Vec<Chunk>> {
    let html = fetch(url, config).await?;
    let chunks = into_chunks(url, &extract_text(&html));

    info!("Number of split documents: {}", chunks.len());

    Ok(chunks)
}

/// Splits already extracted text into chunks attributed to `source`.
#[must_use]
pub fn into_chunks(source: &str, text: &str) -> Vec<Chunk> {
    split(text, CHUNK_SIZE, CHUNK_OVERLAP)
        .into_iter()
        .enumerate()
        .map(|(position, text)| Chunk {
            id: Uuid::new_v4(),
            position,
            text,
            source: source.to_string(),
        })
        .collect()
}

fn client(config: &IngestConfig) -> Result<Client> {
    let mut headers = HeaderMap::new();
    headers.insert(header::CONNECTION, HeaderValue::from_static("keep-alive"));

    Ok(Client::builder()
        .gzip(true)
        .brotli(true)
        .default_headers(headers)
        .user_agent(&config.user_agent)
        .tcp_keepalive(Duration::from_millis(500))
        .build()?)
}

async fn fetch(url: &str, config: &IngestConfig) -> Result<String> {
    debug!("Fetching {url}");

    let response = client(config)?
        .get(url)
        .send()
        .await?
        .error_for_status()?;

    Ok(response.text().await?)
}

/// Extracts the visible text of a page, one trimmed non-empty line at a time.
pub fn extract_text(html: &str) -> String {
    let dom = Html::parse_document(html);

    let text = match body_selector() {
        Ok(selector) => dom.select(&selector).next().map_or_else(
            || dom.root_element().text().collect::<Vec<_>>(),
            |body| body.text().collect::<Vec<_>>(),
        ),
        Err(err) => {
            debug!("{err}");
            dom.root_element().text().collect::<Vec<_>>()
        }
    };

    text.concat()
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn body_selector() -> Result<Selector> {
    Selector::parse("body").map_err(|_| anyhow!("Failed to parse selector"))
}
