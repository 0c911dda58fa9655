#![warn(clippy::all, clippy::pedantic, clippy::nursery)]

pub mod amadeus;
mod chat;
pub mod config;
pub mod flights;
pub mod history;
mod index;
pub mod ingest;
pub mod intent;
pub mod openai;
mod prompt;
#[cfg(test)]
mod testing;

pub use amadeus::Amadeus;
pub use chat::{Assistant, NO_ANSWER};
pub use config::{Config, ConfigError};
pub use flights::{format_search, FlightOffer, FlightQuery, FlightSearch, Search};
pub use history::History;
pub use index::{Index, ScoredChunk};
pub use ingest::{ingest, Chunk};
pub use openai::{ChatModel, Embedder, OpenAI, OpenAIEmbeddings};

use std::sync::Arc;

use anyhow::Result;

/// Ingests a page and embeds it into a fresh index.
///
/// # Errors
///
/// Fails if the page cannot be fetched or the embeddings API returns an error.
pub async fn index_page(url: &str, config: &Config) -> Result<Index> {
    let chunks = ingest(url, &config.ingest).await?;
    let embedder = Arc::new(OpenAIEmbeddings::new(&config.embeddings));

    Index::build(chunks, embedder).await
}

/// Wires the assistant together from configuration and a prepared index.
#[must_use]
pub fn assistant(config: &Config, index: Index) -> Assistant {
    Assistant::new(
        Arc::new(OpenAI::new(&config.llm)),
        index,
        Arc::new(Amadeus::new(config.amadeus.clone())),
        config.chat.top_k,
    )
}
