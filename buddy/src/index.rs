use std::{cmp::Ordering, sync::Arc};

use anyhow::{bail, Result};
use tracing::{debug, warn};

use crate::{ingest::Chunk, openai::Embedder};

#[derive(Debug, Clone, serde::Serialize)]
pub struct ScoredChunk {
    pub score: f32,
    pub chunk: Chunk,
}

struct Entry {
    chunk: Chunk,
    vector: Vec<f32>,
}

/// In-memory similarity index over chunk embeddings. Built once, then read-only.
pub struct Index {
    embedder: Arc<dyn Embedder>,
    entries: Vec<Entry>,
}

impl Index {
    /// Embeds every chunk and keeps the vectors in memory.
    ///
    /// # Errors
    ///
    /// Fails if the embedder errors or returns vectors that don't line up with the chunks.
    pub async fn build(chunks: Vec<Chunk>, embedder: Arc<dyn Embedder>) -> Result<Self> {
        if chunks.is_empty() {
            warn!("Building an index without any chunks");

            return Ok(Self {
                embedder,
                entries: Vec::new(),
            });
        }

        let texts = chunks.iter().map(|c| c.text.clone()).collect::<Vec<_>>();
        let vectors = embedder.embed(&texts).await?;

        if vectors.len() != chunks.len() {
            bail!(
                "Embedder returned {} vectors for {} chunks",
                vectors.len(),
                chunks.len()
            );
        }

        let dimensions = vectors[0].len();
        if vectors.iter().any(|v| v.len() != dimensions) {
            bail!("Embedder returned vectors of mixed dimensions");
        }

        debug!("Indexed {} chunks ({dimensions} dimensions)", chunks.len());

        Ok(Self {
            embedder,
            entries: chunks
                .into_iter()
                .zip(vectors)
                .map(|(chunk, vector)| Entry { chunk, vector })
                .collect(),
        })
    }

    /// Returns the `count` chunks most similar to `query`, best first.
    ///
    /// # Errors
    ///
    /// Fails if the query cannot be embedded.
    pub async fn search(&self, query: &str, count: usize) -> Result<Vec<ScoredChunk>> {
        if self.entries.is_empty() || count == 0 {
            return Ok(Vec::new());
        }

        let query_vector = self
            .embedder
            .embed(&[query.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| anyhow::anyhow!("Could not find embedding"))?;

        let mut results = self
            .entries
            .iter()
            .map(|entry| ScoredChunk {
                score: cosine_similarity(&query_vector, &entry.vector),
                chunk: entry.chunk.clone(),
            })
            .collect::<Vec<_>>();

        results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        results.truncate(count);

        Ok(results)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot = a.iter().zip(b).map(|(x, y)| x * y).sum::<f32>();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a * norm_b)
}
