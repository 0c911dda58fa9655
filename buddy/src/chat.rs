use std::sync::Arc;

use anyhow::Result;
use tracing::{debug, info};

use crate::{
    flights::{format_search, FlightSearch},
    history::History,
    index::Index,
    intent,
    openai::ChatModel,
    prompt::{build_answer_prompt, build_rewrite_prompt},
};

pub const NO_ANSWER: &str = "No answer found";

/// Answers questions from an indexed page, with a shortcut to flight search.
pub struct Assistant {
    llm: Arc<dyn ChatModel>,
    index: Index,
    flights: Arc<dyn FlightSearch>,
    top_k: usize,
}

impl Assistant {
    pub fn new(
        llm: Arc<dyn ChatModel>,
        index: Index,
        flights: Arc<dyn FlightSearch>,
        top_k: usize,
    ) -> Self {
        Self {
            llm,
            index,
            flights,
            top_k,
        }
    }

    /// Answers one user turn. The caller records the exchange in `history`.
    ///
    /// # Errors
    ///
    /// Fails if the LLM or the embeddings API return an error.
    pub async fn respond(&self, question: &str, history: &History) -> Result<String> {
        if let Some(query) = intent::flight_request(question) {
            info!(
                "Searching flights {} -> {} on {}",
                query.origin, query.destination, query.departure_date
            );

            let search = self.flights.search(&query).await;
            return Ok(format_search(&search));
        }

        let search_query = self.standalone_question(question, history).await?;
        let context = self.index.search(&search_query, self.top_k).await?;
        debug!("Retrieved {} chunks for {search_query:?}", context.len());

        let answer = self
            .llm
            .complete(&build_answer_prompt(&context, history, question))
            .await?;

        Ok(answer
            .filter(|answer| !answer.trim().is_empty())
            .unwrap_or_else(|| NO_ANSWER.to_string()))
    }

    async fn standalone_question(&self, question: &str, history: &History) -> Result<String> {
        if history.is_empty() {
            return Ok(question.to_string());
        }

        let rewritten = self
            .llm
            .complete(&build_rewrite_prompt(history, question))
            .await?
            .map(|query| query.trim().to_string())
            .filter(|query| !query.is_empty());

        Ok(rewritten.unwrap_or_else(|| question.to_string()))
    }
}
