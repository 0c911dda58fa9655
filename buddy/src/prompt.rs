use indoc::indoc;

use crate::{
    history::{History, Message},
    index::ScoredChunk,
};

const REWRITE_INSTRUCTION: &str = indoc! {"
    Given the above conversation, generate a search query to look up in order to get information relevant to the conversation.
    Only respond with the query, nothing else."};

/// Messages asking the model to turn a follow-up question into a standalone search query.
#[must_use]
pub fn build_rewrite_prompt(history: &History, question: &str) -> Vec<Message> {
    let mut messages = history.messages().cloned().collect::<Vec<_>>();

    messages.push(Message::user(question));
    messages.push(Message::user(REWRITE_INSTRUCTION));

    messages
}

/// Messages asking the model to answer `question` using only the retrieved context.
#[must_use]
pub fn build_answer_prompt(
    context: &[ScoredChunk],
    history: &History,
    question: &str,
) -> Vec<Message> {
    let context = context
        .iter()
        .map(|result| result.chunk.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n");

    let mut messages = vec![Message::system(format!(
        "Answer the user's question based on the context: {context}"
    ))];

    messages.extend(history.messages().cloned());
    messages.push(Message::user(question));

    messages
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{history::Role, ingest::into_chunks};

    #[test]
    fn rewrite_prompt_ends_with_instruction() {
        let mut history = History::new(5);
        history.push_exchange("what is a proton?", "a positive particle");

        let messages = build_rewrite_prompt(&history, "and its mass?");

        assert_eq!(messages.len(), 4);
        assert_eq!(messages[2], Message::user("and its mass?"));
        assert_eq!(messages[3].content, REWRITE_INSTRUCTION);
    }

    #[test]
    fn answer_prompt_embeds_context_in_system_message() {
        let context = into_chunks("https://example.com", "Protons are positive.")
            .into_iter()
            .map(|chunk| ScoredChunk { score: 1.0, chunk })
            .collect::<Vec<_>>();

        let messages = build_answer_prompt(&context, &History::new(5), "what are protons?");

        assert_eq!(messages[0].role, Role::System);
        assert_eq!(
            messages[0].content,
            "Answer the user's question based on the context: Protons are positive."
        );
        assert_eq!(messages.last(), Some(&Message::user("what are protons?")));
    }
}
