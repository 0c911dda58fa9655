use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Conversation so far, oldest first, capped at `max_exchanges` user/assistant pairs.
#[derive(Debug, Clone)]
pub struct History {
    messages: VecDeque<Message>,
    max_exchanges: usize,
}

impl History {
    #[must_use]
    pub fn new(max_exchanges: usize) -> Self {
        Self {
            messages: VecDeque::new(),
            max_exchanges,
        }
    }

    /// Records a completed exchange, evicting the oldest messages past the cap.
    pub fn push_exchange(&mut self, question: impl Into<String>, answer: impl Into<String>) {
        self.messages.push_back(Message::user(question));
        self.messages.push_back(Message::assistant(answer));

        while self.messages.len() > self.max_exchanges * 2 {
            self.messages.pop_front();
        }
    }

    pub fn messages(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
