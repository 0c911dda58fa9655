use std::{sync::Arc, time::Duration};

use anyhow::Result;
use async_openai::{
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestMessage, ChatCompletionRequestMessageArgs,
        CreateChatCompletionRequestArgs, CreateEmbeddingRequestArgs, Role as OpenAIRole,
    },
    Client,
};
use async_trait::async_trait;
use backoff::ExponentialBackoffBuilder;
use futures::future;
use tracing::debug;

use crate::{
    config::{EmbeddingConfig, LlmConfig},
    history::{Message, Role},
};

const EMBEDDING_BATCH_SIZE: usize = 100;

/// Turns texts into vectors of a fixed dimensionality.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embeds every text, returning one vector per input in the same order.
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}

/// A chat completion model. `None` means the model produced no answer.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn complete(&self, messages: &[Message]) -> Result<Option<String>>;
}

fn client(api_key: &str, api_base: &str) -> Client<OpenAIConfig> {
    let backoff = ExponentialBackoffBuilder::new()
        .with_max_elapsed_time(Some(Duration::from_secs(60)))
        .build();

    Client::with_config(
        OpenAIConfig::new()
            .with_api_key(api_key)
            .with_api_base(api_base),
    )
    .with_backoff(backoff)
}

/// Chat completions against any OpenAI-compatible endpoint (Groq by default).
pub struct OpenAI {
    client: Arc<Client<OpenAIConfig>>,
    model: String,
    temperature: f32,
}

impl OpenAI {
    #[must_use]
    pub fn new(config: &LlmConfig) -> Self {
        Self {
            client: Arc::new(client(&config.api_key, &config.api_base)),
            model: config.model.clone(),
            temperature: config.temperature,
        }
    }
}

impl From<Role> for OpenAIRole {
    fn from(role: Role) -> Self {
        match role {
            Role::System => Self::System,
            Role::User => Self::User,
            Role::Assistant => Self::Assistant,
        }
    }
}

#[async_trait]
impl ChatModel for OpenAI {
    async fn complete(&self, messages: &[Message]) -> Result<Option<String>> {
        let messages = messages
            .iter()
            .map(|message| {
                ChatCompletionRequestMessageArgs::default()
                    .role(OpenAIRole::from(message.role))
                    .content(message.content.clone())
                    .build()
            })
            .collect::<Result<Vec<ChatCompletionRequestMessage>, _>>()?;

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .temperature(self.temperature)
            .messages(messages)
            .build()?;

        let response = self.client.chat().create(request).await?;

        Ok(response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content))
    }
}

/// Embeddings through the OpenAI embeddings API.
pub struct OpenAIEmbeddings {
    client: Arc<Client<OpenAIConfig>>,
    model: String,
}

impl OpenAIEmbeddings {
    #[must_use]
    pub fn new(config: &EmbeddingConfig) -> Self {
        Self {
            client: Arc::new(client(&config.api_key, &config.api_base)),
            model: config.model.clone(),
        }
    }

    async fn embed_batch(&self, batch: &[String]) -> Result<Vec<Vec<f32>>> {
        let request = CreateEmbeddingRequestArgs::default()
            .model(&self.model)
            .input(batch.to_vec())
            .build()?;

        let mut data = self.client.embeddings().create(request).await?.data;
        data.sort_by_key(|embedding| embedding.index);

        if data.len() != batch.len() {
            anyhow::bail!(
                "Expected {} embeddings, received {}",
                batch.len(),
                data.len()
            );
        }

        Ok(data.into_iter().map(|e| e.embedding).collect())
    }
}

#[async_trait]
impl Embedder for OpenAIEmbeddings {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let batches = future::try_join_all(
            texts
                .chunks(EMBEDDING_BATCH_SIZE)
                .map(|batch| self.embed_batch(batch)),
        )
        .await?;

        debug!("Embedded {} texts", texts.len());

        Ok(batches.into_iter().flatten().collect())
    }
}
