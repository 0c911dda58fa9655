use std::{env, str::FromStr};

use thiserror::Error;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (compatible; MyBot/1.0)";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("${0} not set")]
    Missing(&'static str),

    #[error("${name} is invalid: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Everything the console assistant needs, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub llm: LlmConfig,
    pub embeddings: EmbeddingConfig,
    pub amadeus: AmadeusConfig,
    pub ingest: IngestConfig,
    pub chat: ChatConfig,
}

#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_key: String,
    pub api_base: String,
    pub model: String,
    pub temperature: f32,
}

#[derive(Debug, Clone)]
pub struct EmbeddingConfig {
    pub api_key: String,
    pub api_base: String,
    pub model: String,
}

#[derive(Debug, Clone)]
pub struct AmadeusConfig {
    pub client_id: String,
    pub client_secret: String,
    pub base_url: String,
}

#[derive(Debug, Clone)]
pub struct IngestConfig {
    pub user_agent: String,
}

#[derive(Debug, Clone)]
pub struct ChatConfig {
    pub history_max_exchanges: usize,
    pub top_k: usize,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            history_max_exchanges: 10,
            top_k: 4,
        }
    }
}

struct Vars<F>(F);

impl<F: Fn(&str) -> Option<String>> Vars<F> {
    fn get(&self, name: &str) -> Option<String> {
        (self.0)(name).filter(|value| !value.trim().is_empty())
    }

    fn required(&self, name: &'static str) -> Result<String, ConfigError> {
        self.get(name).ok_or(ConfigError::Missing(name))
    }

    fn or(&self, name: &str, default: &str) -> String {
        self.get(name).unwrap_or_else(|| default.to_string())
    }

    fn parsed<T>(&self, name: &'static str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.get(name).map_or(Ok(default), |value| {
            value.trim().parse().map_err(|err: T::Err| ConfigError::Invalid {
                name,
                reason: err.to_string(),
            })
        })
    }
}

fn process_env(name: &str) -> Option<String> {
    env::var(name).ok()
}

impl Config {
    /// Loads the full configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns the first missing or malformed variable.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(process_env)
    }

    /// Loads the configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns the first missing or malformed variable.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let vars = Vars(lookup);

        Ok(Self {
            llm: LlmConfig::load(&vars)?,
            embeddings: EmbeddingConfig::load(&vars)?,
            amadeus: AmadeusConfig::load(&vars)?,
            ingest: IngestConfig::load(&vars),
            chat: ChatConfig::load(&vars)?,
        })
    }
}

impl LlmConfig {
    fn load<F: Fn(&str) -> Option<String>>(vars: &Vars<F>) -> Result<Self, ConfigError> {
        Ok(Self {
            api_key: vars.required("GROQ_API_KEY")?,
            api_base: vars.or("GROQ_API_BASE", "https://api.groq.com/openai/v1"),
            model: vars.or("CHAT_MODEL", "llama3-8b-8192"),
            temperature: vars.parsed("CHAT_TEMPERATURE", 0.7)?,
        })
    }
}

impl EmbeddingConfig {
    fn load<F: Fn(&str) -> Option<String>>(vars: &Vars<F>) -> Result<Self, ConfigError> {
        Ok(Self {
            api_key: vars.required("OPENAI_API_KEY")?,
            api_base: vars.or("OPENAI_API_BASE", "https://api.openai.com/v1"),
            model: vars.or("EMBEDDING_MODEL", "text-embedding-ada-002"),
        })
    }
}

impl AmadeusConfig {
    /// Loads only the travel API credentials, for processes that never talk to the LLM.
    ///
    /// # Errors
    ///
    /// Fails if either credential is missing.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::load(&Vars(process_env))
    }

    fn load<F: Fn(&str) -> Option<String>>(vars: &Vars<F>) -> Result<Self, ConfigError> {
        Ok(Self {
            client_id: vars.required("AMADEUS_API_KEY")?,
            client_secret: vars.required("AMADEUS_API_SECRET")?,
            base_url: vars
                .or("AMADEUS_BASE_URL", "https://test.api.amadeus.com")
                .trim_end_matches('/')
                .to_string(),
        })
    }
}

impl IngestConfig {
    #[must_use]
    pub fn from_env() -> Self {
        Self::load(&Vars(process_env))
    }

    fn load<F: Fn(&str) -> Option<String>>(vars: &Vars<F>) -> Self {
        Self {
            user_agent: vars.or("USER_AGENT", DEFAULT_USER_AGENT),
        }
    }
}

impl ChatConfig {
    fn load<F: Fn(&str) -> Option<String>>(vars: &Vars<F>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        Ok(Self {
            history_max_exchanges: vars
                .parsed("HISTORY_MAX_EXCHANGES", defaults.history_max_exchanges)?,
            top_k: vars.parsed("RETRIEVAL_TOP_K", defaults.top_k)?,
        })
    }
}
