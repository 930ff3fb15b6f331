pub mod llamacpp;
pub mod ollama;
pub mod openai;

use async_trait::async_trait;
use serde::Deserialize;
use std::error::Error as StdError;
use std::sync::Arc;
use url::Url;
use super::{ LlmConfig, LlmType };
use self::llamacpp::LlamaCppClient;
use self::ollama::OllamaClient;
use self::openai::OpenAICompletionClient;

#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub prompt: String,
    pub temperature: f32,
    pub top_p: f32,
    pub max_tokens: usize,
    pub seed: u64,
}

#[derive(Deserialize, Debug, Clone)]
pub struct CompletionResponse {
    pub response: String,
}

/// A runtime that serves the checkpoint and continues raw prompts.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete(
        &self,
        request: &CompletionRequest
    ) -> Result<CompletionResponse, Box<dyn StdError + Send + Sync>>;

    /// Prompt length in model tokens, when the runtime exposes its tokenizer.
    async fn count_tokens(
        &self,
        _text: &str
    ) -> Result<Option<usize>, Box<dyn StdError + Send + Sync>> {
        Ok(None)
    }

    fn get_model(&self) -> String;
    fn get_base_url(&self) -> Option<String>;
}

pub fn new_backend(
    config: &LlmConfig
) -> Result<Arc<dyn CompletionBackend>, Box<dyn StdError + Send + Sync>> {
    let backend: Arc<dyn CompletionBackend> = match config.llm_type {
        LlmType::LlamaCpp => {
            let specific_client = LlamaCppClient::from_config(config)?;
            Arc::new(specific_client)
        }
        LlmType::Ollama => {
            let specific_client = OllamaClient::from_config(config)?;
            Arc::new(specific_client)
        }
        LlmType::OpenAI => {
            let specific_client = OpenAICompletionClient::from_config(config)?;
            Arc::new(specific_client)
        }
    };
    Ok(backend)
}

pub(crate) fn endpoint(base_url: &str, route: &str) -> Result<Url, Box<dyn StdError + Send + Sync>> {
    let joined = format!("{}{}", base_url.trim_end_matches('/'), route);
    Url::parse(&joined).map_err(|e| format!("Invalid endpoint URL '{}': {}", joined, e).into())
}
