use reqwest::Client as HttpClient;
use serde::{ Deserialize, Serialize };
use async_trait::async_trait;
use std::error::Error as StdError;
use super::{ endpoint, CompletionBackend, CompletionRequest, CompletionResponse };
use crate::llama::format::BOS;
use crate::llm::LlmConfig;
use log::debug;

/// Client for the llama.cpp HTTP server (`llama-server`).
#[derive(Debug)]
pub struct LlamaCppClient {
    http: HttpClient,
    base_url: String,
    model: String,
}

#[derive(Serialize)]
struct CompletionPayload<'a> {
    prompt: &'a str,
    temperature: f32,
    top_p: f32,
    n_predict: usize,
    seed: u64,
    stream: bool,
}

#[derive(Deserialize)]
struct CompletionReply {
    content: String,
}

#[derive(Serialize)]
struct TokenizePayload<'a> {
    content: &'a str,
    add_special: bool,
}

#[derive(Deserialize)]
struct TokenizeReply {
    tokens: Vec<serde_json::Value>,
}

/// The server prepends the model's BOS to string prompts itself.
fn without_leading_bos(prompt: &str) -> &str {
    prompt.strip_prefix(BOS).unwrap_or(prompt)
}

impl LlamaCppClient {
    pub fn new(base_url: Option<String>, model: Option<String>) -> Self {
        let url = base_url.unwrap_or_else(|| "http://127.0.0.1:8080".into());
        Self {
            http: HttpClient::new(),
            base_url: url,
            model: model.unwrap_or_else(|| "llama-2-7b-chat".to_string()),
        }
    }

    pub fn from_config(config: &LlmConfig) -> Result<Self, Box<dyn StdError + Send + Sync>> {
        if config.llm_type != crate::llm::LlmType::LlamaCpp {
            return Err("Invalid config type for LlamaCppClient".into());
        }

        Ok(Self::new(config.base_url.clone(), config.completion_model.clone()))
    }
}

#[async_trait]
impl CompletionBackend for LlamaCppClient {
    async fn complete(
        &self,
        request: &CompletionRequest
    ) -> Result<CompletionResponse, Box<dyn StdError + Send + Sync>> {
        let url = endpoint(&self.base_url, "/completion")?;
        let payload = CompletionPayload {
            prompt: without_leading_bos(&request.prompt),
            temperature: request.temperature,
            top_p: request.top_p,
            n_predict: request.max_tokens,
            seed: request.seed,
            stream: false,
        };
        debug!("POST {} (n_predict={})", url, request.max_tokens);
        let reply = self.http
            .post(url)
            .json(&payload)
            .send().await?
            .error_for_status()?
            .json::<CompletionReply>().await?;
        Ok(CompletionResponse { response: reply.content })
    }

    async fn count_tokens(
        &self,
        text: &str
    ) -> Result<Option<usize>, Box<dyn StdError + Send + Sync>> {
        let url = endpoint(&self.base_url, "/tokenize")?;
        let reply = self.http
            .post(url)
            .json(
                &(TokenizePayload {
                    content: without_leading_bos(text),
                    add_special: true,
                })
            )
            .send().await?
            .error_for_status()?
            .json::<TokenizeReply>().await?;
        Ok(Some(reply.tokens.len()))
    }

    fn get_model(&self) -> String {
        self.model.clone()
    }

    fn get_base_url(&self) -> Option<String> {
        Some(self.base_url.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_the_first_bos_is_left_to_the_server() {
        assert_eq!(
            without_leading_bos("<s>[INST] a [/INST] b </s><s>[INST] c [/INST]"),
            "[INST] a [/INST] b </s><s>[INST] c [/INST]"
        );
        assert_eq!(without_leading_bos("[INST] hi [/INST]"), "[INST] hi [/INST]");
    }
}
