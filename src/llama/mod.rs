pub mod checkpoint;
pub mod format;

use futures::future::try_join_all;
use log::{ debug, info, warn };
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use crate::error::{ LlamaError, Result };
use crate::llm::backend::{ CompletionBackend, CompletionRequest };
use crate::models::chat::{ ChatPrediction, Dialog, Message };
use self::checkpoint::{ validate_tokenizer, Checkpoint };
use self::format::{ is_unsafe, normalize, render_prompt, UNSAFE_ERROR };

#[derive(Debug, Clone)]
pub struct BuildOptions {
    pub ckpt_dir: PathBuf,
    pub tokenizer_path: PathBuf,
    pub max_seq_len: usize,
    pub max_batch_size: usize,
    pub seed: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SamplingParams {
    pub temperature: f32,
    pub top_p: f32,
    /// `None` lets a reply run to the end of the context window.
    pub max_gen_len: Option<usize>,
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self {
            temperature: 0.6,
            top_p: 0.9,
            max_gen_len: None,
        }
    }
}

impl SamplingParams {
    fn validate(&self) -> Result<()> {
        if !(self.temperature >= 0.0) {
            return Err(
                LlamaError::InvalidSampling(
                    format!("temperature must be >= 0, got {}", self.temperature)
                )
            );
        }
        if !(self.top_p > 0.0 && self.top_p <= 1.0) {
            return Err(
                LlamaError::InvalidSampling(format!("top_p must be in (0, 1], got {}", self.top_p))
            );
        }
        if self.max_gen_len == Some(0) {
            return Err(LlamaError::InvalidSampling("max_gen_len must be positive".to_string()));
        }
        Ok(())
    }
}

enum PreparedDialog {
    Rejected,
    Prompt(String),
}

/// Chat generator over a Llama 2 checkpoint served by an inference runtime.
pub struct Llama {
    max_seq_len: usize,
    max_batch_size: usize,
    seed: u64,
    backend: Arc<dyn CompletionBackend>,
}

impl Llama {
    pub fn build(options: BuildOptions, backend: Arc<dyn CompletionBackend>) -> Result<Self> {
        let start = Instant::now();

        if options.max_seq_len < 2 {
            return Err(
                LlamaError::InvalidSampling(
                    format!("max_seq_len must be at least 2, got {}", options.max_seq_len)
                )
            );
        }
        if options.max_batch_size == 0 {
            return Err(LlamaError::InvalidSampling("max_batch_size must be positive".to_string()));
        }

        let checkpoint = Checkpoint::discover(&options.ckpt_dir)?;
        validate_tokenizer(&options.tokenizer_path)?;

        info!(
            "Model: dim={} n_layers={} n_heads={} shards={} (model parallel size)",
            checkpoint.params.dim,
            checkpoint.params.n_layers,
            checkpoint.params.n_heads,
            checkpoint.model_parallel_size()
        );
        info!(
            "Runtime: {} at {}",
            backend.get_model(),
            backend.get_base_url().unwrap_or_else(|| "-".to_string())
        );
        info!("Loaded in {:.2} seconds", start.elapsed().as_secs_f64());

        Ok(Self {
            max_seq_len: options.max_seq_len,
            max_batch_size: options.max_batch_size,
            seed: options.seed,
            backend,
        })
    }

    /// Generates one assistant reply per dialog, returned in input order.
    pub async fn chat_completion(
        &self,
        dialogs: &[Dialog],
        sampling: &SamplingParams
    ) -> Result<Vec<ChatPrediction>> {
        if dialogs.len() > self.max_batch_size {
            return Err(LlamaError::BatchTooLarge {
                size: dialogs.len(),
                max: self.max_batch_size,
            });
        }
        sampling.validate()?;
        let max_gen_len = sampling.max_gen_len.unwrap_or(self.max_seq_len - 1);

        let mut prepared = Vec::with_capacity(dialogs.len());
        for (index, dialog) in dialogs.iter().enumerate() {
            if is_unsafe(dialog) {
                warn!("Dialog #{} contains special tags, skipping generation", index);
                prepared.push(PreparedDialog::Rejected);
                continue;
            }
            let turns = normalize(dialog).map_err(|reason| LlamaError::InvalidDialog {
                index,
                reason,
            })?;
            prepared.push(PreparedDialog::Prompt(render_prompt(&turns)));
        }

        let generations = prepared.iter().enumerate().map(|(index, dialog)| async move {
            match dialog {
                PreparedDialog::Rejected => Ok(UNSAFE_ERROR.to_string()),
                PreparedDialog::Prompt(prompt) =>
                    self.generate(index, prompt, sampling, max_gen_len).await,
            }
        });
        let outputs = try_join_all(generations).await?;

        Ok(
            outputs
                .into_iter()
                .map(|content| ChatPrediction {
                    generation: Message::assistant(content),
                })
                .collect()
        )
    }

    async fn generate(
        &self,
        index: usize,
        prompt: &str,
        sampling: &SamplingParams,
        max_gen_len: usize
    ) -> Result<String> {
        let prompt_tokens = self.backend
            .count_tokens(prompt).await
            .map_err(|e| LlamaError::Backend(e.to_string()))?;

        let max_tokens = match prompt_tokens {
            Some(tokens) if tokens > self.max_seq_len => {
                return Err(LlamaError::PromptTooLong {
                    index,
                    tokens,
                    max: self.max_seq_len,
                });
            }
            Some(tokens) => max_gen_len.min(self.max_seq_len - tokens),
            None => max_gen_len,
        };
        if max_tokens == 0 {
            debug!("Dialog #{} fills the context window, nothing to generate", index);
            return Ok(String::new());
        }

        let request = CompletionRequest {
            prompt: prompt.to_string(),
            temperature: sampling.temperature,
            top_p: sampling.top_p,
            max_tokens,
            seed: self.seed,
        };
        debug!("Dialog #{}: prompt_tokens={:?} max_tokens={}", index, prompt_tokens, max_tokens);

        let completion = self.backend
            .complete(&request).await
            .map_err(|e| LlamaError::Backend(format!("dialog #{}: {}", index, e)))?;
        Ok(completion.response.trim().to_string())
    }
}
