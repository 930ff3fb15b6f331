use clap::Parser;
use std::path::PathBuf;

/// Run a batch of example chat dialogs through a Llama 2 chat checkpoint.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    // --- Model Args ---
    /// Directory containing the checkpoint shards (*.pth) and params.json.
    #[arg(env = "CKPT_DIR")]
    pub ckpt_dir: PathBuf,

    /// Path to the tokenizer model used for text encoding/decoding.
    #[arg(env = "TOKENIZER_PATH")]
    pub tokenizer_path: PathBuf,

    /// Maximum sequence length for input prompts.
    #[arg(long, env = "MAX_SEQ_LEN", default_value = "512")]
    pub max_seq_len: usize,

    /// Maximum number of dialogs generated in one batch.
    #[arg(long, env = "MAX_BATCH_SIZE", default_value = "8")]
    pub max_batch_size: usize,

    // --- Sampling Args ---
    /// Temperature controlling randomness in generation.
    #[arg(long, env = "TEMPERATURE", default_value = "0.6")]
    pub temperature: f32,

    /// Top-p (nucleus) sampling threshold.
    #[arg(long, env = "TOP_P", default_value = "0.9")]
    pub top_p: f32,

    /// Maximum length of generated replies. Defaults to max_seq_len - 1.
    #[arg(long, env = "MAX_GEN_LEN")]
    pub max_gen_len: Option<usize>,

    /// Sampling seed passed to the runtime.
    #[arg(long, env = "SEED", default_value = "1")]
    pub seed: u64,

    // --- Runtime Args ---
    /// Inference runtime serving the checkpoint (llamacpp, ollama, openai)
    #[arg(long, env = "LLM_TYPE", default_value = "llamacpp")]
    pub llm_type: String,

    /// Base URL of the runtime (e.g., http://127.0.0.1:8080 for llama.cpp)
    #[arg(long, env = "LLM_BASE_URL")] // No default, let backends handle defaults if None
    pub base_url: Option<String>,

    /// API Key for OpenAI-compatible runtimes
    #[arg(long, env = "LLM_API_KEY", default_value = "")]
    pub api_key: String,

    /// Model name as known to the runtime. Defaults to the checkpoint directory name.
    #[arg(long, env = "LLM_MODEL")]
    pub model: Option<String>,

    // --- General App Args ---
    /// JSON file with dialogs to run instead of the built-in examples.
    #[arg(long, env = "DIALOGS_PATH")]
    pub dialogs: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, env = "DEBUG", default_value = "false")]
    pub debug: bool,
}
