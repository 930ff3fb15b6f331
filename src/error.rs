use thiserror::Error;

#[derive(Debug, Error)]
pub enum LlamaError {
    #[error("checkpoint error: {0}")]
    Checkpoint(String),
    #[error("tokenizer error: {0}")]
    Tokenizer(String),
    #[error("invalid dialog #{index}: {reason}")]
    InvalidDialog { index: usize, reason: String },
    #[error("batch of {size} dialogs exceeds max batch size {max}")]
    BatchTooLarge { size: usize, max: usize },
    #[error("prompt of dialog #{index} is {tokens} tokens, max sequence length is {max}")]
    PromptTooLong { index: usize, tokens: usize, max: usize },
    #[error("invalid sampling parameters: {0}")]
    InvalidSampling(String),
    #[error("got {results} results for {dialogs} dialogs")]
    ResultCountMismatch { dialogs: usize, results: usize },
    #[error("inference backend error: {0}")]
    Backend(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, LlamaError>;
