pub mod cli;
pub mod config;
pub mod error;
pub mod llama;
pub mod llm;
pub mod models;
pub mod report;

use cli::Args;
use config::dialogs::{ example_dialogs, load_dialogs };
use llama::{ checkpoint::model_name, BuildOptions, Llama, SamplingParams };
use llm::{ backend::new_backend, LlmConfig, LlmType };
use log::info;
use std::error::Error;
use std::io::{ self, Write };

pub async fn run(args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    run_with_output(args, &mut io::stdout()).await
}

/// Runs the batch and writes the transcript to `out`.
pub async fn run_with_output<W: Write + Send>(
    args: Args,
    out: &mut W
) -> Result<(), Box<dyn Error + Send + Sync>> {
    info!("--- Core Configuration ---");
    info!("Checkpoint Dir: {}", args.ckpt_dir.display());
    info!("Tokenizer Path: {}", args.tokenizer_path.display());
    info!("Max Seq Len: {}", args.max_seq_len);
    info!("Max Batch Size: {}", args.max_batch_size);
    info!("Temperature: {}", args.temperature);
    info!("Top P: {}", args.top_p);
    match args.max_gen_len {
        Some(len) => info!("Max Gen Len: {}", len),
        None => info!("Max Gen Len: max_seq_len - 1"),
    }
    info!("Seed: {}", args.seed);
    info!("LLM Type: {}", args.llm_type);
    if let Some(base_url) = &args.base_url {
        info!("LLM Base URL: {}", base_url);
    }
    if let Some(path) = &args.dialogs {
        info!("Dialogs Path: {}", path.display());
    }
    info!("-------------------------");

    let llm_type: LlmType = args.llm_type.parse()?;
    let llm_config = LlmConfig {
        llm_type,
        api_key: Some(args.api_key.clone()).filter(|k| !k.is_empty()),
        completion_model: args.model.clone().or_else(|| model_name(&args.ckpt_dir)),
        base_url: args.base_url.clone(),
    };
    let backend = new_backend(&llm_config)?;

    let generator = Llama::build(
        BuildOptions {
            ckpt_dir: args.ckpt_dir.clone(),
            tokenizer_path: args.tokenizer_path.clone(),
            max_seq_len: args.max_seq_len,
            max_batch_size: args.max_batch_size,
            seed: args.seed,
        },
        backend
    )?;

    let dialogs = match &args.dialogs {
        Some(path) => load_dialogs(path)?,
        None => example_dialogs(),
    };

    let sampling = SamplingParams {
        temperature: args.temperature,
        top_p: args.top_p,
        max_gen_len: args.max_gen_len,
    };
    let results = generator.chat_completion(&dialogs, &sampling).await?;

    let transcript = report::render_transcript(&dialogs, &results)?;
    out.write_all(transcript.as_bytes())?;
    out.flush()?;

    Ok(())
}
