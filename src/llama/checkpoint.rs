use serde::{ Deserialize, Serialize };
use std::fs;
use std::path::{ Path, PathBuf };
use log::debug;

use crate::error::{ LlamaError, Result };

/// Architecture hyper-parameters read from `params.json`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ModelParams {
    pub dim: usize,
    pub n_layers: usize,
    pub n_heads: usize,
    #[serde(default)]
    pub n_kv_heads: Option<usize>,
    #[serde(default = "default_vocab_size")]
    pub vocab_size: i64,
    #[serde(default = "default_multiple_of")]
    pub multiple_of: usize,
    #[serde(default)]
    pub ffn_dim_multiplier: Option<f64>,
    #[serde(default = "default_norm_eps")]
    pub norm_eps: f64,
}

fn default_vocab_size() -> i64 {
    -1
}

fn default_multiple_of() -> usize {
    256
}

fn default_norm_eps() -> f64 {
    1e-5
}

#[derive(Debug, Clone)]
pub struct Checkpoint {
    pub dir: PathBuf,
    pub shards: Vec<PathBuf>,
    pub params: ModelParams,
}

impl Checkpoint {
    /// Locates the `*.pth` shards and `params.json` inside `ckpt_dir`.
    pub fn discover<P: AsRef<Path>>(ckpt_dir: P) -> Result<Self> {
        let dir = ckpt_dir.as_ref();
        if !dir.is_dir() {
            return Err(
                LlamaError::Checkpoint(format!("{} is not a directory", dir.display()))
            );
        }

        let mut shards = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.is_file() && path.extension().map(|ext| ext == "pth").unwrap_or(false) {
                shards.push(path);
            }
        }
        shards.sort();

        if shards.is_empty() {
            return Err(
                LlamaError::Checkpoint(format!("no checkpoint files found in {}", dir.display()))
            );
        }

        let params_path = dir.join("params.json");
        let raw = fs
            ::read_to_string(&params_path)
            .map_err(|e| {
                LlamaError::Checkpoint(format!("failed to read {}: {}", params_path.display(), e))
            })?;
        let params: ModelParams = serde_json
            ::from_str(&raw)
            .map_err(|e| {
                LlamaError::Checkpoint(format!("failed to parse {}: {}", params_path.display(), e))
            })?;

        debug!("Found {} checkpoint shard(s) in {}", shards.len(), dir.display());
        Ok(Self { dir: dir.to_path_buf(), shards, params })
    }

    pub fn model_parallel_size(&self) -> usize {
        self.shards.len()
    }
}

/// Directory name, used as the served model name when none is configured.
pub fn model_name<P: AsRef<Path>>(ckpt_dir: P) -> Option<String> {
    ckpt_dir
        .as_ref()
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .filter(|name| !name.is_empty())
}

pub fn validate_tokenizer<P: AsRef<Path>>(tokenizer_path: P) -> Result<PathBuf> {
    let path = tokenizer_path.as_ref();
    if !path.is_file() {
        return Err(LlamaError::Tokenizer(format!("tokenizer model not found at {}", path.display())));
    }
    Ok(path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PARAMS: &str =
        r#"{"dim": 4096, "multiple_of": 256, "n_heads": 32, "n_layers": 32, "norm_eps": 1e-05, "vocab_size": -1}"#;

    #[test]
    fn discovers_sorted_shards_and_params() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("consolidated.01.pth"), b"").unwrap();
        fs::write(dir.path().join("consolidated.00.pth"), b"").unwrap();
        fs::write(dir.path().join("checklist.chk"), b"").unwrap();
        fs::write(dir.path().join("params.json"), PARAMS).unwrap();

        let checkpoint = Checkpoint::discover(dir.path()).unwrap();
        assert_eq!(checkpoint.model_parallel_size(), 2);
        assert!(checkpoint.shards[0].ends_with("consolidated.00.pth"));
        assert_eq!(checkpoint.params.dim, 4096);
        assert_eq!(checkpoint.params.n_kv_heads, None);
    }

    #[test]
    fn only_regular_pth_files_count_as_shards() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("stale.pth")).unwrap();
        fs::write(dir.path().join("consolidated.00.pth"), b"").unwrap();
        fs::write(dir.path().join("params.json"), PARAMS).unwrap();

        let checkpoint = Checkpoint::discover(dir.path()).unwrap();
        assert_eq!(checkpoint.shards, vec![dir.path().join("consolidated.00.pth")]);
    }

    #[test]
    fn missing_directory_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let err = Checkpoint::discover(dir.path().join("absent")).unwrap_err();
        assert!(matches!(err, LlamaError::Checkpoint(msg) if msg.contains("not a directory")));
    }

    #[test]
    fn missing_shards_are_reported() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("params.json"), PARAMS).unwrap();

        let err = Checkpoint::discover(dir.path()).unwrap_err();
        assert!(err.to_string().contains("no checkpoint files found"));
    }

    #[test]
    fn missing_params_are_reported() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("consolidated.00.pth"), b"").unwrap();

        let err = Checkpoint::discover(dir.path()).unwrap_err();
        assert!(matches!(err, LlamaError::Checkpoint(msg) if msg.contains("params.json")));
    }

    #[test]
    fn tokenizer_must_be_a_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(validate_tokenizer(dir.path()).is_err());

        let model = dir.path().join("tokenizer.model");
        fs::write(&model, b"").unwrap();
        assert_eq!(validate_tokenizer(&model).unwrap(), model);
    }

    #[test]
    fn model_name_comes_from_directory() {
        assert_eq!(model_name("/models/llama-2-7b-chat/"), Some("llama-2-7b-chat".to_string()));
        assert_eq!(model_name("/"), None);
    }
}
