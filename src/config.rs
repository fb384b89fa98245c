use std::env;
use std::path::PathBuf;

use anyhow::Result;

use crate::embedding::download;
use crate::embedding::hashing::DEFAULT_HASH_DIM;

/// Which embedding backend to use.
#[derive(Debug, Clone, PartialEq)]
pub enum EmbedderBackend {
    /// Local ONNX sentence transformer (default), needs `download-model` first
    Onnx,
    /// Feature hashing: no model files, weaker semantics
    Hashing,
}

/// Central configuration loaded from environment variables.
///
/// The .env file is loaded automatically at startup via dotenvy.
#[derive(Debug, Clone)]
pub struct Config {
    /// Which embedder to use (default: Onnx)
    pub embedder_backend: EmbedderBackend,
    /// Directory containing the model files
    pub model_dir: PathBuf,
    /// Vector length for the hashing embedder
    pub hash_dim: usize,
    /// Directory of per-user tweet archives
    pub tweets_dir: PathBuf,
}

impl Config {
    /// Load configuration from environment variables. Every setting has a default.
    pub fn load() -> Result<Self> {
        let embedder_backend = match env::var("TWITOFF_EMBEDDER").as_deref() {
            Ok("hashing") => EmbedderBackend::Hashing,
            Ok("onnx") | Err(_) => EmbedderBackend::Onnx,
            Ok(other) => anyhow::bail!(
                "Unknown TWITOFF_EMBEDDER value '{}'. Use 'onnx' or 'hashing'.",
                other
            ),
        };

        let model_dir = env::var("TWITOFF_MODEL_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| download::default_model_dir());

        let hash_dim = match env::var("TWITOFF_HASH_DIM") {
            Ok(raw) => parse_hash_dim(&raw)?,
            Err(_) => DEFAULT_HASH_DIM,
        };

        let tweets_dir = env::var("TWITOFF_TWEETS_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./tweets"));

        Ok(Self {
            embedder_backend,
            model_dir,
            hash_dim,
            tweets_dir,
        })
    }

    /// Validate that the chosen embedder has what it needs.
    /// For ONNX: model files must exist (or user should run download-model).
    pub fn require_embedder(&self) -> Result<()> {
        match self.embedder_backend {
            EmbedderBackend::Onnx => {
                if !download::embedding_files_present(&self.model_dir) {
                    anyhow::bail!(
                        "Embedding model files not found in {}\n\
                         Run `twitoff download-model` to download them.\n\
                         Or set TWITOFF_EMBEDDER=hashing to use the model-free embedder instead.",
                        download::embedding_model_dir(&self.model_dir).display()
                    );
                }
                Ok(())
            }
            EmbedderBackend::Hashing => Ok(()),
        }
    }
}

/// Largest accepted TWITOFF_HASH_DIM. Every stored tweet is a dense vector
/// of this length, and each fit touches all of them per solver iteration.
pub const MAX_HASH_DIM: usize = 1 << 16;

fn parse_hash_dim(raw: &str) -> Result<usize> {
    match raw.trim().parse::<usize>() {
        Ok(dim) if (1..=MAX_HASH_DIM).contains(&dim) => Ok(dim),
        _ => anyhow::bail!(
            "TWITOFF_HASH_DIM must be an integer from 1 to {}, got '{}'",
            MAX_HASH_DIM,
            raw
        ),
    }
}
