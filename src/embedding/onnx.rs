// Sentence embedder using all-MiniLM-L6-v2 via ONNX Runtime.
//
// Tweets are tokenized, padded into a batch, run through the BERT encoder,
// and mean-pooled over their attention masks into 384-dimensional vectors.
// The model runs on the local CPU: no API calls, no rate limits.
//
// Loading the model is the expensive part, so `shared()` keeps one instance
// per process. It is read-only after load apart from ort's `&mut` run.

use std::path::Path;
use std::sync::{Arc, Mutex, OnceLock};

use ort::session::Session;
use ort::value::Tensor;
use tokenizers::Tokenizer;
use tracing::{debug, info};

use super::download::{EMBEDDING_MODEL_FILE_NAME, EMBEDDING_TOKENIZER_FILE};
use super::traits::{require_text, Embedder};
use crate::error::EmbeddingError;
use crate::Vector;

/// Embedding dimension for all-MiniLM-L6-v2.
pub const EMBEDDING_DIM: usize = 384;

/// Texts per forward pass in `embed_batch`.
const BATCH_SIZE: usize = 32;

static SHARED: OnceLock<Arc<OnnxEmbedder>> = OnceLock::new();

/// Return the process-wide embedder, loading it from `model_dir` on first use.
///
/// Later calls return the already-loaded model regardless of `model_dir`.
pub fn shared(model_dir: &Path) -> Result<Arc<OnnxEmbedder>, EmbeddingError> {
    if let Some(embedder) = SHARED.get() {
        return Ok(Arc::clone(embedder));
    }

    let loaded = Arc::new(OnnxEmbedder::load(model_dir)?);
    // Another thread may have won the race; either instance is equivalent.
    Ok(Arc::clone(SHARED.get_or_init(|| loaded)))
}

/// Local ONNX sentence embedder.
///
/// `Arc<Mutex<Session>>` because `Session::run` takes `&mut self` and the
/// embedder is shared across threads. Inference is serialized; each call is
/// one padded forward pass.
pub struct OnnxEmbedder {
    session: Arc<Mutex<Session>>,
    tokenizer: Arc<Tokenizer>,
}

impl OnnxEmbedder {
    /// Load the model and tokenizer from the given directory.
    ///
    /// Expects `model.onnx` and `tokenizer.json` in the directory.
    /// Run `twitoff download-model` first if they don't exist.
    pub fn load(model_dir: &Path) -> Result<Self, EmbeddingError> {
        let model_path = model_dir.join(EMBEDDING_MODEL_FILE_NAME);
        let tokenizer_path = model_dir.join(EMBEDDING_TOKENIZER_FILE);

        if !model_path.exists() {
            return Err(EmbeddingError::ModelNotFound { path: model_path });
        }
        if !tokenizer_path.exists() {
            return Err(EmbeddingError::ModelNotFound {
                path: tokenizer_path,
            });
        }

        let session = Session::builder()
            .map_err(|e| EmbeddingError::ModelLoadFailed {
                reason: format!("failed to create ONNX session builder: {e}"),
            })?
            .commit_from_file(&model_path)
            .map_err(|e| EmbeddingError::ModelLoadFailed {
                reason: format!("{}: {}", model_path.display(), e),
            })?;

        let tokenizer = Tokenizer::from_file(&tokenizer_path).map_err(|e| {
            EmbeddingError::ModelLoadFailed {
                reason: format!("tokenizer {}: {}", tokenizer_path.display(), e),
            }
        })?;

        info!(
            model_dir = %model_dir.display(),
            dim = EMBEDDING_DIM,
            "Loaded sentence embedding model"
        );

        Ok(Self {
            session: Arc::new(Mutex::new(session)),
            tokenizer: Arc::new(tokenizer),
        })
    }

    /// Tokenize, pad and run `texts` through the model in one forward pass.
    fn run_batch(&self, texts: &[&str]) -> Result<Vec<Vector>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let encodings = texts
            .iter()
            .map(|&text| {
                self.tokenizer
                    .encode(text, true)
                    .map_err(|e| EmbeddingError::TokenizationFailed {
                        reason: e.to_string(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let sequences: Vec<(&[u32], &[u32])> = encodings
            .iter()
            .map(|e| (e.get_ids(), e.get_attention_mask()))
            .collect();
        let batch = PaddedBatch::new(&sequences);
        if batch.max_len == 0 {
            return Err(EmbeddingError::TokenizationFailed {
                reason: "text produced no tokens".to_string(),
            });
        }

        let shape = [batch.size as i64, batch.max_len as i64];
        let input_ids_tensor =
            Tensor::from_array((shape, batch.input_ids)).map_err(inference_error)?;
        let attention_mask_tensor =
            Tensor::from_array((shape, batch.attention_mask.clone())).map_err(inference_error)?;
        let token_type_ids_tensor =
            Tensor::from_array((shape, batch.token_type_ids)).map_err(inference_error)?;

        // Output is last_hidden_state: [batch, max_len, 384]
        let hidden_states = {
            let mut session = self
                .session
                .lock()
                .map_err(|e| EmbeddingError::InferenceFailed {
                    reason: format!("session lock poisoned: {e}"),
                })?;

            let outputs = session
                .run(ort::inputs! {
                    "input_ids" => input_ids_tensor,
                    "attention_mask" => attention_mask_tensor,
                    "token_type_ids" => token_type_ids_tensor
                })
                .map_err(inference_error)?;

            let (_shape, data) = outputs[0]
                .try_extract_tensor::<f32>()
                .map_err(inference_error)?;

            data.to_vec()
        };

        let row_len = batch.max_len * EMBEDDING_DIM;
        if hidden_states.len() != batch.size * row_len {
            return Err(EmbeddingError::InferenceFailed {
                reason: format!(
                    "expected {} output values, model returned {}",
                    batch.size * row_len,
                    hidden_states.len()
                ),
            });
        }

        let embeddings: Vec<Vector> = hidden_states
            .chunks(row_len)
            .zip(batch.attention_mask.chunks(batch.max_len))
            .map(|(hidden, mask)| mean_pool(hidden, mask))
            .collect();

        debug!(
            batch_size = batch.size,
            max_len = batch.max_len,
            dim = EMBEDDING_DIM,
            "Computed sentence embeddings"
        );

        Ok(embeddings)
    }
}

impl Embedder for OnnxEmbedder {
    fn embed(&self, text: &str) -> Result<Vector, EmbeddingError> {
        let text = require_text(text)?;
        self.run_batch(&[text])?
            .pop()
            .ok_or_else(|| inference_error("model returned no embedding"))
    }

    fn dimension(&self) -> usize {
        EMBEDDING_DIM
    }

    /// One padded forward pass per `BATCH_SIZE` texts instead of one per text.
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vector>, EmbeddingError> {
        let texts = texts
            .iter()
            .map(|t| require_text(t))
            .collect::<Result<Vec<&str>, _>>()?;

        let mut embeddings = Vec::with_capacity(texts.len());
        for chunk in texts.chunks(BATCH_SIZE) {
            embeddings.extend(self.run_batch(chunk)?);
        }
        Ok(embeddings)
    }
}

/// BERT inputs for several sequences, right-padded to the longest one.
///
/// Padding uses token id 0 and attention mask 0; token_type_ids are all
/// zero for single-sentence input.
struct PaddedBatch {
    size: usize,
    max_len: usize,
    input_ids: Vec<i64>,
    attention_mask: Vec<i64>,
    token_type_ids: Vec<i64>,
}

impl PaddedBatch {
    fn new(sequences: &[(&[u32], &[u32])]) -> Self {
        let size = sequences.len();
        let max_len = sequences.iter().map(|(ids, _)| ids.len()).max().unwrap_or(0);

        let mut input_ids = Vec::with_capacity(size * max_len);
        let mut attention_mask = Vec::with_capacity(size * max_len);

        for (row, (ids, mask)) in sequences.iter().enumerate() {
            input_ids.extend(ids.iter().map(|&id| id as i64));
            attention_mask.extend(mask.iter().map(|&m| m as i64));
            input_ids.resize((row + 1) * max_len, 0);
            attention_mask.resize((row + 1) * max_len, 0);
        }

        Self {
            size,
            max_len,
            input_ids,
            attention_mask,
            token_type_ids: vec![0; size * max_len],
        }
    }
}

fn inference_error(e: impl std::fmt::Display) -> EmbeddingError {
    EmbeddingError::InferenceFailed {
        reason: e.to_string(),
    }
}

/// Average token embeddings weighted by the attention mask.
///
/// `hidden_states` is row-major `[seq_len, EMBEDDING_DIM]`.
fn mean_pool(hidden_states: &[f32], attention_mask: &[i64]) -> Vector {
    let mut sum = vec![0.0_f64; EMBEDDING_DIM];
    let mut mask_sum = 0.0_f64;

    for (token, &mask) in attention_mask.iter().enumerate() {
        if mask <= 0 {
            continue;
        }
        let weight = mask as f64;
        mask_sum += weight;
        let row = &hidden_states[token * EMBEDDING_DIM..(token + 1) * EMBEDDING_DIM];
        for (acc, &value) in sum.iter_mut().zip(row) {
            *acc += value as f64 * weight;
        }
    }

    if mask_sum > 0.0 {
        for val in &mut sum {
            *val /= mask_sum;
        }
    }

    sum
}
