// Embedder trait: the swap-ready abstraction for turning text into vectors.
//
// The default implementation runs a local ONNX sentence transformer. The
// hashing embedder needs no model files and stands in for it in tests and
// offline runs. Nothing downstream cares which one it gets.

use crate::error::EmbeddingError;
use crate::Vector;

/// Maps text to a fixed-length vector.
///
/// Implementations must be deterministic: the same text always yields the
/// same vector, and every vector has length `dimension()`.
pub trait Embedder: Send + Sync {
    /// Embed a single text. Empty or whitespace-only text is an error.
    fn embed(&self, text: &str) -> Result<Vector, EmbeddingError>;

    /// Length of every vector this embedder produces.
    fn dimension(&self) -> usize;

    /// Embed several texts, returning vectors in the same order.
    /// Default implementation calls `embed` sequentially.
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vector>, EmbeddingError> {
        texts.iter().map(|t| self.embed(t)).collect()
    }
}

/// Reject input that has nothing to embed.
pub(crate) fn require_text(text: &str) -> Result<&str, EmbeddingError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(EmbeddingError::EmptyInput);
    }
    Ok(trimmed)
}
