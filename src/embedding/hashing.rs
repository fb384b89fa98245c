// Feature-hashing embedder: deterministic vectors with no model files.
//
// Text is split into Unicode words (UAX #29), each word is hashed with
// seeded XXH3 into one of `dim` buckets with a hash-derived sign, and the
// counts are L2-normalized. Tweets that share words share buckets, which is
// enough signal for the classifier while keeping tests and offline runs free
// of the ONNX model.

use tracing::debug;
use unicode_segmentation::UnicodeSegmentation;
use xxhash_rust::xxh3::xxh3_64_with_seed;

use super::traits::{require_text, Embedder};
use crate::error::EmbeddingError;
use crate::Vector;

/// Dimension used when none is configured (matches common word-vector sizes).
pub const DEFAULT_HASH_DIM: usize = 300;

/// Fixed XXH3 seed. Changing it changes every stored vector.
const HASH_SEED: u64 = 0x7477_1770_ff00_0001;

/// Shared token for every link.
const URL_TOKEN: &str = "<url>";

#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dim: usize,
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self::new(DEFAULT_HASH_DIM)
    }
}

impl HashingEmbedder {
    /// Create an embedder producing `dim`-length vectors (at least 1).
    pub fn new(dim: usize) -> Self {
        Self { dim: dim.max(1) }
    }
}

impl Embedder for HashingEmbedder {
    fn embed(&self, text: &str) -> Result<Vector, EmbeddingError> {
        let text = require_text(text)?;

        let mut tokens = tokenize(text);
        if tokens.is_empty() {
            // Emoji-only or punctuation-only tweets still get a stable vector.
            tokens.push(text.to_lowercase());
        }

        let mut vector = vec![0.0_f64; self.dim];
        for token in &tokens {
            let hash = xxh3_64_with_seed(token.as_bytes(), HASH_SEED);
            let bucket = (hash % self.dim as u64) as usize;
            let sign = if hash >> 63 == 0 { 1.0 } else { -1.0 };
            vector[bucket] += sign;
        }

        let norm = vector.iter().map(|x| x * x).sum::<f64>().sqrt();
        if norm > 0.0 {
            for x in &mut vector {
                *x /= norm;
            }
        }

        debug!(tokens = tokens.len(), dim = self.dim, "Computed hashed embedding");

        Ok(vector)
    }

    fn dimension(&self) -> usize {
        self.dim
    }
}

/// Lowercased word tokens.
///
/// Whitespace-separated chunks are checked first: links collapse to one
/// shared `<url>` token, and a chunk opening with `@` or `#` keeps that
/// prefix on its first word. Everything else is split into Unicode words.
fn tokenize(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    for chunk in text.split_whitespace() {
        if chunk.starts_with("http://") || chunk.starts_with("https://") {
            tokens.push(URL_TOKEN.to_string());
            continue;
        }

        let (prefix, rest) = match chunk.chars().next() {
            Some(c @ ('@' | '#')) => (Some(c), &chunk[c.len_utf8()..]),
            _ => (None, chunk),
        };

        for (i, word) in rest.unicode_words().enumerate() {
            let word = word.to_lowercase();
            match prefix {
                Some(p) if i == 0 => tokens.push(format!("{p}{word}")),
                _ => tokens.push(word),
            }
        }
    }
    tokens
}
