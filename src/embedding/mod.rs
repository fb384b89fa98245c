// Embedding: text to fixed-length vectors.
//
// The Embedder trait defines the interface. OnnxEmbedder runs the
// all-MiniLM-L6-v2 sentence transformer locally; HashingEmbedder is the
// model-free stand-in used by tests and offline runs.

pub mod download;
pub mod hashing;
pub mod onnx;
pub mod traits;

pub use hashing::HashingEmbedder;
pub use onnx::{OnnxEmbedder, EMBEDDING_DIM};
pub use traits::Embedder;
