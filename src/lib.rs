// Twitoff: which of two accounts is more likely to say a given sentence?
//
// This is the library root. The core is embedding (text → vector) and
// classify (two vector sets + query → label); the remaining modules are the
// glue around it: tweet storage, archive loading, and the pipelines the CLI runs.

pub mod archive;
pub mod classify;
pub mod config;
pub mod embedding;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod store;

/// A fixed-length tweet embedding.
pub type Vector = Vec<f64>;
