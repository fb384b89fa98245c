// Pipelines: what the CLI runs, composed from embedding, classify and store.
//
//   ingest:  archive texts -> embeddings -> store
//   predict: store vectors + hypothetical text -> label
//   compare: user-facing wrapper around predict (ordering, self-comparison)

pub mod compare;
pub mod ingest;
pub mod predict;
