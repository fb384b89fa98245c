// Ingest pipeline: embed a user's tweets once and store them.
//
// Embedding is CPU-bound (a padded forward pass per batch with the ONNX
// model), so the whole batch runs on a blocking thread.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::embedding::Embedder;
use crate::store::MemoryTweetStore;
use crate::Vector;

/// Embed `texts` and replace `user`'s stored tweets with the results.
///
/// Blank tweets are skipped with a warning; the rest go to the embedder in
/// one `embed_batch` call. An embedding failure aborts the ingest and leaves
/// the store untouched. Returns the number of tweets stored.
pub async fn ingest_user(
    store: &MemoryTweetStore,
    embedder: Arc<dyn Embedder>,
    user: &str,
    texts: Vec<String>,
) -> Result<usize> {
    let owner = user.to_string();
    let vectors =
        tokio::task::spawn_blocking(move || embed_tweets(embedder.as_ref(), &owner, texts))
            .await
            .context("spawn_blocking panicked")??;

    let count = vectors.len();
    store.replace_tweets(user, vectors).await?;

    info!(user = user, tweets = count, "Ingested tweets");
    Ok(count)
}

fn embed_tweets(embedder: &dyn Embedder, user: &str, texts: Vec<String>) -> Result<Vec<Vector>> {
    let total = texts.len();
    let texts: Vec<String> = texts
        .into_iter()
        .enumerate()
        .filter_map(|(index, text)| {
            if text.trim().is_empty() {
                warn!(user = user, index = index, "Skipping empty tweet");
                None
            } else {
                Some(text)
            }
        })
        .collect();

    if texts.is_empty() {
        return Ok(Vec::new());
    }

    embedder.embed_batch(&texts).with_context(|| {
        format!(
            "Failed to embed {} of {} tweets by @{}",
            texts.len(),
            total,
            user
        )
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::embedding::HashingEmbedder;
    use crate::error::EmbeddingError;
    use crate::store::TweetStore;

    /// Fails on any text containing "boom".
    struct FailingEmbedder;

    impl Embedder for FailingEmbedder {
        fn embed(&self, text: &str) -> Result<Vector, EmbeddingError> {
            if text.contains("boom") {
                return Err(EmbeddingError::InferenceFailed {
                    reason: "boom".to_string(),
                });
            }
            HashingEmbedder::new(4).embed(text)
        }

        fn dimension(&self) -> usize {
            4
        }
    }

    /// Records every batch it is handed.
    #[derive(Default)]
    struct RecordingEmbedder {
        batches: Mutex<Vec<Vec<String>>>,
    }

    impl Embedder for RecordingEmbedder {
        fn embed(&self, text: &str) -> Result<Vector, EmbeddingError> {
            HashingEmbedder::new(4).embed(text)
        }

        fn dimension(&self) -> usize {
            4
        }

        fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vector>, EmbeddingError> {
            self.batches.lock().unwrap().push(texts.to_vec());
            texts.iter().map(|t| self.embed(t)).collect()
        }
    }

    #[tokio::test]
    async fn test_ingest_stores_one_vector_per_tweet() {
        let store = MemoryTweetStore::new();
        let embedder: Arc<dyn Embedder> = Arc::new(HashingEmbedder::new(8));
        let count = ingest_user(
            &store,
            embedder,
            "nasa",
            vec!["Space agency update".to_string(), "Artemis rolls out".to_string()],
        )
        .await
        .unwrap();

        assert_eq!(count, 2);
        let vectors = store.get_tweet_vectors("nasa").await.unwrap();
        assert_eq!(vectors.len(), 2);
        assert!(vectors.iter().all(|v| v.len() == 8));
    }

    #[tokio::test]
    async fn test_ingest_skips_blank_tweets() {
        let store = MemoryTweetStore::new();
        let embedder: Arc<dyn Embedder> = Arc::new(HashingEmbedder::new(8));
        let count = ingest_user(
            &store,
            embedder,
            "a",
            vec!["   ".to_string(), "real tweet".to_string()],
        )
        .await
        .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_ingest_embeds_non_blank_tweets_in_one_batch() {
        let store = MemoryTweetStore::new();
        let recorder = Arc::new(RecordingEmbedder::default());
        let embedder: Arc<dyn Embedder> = recorder.clone();
        let count = ingest_user(
            &store,
            embedder,
            "a",
            vec![
                "first".to_string(),
                "".to_string(),
                "second".to_string(),
                " \t ".to_string(),
                "third".to_string(),
            ],
        )
        .await
        .unwrap();

        assert_eq!(count, 3);
        let batches = recorder.batches.lock().unwrap();
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0], vec!["first", "second", "third"]);
    }

    #[tokio::test]
    async fn test_all_blank_archive_stores_empty_user() {
        let store = MemoryTweetStore::new();
        let recorder = Arc::new(RecordingEmbedder::default());
        let embedder: Arc<dyn Embedder> = recorder.clone();
        let count = ingest_user(&store, embedder, "quiet", vec!["  ".to_string()])
            .await
            .unwrap();

        assert_eq!(count, 0);
        assert!(recorder.batches.lock().unwrap().is_empty());
        assert!(store.get_tweet_vectors("quiet").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_ingest_error_leaves_store_untouched() {
        let store = MemoryTweetStore::new();
        let embedder: Arc<dyn Embedder> = Arc::new(FailingEmbedder);
        let result = ingest_user(
            &store,
            embedder,
            "a",
            vec!["fine".to_string(), "boom".to_string()],
        )
        .await;

        let err = result.unwrap_err();
        assert!(format!("{err:#}").contains("@a"));
        assert!(store.get_tweet_vectors("a").await.is_err());
    }
}
