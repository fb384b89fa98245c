// TweetStore trait: backend-agnostic async lookup of a user's tweet vectors.
//
// Async so a database- or API-backed store fits behind the same interface
// as the in-memory one.

use anyhow::Result;
use async_trait::async_trait;

use crate::Vector;

#[async_trait]
pub trait TweetStore: Send + Sync {
    /// Previously computed embeddings for a user's stored tweets.
    ///
    /// May be empty. Unknown users are an error.
    async fn get_tweet_vectors(&self, user: &str) -> Result<Vec<Vector>>;
}
