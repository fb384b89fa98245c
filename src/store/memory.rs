// MemoryTweetStore: in-process TweetStore backed by a HashMap.
//
// The map sits behind tokio::sync::RwLock: lookups for both compared users
// run concurrently, ingest takes the write lock briefly to swap a user's
// vectors in.

use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use super::normalize_user;
use super::traits::TweetStore;
use crate::Vector;

#[derive(Default)]
pub struct MemoryTweetStore {
    users: RwLock<HashMap<String, Vec<Vector>>>,
}

impl MemoryTweetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace a user's stored tweet vectors. All vectors must share one dimension.
    pub async fn replace_tweets(&self, user: &str, vectors: Vec<Vector>) -> Result<()> {
        if let Some(first) = vectors.first() {
            let dim = first.len();
            if let Some(bad) = vectors.iter().find(|v| v.len() != dim) {
                anyhow::bail!(
                    "Tweet vectors for @{} disagree on dimension: {} vs {}",
                    user,
                    dim,
                    bad.len()
                );
            }
        }

        let user = normalize_user(user);
        debug!(user = %user, tweets = vectors.len(), "Storing tweet vectors");
        self.users.write().await.insert(user, vectors);
        Ok(())
    }
}

#[async_trait]
impl TweetStore for MemoryTweetStore {
    async fn get_tweet_vectors(&self, user: &str) -> Result<Vec<Vector>> {
        let users = self.users.read().await;
        match users.get(&normalize_user(user)) {
            Some(vectors) => Ok(vectors.clone()),
            None => anyhow::bail!("Unknown user @{}", normalize_user(user)),
        }
    }
}
