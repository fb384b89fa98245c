// Prediction pipeline: which of two users is more likely to say a text?
//
// 1. Look up both users' stored tweet vectors (concurrently)
// 2. Embed the hypothetical text
// 3. Fit a fresh pairwise classifier (user A = 1, user B = 0)
// 4. Classify the hypothetical's vector
//
// Steps 2-4 are CPU-bound and run together on a blocking thread. The fitted
// model never outlives the call.

use std::sync::Arc;

use tracing::info;

use crate::classify::{PairwiseClassifier, Prediction};
use crate::embedding::Embedder;
use crate::error::PredictError;
use crate::output::truncate_chars;
use crate::store::{normalize_user, TweetStore};
use crate::Vector;

pub struct Predictor {
    store: Arc<dyn TweetStore>,
    embedder: Arc<dyn Embedder>,
    classifier: PairwiseClassifier,
}

impl Predictor {
    /// A predictor using the default logistic regression settings.
    pub fn new(store: Arc<dyn TweetStore>, embedder: Arc<dyn Embedder>) -> Self {
        Self {
            store,
            embedder,
            classifier: PairwiseClassifier::default(),
        }
    }

    /// Swap in a classifier with custom solver settings.
    pub fn with_classifier(mut self, classifier: PairwiseClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    /// Predict whether `name_a` (label 1) or `name_b` (label 0) is more
    /// likely to have written `hypothetical`.
    ///
    /// Rejecting `name_a == name_b` is the caller's job (see `compare`); if
    /// it happens anyway the fit runs on duplicated data and resolves to B.
    pub async fn predict_user(
        &self,
        name_a: &str,
        name_b: &str,
        hypothetical: &str,
    ) -> Result<Prediction, PredictError> {
        let user_a = normalize_user(name_a);
        let user_b = normalize_user(name_b);

        let (vectors_a, vectors_b) =
            futures::try_join!(self.lookup(&user_a), self.lookup(&user_b))?;

        let embedder = Arc::clone(&self.embedder);
        let classifier = self.classifier.clone();
        let text = hypothetical.to_string();
        let (a, b) = (user_a.clone(), user_b.clone());

        let prediction = tokio::task::spawn_blocking(move || {
            let query = embedder
                .embed(&text)
                .map_err(PredictError::EmbedHypothetical)?;
            classifier
                .train_and_predict(&vectors_a, &vectors_b, &query)
                .map_err(|e| PredictError::from_classify(e, &a, &b))
        })
        .await??;

        info!(
            user_a = %user_a,
            user_b = %user_b,
            label = prediction.label.as_u8(),
            probability_a = prediction.probability_a,
            text_preview = %truncate_chars(hypothetical, 50),
            "Predicted author"
        );

        Ok(prediction)
    }

    async fn lookup(&self, user: &str) -> Result<Vec<Vector>, PredictError> {
        self.store
            .get_tweet_vectors(user)
            .await
            .map_err(|source| PredictError::Store {
                user: user.to_string(),
                source,
            })
    }
}
