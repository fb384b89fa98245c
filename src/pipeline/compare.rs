// Comparison: the user-facing "who would say this?" question.
//
// Puts the two names in a stable (sorted) order so `compare(a, b)` and
// `compare(b, a)` fit the same model, refuses to compare a user with
// themself, and turns the label back into names.

use std::fmt;

use serde::Serialize;

use super::predict::Predictor;
use crate::classify::{Label, Prediction};
use crate::error::PredictError;
use crate::store::normalize_user;

#[derive(Debug, Clone, Serialize)]
pub struct Comparison {
    pub text: String,
    /// The user the classifier picked.
    pub likely: String,
    pub unlikely: String,
    pub prediction: Prediction,
}

impl Comparison {
    /// Probability that `likely` wrote the text.
    pub fn confidence(&self) -> f64 {
        self.prediction.confidence()
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "\"{}\" is more likely to be said by @{} than @{}",
            self.text, self.likely, self.unlikely
        )
    }
}

/// Decide which of `user1` and `user2` is more likely to say `text`.
pub async fn compare(
    predictor: &Predictor,
    user1: &str,
    user2: &str,
    text: &str,
) -> Result<Comparison, PredictError> {
    let mut users = [normalize_user(user1), normalize_user(user2)];
    users.sort();
    let [user_a, user_b] = users;

    if user_a == user_b {
        return Err(PredictError::SameUser { user: user_a });
    }

    let prediction = predictor.predict_user(&user_a, &user_b, text).await?;

    let (likely, unlikely) = match prediction.label {
        Label::A => (user_a, user_b),
        Label::B => (user_b, user_a),
    };

    Ok(Comparison {
        text: text.trim().to_string(),
        likely,
        unlikely,
        prediction,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::embedding::HashingEmbedder;
    use crate::store::MemoryTweetStore;

    #[test]
    fn test_display_message() {
        let comparison = Comparison {
            text: "Tesla cars are rad".to_string(),
            likely: "elonmusk".to_string(),
            unlikely: "nasa".to_string(),
            prediction: Prediction {
                label: Label::B,
                probability_a: 0.4,
            },
        };
        assert_eq!(
            comparison.to_string(),
            "\"Tesla cars are rad\" is more likely to be said by @elonmusk than @nasa"
        );
        assert!((comparison.confidence() - 0.6).abs() < 1e-12);
    }

    #[tokio::test]
    async fn test_same_user_rejected_before_lookup() {
        // Empty store: reaching the lookup would produce a Store error instead.
        let predictor = Predictor::new(
            Arc::new(MemoryTweetStore::new()),
            Arc::new(HashingEmbedder::new(4)),
        );
        let err = compare(&predictor, "@NASA", "nasa", "hello").await.unwrap_err();
        match err {
            PredictError::SameUser { user } => assert_eq!(user, "nasa"),
            other => panic!("expected SameUser, got {other:?}"),
        }
    }
}
