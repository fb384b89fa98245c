// Pairwise classifier: which of two vector sets does a query look like?
//
// Assembles a labeled training set (side A = 1, side B = 0), fits a fresh
// logistic regression, and scores one query vector. The fitted model is
// dropped before returning; nothing is cached between calls.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::logistic::{sigmoid, LogisticRegression};
use crate::error::{ClassifyError, Side, VectorPosition};
use crate::Vector;

/// Binary decision: which side the query is more consistent with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Label {
    /// Label 1: more consistent with side A.
    A,
    /// Label 0: more consistent with side B.
    B,
}

impl Label {
    pub fn as_u8(self) -> u8 {
        match self {
            Label::A => 1,
            Label::B => 0,
        }
    }
}

impl From<Label> for u8 {
    fn from(label: Label) -> Self {
        label.as_u8()
    }
}

/// The point decision plus the probability behind it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub label: Label,
    /// Fitted probability that the query belongs to side A (0.0 to 1.0).
    pub probability_a: f64,
}

impl Prediction {
    /// Probability of the side that was chosen.
    pub fn confidence(&self) -> f64 {
        match self.label {
            Label::A => self.probability_a,
            Label::B => 1.0 - self.probability_a,
        }
    }
}

/// Fits one logistic regression per call using the configured solver settings.
#[derive(Debug, Clone, Default)]
pub struct PairwiseClassifier {
    pub model: LogisticRegression,
}

impl PairwiseClassifier {
    pub fn new(model: LogisticRegression) -> Self {
        Self { model }
    }

    /// Fit on `vectors_a` (label 1) and `vectors_b` (label 0), then classify `query`.
    ///
    /// A decision value of exactly zero (probability 0.5) resolves to `Label::B`.
    pub fn train_and_predict(
        &self,
        vectors_a: &[Vector],
        vectors_b: &[Vector],
        query: &[f64],
    ) -> Result<Prediction, ClassifyError> {
        let dim = validate(vectors_a, vectors_b, query)?;

        let samples: Vec<&[f64]> = vectors_a
            .iter()
            .chain(vectors_b)
            .map(Vec::as_slice)
            .collect();
        let labels: Vec<bool> = std::iter::repeat_n(true, vectors_a.len())
            .chain(std::iter::repeat_n(false, vectors_b.len()))
            .collect();

        let fitted = self.model.fit(&samples, &labels)?;

        let decision = fitted.decision_function(query);
        let label = if decision > 0.0 { Label::A } else { Label::B };
        let prediction = Prediction {
            label,
            probability_a: sigmoid(decision),
        };

        debug!(
            samples_a = vectors_a.len(),
            samples_b = vectors_b.len(),
            dim = dim,
            iterations = fitted.iterations,
            decision = decision,
            label = label.as_u8(),
            "Pairwise prediction"
        );

        Ok(prediction)
    }
}

/// Fit with the default solver settings and classify `query`.
pub fn train_and_predict(
    vectors_a: &[Vector],
    vectors_b: &[Vector],
    query: &[f64],
) -> Result<Prediction, ClassifyError> {
    PairwiseClassifier::default().train_and_predict(vectors_a, vectors_b, query)
}

/// Check both sides are non-empty and every vector shares one dimension.
/// Returns that dimension.
fn validate(vectors_a: &[Vector], vectors_b: &[Vector], query: &[f64]) -> Result<usize, ClassifyError> {
    let first = vectors_a
        .first()
        .ok_or(ClassifyError::InsufficientData { side: Side::A })?;
    if vectors_b.is_empty() {
        return Err(ClassifyError::InsufficientData { side: Side::B });
    }

    let expected = first.len();
    let sides = [(Side::A, vectors_a), (Side::B, vectors_b)];
    for (side, vectors) in sides {
        for (index, v) in vectors.iter().enumerate() {
            if v.len() != expected {
                return Err(ClassifyError::DimensionMismatch {
                    expected,
                    found: v.len(),
                    at: VectorPosition::Training { side, index },
                });
            }
        }
    }
    if query.len() != expected {
        return Err(ClassifyError::DimensionMismatch {
            expected,
            found: query.len(),
            at: VectorPosition::Query,
        });
    }

    if expected == 0 {
        return Err(ClassifyError::ModelFit {
            reason: "vectors have zero dimensions".to_string(),
        });
    }

    let all_finite = vectors_a
        .iter()
        .chain(vectors_b)
        .flat_map(|v| v.iter())
        .chain(query)
        .all(|x| x.is_finite());
    if !all_finite {
        return Err(ClassifyError::ModelFit {
            reason: "vectors contain NaN or infinite components".to_string(),
        });
    }

    Ok(expected)
}
