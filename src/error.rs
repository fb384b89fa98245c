// Error types for the embedding → classification core.
//
// The core never hides these. Each variant carries enough context (which
// side or user, which stage) for the calling layer to render a message.
// Application glue (main.rs, archive loading) stays on anyhow.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Which of the two compared sets a vector or error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    A,
    B,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::A => write!(f, "A"),
            Side::B => write!(f, "B"),
        }
    }
}

/// Where a mis-sized vector was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VectorPosition {
    /// The `index`-th training vector of one side.
    Training { side: Side, index: usize },
    /// The hypothetical query vector.
    Query,
}

impl fmt::Display for VectorPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VectorPosition::Training { side, index } => {
                write!(f, "training vector {index} of side {side}")
            }
            VectorPosition::Query => write!(f, "query vector"),
        }
    }
}

#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("cannot embed empty text")]
    EmptyInput,

    #[error("embedding model not found at path: {path}")]
    ModelNotFound { path: PathBuf },

    #[error("failed to load embedding model: {reason}")]
    ModelLoadFailed { reason: String },

    #[error("tokenization failed: {reason}")]
    TokenizationFailed { reason: String },

    #[error("embedding inference failed: {reason}")]
    InferenceFailed { reason: String },
}

#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error("side {side} has no vectors; both sides need at least one to fit a classifier")]
    InsufficientData { side: Side },

    #[error("dimension mismatch at {at}: expected {expected}, found {found}")]
    DimensionMismatch {
        expected: usize,
        found: usize,
        at: VectorPosition,
    },

    #[error("logistic regression fit failed: {reason}")]
    ModelFit { reason: String },
}

/// Errors surfaced by `Predictor::predict_user` and the comparison layer.
#[derive(Debug, Error)]
pub enum PredictError {
    #[error("failed to look up tweet vectors for @{user}")]
    Store {
        user: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("failed to embed hypothetical text")]
    EmbedHypothetical(#[source] EmbeddingError),

    #[error("@{user} has no stored tweets to learn from")]
    InsufficientData { user: String },

    #[error("tweet vectors for @{user} do not match: expected dimension {expected}, found {found} ({at})")]
    DimensionMismatch {
        user: String,
        expected: usize,
        found: usize,
        at: VectorPosition,
    },

    #[error("hypothetical text embeds to dimension {found}, stored tweets have {expected}")]
    QueryDimensionMismatch { expected: usize, found: usize },

    #[error("could not fit a model for @{user_a} vs @{user_b}: {reason}")]
    ModelFit {
        user_a: String,
        user_b: String,
        reason: String,
    },

    #[error("cannot compare @{user} to themself")]
    SameUser { user: String },

    #[error("prediction worker failed")]
    Worker(#[from] tokio::task::JoinError),
}

impl PredictError {
    /// Attach user names to a classifier error.
    pub fn from_classify(err: ClassifyError, user_a: &str, user_b: &str) -> Self {
        let user_for = |side: Side| match side {
            Side::A => user_a.to_string(),
            Side::B => user_b.to_string(),
        };

        match err {
            ClassifyError::InsufficientData { side } => PredictError::InsufficientData {
                user: user_for(side),
            },
            ClassifyError::DimensionMismatch {
                expected,
                found,
                at: VectorPosition::Query,
            } => PredictError::QueryDimensionMismatch { expected, found },
            ClassifyError::DimensionMismatch {
                expected,
                found,
                at: at @ VectorPosition::Training { side, .. },
            } => PredictError::DimensionMismatch {
                user: user_for(side),
                expected,
                found,
                at,
            },
            ClassifyError::ModelFit { reason } => PredictError::ModelFit {
                user_a: user_a.to_string(),
                user_b: user_b.to_string(),
                reason,
            },
        }
    }
}
