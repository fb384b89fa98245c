// Classification: logistic regression and the two-user pairwise classifier.

pub mod logistic;
pub mod pairwise;

pub use logistic::{FittedModel, LogisticRegression};
pub use pairwise::{train_and_predict, Label, PairwiseClassifier, Prediction};
