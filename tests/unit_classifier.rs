// Unit tests for the pairwise classifier and the logistic regression under it.
//
// Exercises the public classify API with hand-built vectors: output range,
// side-swap symmetry, determinism, regularization, and every error path.

use twitoff::classify::{train_and_predict, Label, LogisticRegression, PairwiseClassifier};
use twitoff::error::{ClassifyError, Side, VectorPosition};
use twitoff::Vector;

/// Two clusters that are separable along the first axis.
fn separated() -> (Vec<Vector>, Vec<Vector>) {
    let a = vec![
        vec![1.0, 0.2, 0.1],
        vec![0.9, -0.1, 0.3],
        vec![1.1, 0.0, -0.2],
        vec![0.8, 0.3, 0.0],
    ];
    let b = vec![
        vec![-1.0, 0.1, 0.2],
        vec![-0.9, -0.2, -0.1],
        vec![-1.2, 0.0, 0.1],
        vec![-0.7, 0.2, -0.3],
    ];
    (a, b)
}

// ============================================================
// Labels and probabilities
// ============================================================

#[test]
fn query_near_a_is_labelled_a() {
    let (a, b) = separated();
    let prediction = train_and_predict(&a, &b, &[1.0, 0.0, 0.0]).unwrap();
    assert_eq!(prediction.label, Label::A);
    assert!(prediction.probability_a > 0.5);
}

#[test]
fn query_near_b_is_labelled_b() {
    let (a, b) = separated();
    let prediction = train_and_predict(&a, &b, &[-1.0, 0.0, 0.0]).unwrap();
    assert_eq!(prediction.label, Label::B);
    assert!(prediction.probability_a < 0.5);
}

#[test]
fn label_is_always_zero_or_one() {
    let (a, b) = separated();
    for query in [[0.0, 0.0, 0.0], [5.0, -3.0, 1.0], [-0.01, 0.5, 0.5]] {
        let prediction = train_and_predict(&a, &b, &query).unwrap();
        assert!(matches!(prediction.label.as_u8(), 0 | 1));
        assert!((0.0..=1.0).contains(&prediction.probability_a));
    }
}

#[test]
fn label_agrees_with_probability() {
    let (a, b) = separated();
    for query in [[0.4, 0.0, 0.0], [-0.4, 0.0, 0.0], [0.05, 1.0, -1.0]] {
        let prediction = train_and_predict(&a, &b, &query).unwrap();
        let expected = if prediction.probability_a > 0.5 {
            Label::A
        } else {
            Label::B
        };
        assert_eq!(prediction.label, expected);
    }
}

// ============================================================
// Symmetry and determinism
// ============================================================

#[test]
fn swapping_sides_inverts_label_and_probability() {
    let (a, b) = separated();
    let query = [0.6, 0.1, -0.1];

    let ab = train_and_predict(&a, &b, &query).unwrap();
    let ba = train_and_predict(&b, &a, &query).unwrap();

    assert_eq!(ab.label, Label::A);
    assert_eq!(ba.label, Label::B);
    assert!(
        (ab.probability_a + ba.probability_a - 1.0).abs() < 1e-9,
        "p(A|a,b) = {}, p(A|b,a) = {}",
        ab.probability_a,
        ba.probability_a
    );
}

#[test]
fn repeated_calls_give_identical_results() {
    let (a, b) = separated();
    let query = [0.2, -0.4, 0.9];
    let first = train_and_predict(&a, &b, &query).unwrap();
    for _ in 0..5 {
        let again = train_and_predict(&a, &b, &query).unwrap();
        assert_eq!(again.label, first.label);
        assert_eq!(again.probability_a.to_bits(), first.probability_a.to_bits());
    }
}

#[test]
fn unbalanced_sides_still_fit() {
    let (a, b) = separated();
    let prediction = train_and_predict(&a[..1], &b, &[1.0, 0.2, 0.1]).unwrap();
    assert!(prediction.probability_a.is_finite());
}

#[test]
fn identical_sides_resolve_to_b() {
    let same = vec![vec![0.5, 0.5], vec![-0.25, 1.0], vec![0.0, -1.0]];
    let prediction = train_and_predict(&same, &same, &[0.5, 0.5]).unwrap();
    assert_eq!(prediction.label, Label::B);
    assert_eq!(prediction.probability_a, 0.5);
}

// ============================================================
// Regularization
// ============================================================

#[test]
fn stronger_regularization_is_less_confident() {
    let (a, b) = separated();
    let query = [1.0, 0.0, 0.0];

    let loose = PairwiseClassifier::new(LogisticRegression {
        c: 10.0,
        ..LogisticRegression::default()
    })
    .train_and_predict(&a, &b, &query)
    .unwrap();
    let tight = PairwiseClassifier::new(LogisticRegression {
        c: 0.01,
        ..LogisticRegression::default()
    })
    .train_and_predict(&a, &b, &query)
    .unwrap();

    assert_eq!(loose.label, Label::A);
    assert_eq!(tight.label, Label::A);
    assert!(loose.probability_a > tight.probability_a);
}

#[test]
fn fitted_weights_point_towards_a() {
    let (a, b) = separated();
    let samples: Vec<&[f64]> = a.iter().chain(&b).map(Vec::as_slice).collect();
    let labels: Vec<bool> = (0..samples.len()).map(|i| i < a.len()).collect();

    let fitted = LogisticRegression::default().fit(&samples, &labels).unwrap();
    assert_eq!(fitted.weights.len(), 3);
    assert!(fitted.weights[0] > 0.0);
    let towards_a = fitted.decision_function(&[1.0, 0.0, 0.0]);
    let towards_b = fitted.decision_function(&[-1.0, 0.0, 0.0]);
    assert!(towards_a > towards_b);
}

// ============================================================
// Wide inputs
// ============================================================

/// One-hot style vector of length `dim` with the given (index, value) entries.
fn sparse(dim: usize, entries: &[(usize, f64)]) -> Vector {
    let mut v = vec![0.0; dim];
    for &(i, x) in entries {
        v[i] = x;
    }
    v
}

#[test]
fn fifty_thousand_dimensions_fit_quickly() {
    let dim = 50_000;
    let a = vec![
        sparse(dim, &[(3, 0.8), (40_000, 0.6)]),
        sparse(dim, &[(3, 1.0)]),
    ];
    let b = vec![
        sparse(dim, &[(777, 1.0)]),
        sparse(dim, &[(777, 0.6), (12_345, 0.8)]),
    ];

    let near_a = train_and_predict(&a, &b, &sparse(dim, &[(3, 1.0)])).unwrap();
    let near_b = train_and_predict(&a, &b, &sparse(dim, &[(777, 1.0)])).unwrap();
    assert_eq!(near_a.label, Label::A);
    assert_eq!(near_b.label, Label::B);
}

// ============================================================
// Error paths
// ============================================================

#[test]
fn empty_a_is_insufficient_data() {
    let (_, b) = separated();
    let err = train_and_predict(&[], &b, &[0.0, 0.0, 0.0]).unwrap_err();
    assert!(matches!(err, ClassifyError::InsufficientData { side: Side::A }));
}

#[test]
fn empty_b_is_insufficient_data() {
    let (a, _) = separated();
    let err = train_and_predict(&a, &[], &[0.0, 0.0, 0.0]).unwrap_err();
    assert!(matches!(err, ClassifyError::InsufficientData { side: Side::B }));
}

#[test]
fn query_dimension_mismatch_is_reported() {
    let (a, b) = separated();
    let err = train_and_predict(&a, &b, &[1.0, 0.0]).unwrap_err();
    match err {
        ClassifyError::DimensionMismatch {
            expected,
            found,
            at,
        } => {
            assert_eq!((expected, found), (3, 2));
            assert_eq!(at, VectorPosition::Query);
        }
        other => panic!("expected DimensionMismatch, got {other:?}"),
    }
}

#[test]
fn training_dimension_mismatch_names_the_vector() {
    let (mut a, b) = separated();
    a[2] = vec![1.0, 0.0, 0.0, 0.0];
    let err = train_and_predict(&a, &b, &[1.0, 0.0, 0.0]).unwrap_err();
    assert_eq!(
        err.to_string(),
        "dimension mismatch at training vector 2 of side A: expected 3, found 4"
    );
}

#[test]
fn non_convergence_is_a_fit_error() {
    let (a, b) = separated();
    let stalled = PairwiseClassifier::new(LogisticRegression {
        max_iter: 1,
        tol: 0.0,
        ..LogisticRegression::default()
    });
    let err = stalled.train_and_predict(&a, &b, &[1.0, 0.0, 0.0]).unwrap_err();
    assert!(matches!(err, ClassifyError::ModelFit { .. }));
}
