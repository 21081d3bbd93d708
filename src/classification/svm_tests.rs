pub(crate) use super::*;

fn symptom_data() -> (Matrix<f32>, Vec<usize>) {
    let x = Matrix::from_vec(
        9,
        6,
        vec![
            1.0, 1.0, 0.0, 0.0, 0.0, 0.0, //
            1.0, 0.0, 0.0, 0.0, 0.0, 0.0, //
            0.0, 1.0, 0.0, 0.0, 0.0, 0.0, //
            0.0, 0.0, 1.0, 1.0, 0.0, 0.0, //
            0.0, 0.0, 1.0, 0.0, 0.0, 0.0, //
            0.0, 0.0, 0.0, 1.0, 0.0, 0.0, //
            0.0, 0.0, 0.0, 0.0, 1.0, 1.0, //
            0.0, 0.0, 0.0, 0.0, 1.0, 0.0, //
            0.0, 0.0, 0.0, 0.0, 0.0, 1.0, //
        ],
    )
    .expect("9x6 matrix");
    (x, vec![0, 0, 0, 1, 1, 1, 2, 2, 2])
}

#[test]
fn test_svc_defaults() {
    let svc = SupportVectorClassifier::new();
    assert_eq!(svc.kernel, Kernel::Rbf);
    assert_eq!(svc.c, 1.0);
    assert!(svc.gamma.is_none());
    assert!(svc.probability);
    assert_eq!(svc.n_support(), 0);
}

#[test]
fn test_sparse_dot() {
    let x = Matrix::from_vec(2, 4, vec![1.0, 0.0, 2.0, 0.0, 3.0, 1.0, 1.0, 0.0]).expect("2x4");
    let a = SparseRow::from_matrix(&x, 0);
    let b = SparseRow::from_matrix(&x, 1);
    assert!((a.dot(&b) - 5.0).abs() < 1e-12);
    assert!((a.norm_sq - 5.0).abs() < 1e-12);
}

#[test]
fn test_scaled_gamma() {
    let (x, y) = symptom_data();
    let mut svc = SupportVectorClassifier::new();
    svc.fit(&x, &y).expect("valid training data");

    let expected = 1.0 / (6.0 * x.variance());
    let fitted = svc.fitted.as_ref().expect("fitted");
    assert!((fitted.gamma - expected).abs() < 1e-12);
    assert_eq!(fitted.pairs.len(), 3);
}

#[test]
fn test_gamma_falls_back_on_zero_variance() {
    let x = Matrix::from_vec(2, 2, vec![1.0; 4]).expect("2x2");
    let mut svc = SupportVectorClassifier::new();
    svc.fit(&x, &[0, 1]).expect("valid training data");
    assert_eq!(svc.fitted.as_ref().expect("fitted").gamma, 1.0);
}

#[test]
fn test_svc_separates_training_rows() {
    let (x, y) = symptom_data();
    let mut svc = SupportVectorClassifier::new();
    svc.fit(&x, &y).expect("valid training data");

    assert_eq!(svc.predict(&x).expect("fitted"), y);
    assert!(svc.n_support() > 0);
}

#[test]
fn test_svc_linear_kernel() {
    let (x, y) = symptom_data();
    let mut svc = SupportVectorClassifier::new().with_kernel(Kernel::Linear);
    svc.fit(&x, &y).expect("valid training data");
    assert_eq!(svc.predict(&x).expect("fitted"), y);
}

#[test]
fn test_dual_coefficients_respect_box() {
    let (x, y) = symptom_data();
    let mut svc = SupportVectorClassifier::new().with_c(0.5);
    svc.fit(&x, &y).expect("valid training data");

    for pair in &svc.fitted.as_ref().expect("fitted").pairs {
        assert!(pair.coef.iter().all(|c| c.abs() <= 0.5 + 1e-9));
        // Equality constraint: sum of alpha_i * y_i is zero
        let total: f64 = pair.coef.iter().sum();
        assert!(total.abs() < 1e-9);
    }
}

#[test]
fn test_predict_proba_requires_probability() {
    let (x, y) = symptom_data();
    let mut svc = SupportVectorClassifier::new().with_probability(false);
    svc.fit(&x, &y).expect("valid training data");
    assert!(svc.predict_proba(&x).is_err());
}

#[test]
fn test_predict_proba_coupled() {
    let (x, y) = symptom_data();
    let mut svc = SupportVectorClassifier::new().with_probability(true);
    svc.fit(&x, &y).expect("valid training data");

    let probas = svc.predict_proba(&x).expect("fitted");
    for (row, &label) in probas.iter().zip(&y) {
        let sum: f32 = row.iter().sum();
        assert!((sum - 1.0).abs() < 1e-3);
        assert_eq!(argmax(row), label);
    }
}

#[test]
fn test_invalid_hyperparameters() {
    let (x, y) = symptom_data();
    assert!(SupportVectorClassifier::new().with_c(0.0).fit(&x, &y).is_err());
    assert!(SupportVectorClassifier::new().with_gamma(-1.0).fit(&x, &y).is_err());
    assert!(SupportVectorClassifier::new().with_tolerance(0.0).fit(&x, &y).is_err());
}

#[test]
fn test_not_fitted() {
    let (x, _) = symptom_data();
    let svc = SupportVectorClassifier::new();
    assert!(matches!(svc.predict(&x), Err(DocrecError::NotFitted { .. })));
}

#[test]
fn test_sigmoid_train_orders_probabilities() {
    let decisions = [2.0, 1.5, 1.0, -1.0, -1.5, -2.0];
    let labels = [1.0, 1.0, 1.0, -1.0, -1.0, -1.0];
    let (a, b) = sigmoid_train(&decisions, &labels);

    assert!(a < 0.0);
    assert!(sigmoid_predict(2.0, a, b) > 0.5);
    assert!(sigmoid_predict(-2.0, a, b) < 0.5);
    assert!(sigmoid_predict(1.0, a, b) < sigmoid_predict(2.0, a, b));
}

#[test]
fn test_couple_two_classes() {
    let r = vec![vec![0.0, 0.8], vec![0.2, 0.0]];
    let p = couple_pairwise(&r);
    assert!((p[0] - 0.8).abs() < 0.02);
    assert!((p[0] + p[1] - 1.0).abs() < 1e-6);
}

#[test]
fn test_couple_uniform() {
    let r = vec![vec![0.5; 3]; 3];
    let p = couple_pairwise(&r);
    for v in p {
        assert!((v - 1.0 / 3.0).abs() < 1e-6);
    }
}
