//! Tests for tree module.

pub(crate) use super::*;

fn symptom_data() -> (Matrix<f32>, Vec<usize>) {
    let x = Matrix::from_vec(
        9,
        6,
        vec![
            1.0, 1.0, 0.0, 0.0, 0.0, 0.0, // class 0
            1.0, 0.0, 0.0, 0.0, 0.0, 0.0, // class 0
            0.0, 1.0, 0.0, 0.0, 0.0, 0.0, // class 0
            0.0, 0.0, 1.0, 1.0, 0.0, 0.0, // class 1
            0.0, 0.0, 1.0, 0.0, 0.0, 0.0, // class 1
            0.0, 0.0, 0.0, 1.0, 0.0, 0.0, // class 1
            0.0, 0.0, 0.0, 0.0, 1.0, 1.0, // class 2
            0.0, 0.0, 0.0, 0.0, 1.0, 0.0, // class 2
            0.0, 0.0, 0.0, 0.0, 0.0, 1.0, // class 2
        ],
    )
    .expect("9x6 matrix with 54 values");
    (x, vec![0, 0, 0, 1, 1, 1, 2, 2, 2])
}

#[test]
fn test_tree_node_depth() {
    let leaf = |c: usize| {
        Box::new(TreeNode::Leaf(Leaf {
            class_counts: vec![c],
            n_samples: c,
        }))
    };
    let tree = TreeNode::Node(Node {
        feature_idx: 0,
        threshold: 0.5,
        left: leaf(1),
        right: Box::new(TreeNode::Node(Node {
            feature_idx: 1,
            threshold: 0.5,
            left: leaf(2),
            right: leaf(3),
        })),
    });
    assert_eq!(tree.depth(), 2);
    assert_eq!(tree.n_leaves(), 3);
}

#[test]
fn test_leaf_majority_tie_goes_to_lowest() {
    let leaf = Leaf {
        class_counts: vec![0, 2, 2],
        n_samples: 4,
    };
    assert_eq!(leaf.class_label(), 1);
    assert_eq!(leaf.probabilities(), vec![0.0, 0.5, 0.5]);
}

#[test]
fn test_decision_tree_builder() {
    let tree = DecisionTreeClassifier::new()
        .with_max_depth(4)
        .with_min_samples_split(3)
        .with_max_features(2)
        .with_random_state(9);
    assert_eq!(tree.max_depth, Some(4));
    assert_eq!(tree.min_samples_split, 3);
    assert_eq!(tree.max_features, Some(2));
    assert_eq!(tree.random_state, Some(9));
    assert!(tree.tree().is_none());
}

#[test]
fn test_decision_tree_fits_training_data() {
    let (x, y) = symptom_data();
    let mut tree = DecisionTreeClassifier::new();
    tree.fit(&x, &y).expect("valid training data");

    assert_eq!(tree.predict(&x).expect("fitted"), y);
}

#[test]
fn test_decision_tree_xor() {
    let x = Matrix::from_vec(4, 2, vec![0.0, 0.0, 0.0, 1.0, 1.0, 0.0, 1.0, 1.0]).expect("4x2");
    let y = vec![0, 1, 1, 0];
    let mut tree = DecisionTreeClassifier::new();
    tree.fit(&x, &y).expect("valid training data");

    // Neither feature alone improves Gini at the root
    let root = tree.tree().expect("fitted");
    assert_eq!(root.depth(), 0);
    assert_eq!(tree.predict(&x).expect("fitted"), vec![0, 0, 0, 0]);
}

#[test]
fn test_decision_tree_predict_proba() {
    let x = Matrix::from_vec(3, 1, vec![1.0, 1.0, 1.0]).expect("3x1");
    let y = vec![0, 1, 1];
    let mut tree = DecisionTreeClassifier::new();
    tree.fit(&x, &y).expect("valid training data");

    let probas = tree.predict_proba(&x).expect("fitted");
    assert!((probas[0][0] - 1.0 / 3.0).abs() < 1e-6);
    assert!((probas[0][1] - 2.0 / 3.0).abs() < 1e-6);
    assert_eq!(tree.predict(&x).expect("fitted"), vec![1, 1, 1]);
}

#[test]
fn test_decision_tree_max_depth_zero_is_stump_leaf() {
    let (x, y) = symptom_data();
    let mut tree = DecisionTreeClassifier::new().with_max_depth(0);
    tree.fit(&x, &y).expect("valid training data");
    assert_eq!(tree.tree().expect("fitted").depth(), 0);
    // Three-way tie in the root leaf
    assert_eq!(tree.predict(&x).expect("fitted"), vec![0; 9]);
}

#[test]
fn test_decision_tree_errors() {
    let (x, y) = symptom_data();
    let unfitted = DecisionTreeClassifier::new();
    assert!(matches!(
        unfitted.predict(&x),
        Err(DocrecError::NotFitted { .. })
    ));

    let mut bad = DecisionTreeClassifier::new().with_min_samples_split(1);
    assert!(bad.fit(&x, &y).is_err());

    let mut tree = DecisionTreeClassifier::new();
    tree.fit(&x, &y).expect("valid training data");
    assert!(matches!(
        tree.predict(&Matrix::zeros(1, 3)),
        Err(DocrecError::DimensionMismatch { .. })
    ));
}

#[test]
fn test_random_forest_fits_training_data() {
    let (x, y) = symptom_data();
    let mut forest = RandomForestClassifier::new(25).with_random_state(42);
    forest.fit(&x, &y).expect("valid training data");

    assert_eq!(forest.n_trees(), 25);
    let probas = forest.predict_proba(&x).expect("fitted");
    for row in &probas {
        assert_eq!(row.len(), 3);
        assert!((row.iter().sum::<f32>() - 1.0).abs() < 1e-4);
    }
}

#[test]
fn test_random_forest_is_deterministic_with_seed() {
    let (x, y) = symptom_data();
    let mut a = RandomForestClassifier::new(10).with_random_state(7);
    let mut b = RandomForestClassifier::new(10).with_random_state(7);
    a.fit(&x, &y).expect("valid training data");
    b.fit(&x, &y).expect("valid training data");

    assert_eq!(
        a.predict_proba(&x).expect("fitted"),
        b.predict_proba(&x).expect("fitted")
    );
}

#[test]
fn test_random_forest_width_survives_missing_bootstrap_class() {
    // The largest label may be absent from a bootstrap sample
    let x = Matrix::from_vec(5, 1, vec![0.0, 0.0, 0.0, 0.0, 1.0]).expect("5x1");
    let y = vec![0, 0, 0, 0, 4];
    let mut forest = RandomForestClassifier::new(8).with_random_state(1);
    forest.fit(&x, &y).expect("valid training data");
    for row in forest.predict_proba(&x).expect("fitted") {
        assert_eq!(row.len(), 5);
    }
}

#[test]
fn test_random_forest_errors() {
    let (x, y) = symptom_data();
    let mut empty = RandomForestClassifier::new(0);
    assert!(empty.fit(&x, &y).is_err());

    let unfitted = RandomForestClassifier::default();
    assert!(unfitted.predict(&x).is_err());
}

#[test]
fn test_single_class_trees() {
    let x = Matrix::from_vec(2, 2, vec![1.0, 0.0, 0.0, 1.0]).expect("2x2");
    let y = vec![2, 2];

    let mut tree = DecisionTreeClassifier::new();
    tree.fit(&x, &y).expect("single class is valid");
    assert_eq!(tree.predict(&x).expect("fitted"), vec![2, 2]);

    let mut forest = RandomForestClassifier::new(5).with_random_state(0);
    forest.fit(&x, &y).expect("single class is valid");
    assert_eq!(forest.predict(&x).expect("fitted"), vec![2, 2]);
}

#[test]
fn test_classifier_names() {
    assert_eq!(Classifier::name(&DecisionTreeClassifier::new()), "Decision Tree");
    assert_eq!(Classifier::name(&RandomForestClassifier::new(1)), "Random Forest");
}
