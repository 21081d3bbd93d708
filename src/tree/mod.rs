//! Decision tree algorithms and ensemble methods.
//!
//! This module implements:
//! - CART (Classification and Regression Trees) using Gini impurity
//! - Random Forest ensemble classifier
//!
//! Leaves keep the full class distribution of the training samples that
//! reached them, so trees produce probability estimates as well as labels.
//!
//! # Example
//!
//! ```
//! use docrec::prelude::*;
//! use docrec::tree::DecisionTreeClassifier;
//!
//! // Training data (simple 2D classification)
//! let x = Matrix::from_vec(4, 2, vec![
//!     1.0, 0.0,  // class 0
//!     1.0, 1.0,  // class 0
//!     0.0, 1.0,  // class 1
//!     0.0, 0.0,  // class 1
//! ]).expect("Matrix creation should succeed in tests");
//! let y = vec![0, 0, 1, 1];
//!
//! // Train decision tree
//! let mut tree = DecisionTreeClassifier::new()
//!     .with_max_depth(3);
//! tree.fit(&x, &y).expect("fit should succeed");
//!
//! // Make predictions
//! let predictions = tree.predict(&x).expect("fitted");
//! assert_eq!(predictions, y);
//! ```

mod helpers;
mod random_forest;

pub use random_forest::RandomForestClassifier;

use crate::error::{DocrecError, Result};
use crate::primitives::Matrix;
use crate::traits::{check_fit_input, n_classes, Classifier};
use helpers::TreeBuilder;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

/// Internal node in a decision tree.
///
/// Contains a split condition (feature and threshold) and pointers to
/// left and right subtrees.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    /// Index of the feature to split on
    pub feature_idx: usize,
    /// Threshold value for the split
    pub threshold: f32,
    /// Left subtree (samples where feature <= threshold)
    pub left: Box<TreeNode>,
    /// Right subtree (samples where feature > threshold)
    pub right: Box<TreeNode>,
}

/// Leaf node in a decision tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Leaf {
    /// Training samples per class id that reached this leaf
    pub class_counts: Vec<usize>,
    /// Number of training samples in this leaf
    pub n_samples: usize,
}

impl Leaf {
    /// Majority class; ties go to the lowest class id.
    #[must_use]
    pub fn class_label(&self) -> usize {
        let mut best = 0;
        for (idx, &count) in self.class_counts.iter().enumerate() {
            if count > self.class_counts[best] {
                best = idx;
            }
        }
        best
    }

    /// Class frequencies in this leaf.
    #[must_use]
    pub fn probabilities(&self) -> Vec<f32> {
        let n = self.n_samples.max(1) as f32;
        self.class_counts.iter().map(|&c| c as f32 / n).collect()
    }
}

/// A node in a decision tree (either internal node or leaf).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TreeNode {
    /// Internal decision node with split condition
    Node(Node),
    /// Leaf node with class distribution
    Leaf(Leaf),
}

impl TreeNode {
    /// Returns the depth of the tree rooted at this node.
    ///
    /// Leaf nodes have depth 0, internal nodes have depth 1 + max(left, right).
    #[must_use]
    pub fn depth(&self) -> usize {
        match self {
            TreeNode::Leaf(_) => 0,
            TreeNode::Node(node) => 1 + node.left.depth().max(node.right.depth()),
        }
    }

    /// Number of leaves below (and including) this node.
    #[must_use]
    pub fn n_leaves(&self) -> usize {
        match self {
            TreeNode::Leaf(_) => 1,
            TreeNode::Node(node) => node.left.n_leaves() + node.right.n_leaves(),
        }
    }

    /// Follows split conditions down to the leaf for `sample`.
    fn leaf_for(&self, sample: &[f32]) -> &Leaf {
        let mut node = self;
        loop {
            match node {
                TreeNode::Leaf(leaf) => return leaf,
                TreeNode::Node(inner) => {
                    node = if sample[inner.feature_idx] <= inner.threshold {
                        &inner.left
                    } else {
                        &inner.right
                    };
                }
            }
        }
    }
}

/// Decision tree classifier using the CART algorithm.
///
/// Uses Gini impurity for splitting criterion and builds trees recursively.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTreeClassifier {
    tree: Option<TreeNode>,
    max_depth: Option<usize>,
    min_samples_split: usize,
    /// Candidate features per split (`None` evaluates all)
    max_features: Option<usize>,
    random_state: Option<u64>,
    /// Number of features the model was trained on (for validation)
    n_features: Option<usize>,
}

impl DecisionTreeClassifier {
    /// Creates a new decision tree classifier with default parameters.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tree: None,
            max_depth: None,
            min_samples_split: 2,
            max_features: None,
            random_state: None,
            n_features: None,
        }
    }

    /// Sets the maximum depth of the tree.
    ///
    /// # Arguments
    ///
    /// * `depth` - Maximum depth (root has depth 0)
    #[must_use]
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    /// Minimum samples a node needs before it may be split.
    #[must_use]
    pub fn with_min_samples_split(mut self, min_samples_split: usize) -> Self {
        self.min_samples_split = min_samples_split;
        self
    }

    /// Number of randomly drawn candidate features per split.
    #[must_use]
    pub fn with_max_features(mut self, max_features: usize) -> Self {
        self.max_features = Some(max_features);
        self
    }

    /// Seeds the feature draw.
    #[must_use]
    pub fn with_random_state(mut self, random_state: u64) -> Self {
        self.random_state = Some(random_state);
        self
    }

    /// Root of the fitted tree.
    #[must_use]
    pub fn tree(&self) -> Option<&TreeNode> {
        self.tree.as_ref()
    }

    /// Fits the decision tree to training data.
    ///
    /// # Arguments
    ///
    /// * `x` - Training features (n_samples × n_features)
    /// * `y` - Training labels (n_samples class indices)
    ///
    /// # Errors
    ///
    /// Returns an error if the data is invalid or `min_samples_split < 2`.
    pub fn fit(&mut self, x: &Matrix<f32>, y: &[usize]) -> Result<()> {
        check_fit_input(x, y)?;
        self.fit_with_outputs(x, y, n_classes(y))
    }

    /// Fits with leaves `n_outputs` wide, so forest members trained on
    /// bootstrap samples agree on the class count.
    pub(crate) fn fit_with_outputs(
        &mut self,
        x: &Matrix<f32>,
        y: &[usize],
        n_outputs: usize,
    ) -> Result<()> {
        check_fit_input(x, y)?;
        if self.min_samples_split < 2 {
            return Err(DocrecError::InvalidHyperparameter {
                param: "min_samples_split".to_string(),
                value: self.min_samples_split.to_string(),
                constraint: ">=2".to_string(),
            });
        }
        if self.max_features == Some(0) {
            return Err(DocrecError::InvalidHyperparameter {
                param: "max_features".to_string(),
                value: "0".to_string(),
                constraint: ">0".to_string(),
            });
        }

        let n_features = x.n_cols();
        let rng = match self.random_state {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut builder = TreeBuilder {
            x,
            y,
            n_outputs,
            max_depth: self.max_depth,
            min_samples_split: self.min_samples_split,
            max_features: self.max_features.map_or(n_features, |m| m.min(n_features)),
            rng,
        };
        let indices: Vec<usize> = (0..x.n_rows()).collect();

        self.tree = Some(builder.build(&indices, 0));
        self.n_features = Some(n_features);
        Ok(())
    }

    fn fitted_tree(&self, x: &Matrix<f32>) -> Result<&TreeNode> {
        let tree = self.tree.as_ref().ok_or_else(|| DocrecError::NotFitted {
            model: "Decision Tree".to_string(),
        })?;
        let expected = self.n_features.unwrap_or(0);
        if x.n_cols() != expected {
            return Err(DocrecError::dimension_mismatch(
                "n_features",
                expected,
                x.n_cols(),
            ));
        }
        Ok(tree)
    }

    /// Predicts class labels for samples.
    ///
    /// # Errors
    ///
    /// Returns an error if called before `fit()` or if the feature count
    /// doesn't match the training data.
    pub fn predict(&self, x: &Matrix<f32>) -> Result<Vec<usize>> {
        let tree = self.fitted_tree(x)?;
        Ok((0..x.n_rows())
            .map(|i| tree.leaf_for(x.row(i)).class_label())
            .collect())
    }

    /// Leaf class frequencies for each sample.
    ///
    /// # Errors
    ///
    /// Returns an error if called before `fit()` or if the feature count
    /// doesn't match the training data.
    pub fn predict_proba(&self, x: &Matrix<f32>) -> Result<Vec<Vec<f32>>> {
        let tree = self.fitted_tree(x)?;
        Ok((0..x.n_rows())
            .map(|i| tree.leaf_for(x.row(i)).probabilities())
            .collect())
    }
}

impl Default for DecisionTreeClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Classifier for DecisionTreeClassifier {
    fn name(&self) -> &str {
        "Decision Tree"
    }

    fn fit(&mut self, x: &Matrix<f32>, y: &[usize]) -> Result<()> {
        DecisionTreeClassifier::fit(self, x, y)
    }

    fn predict(&self, x: &Matrix<f32>) -> Result<Vec<usize>> {
        DecisionTreeClassifier::predict(self, x)
    }

    fn predict_proba(&self, x: &Matrix<f32>) -> Result<Vec<Vec<f32>>> {
        DecisionTreeClassifier::predict_proba(self, x)
    }
}

#[cfg(test)]
mod tests;
