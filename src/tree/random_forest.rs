//! Random Forest classifier.

use super::helpers::bootstrap_sample;
use super::DecisionTreeClassifier;
use crate::error::{DocrecError, Result};
use crate::primitives::Matrix;
use crate::traits::{argmax, check_fit_input, n_classes, Classifier};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Random Forest classifier - an ensemble of decision trees.
///
/// Combines multiple decision trees trained on bootstrap samples
/// with random feature selection at each split.
/// Predictions average the trees' leaf distributions.
///
/// # Example
///
/// ```
/// use docrec::tree::RandomForestClassifier;
/// use docrec::primitives::Matrix;
///
/// let x = Matrix::from_vec(6, 2, vec![
///     1.0, 0.0,
///     1.0, 0.0,
///     1.0, 0.0,
///     0.0, 1.0,
///     0.0, 1.0,
///     0.0, 1.0,
/// ]).expect("6x2 matrix");
/// let y = vec![0, 0, 0, 1, 1, 1];
///
/// let mut forest = RandomForestClassifier::new(10).with_random_state(42);
/// forest.fit(&x, &y).expect("valid training data");
/// assert_eq!(forest.predict(&x).expect("fitted"), y);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForestClassifier {
    trees: Vec<DecisionTreeClassifier>,
    n_estimators: usize,
    max_depth: Option<usize>,
    /// Candidate features per split; `None` means √n_features
    max_features: Option<usize>,
    random_state: Option<u64>,
    n_outputs: usize,
}

impl RandomForestClassifier {
    /// Creates a new Random Forest classifier.
    ///
    /// # Arguments
    ///
    /// * `n_estimators` - Number of trees in the forest
    #[must_use]
    pub fn new(n_estimators: usize) -> Self {
        Self {
            trees: Vec::new(),
            n_estimators,
            max_depth: None,
            max_features: None,
            random_state: None,
            n_outputs: 0,
        }
    }

    /// Sets the maximum depth for each tree.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = Some(max_depth);
        self
    }

    /// Sets the number of candidate features per split.
    #[must_use]
    pub fn with_max_features(mut self, max_features: usize) -> Self {
        self.max_features = Some(max_features);
        self
    }

    /// Sets the random state for reproducibility.
    #[must_use]
    pub fn with_random_state(mut self, random_state: u64) -> Self {
        self.random_state = Some(random_state);
        self
    }

    /// Number of fitted trees.
    #[must_use]
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Fits the random forest to training data.
    ///
    /// Tree `i` draws its bootstrap sample and feature order from
    /// `random_state + i`.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is invalid, `n_estimators` is zero, or
    /// any tree fails to fit.
    pub fn fit(&mut self, x: &Matrix<f32>, y: &[usize]) -> Result<()> {
        check_fit_input(x, y)?;
        if self.n_estimators == 0 {
            return Err(DocrecError::InvalidHyperparameter {
                param: "n_estimators".to_string(),
                value: "0".to_string(),
                constraint: ">0".to_string(),
            });
        }

        let (n_samples, n_features) = x.shape();
        let n_outputs = n_classes(y);
        let max_features = self
            .max_features
            .unwrap_or_else(|| ((n_features as f64).sqrt() as usize).max(1));

        let mut trees = Vec::with_capacity(self.n_estimators);
        for i in 0..self.n_estimators {
            let mut rng = match self.random_state {
                Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(i as u64)),
                None => StdRng::from_entropy(),
            };
            let indices = bootstrap_sample(n_samples, &mut rng);
            let bootstrap_x = x.select_rows(&indices);
            let bootstrap_y: Vec<usize> = indices.iter().map(|&idx| y[idx]).collect();

            let mut tree = DecisionTreeClassifier::new()
                .with_max_features(max_features)
                .with_random_state(rng.gen());
            if let Some(depth) = self.max_depth {
                tree = tree.with_max_depth(depth);
            }
            tree.fit_with_outputs(&bootstrap_x, &bootstrap_y, n_outputs)?;
            trees.push(tree);
        }

        self.trees = trees;
        self.n_outputs = n_outputs;
        Ok(())
    }

    /// Mean of the trees' leaf distributions.
    ///
    /// # Errors
    ///
    /// Returns an error if the forest is not fitted or dimensions mismatch.
    pub fn predict_proba(&self, x: &Matrix<f32>) -> Result<Vec<Vec<f32>>> {
        if self.trees.is_empty() {
            return Err(DocrecError::NotFitted {
                model: "Random Forest".to_string(),
            });
        }

        let mut sums = vec![vec![0.0_f32; self.n_outputs]; x.n_rows()];
        for tree in &self.trees {
            for (sum, proba) in sums.iter_mut().zip(tree.predict_proba(x)?) {
                for (s, p) in sum.iter_mut().zip(proba) {
                    *s += p;
                }
            }
        }

        let n_trees = self.trees.len() as f32;
        for row in &mut sums {
            for v in row.iter_mut() {
                *v /= n_trees;
            }
        }
        Ok(sums)
    }

    /// Makes predictions for input data.
    ///
    /// # Errors
    ///
    /// Returns an error if the forest is not fitted or dimensions mismatch.
    pub fn predict(&self, x: &Matrix<f32>) -> Result<Vec<usize>> {
        Ok(self.predict_proba(x)?.iter().map(|p| argmax(p)).collect())
    }
}

impl Default for RandomForestClassifier {
    fn default() -> Self {
        Self::new(100)
    }
}

impl Classifier for RandomForestClassifier {
    fn name(&self) -> &str {
        "Random Forest"
    }

    fn fit(&mut self, x: &Matrix<f32>, y: &[usize]) -> Result<()> {
        RandomForestClassifier::fit(self, x, y)
    }

    fn predict(&self, x: &Matrix<f32>) -> Result<Vec<usize>> {
        RandomForestClassifier::predict(self, x)
    }

    fn predict_proba(&self, x: &Matrix<f32>) -> Result<Vec<Vec<f32>>> {
        RandomForestClassifier::predict_proba(self, x)
    }
}
