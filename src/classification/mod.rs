//! Classification algorithms.
//!
//! This module implements the non-tree members of the ensemble:
//! - Logistic Regression (multinomial softmax, L2-regularized)
//! - K-Nearest Neighbors (kNN) for instance-based classification
//! - Gaussian Naive Bayes for probabilistic classification
//! - C-Support Vector Classification with an RBF kernel (see [`svm`])
//!
//! # Example
//!
//! ```
//! use docrec::classification::LogisticRegression;
//! use docrec::prelude::*;
//!
//! let x = Matrix::from_vec(6, 3, vec![
//!     1.0, 0.0, 0.0,
//!     1.0, 1.0, 0.0,
//!     0.0, 1.0, 0.0,
//!     0.0, 1.0, 1.0,
//!     0.0, 0.0, 1.0,
//!     1.0, 0.0, 1.0,
//! ]).expect("Matrix dimensions match data length");
//! let y = vec![0, 0, 1, 1, 2, 2];
//!
//! let mut model = LogisticRegression::new();
//! model.fit(&x, &y).expect("Training data is valid");
//! let predictions = model.predict(&x).expect("Model is fitted");
//! assert_eq!(predictions.len(), 6);
//! ```

pub mod svm;

pub use svm::{Kernel, SupportVectorClassifier};

use crate::error::{DocrecError, Result};
use crate::primitives::Matrix;
use crate::traits::{argmax, check_fit_input, n_classes, unique_classes, Classifier};
use serde::{Deserialize, Serialize};

/// Multinomial Logistic Regression classifier.
///
/// Softmax over one linear score per class, trained with full-batch gradient
/// descent on the cross-entropy loss plus an L2 penalty of strength `1 / C`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticRegression {
    /// Weights per observed class: `weights[class_idx][feature]`
    weights: Option<Vec<Vec<f32>>>,
    /// Intercept per observed class
    intercepts: Vec<f32>,
    /// Observed class labels, sorted
    classes: Vec<usize>,
    /// Width of `predict_proba` rows
    n_outputs: usize,
    /// Inverse regularization strength
    c: f32,
    /// Learning rate for gradient descent
    learning_rate: f32,
    /// Maximum number of iterations
    max_iter: usize,
    /// Convergence tolerance on the largest gradient component
    tol: f32,
}

impl LogisticRegression {
    /// Creates a new logistic regression classifier with default parameters.
    ///
    /// Defaults: `C = 1.0`, `learning_rate = 0.5`, `max_iter = 500`, `tol = 1e-4`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            weights: None,
            intercepts: Vec::new(),
            classes: Vec::new(),
            n_outputs: 0,
            c: 1.0,
            learning_rate: 0.5,
            max_iter: 500,
            tol: 1e-4,
        }
    }

    /// Sets the inverse regularization strength.
    #[must_use]
    pub fn with_c(mut self, c: f32) -> Self {
        self.c = c;
        self
    }

    /// Sets the learning rate.
    #[must_use]
    pub fn with_learning_rate(mut self, lr: f32) -> Self {
        self.learning_rate = lr;
        self
    }

    /// Sets the maximum number of iterations.
    #[must_use]
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Sets the convergence tolerance.
    #[must_use]
    pub fn with_tolerance(mut self, tol: f32) -> Self {
        self.tol = tol;
        self
    }

    /// Numerically stable in-place softmax.
    fn softmax(scores: &mut [f32]) {
        let max = scores.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        let mut sum = 0.0;
        for s in scores.iter_mut() {
            *s = (*s - max).exp();
            sum += *s;
        }
        for s in scores.iter_mut() {
            *s /= sum;
        }
    }

    fn scores(weights: &[Vec<f32>], intercepts: &[f32], active: &[(usize, f32)]) -> Vec<f32> {
        weights
            .iter()
            .zip(intercepts)
            .map(|(w, &b)| b + active.iter().map(|&(j, v)| w[j] * v).sum::<f32>())
            .collect()
    }

    /// Fits the model to training data.
    ///
    /// # Errors
    ///
    /// Returns an error for mismatched or empty input, or a non-positive
    /// `C`/learning rate.
    pub fn fit(&mut self, x: &Matrix<f32>, y: &[usize]) -> Result<()> {
        check_fit_input(x, y)?;
        if self.c <= 0.0 {
            return Err(DocrecError::InvalidHyperparameter {
                param: "C".to_string(),
                value: self.c.to_string(),
                constraint: ">0".to_string(),
            });
        }
        if self.learning_rate <= 0.0 {
            return Err(DocrecError::InvalidHyperparameter {
                param: "learning_rate".to_string(),
                value: self.learning_rate.to_string(),
                constraint: ">0".to_string(),
            });
        }

        let (n_samples, n_features) = x.shape();
        let classes = unique_classes(y);
        let k = classes.len();
        self.n_outputs = n_classes(y);

        let mut weights = vec![vec![0.0; n_features]; k];
        let mut intercepts = vec![0.0; k];

        // A single class leaves nothing to separate: a constant predictor.
        if k > 1 {
            let mut class_idx = vec![0; self.n_outputs];
            for (idx, &label) in classes.iter().enumerate() {
                class_idx[label] = idx;
            }
            let rows: Vec<Vec<(usize, f32)>> =
                (0..n_samples).map(|i| x.nonzero_in_row(i)).collect();
            let n = n_samples as f32;
            let alpha = 1.0 / (self.c * n);

            for _ in 0..self.max_iter {
                let mut w_grad = vec![vec![0.0; n_features]; k];
                let mut b_grad = vec![0.0; k];

                for (i, active) in rows.iter().enumerate() {
                    let mut probs = Self::scores(&weights, &intercepts, active);
                    Self::softmax(&mut probs);
                    probs[class_idx[y[i]]] -= 1.0;
                    for (c, &err) in probs.iter().enumerate() {
                        b_grad[c] += err;
                        for &(j, v) in active {
                            w_grad[c][j] += err * v;
                        }
                    }
                }

                let mut max_grad: f32 = 0.0;
                for c in 0..k {
                    b_grad[c] /= n;
                    max_grad = max_grad.max(b_grad[c].abs());
                    intercepts[c] -= self.learning_rate * b_grad[c];
                    for j in 0..n_features {
                        let g = w_grad[c][j] / n + alpha * weights[c][j];
                        max_grad = max_grad.max(g.abs());
                        weights[c][j] -= self.learning_rate * g;
                    }
                }

                if max_grad < self.tol {
                    break;
                }
            }
        }

        self.weights = Some(weights);
        self.intercepts = intercepts;
        self.classes = classes;
        Ok(())
    }

    /// Class probabilities, `n_outputs` columns per row.
    ///
    /// # Errors
    ///
    /// Returns error if model is not fitted or dimensions mismatch.
    pub fn predict_proba(&self, x: &Matrix<f32>) -> Result<Vec<Vec<f32>>> {
        let weights = self.weights.as_ref().ok_or_else(|| DocrecError::NotFitted {
            model: "Logistic Regression".to_string(),
        })?;
        let n_features = weights.first().map_or(0, Vec::len);
        if x.n_cols() != n_features {
            return Err(DocrecError::dimension_mismatch(
                "n_features",
                n_features,
                x.n_cols(),
            ));
        }

        let mut probabilities = Vec::with_capacity(x.n_rows());
        for i in 0..x.n_rows() {
            let mut probs = Self::scores(weights, &self.intercepts, &x.nonzero_in_row(i));
            Self::softmax(&mut probs);
            let mut row = vec![0.0; self.n_outputs];
            for (&label, p) in self.classes.iter().zip(probs) {
                row[label] = p;
            }
            probabilities.push(row);
        }
        Ok(probabilities)
    }

    /// Predicts class labels for samples.
    ///
    /// # Errors
    ///
    /// Returns error if model is not fitted or dimensions mismatch.
    pub fn predict(&self, x: &Matrix<f32>) -> Result<Vec<usize>> {
        Ok(self.predict_proba(x)?.iter().map(|p| argmax(p)).collect())
    }
}

impl Default for LogisticRegression {
    fn default() -> Self {
        Self::new()
    }
}

impl Classifier for LogisticRegression {
    fn name(&self) -> &str {
        "Logistic Regression"
    }

    fn fit(&mut self, x: &Matrix<f32>, y: &[usize]) -> Result<()> {
        LogisticRegression::fit(self, x, y)
    }

    fn predict(&self, x: &Matrix<f32>) -> Result<Vec<usize>> {
        LogisticRegression::predict(self, x)
    }

    fn predict_proba(&self, x: &Matrix<f32>) -> Result<Vec<Vec<f32>>> {
        LogisticRegression::predict_proba(self, x)
    }
}

/// Distance metric for K-Nearest Neighbors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceMetric {
    /// Euclidean distance: `sqrt(sum((x_i - y_i)^2))`
    Euclidean,
    /// Manhattan distance: `sum(|x_i - y_i|)`
    Manhattan,
}

/// K-Nearest Neighbors classifier.
///
/// Instance-based learning algorithm that classifies new samples based on
/// the k closest training examples in the feature space. Equidistant
/// neighbours keep training order; vote ties go to the lowest class id.
///
/// # Example
///
/// ```
/// use docrec::classification::KNearestNeighbors;
/// use docrec::primitives::Matrix;
///
/// let x = Matrix::from_vec(6, 2, vec![
///     0.0, 0.0,  // class 0
///     0.0, 1.0,  // class 0
///     1.0, 0.0,  // class 0
///     5.0, 5.0,  // class 1
///     5.0, 6.0,  // class 1
///     6.0, 5.0,  // class 1
/// ]).expect("6x2 matrix with 12 values");
/// let y = vec![0, 0, 0, 1, 1, 1];
///
/// let mut knn = KNearestNeighbors::new(3);
/// knn.fit(&x, &y).expect("Valid training data with 6 samples");
///
/// let test = Matrix::from_vec(1, 2, vec![0.5, 0.5]).expect("1x2 test matrix");
/// let predictions = knn.predict(&test).expect("Predict should succeed");
/// assert_eq!(predictions[0], 0);
/// ```
#[derive(Debug, Clone)]
pub struct KNearestNeighbors {
    /// Number of neighbors to use
    k: usize,
    /// Distance metric
    metric: DistanceMetric,
    /// Whether to use weighted voting (inverse distance)
    weights: bool,
    /// Training feature matrix (stored during fit)
    x_train: Option<Matrix<f32>>,
    /// Training labels (stored during fit)
    y_train: Option<Vec<usize>>,
    /// Width of `predict_proba` rows
    n_outputs: usize,
}

impl KNearestNeighbors {
    /// Creates a new K-Nearest Neighbors classifier.
    ///
    /// # Arguments
    ///
    /// * `k` - Number of neighbors to use for voting
    #[must_use]
    pub fn new(k: usize) -> Self {
        Self {
            k,
            metric: DistanceMetric::Euclidean,
            weights: false,
            x_train: None,
            y_train: None,
            n_outputs: 0,
        }
    }

    /// Sets the distance metric.
    #[must_use]
    pub fn with_metric(mut self, metric: DistanceMetric) -> Self {
        self.metric = metric;
        self
    }

    /// Enables weighted voting (inverse distance weighting).
    #[must_use]
    pub fn with_weights(mut self, weights: bool) -> Self {
        self.weights = weights;
        self
    }

    /// Fits the model by storing the training data.
    ///
    /// kNN is a lazy learner - it simply stores the training data
    /// and defers computation until prediction time.
    ///
    /// # Errors
    ///
    /// Returns error if data dimensions are invalid or `k` is zero or larger
    /// than the number of training samples.
    pub fn fit(&mut self, x: &Matrix<f32>, y: &[usize]) -> Result<()> {
        check_fit_input(x, y)?;

        if self.k == 0 {
            return Err(DocrecError::InvalidHyperparameter {
                param: "k".to_string(),
                value: "0".to_string(),
                constraint: ">0".to_string(),
            });
        }
        if self.k > x.n_rows() {
            return Err(format!(
                "k = {} cannot be larger than number of training samples ({})",
                self.k,
                x.n_rows()
            )
            .into());
        }

        self.x_train = Some(x.clone());
        self.y_train = Some(y.to_vec());
        self.n_outputs = n_classes(y);

        Ok(())
    }

    /// Returns probability estimates for each class.
    ///
    /// Probabilities are the proportion of neighbors belonging to each
    /// class (optionally weighted by inverse distance).
    ///
    /// # Errors
    ///
    /// Returns error if model is not fitted or dimensions mismatch.
    pub fn predict_proba(&self, x: &Matrix<f32>) -> Result<Vec<Vec<f32>>> {
        let not_fitted = || DocrecError::NotFitted {
            model: "K-Nearest Neighbors".to_string(),
        };
        let x_train = self.x_train.as_ref().ok_or_else(not_fitted)?;
        let y_train = self.y_train.as_ref().ok_or_else(not_fitted)?;

        if x.n_cols() != x_train.n_cols() {
            return Err(DocrecError::dimension_mismatch(
                "n_features",
                x_train.n_cols(),
                x.n_cols(),
            ));
        }

        let mut probabilities = Vec::with_capacity(x.n_rows());
        for i in 0..x.n_rows() {
            let mut distances: Vec<(f32, usize)> = (0..x_train.n_rows())
                .map(|j| (self.compute_distance(x, i, x_train, j), j))
                .collect();
            // Stable on (distance, training index): reproducible neighbour sets
            distances.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));

            let mut class_counts = vec![0.0; self.n_outputs];
            for &(dist, j) in &distances[..self.k] {
                // An exact match would divide by zero; count it as weight 1
                let weight = if self.weights && dist >= 1e-10 {
                    1.0 / dist
                } else {
                    1.0
                };
                class_counts[y_train[j]] += weight;
            }

            let total: f32 = class_counts.iter().sum();
            for count in &mut class_counts {
                *count /= total;
            }
            probabilities.push(class_counts);
        }

        Ok(probabilities)
    }

    /// Predicts class labels for samples.
    ///
    /// For each test sample, finds the k nearest training samples
    /// and returns the majority class.
    ///
    /// # Errors
    ///
    /// Returns error if model is not fitted or dimensions mismatch.
    pub fn predict(&self, x: &Matrix<f32>) -> Result<Vec<usize>> {
        Ok(self.predict_proba(x)?.iter().map(|p| argmax(p)).collect())
    }

    /// Computes distance between two samples.
    fn compute_distance(&self, x1: &Matrix<f32>, i1: usize, x2: &Matrix<f32>, i2: usize) -> f32 {
        match self.metric {
            DistanceMetric::Euclidean => x1.squared_distance(i1, x2, i2).sqrt(),
            DistanceMetric::Manhattan => x1
                .row(i1)
                .iter()
                .zip(x2.row(i2))
                .map(|(a, b)| (a - b).abs())
                .sum(),
        }
    }
}

impl Classifier for KNearestNeighbors {
    fn name(&self) -> &str {
        "K-Nearest Neighbors"
    }

    fn fit(&mut self, x: &Matrix<f32>, y: &[usize]) -> Result<()> {
        KNearestNeighbors::fit(self, x, y)
    }

    fn predict(&self, x: &Matrix<f32>) -> Result<Vec<usize>> {
        KNearestNeighbors::predict(self, x)
    }

    fn predict_proba(&self, x: &Matrix<f32>) -> Result<Vec<Vec<f32>>> {
        KNearestNeighbors::predict_proba(self, x)
    }
}

/// Gaussian Naive Bayes classifier.
///
/// Assumes features follow a Gaussian (normal) distribution within each class.
/// Uses Bayes' theorem with independence assumption between features.
/// Statistics are kept in `f64`: with binary features the smoothed
/// variances are tiny and the log-likelihoods large.
///
/// # Example
///
/// ```
/// use docrec::classification::GaussianNB;
/// use docrec::primitives::Matrix;
///
/// let x = Matrix::from_vec(4, 2, vec![
///     0.0, 0.0,
///     0.0, 1.0,
///     1.0, 0.0,
///     1.0, 1.0,
/// ]).expect("4x2 matrix with 8 values");
/// let y = vec![0, 0, 1, 1];
///
/// let mut model = GaussianNB::new();
/// model.fit(&x, &y).expect("Valid training data");
/// let predictions = model.predict(&x).expect("Model is fitted");
/// assert_eq!(predictions, y);
/// ```
#[derive(Debug, Clone)]
pub struct GaussianNB {
    /// Class prior probabilities P(y=c)
    class_priors: Option<Vec<f64>>,
    /// Feature means per class: means[class][feature]
    means: Option<Vec<Vec<f64>>>,
    /// Feature variances per class: variances[class][feature]
    variances: Option<Vec<Vec<f64>>>,
    /// Class labels
    classes: Vec<usize>,
    /// Width of `predict_proba` rows
    n_outputs: usize,
    /// Fraction of the largest feature variance added to every variance
    var_smoothing: f64,
}

impl GaussianNB {
    /// Creates a new Gaussian Naive Bayes classifier.
    #[must_use]
    pub fn new() -> Self {
        Self {
            class_priors: None,
            means: None,
            variances: None,
            classes: Vec::new(),
            n_outputs: 0,
            var_smoothing: 1e-9,
        }
    }

    /// Sets the variance smoothing parameter.
    ///
    /// `var_smoothing * max_feature_variance` is added to every per-class
    /// variance to avoid division by zero.
    #[must_use]
    pub fn with_var_smoothing(mut self, var_smoothing: f64) -> Self {
        self.var_smoothing = var_smoothing;
        self
    }

    /// Trains the Gaussian Naive Bayes classifier.
    ///
    /// Computes class priors, feature means, and variances for each class.
    ///
    /// # Errors
    ///
    /// Returns error on sample count mismatch, empty data, or a non-positive
    /// smoothing value.
    pub fn fit(&mut self, x: &Matrix<f32>, y: &[usize]) -> Result<()> {
        check_fit_input(x, y)?;
        if self.var_smoothing <= 0.0 {
            return Err(DocrecError::InvalidHyperparameter {
                param: "var_smoothing".to_string(),
                value: self.var_smoothing.to_string(),
                constraint: ">0".to_string(),
            });
        }

        let (n_samples, n_features) = x.shape();
        let classes = unique_classes(y);
        let n_classes_seen = classes.len();

        let max_variance = (0..n_features)
            .map(|j| x.column_variance(j))
            .fold(0.0, f64::max);
        let epsilon = if max_variance > 0.0 {
            self.var_smoothing * max_variance
        } else {
            self.var_smoothing
        };

        let mut class_priors = vec![0.0; n_classes_seen];
        let mut means = vec![vec![0.0; n_features]; n_classes_seen];
        let mut variances = vec![vec![0.0; n_features]; n_classes_seen];

        for (class_idx, &class_label) in classes.iter().enumerate() {
            let class_samples: Vec<usize> = y
                .iter()
                .enumerate()
                .filter_map(|(i, &label)| (label == class_label).then_some(i))
                .collect();

            let n_class_samples = class_samples.len() as f64;
            class_priors[class_idx] = n_class_samples / n_samples as f64;

            for (feature_idx, mean_val) in means[class_idx].iter_mut().enumerate() {
                let sum: f64 = class_samples
                    .iter()
                    .map(|&sample_idx| f64::from(x.get(sample_idx, feature_idx)))
                    .sum();
                *mean_val = sum / n_class_samples;
            }

            for (feature_idx, variance_val) in variances[class_idx].iter_mut().enumerate() {
                let mean = means[class_idx][feature_idx];
                let sum_sq_diff: f64 = class_samples
                    .iter()
                    .map(|&sample_idx| {
                        let diff = f64::from(x.get(sample_idx, feature_idx)) - mean;
                        diff * diff
                    })
                    .sum();
                *variance_val = sum_sq_diff / n_class_samples + epsilon;
            }
        }

        self.class_priors = Some(class_priors);
        self.means = Some(means);
        self.variances = Some(variances);
        self.classes = classes;
        self.n_outputs = n_classes(y);

        Ok(())
    }

    /// Joint log-likelihood `ln P(y=c) + Σ ln P(x_i|y=c)` per sample, one
    /// entry per class seen during `fit`.
    fn joint_log_likelihood(&self, x: &Matrix<f32>) -> Result<Vec<Vec<f64>>> {
        let not_fitted = || DocrecError::NotFitted {
            model: "NaiveBayes".to_string(),
        };
        let means = self.means.as_ref().ok_or_else(not_fitted)?;
        let variances = self.variances.as_ref().ok_or_else(not_fitted)?;
        let class_priors = self.class_priors.as_ref().ok_or_else(not_fitted)?;

        let (n_samples, n_features) = x.shape();
        let expected = means.first().map_or(0, Vec::len);
        if n_features != expected {
            return Err(DocrecError::dimension_mismatch(
                "n_features",
                expected,
                n_features,
            ));
        }

        Ok((0..n_samples)
            .map(|sample_idx| {
                (0..self.classes.len())
                    .map(|class_idx| {
                        let mut log_prob = class_priors[class_idx].ln();
                        for feature_idx in 0..n_features {
                            let diff = f64::from(x.get(sample_idx, feature_idx))
                                - means[class_idx][feature_idx];
                            let variance = variances[class_idx][feature_idx];
                            // Log of Gaussian PDF: -0.5 * log(2π*σ²) - (x-μ)² / (2σ²)
                            log_prob -= 0.5 * (2.0 * std::f64::consts::PI * variance).ln()
                                + (diff * diff) / (2.0 * variance);
                        }
                        log_prob
                    })
                    .collect()
            })
            .collect())
    }

    /// Returns probability estimates for each class.
    ///
    /// Uses Bayes' theorem with Gaussian likelihood:
    /// P(y=c|X) ∝ P(y=c) * ∏ `P(x_i|y=c)`
    ///
    /// # Errors
    ///
    /// Returns error if model is not fitted or dimension mismatch.
    pub fn predict_proba(&self, x: &Matrix<f32>) -> Result<Vec<Vec<f32>>> {
        let joint = self.joint_log_likelihood(x)?;
        let mut probabilities = Vec::with_capacity(joint.len());

        for log_probs in joint {
            // Log-sum-exp normalisation
            let max_log_prob = log_probs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            let exp_probs: Vec<f64> = log_probs
                .iter()
                .map(|&log_p| (log_p - max_log_prob).exp())
                .collect();
            let sum: f64 = exp_probs.iter().sum();

            let mut row = vec![0.0; self.n_outputs];
            for (&label, p) in self.classes.iter().zip(exp_probs) {
                row[label] = (p / sum) as f32;
            }
            probabilities.push(row);
        }

        Ok(probabilities)
    }

    /// Predicts class labels for samples.
    ///
    /// Picks the class with the highest joint log-likelihood, compared in
    /// f64; ties go to the lowest class id.
    ///
    /// # Errors
    ///
    /// Returns error if model is not fitted or dimension mismatch.
    pub fn predict(&self, x: &Matrix<f32>) -> Result<Vec<usize>> {
        Ok(self
            .joint_log_likelihood(x)?
            .iter()
            .map(|log_probs| {
                let mut best = 0;
                for (idx, &lp) in log_probs.iter().enumerate() {
                    if lp > log_probs[best] {
                        best = idx;
                    }
                }
                self.classes.get(best).copied().unwrap_or(0)
            })
            .collect())
    }
}

impl Default for GaussianNB {
    fn default() -> Self {
        Self::new()
    }
}

impl Classifier for GaussianNB {
    fn name(&self) -> &str {
        "NaiveBayes"
    }

    fn fit(&mut self, x: &Matrix<f32>, y: &[usize]) -> Result<()> {
        GaussianNB::fit(self, x, y)
    }

    fn predict(&self, x: &Matrix<f32>) -> Result<Vec<usize>> {
        GaussianNB::predict(self, x)
    }

    fn predict_proba(&self, x: &Matrix<f32>) -> Result<Vec<Vec<f32>>> {
        GaussianNB::predict_proba(self, x)
    }
}
