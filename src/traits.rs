//! Core traits for classifiers.
//!
//! Every ensemble member implements [`Classifier`], so the ensemble can hold
//! six different algorithm families behind one `predict` capability.

use crate::error::Result;
use crate::primitives::Matrix;

/// A supervised multi-class classifier over dense `f32` features.
///
/// Labels are class ids `0..n_classes`. `predict_proba` returns one row per
/// sample with `n_classes` columns, where `n_classes` is one more than the
/// largest label seen during `fit`.
///
/// # Examples
///
/// ```
/// use docrec::prelude::*;
///
/// let x = Matrix::from_vec(4, 2, vec![
///     1.0, 0.0,
///     1.0, 0.0,
///     0.0, 1.0,
///     0.0, 1.0,
/// ]).expect("4x2 matrix");
/// let y = vec![0, 0, 1, 1];
///
/// let mut model: Box<dyn Classifier> = Box::new(DecisionTreeClassifier::new());
/// model.fit(&x, &y).expect("valid training data");
/// assert_eq!(model.predict(&x).expect("fitted"), y);
/// ```
pub trait Classifier: Send + Sync {
    /// Human-readable algorithm name, used in logs and vote breakdowns.
    fn name(&self) -> &str;

    /// Fits the model to training data.
    ///
    /// # Errors
    ///
    /// Returns an error if fitting fails (dimension mismatch, empty data,
    /// hyperparameters incompatible with the data).
    fn fit(&mut self, x: &Matrix<f32>, y: &[usize]) -> Result<()>;

    /// Predicts one class id per row.
    ///
    /// # Errors
    ///
    /// Returns an error if the model is not fitted or the feature width differs.
    fn predict(&self, x: &Matrix<f32>) -> Result<Vec<usize>>;

    /// Class probability estimates, one row per sample.
    ///
    /// # Errors
    ///
    /// Returns an error if the model is not fitted or the feature width differs.
    fn predict_proba(&self, x: &Matrix<f32>) -> Result<Vec<Vec<f32>>>;
}

/// Index of the largest value; ties resolve to the lowest index.
///
/// Returns 0 for an empty slice.
pub(crate) fn argmax(values: &[f32]) -> usize {
    let mut best = 0;
    for (idx, &v) in values.iter().enumerate() {
        if v > values[best] {
            best = idx;
        }
    }
    best
}

/// Number of classes implied by a label vector (largest label + 1).
pub(crate) fn n_classes(y: &[usize]) -> usize {
    y.iter().max().map_or(0, |&m| m + 1)
}

/// Sorted, deduplicated labels present in `y`.
pub(crate) fn unique_classes(y: &[usize]) -> Vec<usize> {
    let mut classes = y.to_vec();
    classes.sort_unstable();
    classes.dedup();
    classes
}

/// Shared input validation for `fit`.
pub(crate) fn check_fit_input(x: &Matrix<f32>, y: &[usize]) -> Result<()> {
    if x.n_rows() != y.len() {
        return Err("Number of samples in X and y must match".into());
    }
    if x.n_rows() == 0 {
        return Err("Cannot fit with zero samples".into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_argmax_prefers_lowest_index_on_tie() {
        assert_eq!(argmax(&[0.2, 0.4, 0.4]), 1);
        assert_eq!(argmax(&[0.5, 0.5]), 0);
        assert_eq!(argmax(&[]), 0);
    }

    #[test]
    fn test_n_classes_from_labels() {
        assert_eq!(n_classes(&[0, 3, 1]), 4);
        assert_eq!(n_classes(&[]), 0);
    }

    #[test]
    fn test_unique_classes_sorted() {
        assert_eq!(unique_classes(&[2, 0, 2, 1, 0]), vec![0, 1, 2]);
    }

    #[test]
    fn test_check_fit_input() {
        let x = Matrix::from_vec(2, 1, vec![0.0, 1.0]).expect("2x1");
        assert!(check_fit_input(&x, &[0, 1]).is_ok());
        let err = check_fit_input(&x, &[0]).unwrap_err();
        assert_eq!(err, "Number of samples in X and y must match");
        let empty = Matrix::zeros(0, 1);
        assert_eq!(
            check_fit_input(&empty, &[]).unwrap_err(),
            "Cannot fit with zero samples"
        );
    }
}
