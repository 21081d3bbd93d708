//! Helper functions for tree building algorithms.
//!
//! Splitting works on index lists into the shared training matrix, so the
//! recursion never copies feature rows.

use super::{Leaf, Node, TreeNode};
use crate::primitives::Matrix;
use rand::distributions::{Distribution, Uniform};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

/// Gains at or below this are treated as no improvement.
const MIN_GAIN: f64 = 1e-12;

/// Gini impurity of a class count vector.
///
/// Formula: Gini = 1 - Σ(p_i²) where p_i is the proportion of class i
pub(super) fn gini_from_counts(counts: &[usize], total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let n = total as f64;
    1.0 - counts
        .iter()
        .map(|&c| {
            let p = c as f64 / n;
            p * p
        })
        .sum::<f64>()
}

/// Class counts for the labels at `indices`.
pub(super) fn class_counts(y: &[usize], indices: &[usize], n_outputs: usize) -> Vec<usize> {
    let mut counts = vec![0; n_outputs];
    for &i in indices {
        counts[y[i]] += 1;
    }
    counts
}

/// A candidate split.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(super) struct Split {
    pub feature_idx: usize,
    pub threshold: f32,
    pub gain: f64,
}

/// Best threshold for one feature: midpoints between consecutive distinct
/// values, scored by Gini gain with incremental class counts.
pub(super) fn best_split_for_feature(
    x: &Matrix<f32>,
    y: &[usize],
    indices: &[usize],
    feature_idx: usize,
    parent_counts: &[usize],
) -> Option<Split> {
    let n = indices.len();
    if n < 2 {
        return None;
    }

    let mut sorted: Vec<(f32, usize)> = indices
        .iter()
        .map(|&i| (x.get(i, feature_idx), y[i]))
        .collect();
    sorted.sort_by(|a, b| a.0.total_cmp(&b.0));

    let parent = gini_from_counts(parent_counts, n);
    let mut left = vec![0; parent_counts.len()];
    let mut right = parent_counts.to_vec();
    let mut best: Option<Split> = None;

    for k in 0..n - 1 {
        let (value, label) = sorted[k];
        left[label] += 1;
        right[label] -= 1;

        let next = sorted[k + 1].0;
        if next <= value {
            continue;
        }

        let n_left = k + 1;
        let n_right = n - n_left;
        let weighted = (n_left as f64 * gini_from_counts(&left, n_left)
            + n_right as f64 * gini_from_counts(&right, n_right))
            / n as f64;
        let gain = parent - weighted;

        if gain > MIN_GAIN && best.map_or(true, |b| gain > b.gain) {
            best = Some(Split {
                feature_idx,
                threshold: (value + next) / 2.0,
                gain,
            });
        }
    }

    best
}

/// Recursive CART builder over row indices.
pub(super) struct TreeBuilder<'a> {
    pub x: &'a Matrix<f32>,
    pub y: &'a [usize],
    pub n_outputs: usize,
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    /// Candidate features per split; `n_features` evaluates all of them
    pub max_features: usize,
    pub rng: StdRng,
}

impl TreeBuilder<'_> {
    pub(super) fn build(&mut self, indices: &[usize], depth: usize) -> TreeNode {
        let counts = class_counts(self.y, indices, self.n_outputs);
        let is_pure = counts.iter().filter(|&&c| c > 0).count() <= 1;
        let at_max_depth = self.max_depth.is_some_and(|max| depth >= max);

        if is_pure || at_max_depth || indices.len() < self.min_samples_split {
            return make_leaf(counts, indices.len());
        }

        let Some(split) = self.find_split(indices, &counts) else {
            return make_leaf(counts, indices.len());
        };

        let (left, right): (Vec<usize>, Vec<usize>) = indices
            .iter()
            .partition(|&&i| self.x.get(i, split.feature_idx) <= split.threshold);

        let left_child = self.build(&left, depth + 1);
        let right_child = self.build(&right, depth + 1);

        TreeNode::Node(Node {
            feature_idx: split.feature_idx,
            threshold: split.threshold,
            left: Box::new(left_child),
            right: Box::new(right_child),
        })
    }

    /// Draws features in random order and keeps looking past `max_features`
    /// until at least one valid split has been found.
    fn find_split(&mut self, indices: &[usize], counts: &[usize]) -> Option<Split> {
        let n_features = self.x.n_cols();
        let mut features: Vec<usize> = (0..n_features).collect();
        if self.max_features < n_features {
            features.shuffle(&mut self.rng);
        }

        let mut best: Option<Split> = None;
        for (visited, &feature_idx) in features.iter().enumerate() {
            if visited >= self.max_features && best.is_some() {
                break;
            }
            if let Some(split) =
                best_split_for_feature(self.x, self.y, indices, feature_idx, counts)
            {
                if best.map_or(true, |b| split.gain > b.gain) {
                    best = Some(split);
                }
            }
        }
        best
    }
}

fn make_leaf(class_counts: Vec<usize>, n_samples: usize) -> TreeNode {
    TreeNode::Leaf(Leaf {
        class_counts,
        n_samples,
    })
}

/// Creates a bootstrap sample (random sample with replacement).
///
/// Returns indices of samples to include in the bootstrap sample.
pub(super) fn bootstrap_sample(n_samples: usize, rng: &mut StdRng) -> Vec<usize> {
    let dist = Uniform::from(0..n_samples);
    (0..n_samples).map(|_| dist.sample(rng)).collect()
}

#[cfg(test)]
#[path = "helpers_tests.rs"]
mod tests;
