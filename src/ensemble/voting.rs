//! Vote aggregation.

use crate::error::{DocrecError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// How member outputs combine into per-class percentages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Voting {
    /// One vote per model; percentage = votes / models × 100
    #[default]
    Hard,
    /// Mean class probability across models × 100
    Soft,
}

impl fmt::Display for Voting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Voting::Hard => f.write_str("hard"),
            Voting::Soft => f.write_str("soft"),
        }
    }
}

impl FromStr for Voting {
    type Err = DocrecError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hard" => Ok(Voting::Hard),
            "soft" => Ok(Voting::Soft),
            other => Err(format!("Unknown voting strategy '{other}', expected hard or soft").into()),
        }
    }
}

/// Per-class percentages from one round of voting.
///
/// # Examples
///
/// ```
/// use docrec::ensemble::VoteTally;
///
/// let tally = VoteTally::from_votes(&[2, 2, 2, 0, 0, 0]);
/// assert_eq!(tally.filter(50), vec![(0, 50.0), (2, 50.0)]);
/// assert!(tally.filter(51).is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VoteTally {
    percentages: BTreeMap<usize, f64>,
    n_models: usize,
}

impl VoteTally {
    /// Hard voting: each class id is one model's vote.
    #[must_use]
    pub fn from_votes(class_ids: &[usize]) -> Self {
        let mut counts: BTreeMap<usize, usize> = BTreeMap::new();
        for &id in class_ids {
            *counts.entry(id).or_insert(0) += 1;
        }
        let n = class_ids.len();
        let percentages = counts
            .into_iter()
            .map(|(id, count)| (id, count as f64 * 100.0 / n as f64))
            .collect();
        Self {
            percentages,
            n_models: n,
        }
    }

    /// Soft voting: mean probability per class; zero-probability classes
    /// are left out.
    #[must_use]
    pub fn from_probabilities(rows: &[Vec<f32>]) -> Self {
        let n = rows.len();
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        let mut sums = vec![0.0_f64; width];
        for row in rows {
            for (sum, &p) in sums.iter_mut().zip(row) {
                *sum += f64::from(p);
            }
        }
        let percentages = sums
            .into_iter()
            .enumerate()
            .filter(|&(_, sum)| sum > 0.0)
            .map(|(id, sum)| (id, sum * 100.0 / n as f64))
            .collect();
        Self {
            percentages,
            n_models: n,
        }
    }

    /// Number of models that voted.
    #[must_use]
    pub fn n_models(&self) -> usize {
        self.n_models
    }

    /// Percentage for every class that received support.
    #[must_use]
    pub fn percentages(&self) -> &BTreeMap<usize, f64> {
        &self.percentages
    }

    /// Classes whose percentage is at least `threshold`, by class id.
    #[must_use]
    pub fn filter(&self, threshold: u8) -> Vec<(usize, f64)> {
        let threshold = f64::from(threshold);
        self.percentages
            .iter()
            .filter(|&(_, &pct)| pct >= threshold)
            .map(|(&id, &pct)| (id, pct))
            .collect()
    }
}
