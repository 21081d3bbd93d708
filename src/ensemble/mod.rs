//! Multi-model voting ensemble.
//!
//! Every member is trained independently on the same data. A query row gets
//! one vote from each member; [`VoteTally`] turns the votes into per-class
//! percentages.

mod config;
mod voting;

pub use config::{
    EnsembleConfig, ForestParams, KnnParams, LogisticParams, ModelKind, NaiveBayesParams,
    SvmParams, TreeParams,
};
pub use voting::{VoteTally, Voting};

use crate::error::{DocrecError, Result};
use crate::primitives::Matrix;
use crate::traits::Classifier;
use serde::Serialize;
use std::time::Instant;
use tracing::{debug, info};

/// One member's vote for a single query row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Vote {
    /// Member name
    pub model: String,
    /// Predicted class id
    pub class_id: usize,
}

/// A fixed set of fitted classifiers.
pub struct Ensemble {
    members: Vec<Box<dyn Classifier>>,
}

impl std::fmt::Debug for Ensemble {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ensemble")
            .field("members", &self.names())
            .finish()
    }
}

impl Ensemble {
    /// Starts an ensemble from already-fitted members.
    pub fn builder() -> EnsembleBuilder {
        EnsembleBuilder::new()
    }

    /// Builds and fits every model named in `config`.
    ///
    /// # Errors
    ///
    /// Returns `ModelFit` naming the first member that fails; no partial
    /// ensemble is returned.
    pub fn train(config: &EnsembleConfig, x: &Matrix<f32>, y: &[usize]) -> Result<Self> {
        config.validate()?;
        let mut members = Vec::with_capacity(config.models.len());
        for &kind in &config.models {
            let mut model = config.build_member(kind);
            let started = Instant::now();
            model
                .fit(x, y)
                .map_err(|e| DocrecError::model_fit(kind.display_name(), e))?;
            debug!(
                model = kind.display_name(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "fitted ensemble member"
            );
            members.push(model);
        }
        info!(
            members = members.len(),
            samples = x.n_rows(),
            features = x.n_cols(),
            "ensemble trained"
        );
        Ok(Self { members })
    }

    /// Wraps already-fitted members.
    ///
    /// # Errors
    ///
    /// Returns an error if `members` is empty.
    pub fn from_members(members: Vec<Box<dyn Classifier>>) -> Result<Self> {
        if members.is_empty() {
            return Err("An ensemble needs at least one member".into());
        }
        Ok(Self { members })
    }

    /// Number of members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// True if there are no members (never the case for a built ensemble).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Member names in vote order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.members.iter().map(|m| m.name()).collect()
    }

    /// One vote per member for the first row of `row`.
    ///
    /// # Errors
    ///
    /// Returns the first member error (width mismatch).
    pub fn votes(&self, row: &Matrix<f32>) -> Result<Vec<Vote>> {
        self.members
            .iter()
            .map(|member| -> Result<Vote> {
                let class_id = member
                    .predict(row)?
                    .first()
                    .copied()
                    .ok_or("Cannot vote on an empty query")?;
                Ok(Vote {
                    model: member.name().to_string(),
                    class_id,
                })
            })
            .collect()
    }

    /// Each member's class probabilities for the first row of `row`.
    ///
    /// # Errors
    ///
    /// Returns the first member error, including members fitted without
    /// probability support.
    pub fn probabilities(&self, row: &Matrix<f32>) -> Result<Vec<Vec<f32>>> {
        self.members
            .iter()
            .map(|member| -> Result<Vec<f32>> {
                member
                    .predict_proba(row)?
                    .into_iter()
                    .next()
                    .ok_or_else(|| DocrecError::from("Cannot vote on an empty query"))
            })
            .collect()
    }

    /// Combines member outputs for one row under `voting`.
    ///
    /// # Errors
    ///
    /// Returns the first member error.
    pub fn tally(&self, row: &Matrix<f32>, voting: Voting) -> Result<(Vec<Vote>, VoteTally)> {
        let votes = self.votes(row)?;
        let tally = match voting {
            Voting::Hard => {
                let ids: Vec<usize> = votes.iter().map(|v| v.class_id).collect();
                VoteTally::from_votes(&ids)
            }
            Voting::Soft => VoteTally::from_probabilities(&self.probabilities(row)?),
        };
        Ok((votes, tally))
    }
}

/// Builder for [`Ensemble`].
#[derive(Default)]
pub struct EnsembleBuilder {
    members: Vec<Box<dyn Classifier>>,
}

impl EnsembleBuilder {
    fn new() -> Self {
        Self::default()
    }

    /// Adds a fitted member.
    #[must_use]
    pub fn member(mut self, member: Box<dyn Classifier>) -> Self {
        self.members.push(member);
        self
    }

    /// Finishes the ensemble.
    ///
    /// # Errors
    ///
    /// Returns an error if no member was added.
    pub fn build(self) -> Result<Ensemble> {
        Ensemble::from_members(self.members)
    }
}
