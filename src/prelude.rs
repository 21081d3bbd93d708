//! Convenience re-exports for common usage.
//!
//! # Usage
//!
//! ```
//! use docrec::prelude::*;
//! ```

pub use crate::classification::{
    GaussianNB, KNearestNeighbors, LogisticRegression, SupportVectorClassifier,
};
pub use crate::config::DocrecConfig;
pub use crate::ensemble::{Ensemble, EnsembleConfig, ModelKind, Voting};
pub use crate::error::{DocrecError, Result};
pub use crate::inference::{Diagnosis, InferenceContext, PredictionQuery};
pub use crate::primitives::Matrix;
pub use crate::report::Report;
pub use crate::traits::Classifier;
pub use crate::tree::{DecisionTreeClassifier, RandomForestClassifier};
