//! Ensemble membership and per-model hyperparameters.

use crate::classification::{
    DistanceMetric, GaussianNB, KNearestNeighbors, Kernel, LogisticRegression,
    SupportVectorClassifier,
};
use crate::error::{DocrecError, Result};
use crate::traits::Classifier;
use crate::tree::{DecisionTreeClassifier, RandomForestClassifier};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The algorithm families an ensemble can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    /// Multinomial logistic regression
    LogisticRegression,
    /// CART decision tree
    DecisionTree,
    /// Bagged trees with feature sub-sampling
    RandomForest,
    /// RBF support-vector classifier
    Svm,
    /// Gaussian naive Bayes
    NaiveBayes,
    /// k-nearest neighbours
    Knn,
}

impl ModelKind {
    /// All six kinds in the default ensemble order.
    pub const ALL: [ModelKind; 6] = [
        ModelKind::LogisticRegression,
        ModelKind::DecisionTree,
        ModelKind::RandomForest,
        ModelKind::Svm,
        ModelKind::NaiveBayes,
        ModelKind::Knn,
    ];

    /// Name shown in vote breakdowns.
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            ModelKind::LogisticRegression => "Logistic Regression",
            ModelKind::DecisionTree => "Decision Tree",
            ModelKind::RandomForest => "Random Forest",
            ModelKind::Svm => "SVM",
            ModelKind::NaiveBayes => "NaiveBayes",
            ModelKind::Knn => "K-Nearest Neighbors",
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Logistic regression settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogisticParams {
    /// Inverse L2 strength
    pub c: f32,
    pub learning_rate: f32,
    pub max_iter: usize,
    pub tol: f32,
}

impl Default for LogisticParams {
    fn default() -> Self {
        Self {
            c: 1.0,
            learning_rate: 0.5,
            max_iter: 500,
            tol: 1e-4,
        }
    }
}

/// Decision tree settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeParams {
    /// `None` grows until leaves are pure
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self {
            max_depth: None,
            min_samples_split: 2,
        }
    }
}

/// Random forest settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForestParams {
    pub n_estimators: usize,
    pub max_depth: Option<usize>,
    /// `None` uses √n_features
    pub max_features: Option<usize>,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            max_depth: None,
            max_features: None,
        }
    }
}

/// Support-vector settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SvmParams {
    pub kernel: Kernel,
    pub c: f64,
    /// `None` uses `1 / (n_features * Var(X))`
    pub gamma: Option<f64>,
    pub tol: f64,
    pub max_iter: usize,
    /// Fit Platt scaling; soft voting needs it
    pub probability: bool,
}

impl Default for SvmParams {
    fn default() -> Self {
        Self {
            kernel: Kernel::Rbf,
            c: 1.0,
            gamma: None,
            tol: 1e-3,
            max_iter: 100_000,
            probability: true,
        }
    }
}

/// Gaussian naive Bayes settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NaiveBayesParams {
    pub var_smoothing: f64,
}

impl Default for NaiveBayesParams {
    fn default() -> Self {
        Self {
            var_smoothing: 1e-9,
        }
    }
}

/// k-nearest-neighbours settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KnnParams {
    pub k: usize,
    pub metric: DistanceMetric,
    /// Inverse-distance weighted votes
    pub weighted: bool,
}

impl Default for KnnParams {
    fn default() -> Self {
        Self {
            k: 5,
            metric: DistanceMetric::Euclidean,
            weighted: false,
        }
    }
}

/// Which models the ensemble trains, and how.
///
/// # Examples
///
/// ```
/// use docrec::ensemble::{EnsembleConfig, ModelKind};
///
/// let config = EnsembleConfig::default().with_seed(7);
/// assert_eq!(config.models, ModelKind::ALL.to_vec());
/// assert_eq!(config.knn.k, 5);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnsembleConfig {
    /// Seed for the randomised models
    pub seed: u64,
    /// Members in vote order; always the six kinds, each once
    pub models: Vec<ModelKind>,
    pub logistic: LogisticParams,
    pub tree: TreeParams,
    pub forest: ForestParams,
    pub svm: SvmParams,
    pub naive_bayes: NaiveBayesParams,
    pub knn: KnnParams,
}

impl Default for EnsembleConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            models: ModelKind::ALL.to_vec(),
            logistic: LogisticParams::default(),
            tree: TreeParams::default(),
            forest: ForestParams::default(),
            svm: SvmParams::default(),
            naive_bayes: NaiveBayesParams::default(),
            knn: KnnParams::default(),
        }
    }
}

impl EnsembleConfig {
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    #[must_use]
    pub fn with_models(mut self, models: Vec<ModelKind>) -> Self {
        self.models = models;
        self
    }

    #[must_use]
    pub fn with_knn_k(mut self, k: usize) -> Self {
        self.knn.k = k;
        self
    }

    #[must_use]
    pub fn with_n_estimators(mut self, n_estimators: usize) -> Self {
        self.forest.n_estimators = n_estimators;
        self
    }

    #[must_use]
    pub fn with_svm_probability(mut self, probability: bool) -> Self {
        self.svm.probability = probability;
        self
    }

    /// Checks hyperparameters that are invalid regardless of the data.
    ///
    /// Data-dependent limits (k larger than the sample count) surface when
    /// the model is fitted.
    ///
    /// # Errors
    ///
    /// Returns `InvalidHyperparameter` naming the first offending setting.
    pub fn validate(&self) -> Result<()> {
        fn invalid(param: &str, value: impl ToString, constraint: &str) -> DocrecError {
            DocrecError::InvalidHyperparameter {
                param: param.to_string(),
                value: value.to_string(),
                constraint: constraint.to_string(),
            }
        }

        let mut kinds = self.models.clone();
        kinds.sort_unstable();
        if kinds != ModelKind::ALL {
            return Err(invalid(
                "models",
                format!("{:?}", self.models),
                "each of the six model kinds exactly once",
            ));
        }
        if self.logistic.c <= 0.0 {
            return Err(invalid("logistic.c", self.logistic.c, ">0"));
        }
        if self.logistic.learning_rate <= 0.0 {
            return Err(invalid(
                "logistic.learning_rate",
                self.logistic.learning_rate,
                ">0",
            ));
        }
        if self.tree.min_samples_split < 2 {
            return Err(invalid(
                "tree.min_samples_split",
                self.tree.min_samples_split,
                ">=2",
            ));
        }
        if self.forest.n_estimators == 0 {
            return Err(invalid("forest.n_estimators", 0, ">0"));
        }
        if self.forest.max_features == Some(0) {
            return Err(invalid("forest.max_features", 0, ">0"));
        }
        if self.svm.c <= 0.0 {
            return Err(invalid("svm.c", self.svm.c, ">0"));
        }
        if let Some(gamma) = self.svm.gamma {
            if gamma <= 0.0 {
                return Err(invalid("svm.gamma", gamma, ">0"));
            }
        }
        if self.svm.tol <= 0.0 {
            return Err(invalid("svm.tol", self.svm.tol, ">0"));
        }
        if self.naive_bayes.var_smoothing <= 0.0 {
            return Err(invalid(
                "naive_bayes.var_smoothing",
                self.naive_bayes.var_smoothing,
                ">0",
            ));
        }
        if self.knn.k == 0 {
            return Err(invalid("knn.k", 0, ">0"));
        }
        Ok(())
    }

    /// Creates an unfitted classifier of `kind` with these settings.
    #[must_use]
    pub fn build_member(&self, kind: ModelKind) -> Box<dyn Classifier> {
        match kind {
            ModelKind::LogisticRegression => Box::new(
                LogisticRegression::new()
                    .with_c(self.logistic.c)
                    .with_learning_rate(self.logistic.learning_rate)
                    .with_max_iter(self.logistic.max_iter)
                    .with_tolerance(self.logistic.tol),
            ),
            ModelKind::DecisionTree => {
                let mut tree = DecisionTreeClassifier::new()
                    .with_min_samples_split(self.tree.min_samples_split)
                    .with_random_state(self.seed);
                if let Some(depth) = self.tree.max_depth {
                    tree = tree.with_max_depth(depth);
                }
                Box::new(tree)
            }
            ModelKind::RandomForest => {
                let mut forest = RandomForestClassifier::new(self.forest.n_estimators)
                    .with_random_state(self.seed);
                if let Some(depth) = self.forest.max_depth {
                    forest = forest.with_max_depth(depth);
                }
                if let Some(max_features) = self.forest.max_features {
                    forest = forest.with_max_features(max_features);
                }
                Box::new(forest)
            }
            ModelKind::Svm => {
                let mut svc = SupportVectorClassifier::new()
                    .with_kernel(self.svm.kernel)
                    .with_c(self.svm.c)
                    .with_tolerance(self.svm.tol)
                    .with_max_iter(self.svm.max_iter)
                    .with_probability(self.svm.probability);
                if let Some(gamma) = self.svm.gamma {
                    svc = svc.with_gamma(gamma);
                }
                Box::new(svc)
            }
            ModelKind::NaiveBayes => Box::new(
                GaussianNB::new().with_var_smoothing(self.naive_bayes.var_smoothing),
            ),
            ModelKind::Knn => Box::new(
                KNearestNeighbors::new(self.knn.k)
                    .with_metric(self.knn.metric)
                    .with_weights(self.knn.weighted),
            ),
        }
    }
}
