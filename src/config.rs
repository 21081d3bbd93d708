//! Application configuration.
//!
//! Every field has a default, so a JSON file only needs the settings it
//! changes:
//!
//! ```json
//! { "data_dir": "/srv/docrec", "threshold": 50, "ensemble": { "knn": { "k": 3 } } }
//! ```

use crate::ensemble::{EnsembleConfig, Voting};
use crate::error::{DocrecError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default confidence threshold, in percent.
pub const DEFAULT_THRESHOLD: u8 = 20;

/// Dataset locations, query defaults and ensemble settings.
///
/// # Examples
///
/// ```
/// use docrec::config::DocrecConfig;
///
/// let config = DocrecConfig::default().with_data_dir("data").with_threshold(50);
/// assert_eq!(config.symptom_path(), std::path::Path::new("data/Original_Dataset.csv"));
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocrecConfig {
    /// Directory holding the three CSV resources
    pub data_dir: PathBuf,
    /// Disease → symptoms table, relative to `data_dir`
    pub symptom_file: String,
    /// Headerless Latin-1 disease → specialist table
    pub specialist_file: String,
    /// `Disease,Description` table
    pub description_file: String,
    /// Default confidence threshold (0..=100)
    pub threshold: u8,
    /// Vote aggregation
    pub voting: Voting,
    /// Ensemble members and hyperparameters
    pub ensemble: EnsembleConfig,
}

impl Default for DocrecConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            symptom_file: "Original_Dataset.csv".to_string(),
            specialist_file: "Doctor_Versus_Disease.csv".to_string(),
            description_file: "Disease_Description.csv".to_string(),
            threshold: DEFAULT_THRESHOLD,
            voting: Voting::Hard,
            ensemble: EnsembleConfig::default(),
        }
    }
}

impl DocrecConfig {
    /// Reads a JSON config; missing fields keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid JSON, or
    /// fails [`validate`](Self::validate).
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| DocrecError::data_format(path, format!("cannot read config: {e}")))?;
        let config: Self = serde_json::from_str(&text)
            .map_err(|e| DocrecError::data_format(path, format!("invalid config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    #[must_use]
    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    #[must_use]
    pub fn with_threshold(mut self, threshold: u8) -> Self {
        self.threshold = threshold;
        self
    }

    #[must_use]
    pub fn with_voting(mut self, voting: Voting) -> Self {
        self.voting = voting;
        self
    }

    #[must_use]
    pub fn with_ensemble(mut self, ensemble: EnsembleConfig) -> Self {
        self.ensemble = ensemble;
        self
    }

    /// Full path of the symptom table.
    #[must_use]
    pub fn symptom_path(&self) -> PathBuf {
        self.data_dir.join(&self.symptom_file)
    }

    /// Full path of the specialist table.
    #[must_use]
    pub fn specialist_path(&self) -> PathBuf {
        self.data_dir.join(&self.specialist_file)
    }

    /// Full path of the description table.
    #[must_use]
    pub fn description_path(&self) -> PathBuf {
        self.data_dir.join(&self.description_file)
    }

    /// Checks the threshold range and ensemble hyperparameters.
    ///
    /// Soft voting needs probability estimates from every member, so it
    /// rejects `svm.probability = false`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidThreshold` or `InvalidHyperparameter`.
    pub fn validate(&self) -> Result<()> {
        if self.threshold > 100 {
            return Err(DocrecError::InvalidThreshold {
                value: u32::from(self.threshold),
            });
        }
        if self.voting == Voting::Soft && !self.ensemble.svm.probability {
            return Err(DocrecError::InvalidHyperparameter {
                param: "ensemble.svm.probability".to_string(),
                value: "false".to_string(),
                constraint: "true for soft voting".to_string(),
            });
        }
        self.ensemble.validate()
    }
}
