//! Symptom-to-disease prediction.
//!
//! An [`InferenceContext`] is built once: it loads the dataset, freezes the
//! symptom universe and disease encoding, and trains the ensemble. Queries
//! are then pure `&self` computations, so one context can serve any number
//! of threads.
//!
//! # Example
//!
//! ```
//! use docrec::data::{Catalog, Dataset, SymptomRecord, SymptomTable};
//! use docrec::config::DocrecConfig;
//! use docrec::inference::{Diagnosis, InferenceContext, PredictionQuery};
//!
//! let mut records = Vec::new();
//! for _ in 0..3 {
//!     records.push(SymptomRecord {
//!         disease: "Fungal infection".to_string(),
//!         symptoms: vec!["itching".to_string(), "skin_rash".to_string()],
//!     });
//!     records.push(SymptomRecord {
//!         disease: "Common Cold".to_string(),
//!         symptoms: vec!["cough".to_string(), "runny_nose".to_string()],
//!     });
//! }
//! let table = SymptomTable::from_records(records);
//! let dataset = Dataset { table, catalog: Catalog::default() };
//! let context = InferenceContext::build(dataset, &DocrecConfig::default()).expect("trains");
//!
//! let query = PredictionQuery::new(["itching", "skin_rash"], 20).expect("valid query");
//! match context.diagnose(&query).expect("known symptoms") {
//!     Diagnosis::Findings { report, .. } => {
//!         assert_eq!(report.findings()[0].disease, "Fungal infection");
//!         assert_eq!(report.findings()[0].chance, 100.0);
//!     }
//!     other => panic!("unexpected: {other:?}"),
//! }
//! ```

use crate::config::DocrecConfig;
use crate::data::{Catalog, Dataset};
use crate::ensemble::{Ensemble, Voting};
use crate::error::{DocrecError, Result};
use crate::preprocessing::{normalize_symptom, LabelEncoder, SymptomBinarizer};
use crate::primitives::Matrix;
use crate::report::{DiseaseChance, Report};
use serde::Serialize;
use tracing::{debug, info};

/// Shown when a query selects nothing.
pub const NO_SYMPTOMS_MESSAGE: &str = "Please select at least one symptom!";

/// Shown when no disease reaches the threshold.
pub const NO_DISEASE_MESSAGE: &str = "No diseases met the confidence threshold!";

/// Selected symptoms plus a confidence threshold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredictionQuery {
    symptoms: Vec<String>,
    threshold: u8,
}

impl PredictionQuery {
    /// Normalizes the selection (trimmed, blanks dropped, deduplicated).
    ///
    /// An empty selection is allowed here and reported by
    /// [`InferenceContext::diagnose`].
    ///
    /// # Errors
    ///
    /// Returns `InvalidThreshold` if `threshold > 100`.
    pub fn new<I, S>(symptoms: I, threshold: u32) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if threshold > 100 {
            return Err(DocrecError::InvalidThreshold { value: threshold });
        }
        let mut selected: Vec<String> = symptoms
            .into_iter()
            .filter_map(|s| normalize_symptom(s.as_ref()).map(str::to_string))
            .collect();
        selected.sort_unstable();
        selected.dedup();
        Ok(Self {
            symptoms: selected,
            threshold: threshold as u8,
        })
    }

    /// Selected symptoms, sorted.
    #[must_use]
    pub fn symptoms(&self) -> &[String] {
        &self.symptoms
    }

    /// Minimum percentage a disease needs to be reported.
    #[must_use]
    pub fn threshold(&self) -> u8 {
        self.threshold
    }

    /// True if nothing is selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.symptoms.is_empty()
    }
}

/// One member's vote, decoded to a disease name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelVote {
    pub model: String,
    pub disease: String,
}

/// Votes and the diseases that met the threshold.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    /// Per-member votes, in ensemble order
    pub votes: Vec<ModelVote>,
    /// Diseases at or above the threshold, highest chance first
    pub chances: Vec<DiseaseChance>,
    pub threshold: u8,
    pub voting: Voting,
}

/// Outcome of a query.
#[derive(Debug, Clone, PartialEq)]
pub enum Diagnosis {
    /// The query selected no symptoms.
    NoSymptomsSelected,
    /// Votes were cast but no disease reached the threshold.
    NoDiseaseMetThreshold(Prediction),
    /// At least one disease reached the threshold.
    Findings {
        prediction: Prediction,
        report: Report,
    },
}

impl Diagnosis {
    /// User-facing message for the two empty outcomes.
    #[must_use]
    pub fn message(&self) -> Option<&'static str> {
        match self {
            Diagnosis::NoSymptomsSelected => Some(NO_SYMPTOMS_MESSAGE),
            Diagnosis::NoDiseaseMetThreshold(_) => Some(NO_DISEASE_MESSAGE),
            Diagnosis::Findings { .. } => None,
        }
    }

    /// The prediction, when votes were cast.
    #[must_use]
    pub fn prediction(&self) -> Option<&Prediction> {
        match self {
            Diagnosis::NoSymptomsSelected => None,
            Diagnosis::NoDiseaseMetThreshold(prediction)
            | Diagnosis::Findings { prediction, .. } => Some(prediction),
        }
    }
}

/// Trained state shared by every query.
#[derive(Debug)]
pub struct InferenceContext {
    binarizer: SymptomBinarizer,
    encoder: LabelEncoder,
    ensemble: Ensemble,
    catalog: Catalog,
    voting: Voting,
}

impl InferenceContext {
    /// Loads the dataset named by `config` and builds a context from it.
    ///
    /// # Errors
    ///
    /// Returns any loading, validation or training error.
    pub fn load(config: &DocrecConfig) -> Result<Self> {
        config.validate()?;
        let dataset = Dataset::load(
            &config.symptom_path(),
            &config.specialist_path(),
            &config.description_path(),
        )?;
        Self::build(dataset, config)
    }

    /// Binarizes the table, encodes diseases and trains the ensemble.
    ///
    /// # Errors
    ///
    /// Returns `DataFormat`-style errors for an unusable table and
    /// `ModelFit` if any member fails to train.
    pub fn build(dataset: Dataset, config: &DocrecConfig) -> Result<Self> {
        config.validate()?;
        let table = &dataset.table;

        let mut binarizer = SymptomBinarizer::new();
        let x = binarizer.fit_transform(&table.symptom_rows())?;
        let mut encoder = LabelEncoder::new();
        let y = encoder.fit_transform(&table.labels())?;
        info!(
            rows = x.n_rows(),
            symptoms = binarizer.n_features(),
            diseases = encoder.n_classes(),
            "feature matrix built"
        );

        let ensemble = Ensemble::train(&config.ensemble, &x, &y)?;
        Ok(Self {
            binarizer,
            encoder,
            ensemble,
            catalog: dataset.catalog,
            voting: config.voting,
        })
    }

    /// Assembles a context from pre-built parts.
    ///
    /// The ensemble's class ids must index `encoder.classes()`.
    #[must_use]
    pub fn from_parts(
        binarizer: SymptomBinarizer,
        encoder: LabelEncoder,
        ensemble: Ensemble,
        catalog: Catalog,
        voting: Voting,
    ) -> Self {
        Self {
            binarizer,
            encoder,
            ensemble,
            catalog,
            voting,
        }
    }

    /// The frozen symptom universe, sorted.
    #[must_use]
    pub fn symptoms(&self) -> &[String] {
        self.binarizer.symptoms()
    }

    /// Known diseases, sorted (index = class id).
    #[must_use]
    pub fn diseases(&self) -> &[String] {
        self.encoder.classes()
    }

    /// Specialist and description lookups.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// The trained ensemble.
    #[must_use]
    pub fn ensemble(&self) -> &Ensemble {
        &self.ensemble
    }

    /// Vote aggregation in use.
    #[must_use]
    pub fn voting(&self) -> Voting {
        self.voting
    }

    /// One feature row for a selection.
    ///
    /// # Errors
    ///
    /// Returns `UnknownSymptom` for a symptom outside the universe.
    pub fn feature_row<S: AsRef<str>>(&self, symptoms: &[S]) -> Result<Matrix<f32>> {
        self.binarizer.encode_selection(symptoms)
    }

    /// Runs every member on the query and filters by threshold.
    ///
    /// # Errors
    ///
    /// Returns `EmptySelection` for an empty query and `UnknownSymptom` for
    /// a symptom outside the universe.
    pub fn predict(&self, query: &PredictionQuery) -> Result<Prediction> {
        if query.is_empty() {
            return Err(DocrecError::EmptySelection);
        }
        let row = self.feature_row(query.symptoms())?;
        let (votes, tally) = self.ensemble.tally(&row, self.voting)?;

        let decode = |id: usize| -> Result<String> {
            self.encoder
                .decode(id)
                .map(str::to_string)
                .ok_or_else(|| format!("Class id {id} has no disease name").into())
        };

        let votes = votes
            .into_iter()
            .map(|v| -> Result<ModelVote> {
                Ok(ModelVote {
                    disease: decode(v.class_id)?,
                    model: v.model,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let mut chances = tally
            .filter(query.threshold())
            .into_iter()
            .map(|(id, chance)| -> Result<DiseaseChance> {
                Ok(DiseaseChance {
                    disease: decode(id)?,
                    chance,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        chances.sort_by(|a, b| {
            b.chance
                .total_cmp(&a.chance)
                .then_with(|| a.disease.cmp(&b.disease))
        });

        debug!(
            symptoms = ?query.symptoms(),
            threshold = query.threshold(),
            votes = ?votes.iter().map(|v| (&v.model, &v.disease)).collect::<Vec<_>>(),
            kept = chances.len(),
            "prediction"
        );

        Ok(Prediction {
            votes,
            chances,
            threshold: query.threshold(),
            voting: self.voting,
        })
    }

    /// Predicts and enriches, mapping empty outcomes to their own variants.
    ///
    /// # Errors
    ///
    /// Returns `UnknownSymptom` for a symptom outside the universe.
    pub fn diagnose(&self, query: &PredictionQuery) -> Result<Diagnosis> {
        if query.is_empty() {
            return Ok(Diagnosis::NoSymptomsSelected);
        }
        let prediction = self.predict(query)?;
        if prediction.chances.is_empty() {
            return Ok(Diagnosis::NoDiseaseMetThreshold(prediction));
        }
        let report = Report::enrich(&prediction.chances, &self.catalog);
        Ok(Diagnosis::Findings { prediction, report })
    }
}
