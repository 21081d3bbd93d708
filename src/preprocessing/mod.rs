//! Preprocessing transformers that turn raw symptom records into model input.
//!
//! [`SymptomBinarizer`] maps ragged symptom lists to a fixed-width binary
//! matrix, one column per distinct symptom. [`LabelEncoder`] maps disease
//! names to contiguous class ids and back.
//!
//! # Example
//!
//! ```
//! use docrec::preprocessing::{LabelEncoder, SymptomBinarizer};
//!
//! let rows = vec![
//!     vec!["itching", " skin_rash"],
//!     vec!["cough", "high_fever", ""],
//! ];
//! let mut binarizer = SymptomBinarizer::new();
//! let x = binarizer.fit_transform(&rows).expect("symptoms present");
//! assert_eq!(binarizer.symptoms(), &["cough", "high_fever", "itching", "skin_rash"]);
//! assert_eq!(x.row(0), &[0.0, 0.0, 1.0, 1.0]);
//!
//! let mut encoder = LabelEncoder::new();
//! let y = encoder.fit_transform(&["Fungal infection", "Bronchial Asthma"]).expect("labels");
//! assert_eq!(y, vec![1, 0]);
//! assert_eq!(encoder.inverse_transform(&[1]).expect("known id"), vec!["Fungal infection"]);
//! ```

use crate::error::{DocrecError, Result};
use crate::primitives::Matrix;
use serde::{Deserialize, Serialize};

/// Trims a raw cell; empty or whitespace-only cells name no symptom.
#[must_use]
pub fn normalize_symptom(raw: &str) -> Option<&str> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

/// One-hot encoder for symptom sets.
///
/// The vocabulary is the sorted set of distinct trimmed symptom names seen
/// during `fit`; column `j` of the output is symptom `symptoms()[j]`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SymptomBinarizer {
    /// Sorted, deduplicated vocabulary (set during fit).
    symptoms: Option<Vec<String>>,
}

impl SymptomBinarizer {
    /// Creates an unfitted binarizer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the binarizer has been fitted.
    #[must_use]
    pub fn is_fitted(&self) -> bool {
        self.symptoms.is_some()
    }

    /// The symptom universe in column order (empty before `fit`).
    #[must_use]
    pub fn symptoms(&self) -> &[String] {
        self.symptoms.as_deref().unwrap_or(&[])
    }

    /// Number of output columns.
    #[must_use]
    pub fn n_features(&self) -> usize {
        self.symptoms().len()
    }

    /// Column of a symptom, after trimming.
    #[must_use]
    pub fn column_of(&self, symptom: &str) -> Option<usize> {
        self.symptoms()
            .binary_search_by(|s| s.as_str().cmp(symptom.trim()))
            .ok()
    }

    /// Learns the symptom universe from training rows.
    ///
    /// # Errors
    ///
    /// Returns an error if no row names any symptom.
    pub fn fit<S: AsRef<str>>(&mut self, rows: &[Vec<S>]) -> Result<()> {
        let mut symptoms: Vec<String> = rows
            .iter()
            .flatten()
            .filter_map(|cell| normalize_symptom(cell.as_ref()))
            .map(str::to_string)
            .collect();
        symptoms.sort_unstable();
        symptoms.dedup();

        if symptoms.is_empty() {
            return Err("Cannot fit SymptomBinarizer: no symptoms in training rows".into());
        }
        self.symptoms = Some(symptoms);
        Ok(())
    }

    /// Encodes each row as a binary vector.
    ///
    /// Empty cells are ignored and repeated symptoms set the same column.
    ///
    /// # Errors
    ///
    /// Returns `NotFitted` before `fit`, and `UnknownSymptom` for a symptom
    /// outside the universe.
    pub fn transform<S: AsRef<str>>(&self, rows: &[Vec<S>]) -> Result<Matrix<f32>> {
        if !self.is_fitted() {
            return Err(DocrecError::NotFitted {
                model: "SymptomBinarizer".to_string(),
            });
        }
        let mut x = Matrix::zeros(rows.len(), self.n_features());
        for (i, row) in rows.iter().enumerate() {
            for symptom in row.iter().filter_map(|c| normalize_symptom(c.as_ref())) {
                let col = self
                    .column_of(symptom)
                    .ok_or_else(|| DocrecError::UnknownSymptom {
                        symptom: symptom.to_string(),
                    })?;
                x.set(i, col, 1.0);
            }
        }
        Ok(x)
    }

    /// Fits the vocabulary and encodes the same rows.
    ///
    /// # Errors
    ///
    /// Returns an error if no row names any symptom.
    pub fn fit_transform<S: AsRef<str>>(&mut self, rows: &[Vec<S>]) -> Result<Matrix<f32>> {
        self.fit(rows)?;
        self.transform(rows)
    }

    /// Encodes a single selection as a `1 × n_features` matrix.
    ///
    /// # Errors
    ///
    /// Returns an error if not fitted or a symptom is unknown.
    pub fn encode_selection<S: AsRef<str>>(&self, selected: &[S]) -> Result<Matrix<f32>> {
        let row: Vec<&str> = selected.iter().map(AsRef::as_ref).collect();
        self.transform(&[row])
    }
}

/// Encodes string labels as contiguous class ids in sorted order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LabelEncoder {
    /// Sorted, deduplicated class names (set during fit).
    classes: Option<Vec<String>>,
}

impl LabelEncoder {
    /// Creates an unfitted encoder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the encoder has been fitted.
    #[must_use]
    pub fn is_fitted(&self) -> bool {
        self.classes.is_some()
    }

    /// Class names indexed by id (empty before `fit`).
    #[must_use]
    pub fn classes(&self) -> &[String] {
        self.classes.as_deref().unwrap_or(&[])
    }

    /// Number of distinct classes.
    #[must_use]
    pub fn n_classes(&self) -> usize {
        self.classes().len()
    }

    /// Name for a class id.
    #[must_use]
    pub fn decode(&self, id: usize) -> Option<&str> {
        self.classes().get(id).map(String::as_str)
    }

    /// Learns the sorted class list.
    ///
    /// # Errors
    ///
    /// Returns an error for no labels or an empty (after trimming) label.
    pub fn fit<S: AsRef<str>>(&mut self, labels: &[S]) -> Result<()> {
        if labels.is_empty() {
            return Err("Cannot fit LabelEncoder with zero labels".into());
        }
        let mut classes = Vec::with_capacity(labels.len());
        for label in labels {
            let name = label.as_ref().trim();
            if name.is_empty() {
                return Err("Labels must not be empty".into());
            }
            classes.push(name.to_string());
        }
        classes.sort_unstable();
        classes.dedup();
        self.classes = Some(classes);
        Ok(())
    }

    /// Maps names to ids.
    ///
    /// # Errors
    ///
    /// Returns an error if not fitted or a label was not seen during `fit`.
    pub fn transform<S: AsRef<str>>(&self, labels: &[S]) -> Result<Vec<usize>> {
        let classes = self.classes.as_ref().ok_or_else(|| DocrecError::NotFitted {
            model: "LabelEncoder".to_string(),
        })?;
        labels
            .iter()
            .map(|label| {
                let name = label.as_ref().trim();
                classes
                    .binary_search_by(|c| c.as_str().cmp(name))
                    .map_err(|_| DocrecError::Other(format!("Unknown label '{name}'")))
            })
            .collect()
    }

    /// Fits and encodes in one step.
    ///
    /// # Errors
    ///
    /// Returns an error if fitting fails.
    pub fn fit_transform<S: AsRef<str>>(&mut self, labels: &[S]) -> Result<Vec<usize>> {
        self.fit(labels)?;
        self.transform(labels)
    }

    /// Maps ids back to names.
    ///
    /// # Errors
    ///
    /// Returns an error if not fitted or an id is out of range.
    pub fn inverse_transform(&self, ids: &[usize]) -> Result<Vec<String>> {
        let classes = self.classes.as_ref().ok_or_else(|| DocrecError::NotFitted {
            model: "LabelEncoder".to_string(),
        })?;
        ids.iter()
            .map(|&id| {
                classes.get(id).cloned().ok_or_else(|| {
                    DocrecError::Other(format!(
                        "Class id {id} out of range for {} classes",
                        classes.len()
                    ))
                })
            })
            .collect()
    }
}
