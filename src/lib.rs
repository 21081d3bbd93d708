//! Docrec: symptom-to-disease prediction with a voting ensemble.
//!
//! A table of diseases and their symptoms trains six classic classifiers.
//! A query (a set of symptoms and a confidence threshold) is answered by
//! letting every model vote; each disease's chance is the share of votes it
//! received, and diseases at or above the threshold are reported with a
//! recommended specialist and a description.
//!
//! # Quick Start
//!
//! ```
//! use docrec::prelude::*;
//! use docrec::data::{Catalog, Dataset, SymptomRecord, SymptomTable};
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
//! let dataset = Dataset {
//!     table: SymptomTable::from_records(records),
//!     catalog: Catalog::default(),
//! };
//!
//! let context = InferenceContext::build(dataset, &DocrecConfig::default()).expect("trains");
//! let query = PredictionQuery::new(["cough", "runny_nose"], 20).expect("valid threshold");
//! let prediction = context.predict(&query).expect("known symptoms");
//! assert_eq!(prediction.chances[0].disease, "Common Cold");
//! ```
//!
//! # Modules
//!
//! - [`primitives`]: Dense `Matrix` type
//! - [`data`]: Dataset, specialist and description loaders
//! - [`preprocessing`]: Symptom binarizer and disease label encoder
//! - [`classification`]: Logistic regression, KNN, Gaussian naive Bayes, SVM
//! - [`tree`]: Decision tree and random forest
//! - [`ensemble`]: Voting ensemble and its configuration
//! - [`inference`]: Trained context, queries and diagnoses
//! - [`report`]: Enriched results and CSV export
//! - [`config`]: Application configuration

pub mod classification;
pub mod config;
pub mod data;
pub mod ensemble;
pub mod error;
pub mod inference;
pub mod prelude;
pub mod preprocessing;
pub mod primitives;
pub mod report;
pub mod traits;
pub mod tree;

pub use error::{DocrecError, Result};
pub use traits::Classifier;
