//! End-to-end tests over the bundled dataset and small in-memory fixtures.

use docrec::data::{Catalog, Dataset, Lookup, SymptomRecord, SymptomTable};
use docrec::inference::{NO_DISEASE_MESSAGE, NO_SYMPTOMS_MESSAGE};
use docrec::preprocessing::{LabelEncoder, SymptomBinarizer};
use docrec::prelude::*;
use std::path::PathBuf;

fn bundled_data_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data")
}

fn bundled_context() -> InferenceContext {
    let config = DocrecConfig::default().with_data_dir(bundled_data_dir());
    InferenceContext::load(&config).expect("bundled dataset trains")
}

fn fungal_only() -> Dataset {
    let record = SymptomRecord {
        disease: "Fungal infection".to_string(),
        symptoms: vec!["itching".to_string(), "skin_rash".to_string()],
    };
    Dataset {
        // KNN needs at least k = 5 samples
        table: SymptomTable::from_records(vec![record; 5]),
        catalog: Catalog {
            specialists: Lookup::from_pairs([("Fungal infection", "Dermatologist")], "inline"),
            descriptions: Lookup::default(),
        },
    }
}

struct FixedVote {
    name: &'static str,
    class_id: usize,
}

impl Classifier for FixedVote {
    fn name(&self) -> &str {
        self.name
    }

    fn fit(&mut self, _x: &Matrix<f32>, _y: &[usize]) -> Result<()> {
        Ok(())
    }

    fn predict(&self, x: &Matrix<f32>) -> Result<Vec<usize>> {
        Ok(vec![self.class_id; x.n_rows()])
    }

    fn predict_proba(&self, x: &Matrix<f32>) -> Result<Vec<Vec<f32>>> {
        let mut row = vec![0.0; 2];
        row[self.class_id] = 1.0;
        Ok(vec![row; x.n_rows()])
    }
}

/// Three members always say "Dengue", three always say "Measles".
fn split_context() -> InferenceContext {
    let mut binarizer = SymptomBinarizer::new();
    binarizer
        .fit(&[vec!["fever", "rash"]])
        .expect("non-empty universe");
    let mut encoder = LabelEncoder::new();
    encoder.fit(&["Dengue", "Measles"]).expect("two labels");
    let mut builder = Ensemble::builder();
    for (name, class_id) in [("m1", 0), ("m2", 0), ("m3", 0), ("m4", 1), ("m5", 1), ("m6", 1)] {
        builder = builder.member(Box::new(FixedVote { name, class_id }));
    }
    let ensemble = builder.build().expect("six members");
    InferenceContext::from_parts(binarizer, encoder, ensemble, Catalog::default(), Voting::Hard)
}

#[test]
fn test_single_disease_is_certain() {
    let context =
        InferenceContext::build(fungal_only(), &DocrecConfig::default()).expect("trains");
    let query = PredictionQuery::new(["itching", "skin_rash"], 20).expect("query");

    match context.diagnose(&query).expect("diagnosis") {
        Diagnosis::Findings { report, prediction } => {
            assert_eq!(prediction.votes.len(), 6);
            assert_eq!(report.len(), 1);
            let finding = &report.findings()[0];
            assert_eq!(finding.disease, "Fungal infection");
            assert!((finding.chance - 100.0).abs() < 1e-9);
            assert_eq!(finding.specialist.as_deref(), Some("Dermatologist"));
            assert!(finding.description.is_none());
        }
        other => panic!("expected findings, got {other:?}"),
    }
}

#[test]
fn test_empty_selection_warns() {
    let context =
        InferenceContext::build(fungal_only(), &DocrecConfig::default()).expect("trains");
    let query = PredictionQuery::new(["  ", ""], 20).expect("query");
    let diagnosis = context.diagnose(&query).expect("not an error");
    assert_eq!(diagnosis, Diagnosis::NoSymptomsSelected);
    assert_eq!(diagnosis.message(), Some(NO_SYMPTOMS_MESSAGE));
}

#[test]
fn test_three_three_split() {
    let context = split_context();

    let at_half = PredictionQuery::new(["fever"], 50).expect("query");
    let prediction = context.predict(&at_half).expect("prediction");
    assert_eq!(prediction.chances.len(), 2);
    for chance in &prediction.chances {
        assert_eq!(format!("{:.2}", chance.chance), "50.00");
    }

    let above = PredictionQuery::new(["fever"], 51).expect("query");
    let diagnosis = context.diagnose(&above).expect("diagnosis");
    assert_eq!(diagnosis.message(), Some(NO_DISEASE_MESSAGE));
}

#[test]
fn test_bundled_dataset_vocabulary() {
    let context = bundled_context();
    assert_eq!(context.symptoms().len(), 36);
    assert_eq!(context.diseases().len(), 8);
    // Trailing spaces in the table are trimmed
    assert!(context.diseases().iter().any(|d| d == "Diabetes"));
    assert!(context.diseases().iter().any(|d| d == "Hypertension"));
    let mut sorted = context.symptoms().to_vec();
    sorted.sort();
    assert_eq!(sorted, context.symptoms());
}

#[test]
fn test_bundled_fungal_query() {
    let context = bundled_context();
    let query = PredictionQuery::new(
        ["itching", "skin_rash", "nodal_skin_eruptions", "dischromic_patches"],
        20,
    )
    .expect("query");
    match context.diagnose(&query).expect("diagnosis") {
        Diagnosis::Findings { report, .. } => {
            let top = &report.findings()[0];
            assert_eq!(top.disease, "Fungal infection");
            assert_eq!(top.specialist.as_deref(), Some("Dermatologist"));
            assert!(top
                .description
                .as_deref()
                .is_some_and(|d| d.contains("fungus")));
        }
        other => panic!("expected findings, got {other:?}"),
    }
}

#[test]
fn test_threshold_100_keeps_only_unanimous() {
    let context = bundled_context();
    let query = PredictionQuery::new(["headache", "chest_pain"], 100).expect("query");
    let prediction = context.predict(&query).expect("prediction");
    assert!(prediction.chances.len() <= 1);
    for chance in &prediction.chances {
        assert!((chance.chance - 100.0).abs() < 1e-9);
        assert!(prediction.votes.iter().all(|v| v.disease == chance.disease));
    }
}

#[test]
fn test_threshold_above_100_is_rejected() {
    let err = PredictionQuery::new(["itching"], 101).unwrap_err();
    assert!(matches!(err, DocrecError::InvalidThreshold { value: 101 }));
}

#[test]
fn test_unknown_symptom_is_rejected() {
    let context = bundled_context();
    let query = PredictionQuery::new(["itching", "purple_tongue"], 20).expect("query");
    let err = context.predict(&query).unwrap_err();
    assert!(matches!(err, DocrecError::UnknownSymptom { .. }));
    assert!(err.to_string().contains("purple_tongue"));
}

#[test]
fn test_report_csv_round_trip() {
    let context = bundled_context();
    let query = PredictionQuery::new(["chills", "high_fever", "headache"], 0).expect("query");
    let Diagnosis::Findings { report, .. } = context.diagnose(&query).expect("diagnosis") else {
        panic!("threshold 0 always reports something");
    };

    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("report.csv");
    report.save_csv(&path).expect("written");
    let text = std::fs::read_to_string(&path).expect("readable");
    assert!(text.starts_with("Disease,Chances (%),Specialist,Description"));

    let loaded = Report::load_csv(&path).expect("parsed back");
    assert_eq!(loaded.len(), report.len());
    for (a, b) in loaded.findings().iter().zip(report.findings()) {
        assert_eq!(a.disease, b.disease);
        assert!((a.chance - b.chance).abs() <= 0.01);
        assert_eq!(a.specialist, b.specialist);
    }
}

#[test]
fn test_soft_voting_on_bundled_data() {
    let config = DocrecConfig::default()
        .with_data_dir(bundled_data_dir())
        .with_voting(Voting::Soft);
    let context = InferenceContext::load(&config).expect("bundled data trains");
    let query = PredictionQuery::new(["stomach_pain", "acidity", "ulcers_on_tongue"], 0)
        .expect("query");
    let prediction = context.predict(&query).expect("prediction");
    assert_eq!(prediction.voting, Voting::Soft);
    assert_eq!(prediction.chances[0].disease, "GERD");
    let total: f64 = prediction.chances.iter().map(|c| c.chance).sum();
    assert!((total - 100.0).abs() < 0.1, "total = {total}");
}

#[test]
fn test_config_file_drives_loading() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("docrec.json");
    let json = serde_json::json!({
        "data_dir": bundled_data_dir(),
        "threshold": 35,
        "ensemble": { "knn": { "k": 3 } }
    });
    std::fs::write(&path, json.to_string()).expect("written");

    let config = DocrecConfig::from_json_file(&path).expect("valid config");
    assert_eq!(config.threshold, 35);
    assert_eq!(config.ensemble.knn.k, 3);
    assert_eq!(config.ensemble.forest.n_estimators, 100);
    let context = InferenceContext::load(&config).expect("trains");
    assert_eq!(context.diseases().len(), 8);
}

#[test]
fn test_missing_data_dir_is_fatal() {
    let config = DocrecConfig::default().with_data_dir("/nonexistent/docrec-data");
    let err = InferenceContext::load(&config).unwrap_err();
    assert!(matches!(err, DocrecError::DataFormat { .. }));
    assert!(err.to_string().contains("Original_Dataset.csv"));
}
