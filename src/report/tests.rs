//! Tests for report enrichment and export.

pub(crate) use super::*;
use crate::data::Lookup;

fn catalog() -> Catalog {
    Catalog {
        specialists: Lookup::from_pairs(
            vec![
                ("Malaria", "Infectious Disease Specialist"),
                ("Allergy", "Allergist"),
            ],
            "specialists",
        ),
        descriptions: Lookup::from_pairs(
            vec![("Malaria", "Spread by mosquitoes, causes \"fever\".")],
            "descriptions",
        ),
    }
}

fn chance(disease: &str, chance: f64) -> DiseaseChance {
    DiseaseChance {
        disease: disease.to_string(),
        chance,
    }
}

#[test]
fn test_enrich_left_join() {
    let report = Report::enrich(
        &[chance("Malaria", 50.0), chance("Dengue", 50.0)],
        &catalog(),
    );
    let findings = report.findings();
    assert_eq!(findings.len(), 2);
    // Equal chances fall back to name order
    assert_eq!(findings[0].disease, "Dengue");
    assert_eq!(findings[0].specialist, None);
    assert_eq!(findings[0].description, None);
    assert_eq!(
        findings[1].specialist.as_deref(),
        Some("Infectious Disease Specialist")
    );
}

#[test]
fn test_enrich_orders_by_chance_desc() {
    let report = Report::enrich(
        &[chance("Allergy", 100.0 / 6.0), chance("Malaria", 500.0 / 6.0)],
        &catalog(),
    );
    let names: Vec<&str> = report.findings().iter().map(|f| f.disease.as_str()).collect();
    assert_eq!(names, vec!["Malaria", "Allergy"]);
}

#[test]
fn test_enrich_drops_duplicate_disease() {
    let report = Report::enrich(&[chance("Malaria", 50.0), chance("Malaria", 20.0)], &catalog());
    assert_eq!(report.len(), 1);
    assert_eq!(report.findings()[0].chance, 50.0);
}

#[test]
fn test_empty_report() {
    let report = Report::enrich(&[], &catalog());
    assert!(report.is_empty());
    assert_eq!(
        report.to_csv_string().expect("write"),
        "Disease,Chances (%),Specialist,Description\n"
    );
}

#[test]
fn test_csv_quotes_and_round_trip() {
    let report = Report::enrich(
        &[chance("Malaria", 200.0 / 3.0), chance("Allergy", 100.0 / 3.0)],
        &catalog(),
    );
    let csv = report.to_csv_string().expect("write");
    assert!(csv.contains("\"Spread by mosquitoes, causes \"\"fever\"\".\""));
    assert!(csv.contains("Malaria,66.67,"));

    let back = Report::read_csv(csv.as_bytes()).expect("parse");
    assert_eq!(back.len(), 2);
    for (a, b) in report.findings().iter().zip(back.findings()) {
        assert_eq!(a.disease, b.disease);
        assert!((a.chance - b.chance).abs() < 0.01);
        assert_eq!(a.specialist, b.specialist);
        assert_eq!(a.description, b.description);
    }
}

#[test]
fn test_read_csv_rejects_wrong_header() {
    let err = Report::read_csv("Name,Score\nMalaria,1\n".as_bytes()).unwrap_err();
    assert!(err.to_string().contains("unexpected report header"));
}

#[test]
fn test_read_csv_rejects_bad_chance() {
    let csv = "Disease,Chances (%),Specialist,Description\nMalaria,high,,\n";
    assert!(Report::read_csv(csv.as_bytes()).is_err());
}

#[test]
fn test_save_and_load_file() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("report.csv");
    let report = Report::enrich(&[chance("Allergy", 100.0)], &catalog());

    report.save_csv(&path).expect("write file");
    let back = Report::load_csv(&path).expect("read file");
    assert_eq!(back.findings()[0].specialist.as_deref(), Some("Allergist"));
    assert!((back.findings()[0].chance - 100.0).abs() < 1e-9);
}

#[test]
fn test_to_json() {
    let report = Report::enrich(&[chance("Allergy", 50.0)], &catalog());
    let json: serde_json::Value =
        serde_json::from_str(&report.to_json().expect("serialize")).expect("valid json");
    assert_eq!(json[0]["disease"], "Allergy");
    assert_eq!(json[0]["chance"], 50.0);
    assert!(json[0]["description"].is_null());
}
