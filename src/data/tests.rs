//! Tests for dataset loading.

pub(crate) use super::*;
use std::io::Write;
use tempfile::NamedTempFile;

fn write_temp(bytes: &[u8]) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("temp file");
    file.write_all(bytes).expect("write fixture");
    file
}

#[test]
fn test_symptom_table_ragged_rows() {
    let csv = "Disease,Symptom_1,Symptom_2,Symptom_3\n\
               Fungal infection,itching, skin_rash,\n\
               Allergy, continuous_sneezing\n\
               Fungal infection,itching, skin_rash, nodal_skin_eruptions\n";
    let table = SymptomTable::from_reader(csv.as_bytes(), "inline.csv").expect("valid table");

    assert_eq!(table.len(), 3);
    assert_eq!(table.records()[1].disease, "Allergy");
    assert_eq!(table.records()[1].symptoms, vec!["continuous_sneezing"]);
    assert_eq!(table.records()[2].symptoms.len(), 3);
    assert_eq!(table.diseases(), vec!["Allergy", "Fungal infection"]);
    assert_eq!(table.labels().len(), 3);
}

#[test]
fn test_symptom_table_trims_disease() {
    let csv = "Disease,Symptom_1\n  GERD  ,acidity\n";
    let table = SymptomTable::from_reader(csv.as_bytes(), "inline.csv").expect("valid table");
    assert_eq!(table.records()[0].disease, "GERD");
}

#[test]
fn test_symptom_table_empty_disease_is_malformed() {
    let csv = "Disease,Symptom_1\n,itching\n";
    let err = SymptomTable::from_reader(csv.as_bytes(), "bad.csv").unwrap_err();
    match err {
        DocrecError::DataFormat { path, message } => {
            assert_eq!(path, std::path::PathBuf::from("bad.csv"));
            assert!(message.contains("line 2"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_symptom_table_no_rows() {
    let csv = "Disease,Symptom_1\n";
    assert!(matches!(
        SymptomTable::from_reader(csv.as_bytes(), "empty.csv"),
        Err(DocrecError::DataFormat { .. })
    ));
}

#[test]
fn test_symptom_table_no_symptoms() {
    let csv = "Disease,Symptom_1\nMalaria,\nDengue,  \n";
    let err = SymptomTable::from_reader(csv.as_bytes(), "empty.csv").unwrap_err();
    assert!(err.to_string().contains("no symptoms"));
}

#[test]
fn test_symptom_table_load_file() {
    let file = write_temp(b"Disease,Symptom_1\nMalaria,chills\nMalaria,vomiting\n");
    let table = SymptomTable::load(file.path()).expect("valid file");
    assert_eq!(table.len(), 2);
    assert_eq!(table.symptom_rows(), vec![vec!["chills"], vec!["vomiting"]]);
}

#[test]
fn test_missing_file_names_path() {
    let err = SymptomTable::load("/nonexistent/Original_Dataset.csv").unwrap_err();
    assert!(err.to_string().contains("Original_Dataset.csv"));
}

#[test]
fn test_decode_latin1() {
    assert_eq!(decode_latin1(b"Caf\xe9"), "Café");
    assert_eq!(decode_latin1(b"plain"), "plain");
}

#[test]
fn test_load_specialists_latin1_headerless() {
    let file = write_temp(b"Fungal infection,Dermatologist\nAllergy,Allergist\nMigraine,Neurolog\xeda\n");
    let lookup = load_specialists(file.path()).expect("valid file");

    assert_eq!(lookup.len(), 3);
    assert_eq!(lookup.get("Fungal infection"), Some("Dermatologist"));
    assert_eq!(lookup.get("Migraine"), Some("Neurología"));
    assert_eq!(lookup.get("Malaria"), None);
}

#[test]
fn test_specialists_first_duplicate_wins() {
    let lookup = parse_specialists(
        "Allergy,Allergist\nAllergy,Immunologist\n GERD , Gastroenterologist \n",
        "inline.csv",
    )
    .expect("valid rows");
    assert_eq!(lookup.get("Allergy"), Some("Allergist"));
    assert_eq!(lookup.get("GERD"), Some("Gastroenterologist"));
}

#[test]
fn test_specialists_single_column_is_malformed() {
    let err = parse_specialists("Allergy\n", "inline.csv").unwrap_err();
    assert!(err.to_string().contains("expected 2 columns"));
}

#[test]
fn test_descriptions_with_quoted_commas() {
    let csv = "Disease,Description\n\
               Malaria,\"A disease caused by Plasmodium, spread by mosquitoes.\"\n\
               Allergy,\n";
    let lookup = parse_descriptions(csv.as_bytes(), "inline.csv").expect("valid rows");
    assert_eq!(
        lookup.get("Malaria"),
        Some("A disease caused by Plasmodium, spread by mosquitoes.")
    );
    // Empty description reads as missing
    assert_eq!(lookup.get("Allergy"), None);
}

#[test]
fn test_descriptions_missing_column() {
    let csv = "Name,Text\nMalaria,x\n";
    let err = parse_descriptions(csv.as_bytes(), "inline.csv").unwrap_err();
    assert!(err.to_string().contains("Disease"));
}

#[test]
fn test_lookup_iter_sorted() {
    let lookup = Lookup::from_pairs(vec![("b", "2"), ("a", "1")], "test");
    let keys: Vec<&str> = lookup.iter().map(|(k, _)| k).collect();
    assert_eq!(keys, vec!["a", "b"]);
    assert!(!lookup.is_empty());
}

#[test]
fn test_catalog_lookups() {
    let catalog = Catalog {
        specialists: Lookup::from_pairs(vec![("Malaria", "Infectious Disease Specialist")], "s"),
        descriptions: Lookup::default(),
    };
    assert_eq!(
        catalog.specialist(" Malaria"),
        Some("Infectious Disease Specialist")
    );
    assert_eq!(catalog.description("Malaria"), None);
}

#[test]
fn test_dataset_load() {
    let symptoms = write_temp(b"Disease,Symptom_1\nMalaria,chills\n");
    let specialists = write_temp(b"Malaria,Infectious Disease Specialist\n");
    let descriptions = write_temp(b"Disease,Description\nMalaria,Mosquito-borne.\n");
    let dataset = Dataset::load(symptoms.path(), specialists.path(), descriptions.path())
        .expect("valid files");
    assert_eq!(dataset.table.len(), 1);
    assert_eq!(dataset.catalog.description("Malaria"), Some("Mosquito-borne."));
}
