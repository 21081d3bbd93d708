//! Symptoms command implementation
//!
//! Lists the symptom universe: every distinct symptom in the training table,
//! sorted. These are the only names `predict` accepts.

use super::load_dataset;
use crate::error::Result;
use crate::output;
use docrec::config::DocrecConfig;
use docrec::preprocessing::SymptomBinarizer;

/// Run the symptoms command
pub(crate) fn run(config: &DocrecConfig, json_output: bool) -> Result<()> {
    let dataset = load_dataset(config)?;
    let mut binarizer = SymptomBinarizer::new();
    binarizer.fit(&dataset.table.symptom_rows())?;
    let symptoms = binarizer.symptoms();

    if json_output {
        println!("{}", serde_json::to_string_pretty(symptoms)?);
        return Ok(());
    }

    output::section(&format!("Symptoms ({})", symptoms.len()));
    for symptom in symptoms {
        println!("  {symptom}");
    }
    Ok(())
}
