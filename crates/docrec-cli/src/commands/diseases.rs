//! Diseases command implementation

use super::load_dataset;
use crate::error::Result;
use crate::output;
use colored::Colorize;
use docrec::config::DocrecConfig;
use serde::Serialize;

#[derive(Serialize)]
struct DiseaseEntry<'a> {
    disease: &'a str,
    specialist: Option<&'a str>,
    description: Option<&'a str>,
}

/// Run the diseases command
pub(crate) fn run(config: &DocrecConfig, json_output: bool) -> Result<()> {
    let dataset = load_dataset(config)?;
    let catalog = &dataset.catalog;
    let entries: Vec<DiseaseEntry<'_>> = dataset
        .table
        .diseases()
        .into_iter()
        .map(|disease| DiseaseEntry {
            disease,
            specialist: catalog.specialist(disease),
            description: catalog.description(disease),
        })
        .collect();

    if json_output {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    output::section(&format!("Diseases ({})", entries.len()));
    for entry in &entries {
        match entry.specialist {
            Some(specialist) => println!("  {} → {}", entry.disease.bold(), specialist),
            None => println!("  {} → {}", entry.disease.bold(), "-".dimmed()),
        }
    }
    Ok(())
}
