//! Predict command implementation
//!
//! Trains the ensemble on the dataset, runs the query through it and prints
//! the enriched findings, a bar chart of chances, and optionally each model's
//! vote and a CSV export.

use crate::error::Result;
use crate::output;
use colored::Colorize;
use docrec::config::DocrecConfig;
use docrec::ensemble::Voting;
use docrec::inference::{Diagnosis, InferenceContext, ModelVote, PredictionQuery};
use docrec::report::Finding;
use serde::Serialize;
use std::path::PathBuf;

/// Flags of the predict command
pub(crate) struct PredictOptions {
    pub(crate) threshold: u32,
    pub(crate) chart: bool,
    pub(crate) export: Option<PathBuf>,
    pub(crate) votes: bool,
    pub(crate) json: bool,
}

/// JSON shape of a prediction
#[derive(Serialize)]
struct PredictResult<'a> {
    symptoms: &'a [String],
    threshold: u8,
    voting: Option<Voting>,
    message: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    votes: Option<&'a [ModelVote]>,
    findings: &'a [Finding],
}

/// Run the predict command
pub(crate) fn run(config: &DocrecConfig, selected: &[String], options: &PredictOptions) -> Result<()> {
    let query = PredictionQuery::new(selected, options.threshold)?;

    // Nothing to train for when nothing is selected
    let diagnosis = if query.is_empty() {
        Diagnosis::NoSymptomsSelected
    } else {
        let context = InferenceContext::load(config)?;
        context.diagnose(&query)?
    };

    let findings: &[Finding] = match &diagnosis {
        Diagnosis::Findings { report, .. } => report.findings(),
        _ => &[],
    };

    if let (Some(path), Diagnosis::Findings { report, .. }) = (&options.export, &diagnosis) {
        report.save_csv(path)?;
    }

    if options.json {
        let prediction = diagnosis.prediction();
        let result = PredictResult {
            symptoms: query.symptoms(),
            threshold: query.threshold(),
            voting: prediction.map(|p| p.voting),
            message: diagnosis.message(),
            votes: prediction
                .filter(|_| options.votes)
                .map(|p| p.votes.as_slice()),
            findings,
        };
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    print_text(&query, &diagnosis, findings, options);
    Ok(())
}

fn print_text(
    query: &PredictionQuery,
    diagnosis: &Diagnosis,
    findings: &[Finding],
    options: &PredictOptions,
) {
    if let Some(message) = diagnosis.message() {
        match diagnosis {
            Diagnosis::NoSymptomsSelected => output::warning(message),
            _ => output::info(message),
        }
    }

    if let (true, Some(prediction)) = (options.votes, diagnosis.prediction()) {
        output::section("Model votes");
        for vote in &prediction.votes {
            output::kv(&vote.model, &vote.disease);
        }
    }

    if findings.is_empty() {
        return;
    }

    output::section(&format!(
        "Findings (threshold {}%, {} selected)",
        query.threshold(),
        query.symptoms().len()
    ));
    for finding in findings {
        println!("\n  {}", finding.disease.bold());
        output::kv("Chance", format!("{:.2}%", finding.chance));
        output::kv("Specialist", finding.specialist.as_deref().unwrap_or("-"));
        output::kv("Description", finding.description.as_deref().unwrap_or("-"));
    }

    if options.chart {
        output::section("Chances");
        let entries: Vec<(&str, f64)> = findings
            .iter()
            .map(|f| (f.disease.as_str(), f.chance))
            .collect();
        output::chart(&entries);
    }

    if let Some(path) = &options.export {
        output::info(&format!("Findings exported to {}", path.display()));
    }
}
