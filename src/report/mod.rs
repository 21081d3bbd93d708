//! Enriched prediction reports and their CSV/JSON forms.
//!
//! The CSV layout is `Disease,Chances (%),Specialist,Description` with the
//! chance written to two decimals and missing fields left empty.

use crate::data::Catalog;
use crate::error::{DocrecError, Result};
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};
use std::path::Path;

/// CSV header of an exported report.
pub const CSV_HEADER: [&str; 4] = ["Disease", "Chances (%)", "Specialist", "Description"];

/// A disease and its vote percentage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiseaseChance {
    pub disease: String,
    /// Percentage in `0.0..=100.0`
    pub chance: f64,
}

/// One row of a report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub disease: String,
    pub chance: f64,
    pub specialist: Option<String>,
    pub description: Option<String>,
}

/// Findings ordered by descending chance, then disease name.
///
/// # Examples
///
/// ```
/// use docrec::data::Catalog;
/// use docrec::report::{DiseaseChance, Report};
///
/// let chances = vec![
///     DiseaseChance { disease: "Allergy".into(), chance: 100.0 / 3.0 },
///     DiseaseChance { disease: "Malaria".into(), chance: 200.0 / 3.0 },
/// ];
/// let report = Report::enrich(&chances, &Catalog::default());
/// let csv = report.to_csv_string().expect("in-memory write");
/// assert_eq!(
///     csv,
///     "Disease,Chances (%),Specialist,Description\nMalaria,66.67,,\nAllergy,33.33,,\n"
/// );
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Report {
    findings: Vec<Finding>,
}

impl Report {
    /// Left-joins chances with the specialist and description lookups.
    ///
    /// A disease listed twice keeps its first chance.
    #[must_use]
    pub fn enrich(chances: &[DiseaseChance], catalog: &Catalog) -> Self {
        let mut findings: Vec<Finding> = Vec::with_capacity(chances.len());
        for c in chances {
            if findings.iter().any(|f| f.disease == c.disease) {
                continue;
            }
            findings.push(Finding {
                disease: c.disease.clone(),
                chance: c.chance,
                specialist: catalog.specialist(&c.disease).map(str::to_string),
                description: catalog.description(&c.disease).map(str::to_string),
            });
        }
        Self::from_findings(findings)
    }

    /// Wraps findings, sorting them into report order.
    #[must_use]
    pub fn from_findings(mut findings: Vec<Finding>) -> Self {
        findings.sort_by(|a, b| {
            b.chance
                .total_cmp(&a.chance)
                .then_with(|| a.disease.cmp(&b.disease))
        });
        Self { findings }
    }

    /// Rows in report order.
    #[must_use]
    pub fn findings(&self) -> &[Finding] {
        &self.findings
    }

    /// Number of findings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.findings.len()
    }

    /// True if nothing met the threshold.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.findings.is_empty()
    }

    /// Writes the CSV export.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying writer fails.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut writer = csv::Writer::from_writer(writer);
        writer.write_record(CSV_HEADER)?;
        for f in &self.findings {
            let chance = format!("{:.2}", f.chance);
            writer.write_record([
                f.disease.as_str(),
                chance.as_str(),
                f.specialist.as_deref().unwrap_or(""),
                f.description.as_deref().unwrap_or(""),
            ])?;
        }
        writer.flush()?;
        Ok(())
    }

    /// The CSV export as a string.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails.
    pub fn to_csv_string(&self) -> Result<String> {
        let mut buf = Vec::new();
        self.write_csv(&mut buf)?;
        String::from_utf8(buf).map_err(|e| DocrecError::Serialization(e.to_string()))
    }

    /// Writes the CSV export to `path`.
    ///
    /// # Errors
    ///
    /// Returns `Io` if the file cannot be created.
    pub fn save_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = std::fs::File::create(path)?;
        self.write_csv(std::io::BufWriter::new(file))
    }

    /// Parses a CSV export.
    ///
    /// # Errors
    ///
    /// Returns an error if the header differs or a chance is not a number.
    pub fn read_csv<R: Read>(reader: R) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(reader);

        let headers = reader.headers()?.clone();
        if !headers.iter().eq(CSV_HEADER) {
            return Err(DocrecError::Serialization(format!(
                "unexpected report header: {:?}",
                headers.iter().collect::<Vec<_>>()
            )));
        }

        let mut findings = Vec::new();
        for result in reader.records() {
            let record = result?;
            let field = |idx: usize| record.get(idx).unwrap_or_default();
            let chance: f64 = field(1).trim().parse().map_err(|e| {
                DocrecError::Serialization(format!("invalid chance '{}': {e}", field(1)))
            })?;
            let optional = |idx: usize| {
                let value = field(idx);
                (!value.is_empty()).then(|| value.to_string())
            };
            findings.push(Finding {
                disease: field(0).to_string(),
                chance,
                specialist: optional(2),
                description: optional(3),
            });
        }
        Ok(Self { findings })
    }

    /// Reads a CSV export from `path`.
    ///
    /// # Errors
    ///
    /// Returns `Io` if the file cannot be opened, or a parse error.
    pub fn load_csv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        Self::read_csv(std::io::BufReader::new(file))
    }

    /// Pretty-printed JSON array of findings.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.findings)?)
    }
}

#[cfg(test)]
mod tests;
