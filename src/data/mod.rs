//! Dataset loading for the three tabular resources.
//!
//! - the symptom table: header row, disease in the first column, ragged
//!   symptom slots after it;
//! - the specialist table: two unlabelled columns `(disease, specialist)`,
//!   encoded as Latin-1;
//! - the description table: header `Disease,Description`, UTF-8.

use crate::error::{DocrecError, Result};
use crate::preprocessing::normalize_symptom;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{info, warn};

/// One row of the symptom table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymptomRecord {
    /// Trimmed disease name
    pub disease: String,
    /// Trimmed, non-empty symptom cells in file order
    pub symptoms: Vec<String>,
}

/// Disease → symptom-list table. Duplicate rows are kept.
///
/// # Examples
///
/// ```
/// use docrec::data::SymptomTable;
///
/// let csv = "Disease,Symptom_1,Symptom_2\nFungal infection,itching, skin_rash\n";
/// let table = SymptomTable::from_reader(csv.as_bytes(), "inline.csv").expect("valid table");
/// assert_eq!(table.len(), 1);
/// assert_eq!(table.records()[0].symptoms, vec!["itching", "skin_rash"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct SymptomTable {
    records: Vec<SymptomRecord>,
}

impl SymptomTable {
    /// Loads the table from a CSV file.
    ///
    /// # Errors
    ///
    /// Returns `DataFormat` (naming the path) if the file cannot be read or
    /// is malformed.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let bytes = read_file(path)?;
        let table = Self::from_reader(bytes.as_slice(), path)?;
        info!(
            path = %path.display(),
            rows = table.len(),
            diseases = table.diseases().len(),
            "loaded symptom table"
        );
        Ok(table)
    }

    /// Parses the table from any reader; `source` names it in errors.
    ///
    /// # Errors
    ///
    /// Returns `DataFormat` for a row with an empty disease name, a table
    /// with no rows, or a table naming no symptoms.
    pub fn from_reader<R: std::io::Read>(reader: R, source: impl AsRef<Path>) -> Result<Self> {
        let source = source.as_ref();
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let mut records = Vec::new();
        // Line 1 is the header
        for (line, result) in (2..).zip(reader.records()) {
            let record = result.map_err(|e| {
                DocrecError::data_format(source, format!("line {line}: {e}"))
            })?;
            let disease = record.get(0).map(str::trim).unwrap_or_default();
            if disease.is_empty() {
                return Err(DocrecError::data_format(
                    source,
                    format!("line {line}: empty disease name"),
                ));
            }
            let symptoms = record
                .iter()
                .skip(1)
                .filter_map(normalize_symptom)
                .map(str::to_string)
                .collect();
            records.push(SymptomRecord {
                disease: disease.to_string(),
                symptoms,
            });
        }

        if records.is_empty() {
            return Err(DocrecError::data_format(source, "no data rows"));
        }
        if records.iter().all(|r| r.symptoms.is_empty()) {
            return Err(DocrecError::data_format(source, "no symptoms in any row"));
        }
        Ok(Self { records })
    }

    /// Builds a table from in-memory records.
    #[must_use]
    pub fn from_records(records: Vec<SymptomRecord>) -> Self {
        Self { records }
    }

    /// All rows in file order.
    #[must_use]
    pub fn records(&self) -> &[SymptomRecord] {
        &self.records
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True if the table has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct disease names, sorted.
    #[must_use]
    pub fn diseases(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.records.iter().map(|r| r.disease.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        names
    }

    /// Disease column.
    #[must_use]
    pub fn labels(&self) -> Vec<&str> {
        self.records.iter().map(|r| r.disease.as_str()).collect()
    }

    /// Symptom lists, one per row.
    #[must_use]
    pub fn symptom_rows(&self) -> Vec<Vec<&str>> {
        self.records
            .iter()
            .map(|r| r.symptoms.iter().map(String::as_str).collect())
            .collect()
    }
}

/// Disease-keyed text lookup; the first entry for a disease wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Lookup {
    entries: BTreeMap<String, String>,
}

impl Lookup {
    /// Builds a lookup from `(disease, value)` pairs.
    ///
    /// Keys and values are trimmed; empty values are dropped so the disease
    /// reads as missing. Later duplicates are ignored with a warning.
    pub fn from_pairs<I, K, V>(pairs: I, source: &str) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut entries = BTreeMap::new();
        for (key, value) in pairs {
            let key = key.as_ref().trim();
            let value = value.as_ref().trim();
            if key.is_empty() || value.is_empty() {
                continue;
            }
            if entries.contains_key(key) {
                warn!(source, disease = key, "duplicate lookup entry ignored");
                continue;
            }
            entries.insert(key.to_string(), value.to_string());
        }
        Self { entries }
    }

    /// Value for a disease, matched after trimming.
    #[must_use]
    pub fn get(&self, disease: &str) -> Option<&str> {
        self.entries.get(disease.trim()).map(String::as_str)
    }

    /// Number of diseases with a value.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if there are no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries sorted by disease.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Decodes ISO-8859-1: every byte is the code point of the same value.
#[must_use]
pub fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

/// Loads the headerless, Latin-1 disease → specialist table.
///
/// # Errors
///
/// Returns `DataFormat` if the file cannot be read or a row has fewer than
/// two columns.
pub fn load_specialists<P: AsRef<Path>>(path: P) -> Result<Lookup> {
    let path = path.as_ref();
    let text = decode_latin1(&read_file(path)?);
    let lookup = parse_specialists(&text, path)?;
    info!(path = %path.display(), entries = lookup.len(), "loaded specialists");
    Ok(lookup)
}

/// Parses already-decoded specialist rows.
///
/// # Errors
///
/// Returns `DataFormat` if a row has fewer than two columns.
pub fn parse_specialists(text: &str, source: impl AsRef<Path>) -> Result<Lookup> {
    let source = source.as_ref();
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut pairs = Vec::new();
    for (line, result) in (1..).zip(reader.records()) {
        let record =
            result.map_err(|e| DocrecError::data_format(source, format!("line {line}: {e}")))?;
        if record.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }
        match (record.get(0), record.get(1)) {
            (Some(disease), Some(specialist)) => {
                pairs.push((disease.to_string(), specialist.to_string()));
            }
            _ => {
                return Err(DocrecError::data_format(
                    source,
                    format!("line {line}: expected 2 columns, found {}", record.len()),
                ))
            }
        }
    }
    Ok(Lookup::from_pairs(pairs, &source.display().to_string()))
}

/// Loads the `Disease,Description` table.
///
/// # Errors
///
/// Returns `DataFormat` if the file cannot be read, the header lacks the
/// two columns, or a row is unreadable.
pub fn load_descriptions<P: AsRef<Path>>(path: P) -> Result<Lookup> {
    let path = path.as_ref();
    let bytes = read_file(path)?;
    let lookup = parse_descriptions(bytes.as_slice(), path)?;
    info!(path = %path.display(), entries = lookup.len(), "loaded descriptions");
    Ok(lookup)
}

/// Parses description rows from any reader.
///
/// # Errors
///
/// Returns `DataFormat` for a missing header column or an unreadable row.
pub fn parse_descriptions<R: std::io::Read>(reader: R, source: impl AsRef<Path>) -> Result<Lookup> {
    let source = source.as_ref();
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| DocrecError::data_format(source, format!("failed to read header: {e}")))?
        .clone();
    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(name))
            .ok_or_else(|| {
                DocrecError::data_format(
                    source,
                    format!(
                        "missing '{name}' column, available: {:?}",
                        headers.iter().collect::<Vec<_>>()
                    ),
                )
            })
    };
    let disease_idx = column("Disease")?;
    let description_idx = column("Description")?;

    let mut pairs = Vec::new();
    for (line, result) in (2..).zip(reader.records()) {
        let record =
            result.map_err(|e| DocrecError::data_format(source, format!("line {line}: {e}")))?;
        let disease = record.get(disease_idx).unwrap_or_default();
        let description = record.get(description_idx).unwrap_or_default();
        pairs.push((disease.to_string(), description.to_string()));
    }
    Ok(Lookup::from_pairs(pairs, &source.display().to_string()))
}

/// Specialist and description lookups for enrichment.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    /// Disease → recommended specialist
    pub specialists: Lookup,
    /// Disease → description text
    pub descriptions: Lookup,
}

impl Catalog {
    /// Specialist for a disease, if listed.
    #[must_use]
    pub fn specialist(&self, disease: &str) -> Option<&str> {
        self.specialists.get(disease)
    }

    /// Description for a disease, if listed.
    #[must_use]
    pub fn description(&self, disease: &str) -> Option<&str> {
        self.descriptions.get(disease)
    }
}

/// Everything loaded from the data directory.
#[derive(Debug, Clone)]
pub struct Dataset {
    /// Training table
    pub table: SymptomTable,
    /// Enrichment lookups
    pub catalog: Catalog,
}

impl Dataset {
    /// Loads the three resources.
    ///
    /// # Errors
    ///
    /// Returns the first loading error encountered.
    pub fn load(symptoms: &Path, specialists: &Path, descriptions: &Path) -> Result<Self> {
        Ok(Self {
            table: SymptomTable::load(symptoms)?,
            catalog: Catalog {
                specialists: load_specialists(specialists)?,
                descriptions: load_descriptions(descriptions)?,
            },
        })
    }
}

fn read_file(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path)
        .map_err(|e| DocrecError::data_format(path, format!("cannot read file: {e}")))
}

#[cfg(test)]
mod tests;
