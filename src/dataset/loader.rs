//! Reading and writing record sequences
//!
//! Two on-disk shapes are supported:
//! - CSV with a `Score,Passed` header, `Passed` spelled `True` or `False`
//! - a structured list document `{"data": [{"topic_score": .., "passed": ..}]}`
//!   in YAML or JSON, where the difficulty key may also be `problem_rating`
//!
//! Rows that cannot be turned into a finite difficulty and a pass flag fail
//! with [`EstimationError::MalformedRecord`] before any estimator sees them.

use crate::error::EstimationError;
use crate::types::Record;
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;
use tracing::info;

/// File formats understood by the loader
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasetFormat {
    Csv,
    Yaml,
    Json,
}

impl DatasetFormat {
    /// Pick the format from a file extension
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_lowercase());

        match extension.as_deref() {
            Some("csv") => Ok(DatasetFormat::Csv),
            Some("yaml") | Some("yml") => Ok(DatasetFormat::Yaml),
            Some("json") => Ok(DatasetFormat::Json),
            _ => Err(anyhow!(
                "Unsupported dataset extension for {} (expected .csv, .yaml or .json)",
                path.display()
            )),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct CsvRow {
    #[serde(rename = "Score")]
    score: String,
    #[serde(rename = "Passed")]
    passed: String,
}

/// Structured list document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordDocument {
    pub data: Vec<RecordEntry>,
}

/// One entry of a structured list document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordEntry {
    #[serde(alias = "problem_rating")]
    pub topic_score: f64,
    pub passed: bool,
}

fn malformed(index: usize, reason: impl Into<String>) -> EstimationError {
    EstimationError::MalformedRecord {
        index,
        reason: reason.into(),
    }
}

fn parse_passed(value: &str) -> Option<bool> {
    match value.trim() {
        "True" | "true" => Some(true),
        "False" | "false" => Some(false),
        _ => None,
    }
}

fn finite_difficulty(index: usize, difficulty: f64) -> std::result::Result<f64, EstimationError> {
    if difficulty.is_finite() {
        Ok(difficulty)
    } else {
        Err(malformed(
            index,
            format!("difficulty is not finite: {}", difficulty),
        ))
    }
}

/// Read records from CSV, in file order.
pub fn read_csv<R: Read>(reader: R) -> Result<Vec<Record>> {
    let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut records = Vec::new();

    for (index, row) in csv_reader.deserialize::<CsvRow>().enumerate() {
        let row = row.map_err(|e| malformed(index, e.to_string()))?;

        let difficulty: f64 = row
            .score
            .parse()
            .map_err(|_| malformed(index, format!("invalid score: {:?}", row.score)))?;
        let outcome = parse_passed(&row.passed)
            .ok_or_else(|| malformed(index, format!("invalid pass flag: {:?}", row.passed)))?;

        records.push(Record::new(finite_difficulty(index, difficulty)?, outcome));
    }

    Ok(records)
}

/// Records of a structured list document, in list order.
fn document_records(document: RecordDocument) -> Result<Vec<Record>> {
    document
        .data
        .into_iter()
        .enumerate()
        .map(|(index, entry)| -> Result<Record> {
            Ok(Record::new(
                finite_difficulty(index, entry.topic_score)?,
                entry.passed,
            ))
        })
        .collect()
}

fn record_document(records: &[Record]) -> RecordDocument {
    RecordDocument {
        data: records
            .iter()
            .map(|record| RecordEntry {
                topic_score: record.difficulty,
                passed: record.outcome,
            })
            .collect(),
    }
}

/// Read records from a YAML structured list document.
pub fn read_yaml<R: Read>(reader: R) -> Result<Vec<Record>> {
    let document: RecordDocument =
        serde_yaml::from_reader(reader).context("Invalid structured record list")?;
    document_records(document)
}

/// Read records from a JSON structured list document.
pub fn read_json<R: Read>(reader: R) -> Result<Vec<Record>> {
    let document: RecordDocument =
        serde_json::from_reader(reader).context("Invalid structured record list")?;
    document_records(document)
}

/// Write records as CSV with the `Score,Passed` header.
pub fn write_csv<W: Write>(writer: W, records: &[Record]) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for record in records {
        csv_writer.serialize(CsvRow {
            score: record.difficulty.to_string(),
            passed: if record.outcome { "True" } else { "False" }.to_string(),
        })?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Write records as a YAML structured list document.
pub fn write_yaml<W: Write>(writer: W, records: &[Record]) -> Result<()> {
    serde_yaml::to_writer(writer, &record_document(records))?;
    Ok(())
}

/// Write records as a JSON structured list document.
pub fn write_json<W: Write>(writer: W, records: &[Record]) -> Result<()> {
    serde_json::to_writer_pretty(writer, &record_document(records))?;
    Ok(())
}

/// Load records from a file, choosing the format by extension.
pub fn load_records(path: &Path) -> Result<Vec<Record>> {
    let format = DatasetFormat::from_path(path)?;
    let file =
        File::open(path).with_context(|| format!("Failed to open dataset {}", path.display()))?;
    let reader = BufReader::new(file);

    let records = match format {
        DatasetFormat::Csv => read_csv(reader)?,
        DatasetFormat::Yaml => read_yaml(reader)?,
        DatasetFormat::Json => read_json(reader)?,
    };

    info!("Loaded {} records from {}", records.len(), path.display());
    Ok(records)
}

/// Save records to a file, choosing the format by extension.
pub fn save_records(path: &Path, records: &[Record]) -> Result<()> {
    let format = DatasetFormat::from_path(path)?;
    let file = File::create(path)
        .with_context(|| format!("Failed to create dataset {}", path.display()))?;
    let mut writer = BufWriter::new(file);

    match format {
        DatasetFormat::Csv => write_csv(&mut writer, records)?,
        DatasetFormat::Yaml => write_yaml(&mut writer, records)?,
        DatasetFormat::Json => write_json(&mut writer, records)?,
    }
    writer.flush()?;

    info!("Saved {} records to {}", records.len(), path.display());
    Ok(())
}
