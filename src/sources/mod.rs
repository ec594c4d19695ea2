//! Record sources: where flat bill records are read from.
//!
//! The graph pipeline only sees [`RawRecord`]s; a [`RecordSource`] hides the
//! file format. Fetching from the upstream API or the warehouse happens
//! elsewhere, this crate consumes their exports.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::AppError;
use crate::models::RawRecord;

/// On-disk layout of a record export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum SourceFormat {
    /// A JSON array of objects, or an object with an `items` array.
    Json,
    /// One JSON object per line.
    #[serde(alias = "jsonl", alias = "ndjson")]
    #[value(alias = "jsonl")]
    JsonLines,
    /// Comma-separated values with a header row.
    Csv,
}

impl SourceFormat {
    /// Infers the format from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "json" => Some(SourceFormat::Json),
            "jsonl" | "ndjson" => Some(SourceFormat::JsonLines),
            "csv" => Some(SourceFormat::Csv),
            _ => None,
        }
    }
}

/// A provider of raw bill records.
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Loads every record, in source order.
    async fn load(&self) -> Result<Vec<RawRecord>, AppError>;

    /// Human-readable description for logs.
    fn describe(&self) -> String;
}

/// Records read from a local export file.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
    format: SourceFormat,
}

impl FileSource {
    /// Opens a file source, inferring the format from the extension unless
    /// one is given.
    pub fn new(path: impl Into<PathBuf>, format: Option<SourceFormat>) -> Result<Self, AppError> {
        let path = path.into();
        let format = match format.or_else(|| SourceFormat::from_path(&path)) {
            Some(f) => f,
            None => {
                return Err(AppError::UnsupportedSource {
                    path: path.display().to_string(),
                    reason: "cannot infer format from extension; set source.format".to_string(),
                })
            }
        };
        Ok(Self { path, format })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> SourceFormat {
        self.format
    }
}

#[async_trait]
impl RecordSource for FileSource {
    async fn load(&self) -> Result<Vec<RawRecord>, AppError> {
        let content = tokio::fs::read_to_string(&self.path).await?;
        let records = match self.format {
            SourceFormat::Json => parse_json(&content, &self.path)?,
            SourceFormat::JsonLines => parse_json_lines(&content, &self.path)?,
            SourceFormat::Csv => parse_csv(&content)?,
        };
        tracing::info!(
            path = %self.path.display(),
            format = ?self.format,
            count = records.len(),
            "Loaded raw records"
        );
        Ok(records)
    }

    fn describe(&self) -> String {
        format!("{} ({:?})", self.path.display(), self.format)
    }
}

/// Records held in memory, mostly for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    records: Vec<RawRecord>,
}

impl MemorySource {
    pub fn new(records: Vec<RawRecord>) -> Self {
        Self { records }
    }
}

#[async_trait]
impl RecordSource for MemorySource {
    async fn load(&self) -> Result<Vec<RawRecord>, AppError> {
        Ok(self.records.clone())
    }

    fn describe(&self) -> String {
        format!("memory ({} records)", self.records.len())
    }
}

fn parse_json(content: &str, path: &Path) -> Result<Vec<RawRecord>, AppError> {
    let value: Value = serde_json::from_str(content)?;
    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("items") {
            Some(Value::Array(items)) => items,
            _ => {
                return Err(unsupported(path, "expected an array or an object with 'items'"));
            }
        },
        _ => return Err(unsupported(path, "expected an array of records")),
    };

    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| match item {
            Value::Object(map) => Ok(RawRecord(map)),
            _ => Err(unsupported(path, &format!("item {} is not an object", i))),
        })
        .collect()
}

fn parse_json_lines(content: &str, path: &Path) -> Result<Vec<RawRecord>, AppError> {
    let mut records = Vec::new();
    for (line_no, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<Value>(line)? {
            Value::Object(map) => records.push(RawRecord(map)),
            _ => {
                return Err(unsupported(
                    path,
                    &format!("line {} is not an object", line_no + 1),
                ))
            }
        }
    }
    Ok(records)
}

/// CSV cells are all strings; empty cells are dropped so they read as absent.
fn parse_csv(content: &str) -> Result<Vec<RawRecord>, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .flexible(true)
        .from_reader(content.as_bytes());
    let headers = reader.headers()?.clone();

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;
        let mut map = Map::with_capacity(headers.len());
        for (header, cell) in headers.iter().zip(row.iter()) {
            if header.is_empty() || cell.is_empty() {
                continue;
            }
            map.insert(header.to_string(), Value::String(cell.to_string()));
        }
        records.push(RawRecord(map));
    }
    Ok(records)
}

fn unsupported(path: &Path, reason: &str) -> AppError {
    AppError::UnsupportedSource {
        path: path.display().to_string(),
        reason: reason.to_string(),
    }
}
