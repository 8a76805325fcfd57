//! Knowledge base records and CSV file access.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{bail, Context, Result};
use csv::StringRecord;
use serde::{Deserialize, Serialize};

/// Columns every knowledge base file must carry, in storage order.
pub const REQUIRED_FIELDS: [&str; 5] = ["question", "answer", "category", "tags", "priority"];

/// Accepted values for the `priority` column.
pub const VALID_PRIORITIES: [&str; 3] = ["high", "medium", "low"];

/// One knowledge base entry. Tags stay in their stored comma-separated
/// form; use [`KnowledgeRecord::tag_list`] to split them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeRecord {
    pub question: String,
    pub answer: String,
    pub category: String,
    pub tags: String,
    pub priority: String,
}

impl KnowledgeRecord {
    /// Build a record from a CSV row, mapping columns by header name.
    /// Missing columns become empty strings so partially broken files
    /// still load and get flagged by validation instead of erroring out.
    pub fn from_row(headers: &StringRecord, row: &StringRecord) -> Self {
        let field = |name: &str| {
            headers
                .iter()
                .position(|header| header == name)
                .and_then(|idx| row.get(idx))
                .unwrap_or("")
                .to_string()
        };

        Self {
            question: field("question"),
            answer: field("answer"),
            category: field("category"),
            tags: field("tags"),
            priority: field("priority"),
        }
    }

    /// Tags as trimmed, non-empty items.
    pub fn tag_list(&self) -> Vec<&str> {
        self.tags
            .split(',')
            .map(str::trim)
            .filter(|tag| !tag.is_empty())
            .collect()
    }
}

/// Decode bytes as Latin-1. Every byte maps to the code point of the
/// same value, so this never fails; scraped exports arrive in this
/// encoding.
pub fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}

/// Decode bytes as UTF-8, substituting the replacement character for
/// invalid sequences rather than refusing the row.
pub fn decode_utf8_lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

/// Read the `content` column of a raw export, decoding each cell with
/// the given decoder.
pub fn read_content_column(path: &Path, decode: fn(&[u8]) -> String) -> Result<Vec<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("failed to open {}", path.display()))?;

    let headers = reader.byte_headers()?.clone();
    let content_idx = headers
        .iter()
        .position(|header| decode(header) == "content")
        .with_context(|| format!("{} has no 'content' column", path.display()))?;

    let mut contents = Vec::new();
    for row in reader.byte_records() {
        let row = row.with_context(|| format!("failed to read {}", path.display()))?;
        contents.push(row.get(content_idx).map(decode).unwrap_or_default());
    }

    Ok(contents)
}

/// Column names of a knowledge base file.
pub fn read_headers(path: &Path) -> Result<Vec<String>> {
    let metadata = std::fs::metadata(path)
        .with_context(|| format!("failed to stat {}", path.display()))?;
    if metadata.len() == 0 {
        bail!("{} is empty", path.display());
    }

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("failed to open {}", path.display()))?;

    Ok(reader.headers()?.iter().map(str::to_string).collect())
}

/// Load every row of one knowledge base file.
pub fn load_file(path: &Path) -> Result<Vec<KnowledgeRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("failed to open {}", path.display()))?;

    let headers = reader.headers()?.clone();
    let mut records = Vec::new();
    for row in reader.records() {
        let row = row.with_context(|| format!("failed to read {}", path.display()))?;
        records.push(KnowledgeRecord::from_row(&headers, &row));
    }

    Ok(records)
}

/// Write records with the standard header.
pub fn save_file(path: &Path, records: &[KnowledgeRecord]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create {}", path.display()))?;

    if records.is_empty() {
        writer.write_record(REQUIRED_FIELDS)?;
    }
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;

    Ok(())
}

/// Load every `.csv` file in a directory, keyed by file name. Files with
/// no data rows are skipped. The map is ordered by name so reports come
/// out deterministic.
pub fn load_dir(dir: &Path) -> Result<BTreeMap<String, Vec<KnowledgeRecord>>> {
    if !dir.is_dir() {
        bail!("knowledge base directory not found: {}", dir.display());
    }

    let mut files = BTreeMap::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.extension().and_then(|ext| ext.to_str()) != Some("csv") {
            continue;
        }

        let records = load_file(&path)?;
        if records.is_empty() {
            continue;
        }
        files.insert(entry.file_name().to_string_lossy().into_owned(), records);
    }

    Ok(files)
}
