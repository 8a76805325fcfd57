//! Detects and repairs problematic Unicode characters in CSV files.
//!
//! Scraped documentation drags in typographic quotes, dashes and
//! trademark glyphs that downstream ingestion chokes on. Everything
//! here maps them to plain ASCII equivalents.

use std::collections::BTreeMap;
use std::fmt;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use csv::StringRecord;

/// Problematic characters and their ASCII replacements.
pub const REPLACEMENTS: [(char, &str); 23] = [
    // Trademark and copyright symbols
    ('\u{00ae}', "(R)"),
    ('\u{2122}', "(TM)"),
    ('\u{00a9}', "(C)"),
    // Quotes and apostrophes
    ('\u{2018}', "'"),
    ('\u{2019}', "'"),
    ('\u{201c}', "\""),
    ('\u{201d}', "\""),
    ('\u{2033}', "\""),
    ('\u{2032}', "'"),
    // Dashes
    ('\u{2013}', "-"),
    ('\u{2014}', "-"),
    ('\u{2212}', "-"),
    // Spaces
    ('\u{00a0}', " "),
    ('\u{2009}', " "),
    ('\u{2003}', " "),
    ('\u{2002}', " "),
    // Other symbols
    ('\u{2022}', "*"),
    ('\u{2026}', "..."),
    ('\u{2010}', "-"),
    ('\u{2011}', "-"),
    // Currency
    ('\u{20ac}', "EUR"),
    ('\u{00a3}', "GBP"),
    ('\u{00a5}', "JPY"),
];

/// One replacement applied to a field value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Change {
    pub from: char,
    pub to: &'static str,
    pub count: usize,
}

impl fmt::Display for Change {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "'{}' (U+{:04X}) -> '{}' ({} occurrences)",
            self.from, self.from as u32, self.to, self.count
        )
    }
}

/// Replace every problematic character in `text`, reporting what was
/// replaced and how often.
pub fn fix_text(text: &str) -> (String, Vec<Change>) {
    let mut fixed = text.to_string();
    let mut changes = Vec::new();

    for (from, to) in REPLACEMENTS {
        let count = fixed.matches(from).count();
        if count > 0 {
            fixed = fixed.replace(from, to);
            changes.push(Change { from, to, count });
        }
    }

    (fixed, changes)
}

/// A field value that needs fixing, captured for the report.
#[derive(Debug)]
pub struct SampleIssue {
    /// CSV line number; the header is line 1.
    pub row: usize,
    pub field: String,
    pub changes: Vec<Change>,
    pub preview: String,
}

/// What an analysis pass found in one file.
#[derive(Debug, Default)]
pub struct FileAnalysis {
    pub total_rows: usize,
    pub rows_with_issues: usize,
    /// Field name to number of rows where that field needs fixing.
    pub issues_by_field: BTreeMap<String, usize>,
    /// At most five examples across the whole file.
    pub sample_issues: Vec<SampleIssue>,
}

const SAMPLE_LIMIT: usize = 5;
const PREVIEW_CHARS: usize = 100;

/// Scan a CSV stream for problematic characters without modifying it.
pub fn analyze<R: Read>(mut reader: csv::Reader<R>) -> Result<FileAnalysis> {
    let headers = reader.headers()?.clone();
    let mut analysis = FileAnalysis::default();

    for (row_num, row) in reader.records().enumerate() {
        let row = row?;
        analysis.total_rows += 1;
        let mut row_has_issues = false;

        for (idx, field) in headers.iter().enumerate() {
            let value = row.get(idx).unwrap_or("");
            if value.is_empty() {
                continue;
            }

            let (_, changes) = fix_text(value);
            if changes.is_empty() {
                continue;
            }

            row_has_issues = true;
            *analysis.issues_by_field.entry(field.to_string()).or_insert(0) += 1;

            if analysis.sample_issues.len() < SAMPLE_LIMIT {
                analysis.sample_issues.push(SampleIssue {
                    // Data rows start on line 2, after the header.
                    row: row_num + 2,
                    field: field.to_string(),
                    changes,
                    preview: preview(value),
                });
            }
        }

        if row_has_issues {
            analysis.rows_with_issues += 1;
        }
    }

    Ok(analysis)
}

/// Scan a CSV file for problematic characters.
pub fn analyze_file(path: &Path) -> Result<FileAnalysis> {
    let reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    analyze(reader)
}

/// Rewrite a CSV file with every problematic character replaced. With
/// `backup` set a `.csv.backup` copy is written first.
pub fn fix_file(path: &Path, backup: bool) -> Result<()> {
    if backup {
        let backup_path = path.with_extension("csv.backup");
        std::fs::copy(path, &backup_path)
            .with_context(|| format!("failed to write {}", backup_path.display()))?;
    }

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    let headers = reader.headers()?.clone();

    let mut rows: Vec<StringRecord> = Vec::new();
    for row in reader.records() {
        let row = row?;
        let fixed: StringRecord = (0..headers.len())
            .map(|idx| fix_text(row.get(idx).unwrap_or("")).0)
            .collect();
        rows.push(fixed);
    }
    drop(reader);

    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("failed to rewrite {}", path.display()))?;
    writer.write_record(&headers)?;
    for row in &rows {
        writer.write_record(row)?;
    }
    writer.flush()?;

    Ok(())
}

fn preview(value: &str) -> String {
    if value.chars().count() > PREVIEW_CHARS {
        let head: String = value.chars().take(PREVIEW_CHARS).collect();
        format!("{}...", head)
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn analyze_bytes(data: &str) -> FileAnalysis {
        let reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(Cursor::new(data.to_string()));
        analyze(reader).unwrap()
    }

    #[test]
    fn fix_text_replaces_and_counts() {
        let (fixed, changes) = fix_text("Datadog\u{ae} \u{201c}Agent\u{201d}\u{2026}");

        assert_eq!(fixed, "Datadog(R) \"Agent\"...");
        assert_eq!(changes.len(), 4);
        assert_eq!(
            changes[0],
            Change { from: '\u{ae}', to: "(R)", count: 1 }
        );
    }

    #[test]
    fn fix_text_counts_repeated_characters_once() {
        let (fixed, changes) = fix_text("a\u{2013}b\u{2013}c");

        assert_eq!(fixed, "a-b-c");
        assert_eq!(changes, vec![Change { from: '\u{2013}', to: "-", count: 2 }]);
    }

    #[test]
    fn fix_text_leaves_clean_text_alone() {
        let (fixed, changes) = fix_text("plain ascii text");
        assert_eq!(fixed, "plain ascii text");
        assert!(changes.is_empty());
    }

    #[test]
    fn currency_symbols_become_codes() {
        let (fixed, _) = fix_text("\u{20ac}5 or \u{a3}4 or \u{a5}600");
        assert_eq!(fixed, "EUR5 or GBP4 or JPY600");
    }

    #[test]
    fn change_display_names_the_code_point() {
        let change = Change { from: '\u{2026}', to: "...", count: 3 };
        assert_eq!(
            change.to_string(),
            "'\u{2026}' (U+2026) -> '...' (3 occurrences)"
        );
    }

    #[test]
    fn analyze_reports_rows_and_fields() {
        let analysis = analyze_bytes(
            "question,answer\nWhat\u{2019}s new?,Nothing\u{2026}\nPlain,Also plain\n",
        );

        assert_eq!(analysis.total_rows, 2);
        assert_eq!(analysis.rows_with_issues, 1);
        assert_eq!(analysis.issues_by_field.get("question"), Some(&1));
        assert_eq!(analysis.issues_by_field.get("answer"), Some(&1));
        assert_eq!(analysis.sample_issues.len(), 2);
        // The header counts as line 1, so the first data row is line 2.
        assert_eq!(analysis.sample_issues[0].row, 2);
        assert_eq!(analysis.sample_issues[0].field, "question");
    }

    #[test]
    fn analyze_caps_samples_at_five() {
        let mut data = String::from("question,answer\n");
        for i in 0..8 {
            data.push_str(&format!("q{}\u{2122},a{}\n", i, i));
        }

        let analysis = analyze_bytes(&data);

        assert_eq!(analysis.rows_with_issues, 8);
        assert_eq!(analysis.sample_issues.len(), 5);
    }

    #[test]
    fn fix_file_rewrites_and_backs_up() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kb.csv");
        std::fs::write(&path, "question,answer\nWhat\u{2019}s up?,It\u{2019}s fine\n").unwrap();

        fix_file(&path, true).unwrap();

        let fixed = std::fs::read_to_string(&path).unwrap();
        assert!(fixed.contains("What's up?"));
        assert!(!fixed.contains('\u{2019}'));
        assert!(dir.path().join("kb.csv.backup").exists());

        // A second pass finds nothing left to fix.
        assert_eq!(analyze_file(&path).unwrap().rows_with_issues, 0);
    }

    #[test]
    fn fix_file_can_skip_the_backup() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kb.csv");
        std::fs::write(&path, "question,answer\na\u{2014}b,c\n").unwrap();

        fix_file(&path, false).unwrap();

        assert!(std::fs::read_to_string(&path).unwrap().contains("a-b"));
        assert!(!dir.path().join("kb.csv.backup").exists());
    }
}
