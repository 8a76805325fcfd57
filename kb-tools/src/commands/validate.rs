//! The `validate` command: structure and content checks over every CSV
//! file in the knowledge base directory, with optional automatic fixes.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use crate::quality::{self, Finding, FIRST_DATA_LINE};
use crate::record::{self, KnowledgeRecord};

pub fn run(dir: &Path, fix: bool) -> Result<()> {
    let paths = list_csv_files(dir)?;
    if paths.is_empty() {
        bail!("no CSV files found in {}", dir.display());
    }

    println!("Validating {} files in {}", paths.len(), dir.display());
    println!();

    let mut findings: Vec<Finding> = Vec::new();
    let mut checked: BTreeMap<String, Vec<KnowledgeRecord>> = BTreeMap::new();
    let mut total_rows = 0usize;
    let mut valid_rows = 0usize;

    for path in &paths {
        let name = file_name(path);

        let headers = match record::read_headers(path) {
            Ok(headers) => headers,
            Err(err) => {
                println!("{}: unreadable", name);
                findings.push(Finding::error(err.to_string()));
                continue;
            }
        };
        let structure = quality::check_structure(&name, &headers);
        let structure_ok = !structure.iter().any(|f| f.is_error());
        findings.extend(structure);
        if !structure_ok {
            println!("{}: missing required columns", name);
            continue;
        }

        let mut records = match record::load_file(path) {
            Ok(records) => records,
            Err(err) => {
                println!("{}: unreadable", name);
                findings.push(Finding::error(format!("Failed to read {}: {}", name, err)));
                continue;
            }
        };

        if fix {
            let outcome = quality::apply_fixes(&mut records);
            if outcome.modified {
                record::save_file(path, &records)
                    .with_context(|| format!("failed to save {}", path.display()))?;
                for message in &outcome.messages {
                    println!("Fixed {} - {}", name, message);
                }
            }
        }

        let mut file_valid = 0usize;
        for (idx, rec) in records.iter().enumerate() {
            let location = format!("{}:{}", name, idx + FIRST_DATA_LINE);
            let row_findings = quality::check_record(&location, rec);
            if !row_findings.iter().any(|f| f.is_error()) {
                file_valid += 1;
            }
            findings.extend(row_findings);
        }
        println!("{}: {}/{} rows valid", name, file_valid, records.len());

        total_rows += records.len();
        valid_rows += file_valid;
        checked.insert(name, records);
    }

    for dup in quality::find_duplicates(&checked) {
        findings.push(Finding::warning(format!(
            "Duplicate question: '{}...' in {}",
            truncate(&dup.question, 50),
            dup.locations.join(", ")
        )));
    }

    print_statistics(&checked, total_rows, valid_rows);

    let errors: Vec<&Finding> = findings.iter().filter(|f| f.is_error()).collect();
    let warnings: Vec<&Finding> = findings.iter().filter(|f| !f.is_error()).collect();
    if !errors.is_empty() {
        println!();
        println!("Errors:");
        for finding in &errors {
            println!("  {}", finding.message);
        }
    }
    if !warnings.is_empty() {
        println!();
        println!("Warnings:");
        for finding in &warnings {
            println!("  {}", finding.message);
        }
    }

    println!();
    if errors.is_empty() {
        println!("Validation passed ({} warnings)", warnings.len());
        Ok(())
    } else {
        bail!("validation failed with {} errors", errors.len())
    }
}

fn print_statistics(
    files: &BTreeMap<String, Vec<KnowledgeRecord>>,
    total_rows: usize,
    valid_rows: usize,
) {
    let analysis = quality::analyze(files);

    println!();
    println!("Statistics:");
    println!("  Total files: {}", analysis.total_files);
    println!("  Total entries: {}", analysis.total_entries);
    if total_rows > 0 {
        println!(
            "  Valid entries: {} ({:.1}%)",
            valid_rows,
            valid_rows as f64 / total_rows as f64 * 100.0
        );
    }
    println!("  Avg question length: {:.1} chars", analysis.avg_question_length);
    println!("  Avg answer length: {:.1} chars", analysis.avg_answer_length);

    println!("  Categories:");
    for (category, count) in &analysis.categories {
        println!("    {}: {}", category, count);
    }
    println!("  Priorities:");
    for priority in ["high", "medium", "low"] {
        let count = analysis.priorities.get(priority).copied().unwrap_or(0);
        if count == 0 {
            continue;
        }
        println!(
            "    {}: {} ({:.1}%)",
            priority,
            count,
            count as f64 / analysis.total_entries as f64 * 100.0
        );
    }
    println!("  Top 10 tags:");
    let mut ranked: Vec<(&String, &usize)> = analysis.tags.iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(a.1));
    for (tag, count) in ranked.into_iter().take(10) {
        println!("    {}: {}", tag, count);
    }
}

fn list_csv_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        bail!("knowledge base directory not found: {}", dir.display());
    }
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read {}", dir.display()))?;
    let mut paths: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.extension().and_then(|ext| ext.to_str()) == Some("csv"))
        .collect();
    paths.sort();
    Ok(paths)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn truncate(text: &str, limit: usize) -> String {
    text.chars().take(limit).collect()
}
