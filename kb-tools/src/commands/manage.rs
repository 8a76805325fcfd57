//! Day-to-day maintenance commands: duplicates, search, stats, merge.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use crate::quality;
use crate::record;

pub fn duplicates(dir: &Path) -> Result<()> {
    let files = record::load_dir(dir)?;
    let duplicates = quality::find_duplicates(&files);

    if duplicates.is_empty() {
        println!("No duplicate questions found");
        return Ok(());
    }

    println!("Found {} duplicate questions:", duplicates.len());
    for dup in &duplicates {
        println!(
            "  '{}...' in {}",
            truncate(&dup.question, 80),
            dup.locations.join(", ")
        );
    }
    Ok(())
}

pub fn remove_duplicates(dir: &Path, dry_run: bool) -> Result<()> {
    let mut files = record::load_dir(dir)?;
    let duplicates = quality::find_duplicates(&files);

    if duplicates.is_empty() {
        println!("No duplicates to remove");
        return Ok(());
    }

    if dry_run {
        println!("Found {} duplicate questions", duplicates.len());
        for dup in &duplicates {
            // The first occurrence stays, everything after it goes.
            for location in &dup.locations[1..] {
                println!("  Would remove: {}", location);
            }
        }
        return Ok(());
    }

    let removed = quality::remove_duplicates(&mut files);
    for (name, count) in &removed {
        let path = dir.join(name);
        record::save_file(&path, &files[name])
            .with_context(|| format!("failed to save {}", path.display()))?;
        println!("Removed {} duplicate rows from {}", count, name);
    }
    Ok(())
}

pub fn search(dir: &Path, query: &str, field: &str, limit: usize) -> Result<()> {
    let files = record::load_dir(dir)?;
    let hits = quality::search(&files, query, field);

    println!("Found {} results for '{}' in field '{}'", hits.len(), query, field);
    for (i, hit) in hits.iter().take(limit).enumerate() {
        println!();
        println!("{}. [{}]", i + 1, hit.source);
        println!("   Question: {}...", truncate(&hit.record.question, 100));
        println!("   Answer: {}...", truncate(&hit.record.answer, 150));
        println!("   Category: {}", hit.record.category);
        println!("   Tags: {}", hit.record.tags);
    }
    if hits.len() > limit {
        println!();
        println!("Showing {} of {} results", limit, hits.len());
    }
    Ok(())
}

pub fn stats(dir: &Path, output: Option<&Path>) -> Result<()> {
    let files = record::load_dir(dir)?;
    let report = quality::stats_report(&quality::analyze(&files));
    let rendered = serde_json::to_string_pretty(&report)?;

    match output {
        Some(path) => {
            std::fs::write(path, rendered)
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("Statistics exported to {}", path.display());
        }
        None => println!("{}", rendered),
    }
    Ok(())
}

pub fn merge(files: &[PathBuf], output: &Path, keep_duplicates: bool) -> Result<()> {
    let mut sources = Vec::new();
    for path in files {
        if !path.is_file() {
            bail!("source file not found: {}", path.display());
        }
        let records = record::load_file(path)?;
        println!("Loaded {} entries from {}", records.len(), path.display());
        sources.push(records);
    }

    let (merged, skipped) = quality::merge_records(sources, keep_duplicates);
    record::save_file(output, &merged)
        .with_context(|| format!("failed to save {}", output.display()))?;

    if skipped > 0 {
        println!("Skipped {} duplicate questions", skipped);
    }
    println!("Merged {} entries into {}", merged.len(), output.display());
    Ok(())
}

fn truncate(text: &str, limit: usize) -> String {
    text.chars().take(limit).collect()
}
