//! The `process` command: raw support export in, structured Q&A out.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};

use crate::process::process_content;
use crate::record::{self, KnowledgeRecord};

pub fn run(input: &Path, output: &Path) -> Result<()> {
    let contents = record::read_content_column(input, record::decode_utf8_lossy)?;
    let records: Vec<KnowledgeRecord> = contents
        .iter()
        .map(|content| process_content(content))
        .collect();

    record::save_file(output, &records)
        .with_context(|| format!("failed to save {}", output.display()))?;

    println!("Processed {} entries", records.len());
    println!("Knowledge base saved to: {}", output.display());
    print_summary(&records);

    Ok(())
}

fn print_summary(records: &[KnowledgeRecord]) {
    if records.is_empty() {
        return;
    }

    let mut categories: BTreeMap<&str, usize> = BTreeMap::new();
    let mut priorities: BTreeMap<&str, usize> = BTreeMap::new();
    let mut tags: BTreeMap<&str, usize> = BTreeMap::new();
    for record in records {
        *categories.entry(&record.category).or_insert(0) += 1;
        *priorities.entry(&record.priority).or_insert(0) += 1;
        for tag in record.tag_list() {
            *tags.entry(tag).or_insert(0) += 1;
        }
    }

    println!();
    println!("Categories:");
    for (category, count) in &categories {
        println!("  {}: {}", category, count);
    }
    println!("Priorities:");
    for (priority, count) in &priorities {
        println!("  {}: {}", priority, count);
    }
    println!("Top 10 tags:");
    let mut ranked: Vec<(&str, usize)> = tags.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    for (tag, count) in ranked.into_iter().take(10) {
        println!("  {}: {}", tag, count);
    }
}
