//! The `process-web-docs` command: scraped documentation pages in,
//! structured Q&A out.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};

use crate::record::{self, KnowledgeRecord};
use crate::webdocs::process_content;

pub fn run(input: &Path, output: &Path) -> Result<()> {
    let contents = record::read_content_column(input, record::decode_latin1)?;
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

    let mut priorities: BTreeMap<&str, usize> = BTreeMap::new();
    let mut tags: BTreeMap<&str, usize> = BTreeMap::new();
    for record in records {
        *priorities.entry(&record.priority).or_insert(0) += 1;
        for tag in record.tag_list() {
            *tags.entry(tag).or_insert(0) += 1;
        }
    }

    println!();
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

    let question_chars: usize = records.iter().map(|r| r.question.chars().count()).sum();
    let answer_chars: usize = records.iter().map(|r| r.answer.chars().count()).sum();
    println!(
        "Avg question length: {:.0} chars",
        question_chars as f64 / records.len() as f64
    );
    println!(
        "Avg answer length: {:.0} chars",
        answer_chars as f64 / records.len() as f64
    );
}
