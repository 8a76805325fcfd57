//! Quality checks, duplicate handling and aggregate analysis.
//!
//! Row references throughout use CSV line numbers: the header is line 1
//! and the first data row is line 2, matching what an editor shows.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde_json::json;

use crate::record::{KnowledgeRecord, REQUIRED_FIELDS, VALID_PRIORITIES};

/// Line number of the first data row.
pub const FIRST_DATA_LINE: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

/// One validation finding with its file/row context baked in.
#[derive(Debug, Clone)]
pub struct Finding {
    pub severity: Severity,
    pub message: String,
}

impl Finding {
    pub fn error(message: String) -> Self {
        Self { severity: Severity::Error, message }
    }

    pub fn warning(message: String) -> Self {
        Self { severity: Severity::Warning, message }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

/// Header check. A missing required column is an error and excludes the
/// file from content checks; unknown columns only warn.
pub fn check_structure(file: &str, headers: &[String]) -> Vec<Finding> {
    let header_set: HashSet<&str> = headers.iter().map(String::as_str).collect();

    let missing: Vec<&str> = REQUIRED_FIELDS
        .iter()
        .copied()
        .filter(|field| !header_set.contains(field))
        .collect();
    if !missing.is_empty() {
        return vec![Finding::error(format!(
            "Missing required fields in {}: {}",
            file,
            missing.join(", ")
        ))];
    }

    let extra: Vec<&str> = headers
        .iter()
        .map(String::as_str)
        .filter(|field| !REQUIRED_FIELDS.contains(field))
        .collect();
    if extra.is_empty() {
        Vec::new()
    } else {
        vec![Finding::warning(format!(
            "Extra fields in {}: {}",
            file,
            extra.join(", ")
        ))]
    }
}

/// Content checks for one row. `location` is the `file:line` prefix for
/// the messages.
pub fn check_record(location: &str, record: &KnowledgeRecord) -> Vec<Finding> {
    let mut findings = Vec::new();

    let fields = [
        ("question", &record.question),
        ("answer", &record.answer),
        ("category", &record.category),
        ("tags", &record.tags),
        ("priority", &record.priority),
    ];
    for (name, value) in fields {
        if value.trim().is_empty() {
            findings.push(Finding::error(format!("{} - Empty {}", location, name)));
        }
    }

    let priority = record.priority.trim().to_lowercase();
    if !priority.is_empty() && !VALID_PRIORITIES.contains(&priority.as_str()) {
        findings.push(Finding::error(format!(
            "{} - Invalid priority: {}",
            location, priority
        )));
    }

    let question_len = record.question.trim().chars().count();
    if question_len > 500 {
        findings.push(Finding::warning(format!(
            "{} - Question is very long ({} chars)",
            location, question_len
        )));
    } else if question_len < 10 {
        findings.push(Finding::warning(format!(
            "{} - Question is very short ({} chars)",
            location, question_len
        )));
    }

    let answer_len = record.answer.trim().chars().count();
    if answer_len > 5000 {
        findings.push(Finding::warning(format!(
            "{} - Answer is very long ({} chars)",
            location, answer_len
        )));
    } else if answer_len < 20 {
        findings.push(Finding::warning(format!(
            "{} - Answer is very short ({} chars)",
            location, answer_len
        )));
    }

    let tags = record.tags.trim();
    if !tags.is_empty() {
        let tag_list: Vec<&str> = tags.split(',').map(str::trim).collect();
        if tag_list.len() > 10 {
            findings.push(Finding::warning(format!(
                "{} - Too many tags ({})",
                location,
                tag_list.len()
            )));
        }
        if tag_list.iter().any(|tag| tag.is_empty()) {
            findings.push(Finding::error(format!("{} - Empty tags found", location)));
        }
    }

    let category = record.category.trim();
    if !category.is_empty()
        && !category
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        findings.push(Finding::warning(format!(
            "{} - Category contains special characters: {}",
            location, category
        )));
    }

    findings
}

/// A question stored more than once.
#[derive(Debug, PartialEq, Eq)]
pub struct Duplicate {
    /// Trimmed, lowercased question text.
    pub question: String,
    /// `file:line` locations, first occurrence first.
    pub locations: Vec<String>,
}

/// Find questions appearing more than once across all files,
/// case-insensitively. Ordered by first occurrence.
pub fn find_duplicates(files: &BTreeMap<String, Vec<KnowledgeRecord>>) -> Vec<Duplicate> {
    let mut locations: HashMap<String, Vec<String>> = HashMap::new();
    let mut order: Vec<String> = Vec::new();

    for (file, records) in files {
        for (idx, record) in records.iter().enumerate() {
            let question = record.question.trim().to_lowercase();
            if question.is_empty() {
                continue;
            }
            let entry = locations.entry(question.clone()).or_default();
            if entry.is_empty() {
                order.push(question);
            }
            entry.push(format!("{}:{}", file, idx + FIRST_DATA_LINE));
        }
    }

    order
        .into_iter()
        .filter_map(|question| {
            let locs = locations.remove(&question)?;
            (locs.len() > 1).then_some(Duplicate { question, locations: locs })
        })
        .collect()
}

/// Drop every later occurrence of a duplicated question, keeping the
/// first. Returns rows removed per file.
pub fn remove_duplicates(
    files: &mut BTreeMap<String, Vec<KnowledgeRecord>>,
) -> BTreeMap<String, usize> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut removed = BTreeMap::new();

    for (file, records) in files.iter_mut() {
        let before = records.len();
        records.retain(|record| {
            let question = record.question.trim().to_lowercase();
            if question.is_empty() {
                // Rows without a question never count as duplicates.
                return true;
            }
            seen.insert(question)
        });
        let dropped = before - records.len();
        if dropped > 0 {
            removed.insert(file.clone(), dropped);
        }
    }

    removed
}

/// Fields `search` understands; `all` spans every column.
pub const SEARCH_FIELDS: [&str; 5] = ["question", "answer", "category", "tags", "all"];

/// A search match with its `file:line` provenance.
#[derive(Debug)]
pub struct SearchHit<'a> {
    pub source: String,
    pub record: &'a KnowledgeRecord,
}

/// Case-insensitive substring search over one field or all of them.
pub fn search<'a>(
    files: &'a BTreeMap<String, Vec<KnowledgeRecord>>,
    query: &str,
    field: &str,
) -> Vec<SearchHit<'a>> {
    let query = query.to_lowercase();
    let matches = |value: &str| value.to_lowercase().contains(&query);

    let mut hits = Vec::new();
    for (file, records) in files {
        for (idx, record) in records.iter().enumerate() {
            let matched = match field {
                "question" => matches(&record.question),
                "answer" => matches(&record.answer),
                "category" => matches(&record.category),
                "tags" => matches(&record.tags),
                _ => {
                    matches(&record.question)
                        || matches(&record.answer)
                        || matches(&record.category)
                        || matches(&record.tags)
                        || matches(&record.priority)
                }
            };
            if matched {
                hits.push(SearchHit {
                    source: format!("{}:{}", file, idx + FIRST_DATA_LINE),
                    record,
                });
            }
        }
    }

    hits
}

/// Per-file counters and row issues.
#[derive(Debug, Default)]
pub struct FileStats {
    pub entry_count: usize,
    pub categories: BTreeMap<String, usize>,
    pub priorities: BTreeMap<String, usize>,
    pub tags: BTreeMap<String, usize>,
    pub issues: Vec<String>,
}

/// Aggregate view of the whole knowledge base.
#[derive(Debug, Default)]
pub struct Analysis {
    pub total_files: usize,
    pub total_entries: usize,
    pub categories: BTreeMap<String, usize>,
    pub priorities: BTreeMap<String, usize>,
    pub tags: BTreeMap<String, usize>,
    pub avg_question_length: f64,
    pub avg_answer_length: f64,
    pub empty_fields: BTreeMap<String, usize>,
    pub duplicates: Vec<Duplicate>,
    pub files: BTreeMap<String, FileStats>,
}

/// Walk every record once, collecting counters, per-file issues and
/// cross-file duplicates.
pub fn analyze(files: &BTreeMap<String, Vec<KnowledgeRecord>>) -> Analysis {
    let mut analysis = Analysis {
        total_files: files.len(),
        ..Analysis::default()
    };
    let mut question_chars = 0usize;
    let mut answer_chars = 0usize;

    for (file, records) in files {
        let mut stats = FileStats {
            entry_count: records.len(),
            ..FileStats::default()
        };

        for (idx, record) in records.iter().enumerate() {
            let line = idx + FIRST_DATA_LINE;
            analysis.total_entries += 1;

            let question = record.question.trim();
            if question.is_empty() {
                *analysis.empty_fields.entry("question".to_string()).or_insert(0) += 1;
                stats.issues.push(format!("Row {}: Empty question", line));
            } else {
                question_chars += question.chars().count();
            }

            let answer = record.answer.trim();
            if answer.is_empty() {
                *analysis.empty_fields.entry("answer".to_string()).or_insert(0) += 1;
                stats.issues.push(format!("Row {}: Empty answer", line));
            } else {
                answer_chars += answer.chars().count();
            }

            let category = record.category.trim();
            if category.is_empty() {
                *analysis.empty_fields.entry("category".to_string()).or_insert(0) += 1;
            } else {
                *analysis.categories.entry(category.to_string()).or_insert(0) += 1;
                *stats.categories.entry(category.to_string()).or_insert(0) += 1;
            }

            let priority = record.priority.trim().to_lowercase();
            if priority.is_empty() {
                *analysis.empty_fields.entry("priority".to_string()).or_insert(0) += 1;
            } else if VALID_PRIORITIES.contains(&priority.as_str()) {
                *analysis.priorities.entry(priority.clone()).or_insert(0) += 1;
                *stats.priorities.entry(priority).or_insert(0) += 1;
            } else {
                stats.issues.push(format!("Row {}: Invalid priority '{}'", line, priority));
            }

            let tag_list = record.tag_list();
            if tag_list.is_empty() {
                *analysis.empty_fields.entry("tags".to_string()).or_insert(0) += 1;
            } else {
                for tag in &tag_list {
                    *analysis.tags.entry(tag.to_string()).or_insert(0) += 1;
                    *stats.tags.entry(tag.to_string()).or_insert(0) += 1;
                }
                if tag_list.len() > 10 {
                    stats.issues.push(format!("Row {}: Too many tags ({})", line, tag_list.len()));
                }
            }

            let question_raw = record.question.chars().count();
            if question_raw > 500 {
                stats.issues.push(format!("Row {}: Question too long ({} chars)", line, question_raw));
            }
            let answer_raw = record.answer.chars().count();
            if answer_raw > 5000 {
                stats.issues.push(format!("Row {}: Answer too long ({} chars)", line, answer_raw));
            }
        }

        analysis.files.insert(file.clone(), stats);
    }

    if analysis.total_entries > 0 {
        analysis.avg_question_length = question_chars as f64 / analysis.total_entries as f64;
        analysis.avg_answer_length = answer_chars as f64 / analysis.total_entries as f64;
    }
    analysis.duplicates = find_duplicates(files);

    analysis
}

/// Render an analysis as the JSON statistics report.
pub fn stats_report(analysis: &Analysis) -> serde_json::Value {
    let mut files = serde_json::Map::new();
    for (name, stats) in &analysis.files {
        files.insert(
            name.clone(),
            json!({
                "entry_count": stats.entry_count,
                "categories": stats.categories,
                "priorities": stats.priorities,
                "top_tags": top_counts(&stats.tags, 10),
                "issues_count": stats.issues.len(),
                "issues": stats.issues.iter().take(10).collect::<Vec<_>>(),
            }),
        );
    }

    let mut report = json!({
        "generated_at": chrono::Utc::now().to_rfc3339(),
        "summary": {
            "total_files": analysis.total_files,
            "total_entries": analysis.total_entries,
            "duplicate_questions": analysis.duplicates.len(),
            "avg_question_length": round2(analysis.avg_question_length),
            "avg_answer_length": round2(analysis.avg_answer_length),
        },
        "categories": analysis.categories,
        "priorities": analysis.priorities,
        "top_tags": top_counts(&analysis.tags, 20),
        "empty_fields": analysis.empty_fields,
        "files": files,
    });

    if !analysis.duplicates.is_empty() {
        let examples: serde_json::Map<String, serde_json::Value> = analysis
            .duplicates
            .iter()
            .take(10)
            .map(|dup| (dup.question.clone(), json!(dup.locations)))
            .collect();
        report["duplicates"] = json!({
            "count": analysis.duplicates.len(),
            "examples": examples,
        });
    }

    report
}

/// The `n` highest counts, ties broken alphabetically.
fn top_counts(counts: &BTreeMap<String, usize>, n: usize) -> serde_json::Map<String, serde_json::Value> {
    let mut entries: Vec<(&String, &usize)> = counts.iter().collect();
    entries.sort_by(|a, b| b.1.cmp(a.1));
    entries
        .into_iter()
        .take(n)
        .map(|(name, count)| (name.clone(), json!(count)))
        .collect()
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// What an automatic fix pass changed.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct FixOutcome {
    pub messages: Vec<String>,
    pub modified: bool,
}

/// Apply the safe automatic fixes: default category and priority,
/// normalized tag lists. Anything else stays for a human.
pub fn apply_fixes(records: &mut [KnowledgeRecord]) -> FixOutcome {
    let mut outcome = FixOutcome::default();

    for (idx, record) in records.iter_mut().enumerate() {
        let line = idx + FIRST_DATA_LINE;

        if record.category.trim().is_empty() {
            record.category = "general".to_string();
            outcome.messages.push(format!("Row {}: Added default category", line));
        }

        if record.priority.trim().is_empty() {
            record.priority = "medium".to_string();
            outcome.messages.push(format!("Row {}: Added default priority", line));
        }

        let priority = record.priority.trim().to_lowercase();
        if !VALID_PRIORITIES.contains(&priority.as_str()) {
            outcome.messages.push(format!(
                "Row {}: Invalid priority '{}' -> 'medium'",
                line, priority
            ));
            record.priority = "medium".to_string();
        }

        if !record.tags.trim().is_empty() {
            let cleaned = record.tag_list().join(",");
            if cleaned != record.tags {
                record.tags = cleaned;
                outcome.messages.push(format!("Row {}: Cleaned up tags", line));
            }
        }
    }

    outcome.modified = !outcome.messages.is_empty();
    outcome
}

/// Concatenate record sets, optionally dropping rows whose question was
/// already seen (case-insensitive). Returns the merged records and how
/// many rows were skipped.
pub fn merge_records(
    sources: Vec<Vec<KnowledgeRecord>>,
    keep_duplicates: bool,
) -> (Vec<KnowledgeRecord>, usize) {
    let mut merged = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    let mut skipped = 0;

    for records in sources {
        for record in records {
            let question = record.question.trim().to_lowercase();
            if !question.is_empty() {
                if !keep_duplicates && seen.contains(&question) {
                    skipped += 1;
                    continue;
                }
                seen.insert(question);
            }
            merged.push(record);
        }
    }

    (merged, skipped)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(question: &str) -> KnowledgeRecord {
        KnowledgeRecord {
            question: question.to_string(),
            answer: "A sufficiently detailed answer text.".to_string(),
            category: "datadog-mulesoft".to_string(),
            tags: "datadog,mulesoft".to_string(),
            priority: "medium".to_string(),
        }
    }

    fn kb(files: &[(&str, Vec<KnowledgeRecord>)]) -> BTreeMap<String, Vec<KnowledgeRecord>> {
        files
            .iter()
            .map(|(name, records)| (name.to_string(), records.clone()))
            .collect()
    }

    #[test]
    fn structure_missing_fields_is_an_error() {
        let headers = vec!["question".to_string(), "answer".to_string()];
        let findings = check_structure("kb.csv", &headers);

        assert_eq!(findings.len(), 1);
        assert!(findings[0].is_error());
        assert!(findings[0].message.contains("Missing required fields in kb.csv"));
        assert!(findings[0].message.contains("category"));
    }

    #[test]
    fn structure_extra_fields_only_warn() {
        let mut headers: Vec<String> = REQUIRED_FIELDS.iter().map(|f| f.to_string()).collect();
        headers.push("notes".to_string());

        let findings = check_structure("kb.csv", &headers);

        assert_eq!(findings.len(), 1);
        assert!(!findings[0].is_error());
        assert!(findings[0].message.contains("Extra fields in kb.csv: notes"));
    }

    #[test]
    fn structure_accepts_exact_headers() {
        let headers: Vec<String> = REQUIRED_FIELDS.iter().map(|f| f.to_string()).collect();
        assert!(check_structure("kb.csv", &headers).is_empty());
    }

    #[test]
    fn clean_record_has_no_findings() {
        let findings = check_record("kb.csv:2", &record("How do I enable the agent?"));
        assert!(findings.is_empty());
    }

    #[test]
    fn empty_question_is_an_error_and_a_short_warning() {
        let mut bad = record("");
        bad.question = "  ".to_string();

        let findings = check_record("kb.csv:3", &bad);

        assert!(findings.iter().any(|f| f.is_error() && f.message == "kb.csv:3 - Empty question"));
        assert!(findings
            .iter()
            .any(|f| f.message.contains("Question is very short (0 chars)")));
    }

    #[test]
    fn invalid_priority_is_an_error() {
        let mut bad = record("How do I enable the agent?");
        bad.priority = "Urgent".to_string();

        let findings = check_record("kb.csv:2", &bad);

        assert_eq!(findings.len(), 1);
        assert!(findings[0].is_error());
        assert_eq!(findings[0].message, "kb.csv:2 - Invalid priority: urgent");
    }

    #[test]
    fn empty_tag_items_are_an_error() {
        let mut bad = record("How do I enable the agent?");
        bad.tags = "datadog,,mulesoft".to_string();

        let findings = check_record("kb.csv:2", &bad);

        assert!(findings.iter().any(|f| f.is_error() && f.message.ends_with("Empty tags found")));
    }

    #[test]
    fn too_many_tags_warn() {
        let mut noisy = record("How do I enable the agent?");
        noisy.tags = (0..11).map(|i| format!("t{}", i)).collect::<Vec<_>>().join(",");

        let findings = check_record("kb.csv:2", &noisy);

        assert_eq!(findings.len(), 1);
        assert!(!findings[0].is_error());
        assert!(findings[0].message.contains("Too many tags (11)"));
    }

    #[test]
    fn category_with_special_characters_warns() {
        let mut odd = record("How do I enable the agent?");
        odd.category = "datadog & mulesoft".to_string();

        let findings = check_record("kb.csv:2", &odd);

        assert_eq!(findings.len(), 1);
        assert!(!findings[0].is_error());
        assert!(findings[0].message.contains("Category contains special characters"));
    }

    #[test]
    fn duplicates_found_across_files_in_encounter_order() {
        let files = kb(&[
            ("a.csv", vec![record("What is APM?"), record("Unique one")]),
            ("b.csv", vec![record("  what is apm?  ")]),
        ]);

        let duplicates = find_duplicates(&files);

        assert_eq!(duplicates.len(), 1);
        assert_eq!(duplicates[0].question, "what is apm?");
        assert_eq!(duplicates[0].locations, vec!["a.csv:2", "b.csv:2"]);
    }

    #[test]
    fn no_duplicates_means_empty_report() {
        let files = kb(&[("a.csv", vec![record("One"), record("Two")])]);
        assert!(find_duplicates(&files).is_empty());
    }

    #[test]
    fn remove_duplicates_keeps_first_occurrence() {
        let mut files = kb(&[
            (
                "a.csv",
                vec![record("Q1"), record("Q2"), record("q1"), record("q2")],
            ),
            ("b.csv", vec![record("Q1"), record("Fresh")]),
        ]);

        let removed = remove_duplicates(&mut files);

        assert_eq!(removed.get("a.csv"), Some(&2));
        assert_eq!(removed.get("b.csv"), Some(&1));
        assert_eq!(
            files["a.csv"].iter().map(|r| r.question.as_str()).collect::<Vec<_>>(),
            vec!["Q1", "Q2"]
        );
        assert_eq!(
            files["b.csv"].iter().map(|r| r.question.as_str()).collect::<Vec<_>>(),
            vec!["Fresh"]
        );
    }

    #[test]
    fn remove_duplicates_leaves_unquestioned_rows_alone() {
        let mut files = kb(&[("a.csv", vec![record(""), record(""), record("Real")])]);

        let removed = remove_duplicates(&mut files);

        assert!(removed.is_empty());
        assert_eq!(files["a.csv"].len(), 3);
    }

    #[test]
    fn search_specific_field_and_all() {
        let mut tagged = record("Billing question");
        tagged.tags = "datadog,billing".to_string();
        let files = kb(&[("a.csv", vec![record("How do I enable APM?"), tagged])]);

        let by_question = search(&files, "apm", "question");
        assert_eq!(by_question.len(), 1);
        assert_eq!(by_question[0].source, "a.csv:2");

        let by_tags = search(&files, "BILLING", "tags");
        assert_eq!(by_tags.len(), 1);
        assert_eq!(by_tags[0].source, "a.csv:3");

        // "all" also matches the priority column.
        let by_all = search(&files, "medium", "all");
        assert_eq!(by_all.len(), 2);
    }

    #[test]
    fn search_misses_return_empty() {
        let files = kb(&[("a.csv", vec![record("How do I enable APM?")])]);
        assert!(search(&files, "nonexistent", "all").is_empty());
    }

    #[test]
    fn analyze_counts_and_averages() {
        let mut empty_answer = record("Q2 text wow");
        empty_answer.answer = " ".to_string();
        empty_answer.priority = "critical".to_string();
        let files = kb(&[(
            "a.csv",
            vec![record("Q1 text long"), empty_answer],
        )]);

        let analysis = analyze(&files);

        assert_eq!(analysis.total_files, 1);
        assert_eq!(analysis.total_entries, 2);
        assert_eq!(analysis.empty_fields.get("answer"), Some(&1));
        assert_eq!(analysis.priorities.get("medium"), Some(&1));
        assert_eq!(analysis.categories.get("datadog-mulesoft"), Some(&2));
        assert_eq!(analysis.tags.get("datadog"), Some(&2));
        // 12 + 11 question chars over 2 entries; answers 36 + 0 over 2.
        assert!((analysis.avg_question_length - 11.5).abs() < 1e-9);
        assert!((analysis.avg_answer_length - 18.0).abs() < 1e-9);

        let file_stats = &analysis.files["a.csv"];
        assert_eq!(file_stats.entry_count, 2);
        assert!(file_stats.issues.iter().any(|i| i == "Row 3: Empty answer"));
        assert!(file_stats
            .issues
            .iter()
            .any(|i| i == "Row 3: Invalid priority 'critical'"));
    }

    #[test]
    fn stats_report_shape() {
        let files = kb(&[(
            "a.csv",
            vec![record("What is APM?"), record("what is apm?")],
        )]);
        let report = stats_report(&analyze(&files));

        assert_eq!(report["summary"]["total_files"], 1);
        assert_eq!(report["summary"]["total_entries"], 2);
        assert_eq!(report["summary"]["duplicate_questions"], 1);
        assert_eq!(report["duplicates"]["count"], 1);
        assert_eq!(
            report["duplicates"]["examples"]["what is apm?"],
            json!(["a.csv:2", "a.csv:3"])
        );
        assert_eq!(report["files"]["a.csv"]["entry_count"], 2);
        assert!(report["generated_at"].is_string());
    }

    #[test]
    fn stats_report_omits_duplicates_section_when_clean() {
        let files = kb(&[("a.csv", vec![record("One"), record("Two")])]);
        let report = stats_report(&analyze(&files));
        assert!(report.get("duplicates").is_none());
    }

    #[test]
    fn top_counts_selects_highest_with_stable_ties() {
        let counts: BTreeMap<String, usize> =
            [("zeta", 3), ("alpha", 3), ("beta", 7)]
                .into_iter()
                .map(|(name, count)| (name.to_string(), count))
                .collect();

        // Two slots: beta wins outright, the alpha/zeta tie breaks
        // alphabetically.
        let top = top_counts(&counts, 2);
        assert_eq!(top.len(), 2);
        assert!(top.contains_key("beta"));
        assert!(top.contains_key("alpha"));
        assert!(!top.contains_key("zeta"));
    }

    #[test]
    fn fixes_fill_defaults_and_normalize_tags() {
        let mut records = vec![record("Fine entry here"), record("Broken entry here")];
        records[1].category = " ".to_string();
        records[1].priority = "CRITICAL".to_string();
        records[1].tags = " datadog , mulesoft ,".to_string();

        let outcome = apply_fixes(&mut records);

        assert!(outcome.modified);
        assert_eq!(
            outcome.messages,
            vec![
                "Row 3: Added default category",
                "Row 3: Invalid priority 'critical' -> 'medium'",
                "Row 3: Cleaned up tags",
            ]
        );
        assert_eq!(records[1].category, "general");
        assert_eq!(records[1].priority, "medium");
        assert_eq!(records[1].tags, "datadog,mulesoft");
    }

    #[test]
    fn fixes_default_empty_priority_without_flagging_it_invalid() {
        let mut records = vec![record("Entry with no priority")];
        records[0].priority = "".to_string();

        let outcome = apply_fixes(&mut records);

        assert_eq!(outcome.messages, vec!["Row 2: Added default priority"]);
        assert_eq!(records[0].priority, "medium");
    }

    #[test]
    fn fixes_are_idempotent() {
        let mut records = vec![record("Broken entry here")];
        records[0].priority = "urgent!".to_string();

        assert!(apply_fixes(&mut records).modified);
        let second = apply_fixes(&mut records);
        assert!(!second.modified);
        assert!(second.messages.is_empty());
    }

    #[test]
    fn merge_drops_repeated_questions() {
        let (merged, skipped) = merge_records(
            vec![
                vec![record("Q1"), record("Q2")],
                vec![record("q1"), record("Q3")],
            ],
            false,
        );

        assert_eq!(skipped, 1);
        assert_eq!(
            merged.iter().map(|r| r.question.as_str()).collect::<Vec<_>>(),
            vec!["Q1", "Q2", "Q3"]
        );
    }

    #[test]
    fn merge_can_keep_duplicates() {
        let (merged, skipped) = merge_records(
            vec![vec![record("Q1")], vec![record("q1")]],
            true,
        );

        assert_eq!(skipped, 0);
        assert_eq!(merged.len(), 2);
    }
}
