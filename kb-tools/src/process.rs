//! Turns the raw support export into structured Q&A records.
//!
//! Each `content` cell is a free-text blob with labelled sections
//! (`Title:`, `Description:`, `Problem:`, `Resolution:`). The sections
//! drive the generated question, answer, tags and priority.

use std::sync::OnceLock;

use regex::Regex;

use crate::record::KnowledgeRecord;

const CATEGORY: &str = "datadog-mulesoft";

/// Tag keywords, checked in order against the combined section text.
/// The first five distinct hits survive the cap in [`derive_tags`].
const TAG_KEYWORDS: [(&str, &[&str]); 12] = [
    (
        "activation",
        &["activation", "activate", "enable", "setup", "configure"],
    ),
    (
        "configuration",
        &["config", "configure", "setup", "settings", "parameter"],
    ),
    (
        "integration",
        &["integration", "integrate", "connect", "connection"],
    ),
    ("mulesoft", &["mulesoft", "mule", "anypoint", "rtf", "cloudhub"]),
    ("datadog", &["datadog", "dd", "monitoring", "metrics", "traces"]),
    (
        "troubleshooting",
        &["error", "issue", "problem", "troubleshoot", "debug"],
    ),
    (
        "authentication",
        &["auth", "login", "credential", "token", "api key"],
    ),
    (
        "deployment",
        &["deploy", "deployment", "runtime", "environment"],
    ),
    (
        "performance",
        &["performance", "memory", "cpu", "optimization", "jvm"],
    ),
    (
        "network",
        &["network", "connectivity", "port", "firewall", "proxy"],
    ),
    ("version", &["version", "update", "upgrade", "compatibility"]),
    ("logs", &["log", "logging", "trace", "debug", "monitor"]),
];

const HIGH_PRIORITY_KEYWORDS: [&str; 11] = [
    "error",
    "fail",
    "crash",
    "critical",
    "urgent",
    "down",
    "outage",
    "security",
    "authentication",
    "authorization",
    "data loss",
];

const LOW_PRIORITY_KEYWORDS: [&str; 8] = [
    "documentation",
    "reference",
    "example",
    "guide",
    "tutorial",
    "feature request",
    "enhancement",
    "nice to have",
];

/// Labelled sections pulled out of one content blob. Missing sections
/// are empty strings.
#[derive(Debug, Default, PartialEq)]
pub struct Sections {
    pub title: String,
    pub description: String,
    pub problem: String,
    pub resolution: String,
}

struct SectionPatterns {
    title: Regex,
    description: Regex,
    problem: Regex,
    resolution: Regex,
}

fn section_patterns() -> &'static SectionPatterns {
    static PATTERNS: OnceLock<SectionPatterns> = OnceLock::new();
    PATTERNS.get_or_init(|| SectionPatterns {
        // Title and description stop at the end of the line; problem and
        // resolution may span lines and run until the next label.
        title: Regex::new(r"(?i)Title:\s*([^\n\r]+)").unwrap(),
        description: Regex::new(r"(?i)Description:\s*([^\n\r]*?)(?:Problem:|\s*$)").unwrap(),
        problem: Regex::new(r"(?is)Problem:\s*(.*?)(?:Resolution:|\s*$)").unwrap(),
        resolution: Regex::new(r"(?is)Resolution:\s*(.*)").unwrap(),
    })
}

/// Extract the labelled sections from a content blob.
pub fn extract_sections(content: &str) -> Sections {
    let patterns = section_patterns();
    let capture = |pattern: &Regex| {
        pattern
            .captures(content)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim().to_string())
            .unwrap_or_default()
    };

    Sections {
        title: capture(&patterns.title),
        description: capture(&patterns.description),
        problem: capture(&patterns.problem),
        resolution: capture(&patterns.resolution),
    }
}

/// Derive up to five tags from the section text. `datadog` and
/// `mulesoft` are appended before the cap so they can still be pushed
/// out by five earlier keyword hits.
pub fn derive_tags(sections: &Sections) -> Vec<String> {
    let text = format!(
        "{} {} {} {}",
        sections.title, sections.description, sections.problem, sections.resolution
    )
    .to_lowercase();

    let mut tags: Vec<String> = Vec::new();
    for (tag, keywords) in TAG_KEYWORDS {
        if keywords.iter().any(|keyword| text.contains(keyword)) {
            tags.push(tag.to_string());
        }
    }

    for base in ["datadog", "mulesoft"] {
        if !tags.iter().any(|tag| tag == base) {
            tags.push(base.to_string());
        }
    }

    tags.truncate(5);
    tags
}

/// High if any incident keyword appears, low if only reference keywords
/// do, medium otherwise. The description is deliberately excluded; it
/// tends to restate the product name rather than the severity.
pub fn derive_priority(sections: &Sections) -> &'static str {
    let text = format!(
        "{} {} {}",
        sections.title, sections.problem, sections.resolution
    )
    .to_lowercase();

    if HIGH_PRIORITY_KEYWORDS.iter().any(|kw| text.contains(kw)) {
        "high"
    } else if LOW_PRIORITY_KEYWORDS.iter().any(|kw| text.contains(kw)) {
        "low"
    } else {
        "medium"
    }
}

/// Question text: title and problem joined with a dash, skipping the
/// problem when it just repeats the title.
pub fn compose_question(sections: &Sections) -> String {
    let mut parts: Vec<&str> = Vec::new();
    if !sections.title.is_empty() {
        parts.push(&sections.title);
    }
    if !sections.problem.is_empty() && sections.problem != sections.title {
        parts.push(&sections.problem);
    }

    if parts.is_empty() {
        "Datadog MuleSoft Integration Question".to_string()
    } else {
        parts.join(" - ")
    }
}

/// Answer text: the non-empty sections as labelled paragraphs.
pub fn compose_answer(sections: &Sections) -> String {
    let mut parts: Vec<String> = Vec::new();
    if !sections.description.is_empty() {
        parts.push(format!("Overview: {}", sections.description));
    }
    if !sections.problem.is_empty() {
        parts.push(format!("Problem: {}", sections.problem));
    }
    if !sections.resolution.is_empty() {
        parts.push(format!("Resolution: {}", sections.resolution));
    }

    if parts.is_empty() {
        "Please refer to the documentation for more information.".to_string()
    } else {
        parts.join("\n\n")
    }
}

/// Convert one raw content blob into a knowledge record.
pub fn process_content(content: &str) -> KnowledgeRecord {
    let sections = extract_sections(content);

    KnowledgeRecord {
        question: compose_question(&sections),
        answer: compose_answer(&sections),
        category: CATEGORY.to_string(),
        tags: derive_tags(&sections).join(","),
        priority: derive_priority(&sections).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sections(title: &str, description: &str, problem: &str, resolution: &str) -> Sections {
        Sections {
            title: title.to_string(),
            description: description.to_string(),
            problem: problem.to_string(),
            resolution: resolution.to_string(),
        }
    }

    #[test]
    fn extracts_all_four_sections_from_one_line() {
        let content =
            "Title: Agent offline Description: Status page Problem: No data Resolution: Restart";

        let sections = extract_sections(content);

        assert_eq!(sections.title, "Agent offline Description: Status page Problem: No data Resolution: Restart");
        assert_eq!(sections.description, "Status page");
        assert_eq!(sections.problem, "No data");
        assert_eq!(sections.resolution, "Restart");
    }

    #[test]
    fn extracts_sections_across_lines() {
        let content = "Title: Metrics missing\nDescription: Dashboard gap\nProblem: Host metrics stop\nafter some hours.\nResolution: Raise the JVM heap\nand restart the agent.";

        let sections = extract_sections(content);

        assert_eq!(sections.title, "Metrics missing");
        // The description is line-bounded: it only matches when the
        // Problem label follows on the same line or the content ends.
        assert_eq!(sections.description, "");
        assert_eq!(sections.problem, "Host metrics stop\nafter some hours.");
        assert_eq!(sections.resolution, "Raise the JVM heap\nand restart the agent.");
    }

    #[test]
    fn description_at_end_of_content_is_captured() {
        let sections = extract_sections("Title: Note\nDescription: Just context\n");
        assert_eq!(sections.description, "Just context");
    }

    #[test]
    fn missing_sections_come_back_empty() {
        let sections = extract_sections("Problem: only a problem here");

        assert_eq!(sections.title, "");
        assert_eq!(sections.description, "");
        assert_eq!(sections.problem, "only a problem here");
        assert_eq!(sections.resolution, "");
    }

    #[test]
    fn labels_match_case_insensitively() {
        let sections = extract_sections("TITLE: Upper\nPROBLEM: Shouting");

        assert_eq!(sections.title, "Upper");
        assert_eq!(sections.problem, "Shouting");
    }

    #[test]
    fn tags_include_keyword_hits_and_product_defaults() {
        let sections = sections("Connection error", "", "Cannot connect to Anypoint", "");

        let tags = derive_tags(&sections);

        // integration (connect), mulesoft (anypoint), troubleshooting
        // (error), then datadog appended as a product default.
        assert_eq!(tags, vec!["integration", "mulesoft", "troubleshooting", "datadog"]);
    }

    #[test]
    fn tag_cap_can_push_out_product_defaults() {
        let sections = sections(
            "Activation config integration error on login",
            "",
            "port blocked",
            "",
        );

        let tags = derive_tags(&sections);

        assert_eq!(tags.len(), 5);
        // Five keyword tags hit first, so neither product default fits.
        assert_eq!(
            tags,
            vec![
                "activation",
                "configuration",
                "integration",
                "troubleshooting",
                "authentication"
            ]
        );
    }

    #[test]
    fn priority_high_beats_low() {
        let sections = sections("Critical outage", "", "", "See the tutorial");
        assert_eq!(derive_priority(&sections), "high");
    }

    #[test]
    fn priority_low_for_reference_material() {
        let sections = sections("Setup guide", "", "", "");
        assert_eq!(derive_priority(&sections), "low");
    }

    #[test]
    fn priority_defaults_to_medium() {
        let sections = sections("Dashboard layout", "", "", "");
        assert_eq!(derive_priority(&sections), "medium");
    }

    #[test]
    fn question_joins_title_and_problem() {
        let s = sections("Agent offline", "", "No metrics arrive", "");
        assert_eq!(compose_question(&s), "Agent offline - No metrics arrive");
    }

    #[test]
    fn question_skips_problem_equal_to_title() {
        let s = sections("Agent offline", "", "Agent offline", "");
        assert_eq!(compose_question(&s), "Agent offline");
    }

    #[test]
    fn question_falls_back_when_nothing_extracted() {
        assert_eq!(
            compose_question(&Sections::default()),
            "Datadog MuleSoft Integration Question"
        );
    }

    #[test]
    fn answer_labels_non_empty_sections() {
        let s = sections("t", "What it is", "It broke", "Fix it");
        assert_eq!(
            compose_answer(&s),
            "Overview: What it is\n\nProblem: It broke\n\nResolution: Fix it"
        );
    }

    #[test]
    fn answer_falls_back_when_nothing_extracted() {
        assert_eq!(
            compose_answer(&Sections::default()),
            "Please refer to the documentation for more information."
        );
    }

    #[test]
    fn process_content_builds_a_full_record() {
        let record = process_content(
            "Title: Agent activation fails\nDescription: Setup flow\nProblem: Token rejected\nResolution: Rotate the API key",
        );

        assert_eq!(record.question, "Agent activation fails - Token rejected");
        assert_eq!(
            record.answer,
            "Problem: Token rejected\n\nResolution: Rotate the API key"
        );
        assert_eq!(record.category, "datadog-mulesoft");
        assert_eq!(record.priority, "high");
        assert!(record.tags.split(',').any(|tag| tag == "activation"));
    }
}
