//! Turns scraped web documentation into Q&A records.
//!
//! Unlike the support export there are no labelled sections; the first
//! line serves as the title and the question is generated from a
//! template chosen by the detected content type.

use crate::record::KnowledgeRecord;

const CATEGORY: &str = "datadog-mulesoft-docs";

const BASE_TAGS: [&str; 3] = ["datadog", "mulesoft", "documentation"];

/// Classify a documentation page. Checks run in order against the
/// uppercased content, so a page mentioning both an overview and a
/// dashboard counts as an overview.
pub fn detect_content_type(content: &str) -> &'static str {
    let upper = content.to_uppercase();

    if upper.contains("OVERVIEW") {
        "overview"
    } else if upper.contains("CONFIGURATION") {
        "configuration"
    } else if upper.contains("INSTALLATION") {
        "installation"
    } else if upper.contains("CONNECTOR") {
        "connector"
    } else if upper.contains("INTEGRATION") {
        "integration"
    } else if upper.contains("MONITOR") {
        "monitoring"
    } else if upper.contains("DASHBOARD") {
        "dashboard"
    } else if upper.contains("TROUBLESHOOT") {
        "troubleshooting"
    } else if upper.contains("SYSTEM ARCHITECTURE") {
        "architecture"
    } else if upper.contains("OOTB") || upper.contains("OUT OF THE BOX") {
        "ootb-assets"
    } else if upper.contains("COST OPTIMIZATION") {
        "cost-optimization"
    } else {
        "documentation"
    }
}

/// Title (first non-empty line, cleaned up) and the product topic it
/// names.
pub fn extract_title_and_topic(content: &str) -> (String, String) {
    let first_line = content.lines().map(str::trim).find(|line| !line.is_empty());
    let first_line = match first_line {
        Some(line) => line,
        None => return ("Documentation".to_string(), "general".to_string()),
    };

    let title = collapse_whitespace(&strip_trademark_glyphs(first_line));

    let upper = title.to_uppercase();
    let topic = if upper.contains("DATADOG") {
        "datadog"
    } else if upper.contains("CLOUDWATCH") {
        "cloudwatch"
    } else if upper.contains("APM") {
        "apm"
    } else if upper.contains("MULE") {
        "mulesoft"
    } else {
        "integration"
    };

    (title, topic.to_string())
}

/// Question template for the detected content type.
pub fn compose_question(title: &str, content_type: &str) -> String {
    match content_type {
        "overview" => format!("What is {} and how does it work?", title),
        "configuration" => {
            if title.to_uppercase().contains("SERVICE") {
                format!("How do I configure the service for {}?", title)
            } else {
                format!("How do I configure {}?", title)
            }
        }
        "installation" => format!("How do I install {}?", title),
        "monitoring" => format!("How do I set up monitoring with {}?", title),
        "dashboard" => format!("What dashboards are available for {}?", title),
        "troubleshooting" => format!("How do I troubleshoot issues with {}?", title),
        "architecture" => format!("What is the system architecture for {}?", title),
        "ootb-assets" => format!("What out-of-the-box assets are available for {}?", title),
        "cost-optimization" => format!("How can I optimize costs for {}?", title),
        _ => format!("What do I need to know about {}?", title),
    }
}

/// The page text flattened into a single paragraph.
pub fn clean_answer(content: &str) -> String {
    collapse_whitespace(&strip_trademark_glyphs(content))
}

/// Up to six tags: the base set, the content type, the topic, then
/// technology keywords found in the page.
pub fn derive_tags(title: &str, content: &str, content_type: &str, topic: &str) -> Vec<String> {
    let mut tags: Vec<String> = BASE_TAGS.iter().map(|tag| tag.to_string()).collect();
    tags.push(content_type.to_string());
    if !tags.iter().any(|tag| tag == topic) {
        tags.push(topic.to_string());
    }

    let content_lower = content.to_lowercase();
    let title_lower = title.to_lowercase();
    let mentions = |keyword: &str| content_lower.contains(keyword) || title_lower.contains(keyword);

    let keyword_tags: [(&str, &str); 10] = [
        ("cloudwatch", "cloudwatch"),
        ("apm", "apm"),
        ("connector", "connector"),
        ("dashboard", "dashboard"),
        ("monitor", "monitoring"),
        ("installation", "installation"),
        ("configuration", "configuration"),
        ("troubleshoot", "troubleshooting"),
        ("architecture", "architecture"),
        ("cost", "cost-optimization"),
    ];
    for (keyword, tag) in keyword_tags {
        if mentions(keyword) {
            tags.push(tag.to_string());
        }
    }
    // OOTB assets are only ever flagged in the body, not the title.
    if content_lower.contains("ootb") || content_lower.contains("out of the box") {
        tags.push("ootb".to_string());
    }

    let mut seen = std::collections::HashSet::new();
    tags.retain(|tag| seen.insert(tag.clone()));
    tags.truncate(6);
    tags
}

/// Setup and troubleshooting pages rank high, operational reference
/// medium, optimization extras low.
pub fn derive_priority(content_type: &str, content: &str) -> &'static str {
    if matches!(content_type, "overview" | "installation" | "configuration") {
        return "high";
    }

    let content_lower = content.to_lowercase();
    let incident_words = ["error", "issue", "problem", "troubleshoot", "fail", "debug"];
    if content_type == "troubleshooting"
        || incident_words.iter().any(|word| content_lower.contains(word))
    {
        return "high";
    }

    if matches!(
        content_type,
        "monitoring" | "dashboard" | "architecture" | "connector" | "integration"
    ) {
        return "medium";
    }

    if matches!(content_type, "ootb-assets" | "cost-optimization") {
        return "low";
    }

    "medium"
}

/// Convert one scraped page into a knowledge record.
pub fn process_content(content: &str) -> KnowledgeRecord {
    let (title, topic) = extract_title_and_topic(content);
    let content_type = detect_content_type(content);

    KnowledgeRecord {
        question: compose_question(&title, content_type),
        answer: clean_answer(content),
        category: CATEGORY.to_string(),
        tags: derive_tags(&title, content, content_type, &topic).join(","),
        priority: derive_priority(content_type, content).to_string(),
    }
}

fn strip_trademark_glyphs(text: &str) -> String {
    text.chars()
        .filter(|c| !matches!(c, '\u{ae}' | '\u{2122}' | '\u{a9}'))
        .collect()
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
