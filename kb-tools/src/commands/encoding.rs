//! The `fix-encoding` command: report or repair problematic Unicode
//! characters that break downstream ingestion.

use std::path::PathBuf;

use anyhow::Result;

use crate::encoding;

pub fn run(files: &[PathBuf], fix: bool, no_backup: bool) -> Result<()> {
    let mut analyzed = 0usize;
    let mut with_issues = 0usize;
    let mut rows_to_fix = 0usize;
    let mut processed = 0usize;

    for path in files {
        if !path.is_file() {
            println!("File not found: {}", path.display());
            continue;
        }

        let analysis = match encoding::analyze_file(path) {
            Ok(analysis) => analysis,
            Err(err) => {
                println!("Failed to analyze {}: {}", path.display(), err);
                continue;
            }
        };
        analyzed += 1;

        if analysis.rows_with_issues == 0 {
            println!("No encoding issues in {}", path.display());
            continue;
        }
        with_issues += 1;
        rows_to_fix += analysis.rows_with_issues;

        println!("Found issues in {}:", path.display());
        println!(
            "  Rows with issues: {}/{}",
            analysis.rows_with_issues, analysis.total_rows
        );
        let fields: Vec<&str> = analysis.issues_by_field.keys().map(String::as_str).collect();
        println!("  Fields affected: {}", fields.join(", "));
        for issue in analysis.sample_issues.iter().take(3) {
            let changes: Vec<String> = issue.changes.iter().map(|c| c.to_string()).collect();
            println!("  Row {} ({}): {}", issue.row, issue.field, changes.join("; "));
        }

        if fix {
            encoding::fix_file(path, !no_backup)?;
            processed += 1;

            let check = encoding::analyze_file(path)?;
            if check.rows_with_issues == 0 {
                println!("  All issues fixed in {}", path.display());
            } else {
                println!(
                    "  {} rows still have issues in {}",
                    check.rows_with_issues,
                    path.display()
                );
            }
        }
    }

    println!();
    println!("Summary:");
    println!("  Files analyzed: {}", analyzed);
    println!("  Files with issues: {}", with_issues);
    println!("  Rows needing fixes: {}", rows_to_fix);
    if fix {
        println!("  Files rewritten: {}", processed);
    } else if with_issues > 0 {
        println!("Run again with --fix to apply the replacements");
    }
    Ok(())
}
