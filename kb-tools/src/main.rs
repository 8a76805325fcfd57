//! Knowledge base maintenance CLI for NovaBot.
//!
//! Turns raw content exports into structured Q&A CSV files and keeps
//! those files healthy: validation, duplicate removal, search, stats,
//! merging, and encoding repair.

mod commands;
mod encoding;
mod process;
mod quality;
mod record;
mod webdocs;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

const DEFAULT_DIR: &str = "data/knowledge_base";

#[derive(Parser)]
#[command(name = "kb-tools")]
#[command(about = "kb-tools - Build and maintain the NovaBot knowledge base CSV files")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Convert a raw support export into structured Q&A records
    Process {
        /// Input CSV with a `content` column
        input: PathBuf,

        /// Output knowledge base CSV
        output: PathBuf,
    },

    /// Convert scraped web documentation into structured Q&A records
    ProcessWebDocs {
        /// Input CSV with a `content` column (Latin-1 encoded)
        input: PathBuf,

        /// Output knowledge base CSV
        output: PathBuf,
    },

    /// Check structure and content quality of the knowledge base
    Validate {
        /// Knowledge base directory
        #[arg(long, short, default_value = DEFAULT_DIR)]
        dir: PathBuf,

        /// Apply default values and tag cleanup, rewriting the files
        #[arg(long)]
        fix: bool,
    },

    /// List duplicate questions across the knowledge base
    Duplicates {
        /// Knowledge base directory
        #[arg(long, short, default_value = DEFAULT_DIR)]
        dir: PathBuf,
    },

    /// Remove duplicate questions, keeping the first occurrence
    RemoveDuplicates {
        /// Knowledge base directory
        #[arg(long, short, default_value = DEFAULT_DIR)]
        dir: PathBuf,

        /// Show what would be removed without touching the files
        #[arg(long)]
        dry_run: bool,
    },

    /// Search the knowledge base
    Search {
        /// Text to look for (case-insensitive)
        query: String,

        /// Knowledge base directory
        #[arg(long, short, default_value = DEFAULT_DIR)]
        dir: PathBuf,

        /// Field to search in
        #[arg(long, default_value = "all", value_parser = quality::SEARCH_FIELDS)]
        field: String,

        /// Maximum number of results to show
        #[arg(long, default_value = "10")]
        limit: usize,
    },

    /// Export aggregate statistics as JSON
    Stats {
        /// Knowledge base directory
        #[arg(long, short, default_value = DEFAULT_DIR)]
        dir: PathBuf,

        /// Write the report to this file instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Merge several knowledge base files into one
    Merge {
        /// Source files to merge, in order
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Merged output file
        #[arg(long, short)]
        output: PathBuf,

        /// Keep duplicate questions instead of dropping them
        #[arg(long)]
        keep_duplicates: bool,
    },

    /// Report or repair problematic Unicode characters in CSV files
    FixEncoding {
        /// Files to process (defaults to the generated knowledge base files)
        #[arg(long, short, num_args = 1..)]
        files: Vec<PathBuf>,

        /// Rewrite the files instead of only reporting
        #[arg(long)]
        fix: bool,

        /// Skip the .backup copy before rewriting
        #[arg(long)]
        no_backup: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Process { input, output } => commands::process::run(&input, &output),
        Commands::ProcessWebDocs { input, output } => commands::webdocs::run(&input, &output),
        Commands::Validate { dir, fix } => commands::validate::run(&dir, fix),
        Commands::Duplicates { dir } => commands::manage::duplicates(&dir),
        Commands::RemoveDuplicates { dir, dry_run } => {
            commands::manage::remove_duplicates(&dir, dry_run)
        }
        Commands::Search {
            query,
            dir,
            field,
            limit,
        } => commands::manage::search(&dir, &query, &field, limit),
        Commands::Stats { dir, output } => commands::manage::stats(&dir, output.as_deref()),
        Commands::Merge {
            files,
            output,
            keep_duplicates,
        } => commands::manage::merge(&files, &output, keep_duplicates),
        Commands::FixEncoding {
            files,
            fix,
            no_backup,
        } => {
            let files = if files.is_empty() {
                default_encoding_targets()
            } else {
                files
            };
            commands::encoding::run(&files, fix, no_backup)
        }
    }
}

/// The two CSV files the `process` and `process-web-docs` commands
/// generate, which is where encoding problems usually surface.
fn default_encoding_targets() -> Vec<PathBuf> {
    let dir = PathBuf::from(DEFAULT_DIR);
    vec![
        dir.join("datadog_mulesoft_integration.csv"),
        dir.join("datadog_mulesoft_web_docs.csv"),
    ]
}
