//! Fluke Linter: checks story templates before they are played.
//!
//! Usage: fluke_lint <file-or-dir>

use fluke_engine::core::placeholder::{all_required_indices, missing_indices, unused_input_keys};
use fluke_engine::core::token::{segments, Segment};
use fluke_engine::schema::prompt::{format_indices, PromptIndex};
use fluke_engine::schema::template::{StoryRecord, FLUKE_EXTENSION};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        println!("Usage: fluke_lint <file-or-dir>");
        process::exit(0);
    }

    let target = Path::new(&args[1]);
    let mut files = Vec::new();
    if target.is_file() {
        files.push(target.to_path_buf());
    } else if target.is_dir() {
        collect_flukes(target, &mut files);
    } else {
        eprintln!("ERROR: Path '{}' does not exist", target.display());
        process::exit(1);
    }
    files.sort();

    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    for path in &files {
        match std::fs::read_to_string(path) {
            Ok(json) => match StoryRecord::from_json(&json) {
                Ok(record) => lint_record(path, &record, &mut errors, &mut warnings),
                Err(e) => errors.push(format!("{}: unreadable template: {}", path.display(), e)),
            },
            Err(e) => errors.push(format!("{}: {}", path.display(), e)),
        }
    }

    println!("Checked {} template(s)", files.len());
    println!("\n=== Fluke Lint Report ===\n");

    if errors.is_empty() && warnings.is_empty() {
        println!("All checks passed!");
    }

    for warning in &warnings {
        println!("WARNING: {}", warning);
    }

    for error in &errors {
        println!("ERROR: {}", error);
    }

    println!(
        "\nSummary: {} errors, {} warnings",
        errors.len(),
        warnings.len()
    );

    if errors.is_empty() {
        process::exit(0);
    } else {
        process::exit(1);
    }
}

fn collect_flukes(dir: &Path, files: &mut Vec<PathBuf>) {
    if let Ok(entries) = std::fs::read_dir(dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                collect_flukes(&path, files);
            } else if path.to_string_lossy().ends_with(FLUKE_EXTENSION) {
                files.push(path);
            }
        }
    }
}

fn lint_record(
    path: &Path,
    record: &StoryRecord,
    errors: &mut Vec<String>,
    warnings: &mut Vec<String>,
) {
    let name = path.display();
    let keys: BTreeSet<PromptIndex> = record.inputs.keys().copied().collect();

    let undefined = missing_indices(&keys, &all_required_indices(&record.title, &record.body));
    if !undefined.is_empty() {
        errors.push(format!(
            "{}: undefined placeholders used in the story: {}",
            name,
            format_indices(&undefined)
        ));
    }

    let unused = unused_input_keys(&keys, &record.title, &record.body);
    if !unused.is_empty() {
        warnings.push(format!(
            "{}: prompts never used: {}",
            name,
            format_indices(&unused)
        ));
    }

    let blank: BTreeSet<PromptIndex> = record
        .inputs
        .iter()
        .filter(|(_, prompt)| prompt.trim().is_empty())
        .map(|(index, _)| *index)
        .collect();
    if !blank.is_empty() {
        warnings.push(format!(
            "{}: blank prompt text for {}",
            name,
            format_indices(&blank)
        ));
    }

    if record.title.trim().is_empty() || record.body.trim().is_empty() {
        warnings.push(format!("{}: title or body is blank", name));
    }

    if file_name_mismatch(path, &record.filename) {
        warnings.push(format!(
            "{}: record names its file '{}'",
            name, record.filename
        ));
    }

    // Tokens too large for an index can never be answered.
    for text in [&record.title, &record.body] {
        for segment in segments(text) {
            if let Segment::Placeholder { raw, index: None, .. } = segment {
                warnings.push(format!("{}: placeholder {} is out of range", name, raw));
            }
        }
    }
}

fn file_name_mismatch(path: &Path, recorded: &str) -> bool {
    path.file_name()
        .map(|actual| actual.to_string_lossy() != recorded)
        .unwrap_or(false)
}
