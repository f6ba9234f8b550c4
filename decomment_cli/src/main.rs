//! `decomment` finds comment tokens in source files and deletes the
//! selected ones in place. `scan` reports, `fix` rewrites.

use std::collections::BTreeMap;
use std::io::{BufRead, Write};

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use decomment_core::{
    scan_pipeline, trash_pipeline, Comment, GitSource, LanguageRegistry, ScanMode, ScanOptions,
};

mod cli;

use cli::{Cli, Commands, FixArgs, ScanArgs, SelectionArgs};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&cli.log_level).context("invalid log filter")?)
        .with_writer(std::io::stderr)
        .init();

    let registry = LanguageRegistry::builtin();
    match cli.command {
        Commands::Scan(args) => run_scan(&args, &registry),
        Commands::Fix(args) => run_fix(&args, &registry),
    }
}

fn run_scan(args: &ScanArgs, registry: &LanguageRegistry) -> anyhow::Result<()> {
    let comments = collect(&args.selection, registry)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&comments)?);
        return Ok(());
    }

    if comments.is_empty() {
        println!("No comments found.");
        return Ok(());
    }

    let grouped = group_by_path(&comments);
    for (path, batch) in &grouped {
        println!("Found {} comments in {path}", batch.len());
        if args.verbose {
            for comment in batch {
                println!("\t- Line {}: {}", comment.line, flatten(&comment.text));
            }
        }
    }
    println!(
        "Found {} comments in {} files",
        comments.len(),
        grouped.len()
    );

    Ok(())
}

fn run_fix(args: &FixArgs, registry: &LanguageRegistry) -> anyhow::Result<()> {
    let comments = collect(&args.selection, registry)?;

    if comments.is_empty() {
        println!("No comments found.");
        return Ok(());
    }

    let grouped = group_by_path(&comments);
    for (path, batch) in &grouped {
        println!("{path}: {} comments", batch.len());
    }

    if !args.yes && !confirm(comments.len(), grouped.len())? {
        println!("Aborted.");
        return Ok(());
    }

    let report = trash_pipeline(comments);
    for failure in &report.failures {
        eprintln!("error: {}: {}", failure.path, failure.error);
    }
    println!(
        "Removed {} comments from {} files.",
        report.comments_removed, report.files_changed
    );

    if report.failures.is_empty() {
        Ok(())
    } else {
        anyhow::bail!("{} files could not be rewritten", report.failures.len())
    }
}

fn collect(selection: &SelectionArgs, registry: &LanguageRegistry) -> anyhow::Result<Vec<Comment>> {
    let source = GitSource::open(".", registry.clone())?;

    if let (Some(base), Some(target)) = (&selection.base, &selection.target) {
        source.validate_commit_order(base, target)?;
    }

    let options = ScanOptions {
        mode: if selection.all {
            ScanMode::WholeFile
        } else {
            ScanMode::AddedLines
        },
        paths: selection.paths.clone(),
        base: selection.base.clone(),
        target: selection.target.clone(),
        include_untracked: selection.include_untracked,
        include_ignored: selection.include_ignored,
    };

    Ok(scan_pipeline(&source, registry, &options)?)
}

fn group_by_path(comments: &[Comment]) -> BTreeMap<&str, Vec<&Comment>> {
    let mut grouped: BTreeMap<&str, Vec<&Comment>> = BTreeMap::new();
    for comment in comments {
        grouped.entry(&comment.path).or_default().push(comment);
    }
    grouped
}

fn confirm(comments: usize, files: usize) -> anyhow::Result<bool> {
    print!("Remove {comments} comments from {files} files? [y/N] ");
    std::io::stdout().flush()?;

    let mut answer = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut answer)
        .context("failed to read confirmation")?;

    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}

fn flatten(text: &str) -> String {
    text.replace(['\n', '\r'], " ")
}
