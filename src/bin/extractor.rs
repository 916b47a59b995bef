//! The canonical client binary: recursively extracts archives under a tree.

#![deny(unsafe_code)]
#![warn(rust_2018_idioms)]

use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use console::style;
use extractor::api::extract_archives;
use extractor::cli::Cli;
use indicatif::{ProgressBar, ProgressStyle};
use stable_eyre::eyre::{Context, Result};

fn main() -> Result<ExitCode> {
    stable_eyre::install()?;
    pretty_env_logger::init();

    let cli = Cli::parse();
    run(&cli)
}

fn run(cli: &Cli) -> Result<ExitCode> {
    let options = cli.options();
    let events = extract_archives(&cli.input, &options).context("walk input tree")?;

    let progress = (!cli.quiet).then(|| {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner} {msg}").expect("valid progress template"),
        );
        bar
    });

    let mut worst_is_error = false;
    let mut worst_is_warning = false;

    for event in events {
        if !event.done() {
            if let Some(bar) = &progress {
                let label = if cli.verbose {
                    event.source().display().to_string()
                } else {
                    event
                        .source()
                        .file_name()
                        .map(|n| n.to_string_lossy().to_string())
                        .unwrap_or_else(|| event.source().display().to_string())
                };
                bar.set_message(label);
                bar.tick();
            }
            continue;
        }

        for message in event.errors() {
            worst_is_error = true;
            eprintln!(
                "{} extracting: {}: {message}",
                style("ERROR").red().bold(),
                relative_or_absolute(event.source(), &cli.input).display(),
            );
        }
        for message in event.warnings() {
            if !worst_is_error {
                worst_is_warning = true;
            }
            eprintln!(
                "{} extracting: {}: {message}",
                style("WARNING").yellow().bold(),
                relative_or_absolute(event.source(), &cli.input).display(),
            );
        }
    }

    if let Some(bar) = &progress {
        bar.finish_and_clear();
    }

    let summary = if worst_is_error {
        style("extraction finished with errors").red()
    } else if worst_is_warning {
        style("extraction finished with warnings").yellow()
    } else {
        style("extraction finished cleanly").green()
    };
    println!("{summary}");

    Ok(if worst_is_error {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

fn relative_or_absolute<'a>(path: &'a Path, base: &Path) -> &'a Path {
    path.strip_prefix(base).unwrap_or(path)
}
