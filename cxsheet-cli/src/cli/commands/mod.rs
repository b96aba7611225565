//! Subcommands and the pieces they share

pub mod entities;
pub mod intents;
pub mod sheet;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use colored::*;
use serde::Serialize;

use crate::batch::{Action, BatchReport, BatchResult};
use crate::convert::SchemaPolicy;

/// Schema handling on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SchemaArg {
    /// Abort on any schema problem
    Strict,
    /// Report problems and keep usable rows
    Lenient,
}

impl From<SchemaArg> for SchemaPolicy {
    fn from(arg: SchemaArg) -> Self {
        match arg {
            SchemaArg::Strict => SchemaPolicy::Strict,
            SchemaArg::Lenient => SchemaPolicy::Lenient,
        }
    }
}

/// Flags shared by every create/update command
#[derive(Debug, Clone, Args)]
pub struct SubmitArgs {
    /// Agent path (projects/<p>/locations/<l>/agents/<id>); falls back to the config file
    #[arg(long)]
    pub agent: Option<String>,

    /// Push the built collections to the agent (default: build only)
    #[arg(long)]
    pub commit: bool,

    /// Skip the confirmation prompt before committing
    #[arg(short, long)]
    pub yes: bool,

    /// Override schema handling (default: strict on create, lenient on update)
    #[arg(long, value_enum)]
    pub schema: Option<SchemaArg>,

    /// Write the built collections as JSON
    #[arg(long)]
    pub output: Option<PathBuf>,
}

impl SubmitArgs {
    /// False when the user declined to commit
    pub fn confirm(&self, action: Action, what: &str, source: &str, agent: &str) -> Result<bool> {
        if !self.commit || self.yes {
            return Ok(true);
        }
        let prompt = format!("{} {}s from {} in {}?", action, what, source, agent);
        dialoguer::Confirm::new()
            .with_prompt(prompt)
            .default(false)
            .interact()
            .context("Failed to read confirmation")
    }
}

/// Print the batch outcome and write `--output`. An aborted batch still shows
/// and writes what was committed before it stopped.
pub fn finish_batch<R>(action: Action, what: &str, submit: &SubmitArgs, result: BatchResult<R>) -> Result<()>
where
    R: Serialize + std::fmt::Debug + Send + Sync + 'static,
{
    let aborted = match result {
        Ok(report) => {
            print_report(action, what, submit.commit, &report);
            if let Some(path) = &submit.output {
                write_report_json(path, &report)?;
            }
            return Ok(());
        }
        Err(aborted) => aborted,
    };

    if aborted.has_progress() {
        print_report(action, what, submit.commit, &aborted.report);
        println!("{} stopped early; committed items were not rolled back", "!".bright_red().bold());
        if let Some(path) = &submit.output {
            write_report_json(path, &aborted.report)?;
        }
    }
    Err(anyhow::Error::new(aborted)).with_context(|| format!("Failed to {} {}s", action, what))
}

pub fn write_report_json<R: Serialize>(path: &Path, report: &BatchReport<R>) -> Result<()> {
    let json = serde_json::to_string_pretty(&report.built)
        .context("Failed to serialize built collections")?;
    fs::write(path, json)
        .with_context(|| format!("Failed to write output file: {}", path.display()))?;
    println!("Wrote {}", path.display().to_string().cyan());
    Ok(())
}

pub fn print_report<R>(action: Action, what: &str, commit: bool, report: &BatchReport<R>) {
    let verb = if commit {
        format!("{}d", action).bright_green().bold()
    } else {
        "built".yellow().bold()
    };
    println!();
    println!("{} {} {}(s)", verb, report.built.len(), what);
    if commit {
        println!(
            "  submitted: {}, pauses: {} ({}s)",
            report.submitted,
            report.pacing.pauses,
            report.pacing.total_paused.as_secs()
        );
    } else {
        println!("  {}", "dry run: nothing was sent, pass --commit to submit".dimmed());
    }
    if !report.failures.is_empty() {
        println!("{} {} skipped:", "!".bright_red().bold(), report.failures.len());
        for failure in &report.failures {
            println!("  {} {}", failure.display_name.bright_red(), failure.error.dimmed());
        }
    }
}
