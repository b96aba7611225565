//! Intent command handlers

use anyhow::{Context, Result};
use colored::*;

use super::{ExportArgs, IntentTableArgs, IntentsCommands};
use crate::batch::Action;
use crate::cli::AppContext;
use crate::cli::commands::finish_batch;
use crate::cli::progress;
use crate::convert::BuildMode;
use crate::cxsheets::BulkOptions;

pub async fn handle_intents_command(cmd: IntentsCommands, ctx: &AppContext) -> Result<()> {
    match cmd {
        IntentsCommands::Create(args) => submit(Action::Create, args, ctx).await,
        IntentsCommands::Update(args) => submit(Action::Update, args, ctx).await,
        IntentsCommands::Export(args) => export(args, ctx).await,
    }
}

async fn submit(action: Action, args: IntentTableArgs, ctx: &AppContext) -> Result<()> {
    // Reject a bad mode before anything is read
    args.mode
        .parse::<BuildMode>()
        .context("Invalid --mode")?;
    let agent = ctx.agent(args.submit.agent.as_deref())?;

    if !args
        .submit
        .confirm(action, "intent", &args.phrases.to_string(), &agent)?
    {
        println!("{}", "Aborted".yellow());
        return Ok(());
    }

    let cx = ctx.connect()?;
    println!(
        "Reading training phrases from {}",
        args.phrases.to_string().cyan()
    );
    let phrases = cx
        .read_table(&args.phrases)
        .await
        .with_context(|| format!("Failed to read {}", args.phrases))?;
    let params = match &args.params {
        Some(location) => Some(
            cx.read_table(location)
                .await
                .with_context(|| format!("Failed to read {}", location))?,
        ),
        None => None,
    };

    let reporter = progress::reporter();
    let mut options = BulkOptions::commit(args.submit.commit).with_progress(reporter.as_ref());
    options.schema = args.submit.schema.map(Into::into);

    let result = match action {
        Action::Create => {
            cx.bulk_create_intents(&agent, &phrases, params.as_ref(), &args.mode, options)
                .await
        }
        Action::Update => {
            cx.bulk_update_intents(&agent, &phrases, params.as_ref(), &args.mode, options)
                .await
        }
    };
    finish_batch(action, "intent", &args.submit, result)
}

async fn export(args: ExportArgs, ctx: &AppContext) -> Result<()> {
    let agent = ctx.agent(args.agent.as_deref())?;
    let cx = ctx.connect()?;

    let tables = cx
        .export_intents(&agent)
        .await
        .context("Failed to export intents")?;

    cx.write_table(&args.to, &tables.training_phrases)
        .await
        .with_context(|| format!("Failed to write {}", args.to))?;
    println!(
        "Wrote {} training phrase row(s) to {}",
        tables.training_phrases.len(),
        args.to.to_string().cyan()
    );

    if let Some(location) = &args.params_to {
        cx.write_table(location, &tables.parameters)
            .await
            .with_context(|| format!("Failed to write {}", location))?;
        println!(
            "Wrote {} parameter row(s) to {}",
            tables.parameters.len(),
            location.to_string().cyan()
        );
    }
    Ok(())
}
