//! Entity type command handlers

use anyhow::{Context, Result};
use colored::*;

use super::{EntitiesCommands, EntityExportArgs, EntityTableArgs};
use crate::batch::Action;
use crate::cli::AppContext;
use crate::cli::commands::finish_batch;
use crate::cli::progress;
use crate::cxsheets::BulkOptions;

pub async fn handle_entities_command(cmd: EntitiesCommands, ctx: &AppContext) -> Result<()> {
    match cmd {
        EntitiesCommands::Create(args) => submit(Action::Create, args, ctx).await,
        EntitiesCommands::Update(args) => submit(Action::Update, args, ctx).await,
        EntitiesCommands::Export(args) => export(args, ctx).await,
    }
}

async fn submit(action: Action, args: EntityTableArgs, ctx: &AppContext) -> Result<()> {
    let agent = ctx.agent(args.submit.agent.as_deref())?;
    if !args
        .submit
        .confirm(action, "entity type", &args.values.to_string(), &agent)?
    {
        println!("{}", "Aborted".yellow());
        return Ok(());
    }

    let cx = ctx.connect()?;
    println!("Reading entity values from {}", args.values.to_string().cyan());
    let values = cx
        .read_table(&args.values)
        .await
        .with_context(|| format!("Failed to read {}", args.values))?;

    let reporter = progress::reporter();
    let mut options = BulkOptions::commit(args.submit.commit).with_progress(reporter.as_ref());
    options.schema = args.submit.schema.map(Into::into);

    let result = match action {
        Action::Create => cx.bulk_create_entity_types(&agent, &values, options).await,
        Action::Update => cx.bulk_update_entity_types(&agent, &values, options).await,
    };
    finish_batch(action, "entity type", &args.submit, result)
}

async fn export(args: EntityExportArgs, ctx: &AppContext) -> Result<()> {
    let agent = ctx.agent(args.agent.as_deref())?;
    let cx = ctx.connect()?;

    let table = cx
        .export_entity_types(&agent)
        .await
        .context("Failed to export entity types")?;
    cx.write_table(&args.to, &table)
        .await
        .with_context(|| format!("Failed to write {}", args.to))?;

    println!(
        "Wrote {} entity value row(s) to {}",
        table.len(),
        args.to.to_string().cyan()
    );
    Ok(())
}
