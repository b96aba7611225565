mod handler;

pub use handler::handle_entities_command;

use clap::{Args, Subcommand};

use super::SubmitArgs;
use crate::sheets::TableLocation;

#[derive(Debug, Subcommand)]
pub enum EntitiesCommands {
    /// Build new entity types, one per display_name
    Create(EntityTableArgs),
    /// Replace the values of existing entity types
    Update(EntityTableArgs),
    /// Dump every entity type of an agent as value rows
    Export(EntityExportArgs),
}

#[derive(Debug, Args)]
pub struct EntityTableArgs {
    /// Value table (display_name, value, synonyms[, meta])
    #[arg(long)]
    pub values: TableLocation,

    #[command(flatten)]
    pub submit: SubmitArgs,
}

#[derive(Debug, Args)]
pub struct EntityExportArgs {
    #[arg(long)]
    pub agent: Option<String>,

    #[arg(long)]
    pub to: TableLocation,
}
