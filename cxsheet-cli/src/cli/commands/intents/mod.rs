mod handler;

pub use handler::handle_intents_command;

use clap::{Args, Subcommand};

use super::SubmitArgs;
use crate::sheets::TableLocation;

/// Table locations: `file.csv`, `book.xlsx[#tab]` or `gsheet://<title or id>#<tab>`
#[derive(Debug, Subcommand)]
pub enum IntentsCommands {
    /// Build new intents, one per display_name
    Create(IntentTableArgs),
    /// Rebuild the training data of existing intents
    Update(IntentTableArgs),
    /// Dump every intent of an agent as advanced-mode tables
    Export(ExportArgs),
}

#[derive(Debug, Args)]
pub struct IntentTableArgs {
    /// Training phrase table
    #[arg(long)]
    pub phrases: TableLocation,

    /// Parameter table (display_name, id, entity_type)
    #[arg(long)]
    pub params: Option<TableLocation>,

    /// Phrase table layout: basic (one row per phrase) or advanced (one row per part)
    #[arg(long, default_value = "basic")]
    pub mode: String,

    #[command(flatten)]
    pub submit: SubmitArgs,
}

#[derive(Debug, Args)]
pub struct ExportArgs {
    /// Agent path; falls back to the config file
    #[arg(long)]
    pub agent: Option<String>,

    /// Destination for the training phrase table
    #[arg(long)]
    pub to: TableLocation,

    /// Destination for the parameter table (skipped when omitted)
    #[arg(long)]
    pub params_to: Option<TableLocation>,
}
