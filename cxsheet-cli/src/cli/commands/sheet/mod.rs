mod handler;

pub use handler::handle_sheet_command;

use clap::Subcommand;

use crate::sheets::TableLocation;

#[derive(Debug, Subcommand)]
pub enum SheetCommands {
    /// Copy a table between CSV, XLSX and Google Sheets locations
    Copy {
        #[arg(long)]
        from: TableLocation,
        #[arg(long)]
        to: TableLocation,
    },
}
