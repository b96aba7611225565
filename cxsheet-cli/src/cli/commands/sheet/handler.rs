//! Sheet copy handler

use anyhow::{Context, Result};
use colored::*;

use super::SheetCommands;
use crate::cli::AppContext;
use crate::convert::Table;
use crate::sheets::{TableLocation, read_csv, read_xlsx, write_csv, write_xlsx};

pub async fn handle_sheet_command(cmd: SheetCommands, ctx: &AppContext) -> Result<()> {
    match cmd {
        SheetCommands::Copy { from, to } => copy(&from, &to, ctx).await,
    }
}

async fn copy(from: &TableLocation, to: &TableLocation, ctx: &AppContext) -> Result<()> {
    // Local-only copies never need credentials
    let table = if is_remote(from) || is_remote(to) {
        let cx = ctx.connect()?;
        let table = cx
            .read_table(from)
            .await
            .with_context(|| format!("Failed to read {}", from))?;
        cx.write_table(to, &table)
            .await
            .with_context(|| format!("Failed to write {}", to))?;
        table
    } else {
        let table = read_local(from).with_context(|| format!("Failed to read {}", from))?;
        write_local(to, &table).with_context(|| format!("Failed to write {}", to))?;
        table
    };

    println!(
        "Copied {} row(s) from {} to {}",
        table.len(),
        from.to_string().cyan(),
        to.to_string().cyan()
    );
    Ok(())
}

fn is_remote(location: &TableLocation) -> bool {
    matches!(location, TableLocation::GoogleSheet { .. })
}

fn read_local(location: &TableLocation) -> crate::Result<Table> {
    match location {
        TableLocation::Csv(path) => read_csv(path),
        TableLocation::Xlsx { path, tab } => read_xlsx(path, tab.as_deref()),
        TableLocation::GoogleSheet { .. } => Err(crate::CxSheetError::table(format!(
            "{} is not a local file",
            location
        ))),
    }
}

fn write_local(location: &TableLocation, table: &Table) -> crate::Result<()> {
    match location {
        TableLocation::Csv(path) => write_csv(path, table),
        TableLocation::Xlsx { path, tab } => write_xlsx(path, tab.as_deref(), table),
        TableLocation::GoogleSheet { .. } => Err(crate::CxSheetError::table(format!(
            "{} is not a local file",
            location
        ))),
    }
}
